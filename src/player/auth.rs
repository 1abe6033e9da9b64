use log::{debug, info};

use crate::http::urls::Endpoints;

/// Sends the user somewhere else, e.g. the login page
pub trait Navigator {
    fn navigate(&mut self, url: &str);
}

/// Redirects to the login page at most once per session
pub struct AuthGuard {
    navigator: Box<dyn Navigator>,
    login_url: String,
    redirected: bool,
}

impl AuthGuard {
    /// `page` is the path and query to come back to after logging in
    pub fn new(navigator: Box<dyn Navigator>, endpoints: &Endpoints, page: &str) -> Self {
        Self {
            navigator,
            login_url: endpoints.login_url(page),
            redirected: false,
        }
    }

    /// Returns true if this call started the redirect.
    pub fn redirect(&mut self) -> bool {
        if self.redirected {
            debug!("Login redirect already in progress");
            return false;
        }
        self.redirected = true;
        info!("Not authenticated, redirecting to {}", self.login_url);
        self.navigator.navigate(&self.login_url);
        true
    }

    pub fn is_redirected(&self) -> bool {
        self.redirected
    }
}
