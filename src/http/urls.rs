use crate::domain::track::FileId;

/// URLs of the progress service and the pages it serves
#[derive(Debug, Clone)]
pub struct Endpoints {
    base_url: String,
}

impl Endpoints {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// `POST` target for progress writes
    pub fn progress_url(&self) -> String {
        format!("{}/api/progress", self.base_url)
    }

    /// `GET` target for the stored progress of `file`
    pub fn progress_query_url(&self, file: &FileId) -> String {
        format!(
            "{}/api/progress?file={}",
            self.base_url,
            urlencoding::encode(file.as_str())
        )
    }

    /// byte stream consumed by the playback source
    pub fn media_url(&self, file: &FileId) -> String {
        format!(
            "{}/media?path={}",
            self.base_url,
            urlencoding::encode(file.as_str())
        )
    }

    /// login entry point returning to `next` (path + query) afterwards
    ///
    /// The service only honours absolute-path targets, anything else returns to `/`.
    pub fn login_url(&self, next: &str) -> String {
        let next = if next.starts_with('/') { next } else { "/" };
        format!("{}/login?next={}", self.base_url, urlencoding::encode(next))
    }
}
