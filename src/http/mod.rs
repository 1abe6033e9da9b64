pub mod client;
pub mod dispatch;
pub mod error;
#[cfg(test)]
pub(crate) mod fake;
pub mod urls;

pub use client::ProgressClient;
pub use dispatch::BackgroundProgressApi;
pub use error::ApiError;
pub use urls::Endpoints;
