//! Durable local storage, the counterpart of a browser's `localStorage`.

pub mod db;
pub mod error;
pub mod local;
pub(crate) mod schema;

pub use error::StorageError;
pub use local::{KeyValueStore, LocalStorage};
