// Service exports
pub mod api;
pub mod backend;

pub use api::{ApiClient, ApiError};
pub use backend::{BackendClient, BackendError, Forwarded, UpstreamMethod};
