// Outbound clients for external services.

pub mod api;

pub use api::{ApiError, GameApiClient};
