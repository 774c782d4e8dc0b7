//! Backend API layer: transport seam, typed endpoints, error type.

pub mod client;
pub mod error;
pub mod transport;

pub use client::ApiClient;
pub use error::ApiError;
pub use transport::{ApiRequest, HttpTransport, Transport};
