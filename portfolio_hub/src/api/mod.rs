//! HTTP transport for the PortfolioHub REST API.
//!
//! [`ApiClient`] is the single dispatch point for backend calls. It injects
//! the bearer token from the [`TokenStore`](crate::store::TokenStore) and
//! transparently recovers once from an expired access token.

pub mod client;
pub mod errors;

pub use client::{ApiClient, ApiConfig, ApiRequest, Auth, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
pub use errors::{ApiError, ApiResult};
