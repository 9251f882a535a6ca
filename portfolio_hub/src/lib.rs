//! # PortfolioHub
//!
//! Session core for PortfolioHub clients: token storage, a bearer-token HTTP
//! client with transparent refresh, the authentication state machine,
//! platform-admin impersonation and route guarding.
//!
//! ## Architecture
//!
//! Components, leaves first:
//!
//! - **Token Store** ([`store`]): persisted `access_token`, `refresh_token`
//!   and the `original_admin_id` impersonation marker
//! - **HTTP Client** ([`api`]): attaches the bearer token and recovers once
//!   from a 401 by refreshing
//! - **Session Manager** ([`auth::SessionManager`]): `Unknown`, `Anonymous`
//!   or `Authenticated`; login, registration, logout
//! - **Impersonation** ([`auth::ImpersonationController`]): swap to another
//!   user's tokens and back
//! - **Route Guard** ([`auth::guard`]): view access from session state
//!
//! [`Hub`] wires them together for a host, which supplies storage and a
//! [`Navigator`](navigation::Navigator).
//!
//! ## Example
//!
//! ```no_run
//! use portfolio_hub::{ApiConfig, Hub, TokenStore, navigation::NullNavigator};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let hub = Hub::new(
//!         ApiConfig::new("http://localhost:8001/api"),
//!         Arc::new(TokenStore::in_memory()),
//!         Arc::new(NullNavigator),
//!     )?;
//!
//!     if !hub.session().start().await.is_authenticated() {
//!         hub.session().login("demo", "demopass").await?;
//!     }
//!     Ok(())
//! }
//! ```

/// HTTP transport with bearer injection and token refresh.
pub mod api;
pub use api::{ApiClient, ApiConfig, ApiError, ApiRequest, ApiResult};

/// Session state, login/registration, impersonation and guards.
pub mod auth;
pub use auth::{
    Access, AuthError, AuthResult, GuardDecision, ImpersonationController, SessionManager,
    SessionState, User, UserId,
};

/// Composition root.
pub mod hub;
pub use hub::Hub;

/// Host navigation seam and route paths.
pub mod navigation;

/// Platform-admin user management.
pub mod platform;
pub use platform::PlatformAdmin;

/// Persisted session tokens.
pub mod store;
pub use store::{TokenPair, TokenStore};
