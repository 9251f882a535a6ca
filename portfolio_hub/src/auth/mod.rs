//! Authentication session core.
//!
//! This module owns the signed-in state of the application:
//! - [`SessionManager`]: startup check, login, registration, logout
//! - [`ImpersonationController`]: platform admins acting as another user
//! - [`guard`]: view access decisions from session state
//! - [`validation`]: form checks run before any request is sent
//!
//! ## Example
//!
//! ```no_run
//! use portfolio_hub::api::{ApiClient, ApiConfig};
//! use portfolio_hub::auth::SessionManager;
//! use portfolio_hub::navigation::NullNavigator;
//! use portfolio_hub::store::TokenStore;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let api = Arc::new(ApiClient::new(
//!         ApiConfig::default(),
//!         Arc::new(TokenStore::in_memory()),
//!         Arc::new(NullNavigator),
//!     )?);
//!     let session = SessionManager::new(api);
//!
//!     session.start().await;
//!     let user = session.login("demo", "demopass").await?;
//!     println!("Signed in as {}", user.username);
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod guard;
pub mod impersonation;
pub mod manager;
pub mod models;
pub mod validation;

pub use errors::{AuthError, AuthResult};
pub use guard::{Access, GuardDecision};
pub use impersonation::ImpersonationController;
pub use manager::SessionManager;
pub use models::{
    ChangePasswordRequest, ForgotPasswordRequest, ImpersonatedUser, ImpersonationGrant,
    LoginRequest, Profile, RegisterRequest, RegisterResponse, ResetPasswordRequest, SessionState,
    StopImpersonationRequest, User, UserId,
};
pub use validation::FieldErrors;
