//! Session manager implementation.

use super::{
    errors::{AuthError, AuthResult},
    models::{
        ChangePasswordRequest, ForgotPasswordRequest, LoginRequest, RegisterRequest,
        RegisterResponse, ResetPasswordRequest, SessionState, User,
    },
    validation,
};
use crate::api::{ApiClient, ApiRequest, ApiResult};
use crate::store::{TokenPair, TokenStore};
use log::{info, warn};
use std::sync::Arc;
use tokio::sync::{OnceCell, watch};

/// Token issue endpoint
pub const TOKEN_PATH: &str = "auth/token/";

/// "Who am I" endpoint
pub const ME_PATH: &str = "auth/me/";

/// Registration endpoint
pub const REGISTER_PATH: &str = "auth/register/";

pub const FORGOT_PASSWORD_PATH: &str = "auth/forgot-password/";
pub const RESET_PASSWORD_PATH: &str = "auth/reset-password/";
pub const CHANGE_PASSWORD_PATH: &str = "auth/change-password/";

/// Owner of the process-wide [`SessionState`].
///
/// State moves from `Unknown` to `Anonymous` or `Authenticated` once, in
/// [`start`](Self::start), and afterwards only through this manager's
/// operations. Observers subscribe with [`subscribe`](Self::subscribe).
pub struct SessionManager {
    api: Arc<ApiClient>,
    state: Arc<watch::Sender<SessionState>>,
    started: OnceCell<()>,
}

impl SessionManager {
    /// Create a manager in the `Unknown` state
    pub fn new(api: Arc<ApiClient>) -> Self {
        let (state, _) = watch::channel(SessionState::Unknown);
        let state = Arc::new(state);

        // A failed refresh on any caller's request ends this session too
        let observer = Arc::downgrade(&state);
        api.on_session_invalid(move || {
            if let Some(state) = observer.upgrade() {
                end_session(&state);
            }
        });

        Self {
            api,
            state,
            started: OnceCell::new(),
        }
    }

    /// Snapshot of the current state
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Observe state transitions
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    pub fn user(&self) -> Option<User> {
        self.state.borrow().user().cloned()
    }

    fn tokens(&self) -> &TokenStore {
        self.api.tokens()
    }

    /// Resolve the startup state from the token store.
    ///
    /// Runs the check at most once per manager; later calls (and concurrent
    /// ones) wait for that first check and return the current state.
    pub async fn start(&self) -> SessionState {
        self.started.get_or_init(|| self.restore()).await;
        self.state()
    }

    async fn restore(&self) {
        let resolved = if self.tokens().tokens().is_none() {
            if !self.tokens().is_empty() {
                // Leftovers of an incomplete session
                self.tokens().clear();
            }
            SessionState::Anonymous
        } else {
            match self.fetch_user().await {
                Ok(user) => {
                    info!("Restored session for {}", user.username);
                    SessionState::Authenticated(user)
                }
                Err(e) => {
                    warn!("Stored session rejected: {}", e);
                    self.tokens().clear();
                    SessionState::Anonymous
                }
            }
        };

        self.state.send_if_modified(|state| {
            if state.is_loading() {
                *state = resolved;
                true
            } else {
                false
            }
        });
    }

    /// Sign in with username and password
    ///
    /// # Errors
    ///
    /// * `AuthError::Validation` - A field is empty; nothing was sent
    /// * `AuthError::Api` - Credentials rejected or the server unreachable; the
    ///   token store is unchanged
    pub async fn login(&self, username: &str, password: &str) -> AuthResult<User> {
        validation::validate_login(username, password)?;

        let request = ApiRequest::post(TOKEN_PATH).anonymous().json(&LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        })?;
        let tokens: TokenPair = self.api.send_json(request).await?;

        self.tokens().clear_original_admin_id();
        self.tokens().store_tokens(&tokens);

        match self.fetch_user().await {
            Ok(user) => {
                info!("Signed in as {}", user.username);
                self.state
                    .send_replace(SessionState::Authenticated(user.clone()));
                Ok(user)
            }
            Err(e) => {
                warn!("Signed in but profile lookup failed: {}", e);
                self.tokens().clear();
                self.state.send_replace(SessionState::Anonymous);
                Err(e.into())
            }
        }
    }

    /// Create an account and sign in with the tokens it returns
    ///
    /// # Errors
    ///
    /// * `AuthError::Validation` - Client-side checks failed; nothing was sent
    /// * `AuthError::Api` - Server rejected the form (see
    ///   [`AuthError::field_errors`])
    pub async fn register(&self, form: &RegisterRequest) -> AuthResult<User> {
        validation::validate_registration(form)?;

        let request = ApiRequest::post(REGISTER_PATH).anonymous().json(form)?;
        let RegisterResponse { user, tokens } = self.api.send_json(request).await?;

        self.tokens().clear_original_admin_id();
        self.tokens().store_tokens(&tokens);

        info!("Registered and signed in as {}", user.username);
        self.state
            .send_replace(SessionState::Authenticated(user.clone()));
        Ok(user)
    }

    /// End the session locally. No request is sent.
    pub fn logout(&self) {
        self.tokens().clear();
        let previous = self.state.send_replace(SessionState::Anonymous);
        if let Some(user) = previous.user() {
            info!("Signed out {}", user.username);
        }
    }

    /// Re-fetch the signed-in user
    pub async fn refresh_user(&self) -> AuthResult<User> {
        if !self.is_authenticated() {
            return Err(AuthError::NotAuthenticated);
        }

        let user = self.fetch_user().await?;
        self.state
            .send_replace(SessionState::Authenticated(user.clone()));
        Ok(user)
    }

    /// Ask for a password reset email; returns the server's message
    pub async fn forgot_password(&self, email: &str) -> AuthResult<String> {
        validation::validate_email(email)?;

        let request = ApiRequest::post(FORGOT_PASSWORD_PATH)
            .anonymous()
            .json(&ForgotPasswordRequest {
                email: email.trim().to_string(),
            })?;
        Ok(self.api.send_detail(request).await?)
    }

    /// Set a new password from a reset link
    pub async fn reset_password(
        &self,
        request: &ResetPasswordRequest,
        confirmation: &str,
    ) -> AuthResult<String> {
        validation::validate_password_reset(request, confirmation)?;

        let request = ApiRequest::post(RESET_PASSWORD_PATH)
            .anonymous()
            .json(request)?;
        Ok(self.api.send_detail(request).await?)
    }

    /// Change the signed-in user's password
    pub async fn change_password(&self, old_password: &str, new_password: &str) -> AuthResult<String> {
        if !self.is_authenticated() {
            return Err(AuthError::NotAuthenticated);
        }
        validation::validate_password_change(old_password, new_password)?;

        let request = ApiRequest::post(CHANGE_PASSWORD_PATH).json(&ChangePasswordRequest {
            old_password: old_password.to_string(),
            new_password: new_password.to_string(),
        })?;
        Ok(self.api.send_detail(request).await?)
    }

    async fn fetch_user(&self) -> ApiResult<User> {
        self.api.send_json(ApiRequest::get(ME_PATH)).await
    }
}

/// Drop an authenticated session to `Anonymous`
fn end_session(state: &watch::Sender<SessionState>) {
    state.send_if_modified(|state| {
        if state.is_authenticated() {
            info!("Session ended by a rejected token refresh");
            *state = SessionState::Anonymous;
            true
        } else {
            false
        }
    });
}
