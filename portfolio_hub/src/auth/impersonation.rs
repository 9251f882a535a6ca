//! Platform-admin impersonation.
//!
//! Starting an impersonation stores the admin's id as a marker and replaces
//! the active tokens with ones issued for the target user. The marker is
//! present exactly while the active tokens belong to an impersonated user.

use super::{
    errors::{AuthError, AuthResult},
    models::{ImpersonatedUser, ImpersonationGrant, StopImpersonationRequest, UserId},
};
use crate::api::{ApiClient, ApiRequest};
use crate::navigation::routes;
use crate::store::TokenPair;
use log::{info, warn};
use std::sync::Arc;
use tokio::sync::watch;

/// Stop-impersonation endpoint
pub const STOP_IMPERSONATION_PATH: &str = "admin/stop-impersonation/";

/// Impersonation endpoint for a target user
pub fn impersonate_path(user_id: UserId) -> String {
    format!("admin/impersonate/{}/", user_id)
}

/// Swaps the active session between a platform admin and another user
pub struct ImpersonationController {
    api: Arc<ApiClient>,
}

impl ImpersonationController {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    /// Whether the active session is an impersonation
    pub fn is_impersonating(&self) -> bool {
        self.api.tokens().is_impersonating()
    }

    /// Id of the admin to return to, if impersonating
    pub fn original_admin_id(&self) -> Option<String> {
        self.api.tokens().original_admin_id()
    }

    /// Observe the marker; `Some` while impersonating
    pub fn watch(&self) -> watch::Receiver<Option<String>> {
        self.api.tokens().subscribe_marker()
    }

    /// Act as `target` and reload at the user dashboard
    ///
    /// # Errors
    ///
    /// * `AuthError::Api` - Not authorized or unknown user; nothing changed
    pub async fn start(&self, target: UserId) -> AuthResult<ImpersonatedUser> {
        let grant: ImpersonationGrant = self
            .api
            .send_json(ApiRequest::post(impersonate_path(target)))
            .await
            .inspect_err(|e| warn!("Impersonation of user {} failed: {}", target, e))?;

        let tokens = self.api.tokens();
        tokens.set_original_admin_id(&grant.original_admin_id);
        tokens.store_tokens(&grant.tokens());

        info!(
            "Admin {} now impersonating {} ({})",
            grant.original_admin_id, grant.impersonated_user.username, grant.impersonated_user.id
        );
        self.api.navigator().reload(routes::USER_DASHBOARD);
        Ok(grant.impersonated_user)
    }

    /// Return to the admin identity and reload at the admin dashboard
    ///
    /// # Errors
    ///
    /// * `AuthError::NotImpersonating` - No marker is stored
    /// * `AuthError::Api` - The admin session could not be restored; marker and
    ///   tokens are left as they were so the call can be retried
    pub async fn stop(&self) -> AuthResult<()> {
        let original_admin_id = self
            .original_admin_id()
            .ok_or(AuthError::NotImpersonating)?;

        let request = ApiRequest::post(STOP_IMPERSONATION_PATH).json(&StopImpersonationRequest {
            original_admin_id: original_admin_id.clone(),
        })?;
        let admin_tokens: TokenPair = self
            .api
            .send_json(request)
            .await
            .inspect_err(|e| warn!("Failed to stop impersonation: {}", e))?;

        let tokens = self.api.tokens();
        tokens.store_tokens(&admin_tokens);
        tokens.clear_original_admin_id();

        info!("Returned to admin {}", original_admin_id);
        self.api.navigator().reload(routes::ADMIN_DASHBOARD);
        Ok(())
    }
}
