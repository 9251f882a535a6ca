//! Platform-admin user management.
//!
//! Cross-tenant operations available to users with the platform-admin flag.
//! Authorization is enforced by the backend; a non-admin caller receives the
//! server's 403 as an [`ApiError::Status`](crate::api::ApiError::Status).

pub mod models;

pub use models::{Listing, Page, PlatformStats, PlatformUser, SetActiveRequest, UserStatus};

use crate::api::{ApiClient, ApiRequest, ApiResult};
use crate::auth::UserId;
use log::info;
use std::sync::Arc;

pub const STATS_PATH: &str = "superadmin/stats/";
pub const USERS_PATH: &str = "superadmin/users/";

/// Detail endpoint of one tenant user
pub fn user_path(user_id: UserId) -> String {
    format!("superadmin/users/{}/", user_id)
}

/// Client for the platform-admin endpoints
pub struct PlatformAdmin {
    api: Arc<ApiClient>,
}

impl PlatformAdmin {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    pub async fn stats(&self) -> ApiResult<PlatformStats> {
        self.api.send_json(ApiRequest::get(STATS_PATH)).await
    }

    /// All tenant users, newest first.
    ///
    /// Follows `next` links when the backend paginates the listing.
    pub async fn list_users(&self) -> ApiResult<Vec<PlatformUser>> {
        let mut users = Vec::new();
        let mut request = Some(ApiRequest::get(USERS_PATH));

        while let Some(current) = request.take() {
            let listing: Listing<PlatformUser> = self.api.send_json(current).await?;
            let (page, next) = listing.into_parts();
            users.extend(page);
            request = next.map(ApiRequest::get);
        }

        Ok(users)
    }

    pub async fn get_user(&self, user_id: UserId) -> ApiResult<PlatformUser> {
        self.api.send_json(ApiRequest::get(user_path(user_id))).await
    }

    /// Activate or deactivate a user
    pub async fn set_user_active(&self, user_id: UserId, is_active: bool) -> ApiResult<UserStatus> {
        let request = ApiRequest::patch(user_path(user_id)).json(&SetActiveRequest { is_active })?;
        let status: UserStatus = self.api.send_json(request).await?;
        info!("User {} is_active={}", status.id, status.is_active);
        Ok(status)
    }

    /// Delete a user and all of their content; returns the server's message
    pub async fn delete_user(&self, user_id: UserId) -> ApiResult<String> {
        let detail = self
            .api
            .send_detail(ApiRequest::delete(user_path(user_id)))
            .await?;
        info!("Deleted user {}", user_id);
        Ok(detail)
    }
}
