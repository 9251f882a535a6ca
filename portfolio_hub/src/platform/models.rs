//! Platform-admin data models.

use crate::auth::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Platform-wide counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformStats {
    pub total_users: u64,
    pub active_users: u64,
    pub recent_signups: u64,
    pub total_projects: u64,
    pub total_skills: u64,
    pub total_categories: u64,
    pub total_experience: u64,
    pub total_messages: u64,
}

/// Tenant user as listed in the admin panel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformUser {
    pub id: UserId,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub date_joined: Option<DateTime<Utc>>,
    #[serde(default = "active_by_default")]
    pub is_active: bool,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub username_slug: String,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub is_platform_admin: bool,
    #[serde(default)]
    pub projects_count: u64,
    #[serde(default)]
    pub skills_count: u64,
}

fn active_by_default() -> bool {
    true
}

/// One page of a paginated listing
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Page<T> {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    pub results: Vec<T>,
}

/// A listing served either paginated or as a bare array
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Listing<T> {
    Page(Page<T>),
    List(Vec<T>),
}

impl<T> Listing<T> {
    /// Items of this response and the link to the following page, if any
    pub fn into_parts(self) -> (Vec<T>, Option<String>) {
        match self {
            Listing::Page(page) => (page.results, page.next),
            Listing::List(items) => (items, None),
        }
    }
}

/// Activation change request
#[derive(Debug, Clone, Serialize)]
pub struct SetActiveRequest {
    pub is_active: bool,
}

/// Activation state after a change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct UserStatus {
    pub id: UserId,
    pub is_active: bool,
}
