//! Authentication data models.

use crate::store::TokenPair;
use serde::{Deserialize, Deserializer, Serialize};

/// User ID type
pub type UserId = i64;

/// Public portfolio profile attached to a user
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    pub username_slug: String,
    pub full_name: String,
    pub tagline: String,
    pub bio: String,
    pub avatar: Option<String>,
    pub resume: Option<String>,
    pub github_url: Option<String>,
    pub linkedin_url: Option<String>,
    pub twitter_url: Option<String>,
    pub email: Option<String>,
    pub is_platform_admin: bool,
}

/// User as returned by "who am I"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub is_platform_admin: bool,
    #[serde(default)]
    pub profile: Option<Profile>,
}

impl User {
    /// Platform-admin flag, from the user record or its nested profile
    pub fn is_platform_admin(&self) -> bool {
        self.is_platform_admin
            || self
                .profile
                .as_ref()
                .is_some_and(|profile| profile.is_platform_admin)
    }
}

/// Login credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// User registration form
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub password: String,
    pub password_confirm: String,
}

/// Registration response: the new user and its first token pair
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterResponse {
    pub user: User,
    pub tokens: TokenPair,
}

/// Summary of the user a platform admin is acting as
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpersonatedUser {
    pub id: UserId,
    pub username: String,
    #[serde(default)]
    pub full_name: String,
}

/// Tokens issued for an impersonation session
#[derive(Debug, Clone, Deserialize)]
pub struct ImpersonationGrant {
    pub access: String,
    pub refresh: String,
    #[serde(deserialize_with = "id_as_string")]
    pub original_admin_id: String,
    pub impersonated_user: ImpersonatedUser,
}

impl ImpersonationGrant {
    pub fn tokens(&self) -> TokenPair {
        TokenPair {
            access: self.access.clone(),
            refresh: self.refresh.clone(),
        }
    }
}

/// Request to return to the admin identity
#[derive(Debug, Clone, Serialize)]
pub struct StopImpersonationRequest {
    pub original_admin_id: String,
}

/// Request a password reset email
#[derive(Debug, Clone, Serialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

/// Password reset confirmation
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResetPasswordRequest {
    pub uid: String,
    pub token: String,
    pub new_password: String,
}

/// Password change for the signed-in user
#[derive(Debug, Clone, Serialize)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

/// Process-wide authentication state
#[derive(Debug, Clone, Default, PartialEq)]
pub enum SessionState {
    /// Startup check has not finished
    #[default]
    Unknown,
    /// No usable session
    Anonymous,
    /// Signed in as the given user
    Authenticated(User),
}

impl SessionState {
    pub fn is_loading(&self) -> bool {
        matches!(self, SessionState::Unknown)
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated(_))
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            SessionState::Authenticated(user) => Some(user),
            _ => None,
        }
    }
}

/// Accept an id sent either as a JSON number or a string
fn id_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Number(i64),
        Text(String),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Number(n) => n.to_string(),
        Id::Text(s) => s,
    })
}
