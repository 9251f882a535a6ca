//! Durable token storage.
//!
//! The [`TokenStore`] is the only owner of the persisted session keys:
//! `access_token`, `refresh_token` and the `original_admin_id` impersonation
//! marker. Everything above it reads and writes through this facade, never
//! through the raw [`KeyValueStorage`] backend.

pub mod storage;

pub use storage::{FileStorage, KeyValueStorage, MemoryStorage};

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// Storage key of the bearer access token
pub const ACCESS_TOKEN_KEY: &str = "access_token";

/// Storage key of the refresh token
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";

/// Storage key of the impersonation marker
pub const ORIGINAL_ADMIN_ID_KEY: &str = "original_admin_id";

/// Access and refresh tokens issued together by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Typed facade over a [`KeyValueStorage`] backend.
///
/// Empty values are treated as absent. The impersonation marker is also
/// published through a watch channel so banners can react to it changing.
pub struct TokenStore {
    storage: Box<dyn KeyValueStorage>,
    marker: watch::Sender<Option<String>>,
}

impl TokenStore {
    /// Create a token store over the given backend
    pub fn new(storage: impl KeyValueStorage + 'static) -> Self {
        let initial = non_empty(storage.get(ORIGINAL_ADMIN_ID_KEY));
        let (marker, _) = watch::channel(initial);
        Self {
            storage: Box::new(storage),
            marker,
        }
    }

    /// Create a token store that lives only as long as the process
    pub fn in_memory() -> Self {
        Self::new(MemoryStorage::default())
    }

    /// Read a raw key
    pub fn get(&self, key: &str) -> Option<String> {
        non_empty(self.storage.get(key))
    }

    /// Write a raw key
    pub fn set(&self, key: &str, value: &str) {
        self.storage.set(key, value);
        if key == ORIGINAL_ADMIN_ID_KEY {
            self.marker.send_replace(non_empty(Some(value.to_string())));
        }
    }

    /// Remove a raw key
    pub fn remove(&self, key: &str) {
        self.storage.remove(key);
        if key == ORIGINAL_ADMIN_ID_KEY {
            self.marker.send_replace(None);
        }
    }

    pub fn access_token(&self) -> Option<String> {
        self.get(ACCESS_TOKEN_KEY)
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.get(REFRESH_TOKEN_KEY)
    }

    /// Both tokens, or `None` when either one is missing.
    ///
    /// An access token without its refresh token is not a usable session.
    pub fn tokens(&self) -> Option<TokenPair> {
        Some(TokenPair {
            access: self.access_token()?,
            refresh: self.refresh_token()?,
        })
    }

    pub fn set_access_token(&self, token: &str) {
        self.set(ACCESS_TOKEN_KEY, token);
    }

    pub fn set_refresh_token(&self, token: &str) {
        self.set(REFRESH_TOKEN_KEY, token);
    }

    /// Overwrite both tokens
    pub fn store_tokens(&self, tokens: &TokenPair) {
        self.set_access_token(&tokens.access);
        self.set_refresh_token(&tokens.refresh);
    }

    /// Remove both tokens, leaving the impersonation marker alone
    pub fn clear_tokens(&self) {
        self.remove(ACCESS_TOKEN_KEY);
        self.remove(REFRESH_TOKEN_KEY);
    }

    pub fn original_admin_id(&self) -> Option<String> {
        self.get(ORIGINAL_ADMIN_ID_KEY)
    }

    pub fn set_original_admin_id(&self, admin_id: &str) {
        self.set(ORIGINAL_ADMIN_ID_KEY, admin_id);
    }

    pub fn clear_original_admin_id(&self) {
        self.remove(ORIGINAL_ADMIN_ID_KEY);
    }

    /// Whether the active tokens belong to an impersonated identity
    pub fn is_impersonating(&self) -> bool {
        self.original_admin_id().is_some()
    }

    /// Remove every session key
    pub fn clear(&self) {
        self.clear_tokens();
        self.clear_original_admin_id();
    }

    /// Whether nothing session-related is stored
    pub fn is_empty(&self) -> bool {
        self.access_token().is_none()
            && self.refresh_token().is_none()
            && self.original_admin_id().is_none()
    }

    /// Subscribe to changes of the impersonation marker
    pub fn subscribe_marker(&self) -> watch::Receiver<Option<String>> {
        self.marker.subscribe()
    }
}

impl std::fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenStore")
            .field("has_access_token", &self.access_token().is_some())
            .field("has_refresh_token", &self.refresh_token().is_some())
            .field("original_admin_id", &self.original_admin_id())
            .finish()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
