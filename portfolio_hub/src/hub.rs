//! Composition root wiring the session core together.

use crate::api::{ApiClient, ApiConfig, ApiResult};
use crate::auth::guard::{self, Access, GuardDecision};
use crate::auth::{ImpersonationController, SessionManager};
use crate::navigation::Navigator;
use crate::platform::PlatformAdmin;
use crate::store::TokenStore;
use std::sync::Arc;

/// One application instance: a single session over a single token store.
///
/// A host builds one `Hub` per process (or per full reload) and hands out
/// references to its parts.
pub struct Hub {
    api: Arc<ApiClient>,
    session: SessionManager,
    impersonation: ImpersonationController,
    platform: PlatformAdmin,
}

impl Hub {
    pub fn new(
        config: ApiConfig,
        tokens: Arc<TokenStore>,
        navigator: Arc<dyn Navigator>,
    ) -> ApiResult<Self> {
        let api = Arc::new(ApiClient::new(config, tokens, navigator)?);
        Ok(Self {
            session: SessionManager::new(api.clone()),
            impersonation: ImpersonationController::new(api.clone()),
            platform: PlatformAdmin::new(api.clone()),
            api,
        })
    }

    pub fn api(&self) -> &Arc<ApiClient> {
        &self.api
    }

    pub fn tokens(&self) -> &Arc<TokenStore> {
        self.api.tokens()
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    pub fn impersonation(&self) -> &ImpersonationController {
        &self.impersonation
    }

    pub fn platform(&self) -> &PlatformAdmin {
        &self.platform
    }

    /// Guard a view against the current session state
    pub fn guard(&self, access: Access) -> GuardDecision {
        guard::check(&self.session.state(), access)
    }
}
