//! Bearer-authenticated HTTP client with one-shot token refresh.

use super::errors::{ApiError, ApiResult};
use crate::navigation::{Navigator, routes};
use crate::store::TokenStore;
use log::{debug, info, warn};
use reqwest::{Method, Response, StatusCode};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Default backend base URL
pub const DEFAULT_BASE_URL: &str = "http://localhost:8001/api";

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Token refresh endpoint, relative to the base URL
pub const REFRESH_PATH: &str = "auth/token/refresh/";

/// Connection settings for [`ApiClient`]
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL every request path is joined onto
    pub base_url: String,
    /// Timeout applied to each individual request
    pub timeout: Duration,
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

/// How a request authenticates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Auth {
    /// Attach the stored access token and recover once from a 401
    Bearer,
    /// Send without credentials; a 401 is returned as-is
    Anonymous,
}

/// A request that can be sent again after a token refresh
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    body: Option<Value>,
    auth: Auth,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            auth: Auth::Bearer,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Attach a JSON body
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> ApiResult<Self> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    /// Send without the bearer token
    pub fn anonymous(mut self) -> Self {
        self.auth = Auth::Anonymous;
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn auth(&self) -> Auth {
        self.auth
    }
}

/// Whether a request may still be recovered with a token refresh
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RetryBudget {
    Available,
    Spent,
}

/// Result of sending a request once
enum Attempt {
    /// Final response, successful or not
    Done(Response),
    /// 401 on a request that still has its retry budget
    Expired(Response),
}

#[derive(Deserialize)]
struct DetailResponse {
    #[serde(default)]
    detail: String,
}

#[derive(Serialize)]
struct RefreshRequest<'a> {
    refresh: &'a str,
}

#[derive(Deserialize)]
struct RefreshResponse {
    access: String,
    #[serde(default)]
    refresh: Option<String>,
}

/// HTTP client for the PortfolioHub REST API.
///
/// Bearer requests carry the stored access token. A 401 is recovered at most
/// once per request: the refresh token is exchanged on a separate path that
/// never goes through this recovery, and the original request is replayed
/// with the new access token. If the refresh is rejected the token store is
/// wiped and the host is reloaded at the login view.
///
/// Concurrent 401s are funnelled through a single refresh: a request that
/// waited for another refresh to finish reuses its result.
///
/// Components holding in-memory session state register with
/// [`on_session_invalid`](Self::on_session_invalid) to be told when a failed
/// refresh ends the session, whichever caller's request triggered it.
pub struct ApiClient {
    config: ApiConfig,
    http: reqwest::Client,
    tokens: Arc<TokenStore>,
    navigator: Arc<dyn Navigator>,
    refresh_gate: Mutex<()>,
    invalidation_listeners: parking_lot::Mutex<Vec<SessionListener>>,
}

type SessionListener = Box<dyn Fn() + Send + Sync>;

impl ApiClient {
    /// Create a new API client
    ///
    /// # Errors
    ///
    /// * `ApiError::Transport` - The underlying HTTP client could not be built
    pub fn new(
        config: ApiConfig,
        tokens: Arc<TokenStore>,
        navigator: Arc<dyn Navigator>,
    ) -> ApiResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            config,
            http,
            tokens,
            navigator,
            refresh_gate: Mutex::new(()),
            invalidation_listeners: parking_lot::Mutex::new(Vec::new()),
        })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    pub fn tokens(&self) -> &Arc<TokenStore> {
        &self.tokens
    }

    pub fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.navigator
    }

    /// Run `listener` every time a rejected refresh ends the session.
    ///
    /// Listeners run after the token store is cleared and before the host is
    /// reloaded at the login view.
    pub fn on_session_invalid(&self, listener: impl Fn() + Send + Sync + 'static) {
        self.invalidation_listeners.lock().push(Box::new(listener));
    }

    /// Absolute URL of an API path.
    ///
    /// Absolute URLs (pagination links) are used as they are.
    pub fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Send a request, returning the successful response.
    ///
    /// # Errors
    ///
    /// * `ApiError::Status` - Non-2xx response, including a 401 that could not be recovered
    /// * `ApiError::SessionInvalid` - The refresh token was rejected
    /// * `ApiError::Transport` - The request could not be sent
    pub async fn send(&self, request: ApiRequest) -> ApiResult<Response> {
        let token = match request.auth {
            Auth::Bearer => self.tokens.access_token(),
            Auth::Anonymous => None,
        };

        let response = match self
            .attempt(&request, token.as_deref(), RetryBudget::Available)
            .await?
        {
            Attempt::Done(response) => response,
            Attempt::Expired(rejected) => {
                let fresh = self.recover(token.as_deref(), rejected).await?;
                match self
                    .attempt(&request, Some(&fresh), RetryBudget::Spent)
                    .await?
                {
                    Attempt::Done(response) | Attempt::Expired(response) => response,
                }
            }
        };

        ensure_success(response).await
    }

    /// Send a request and decode its JSON body
    pub async fn send_json<T: DeserializeOwned>(&self, request: ApiRequest) -> ApiResult<T> {
        let response = self.send(request).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Send a request whose body is only a `{"detail": ...}` message.
    ///
    /// An empty or unexpected body yields an empty message.
    pub async fn send_detail(&self, request: ApiRequest) -> ApiResult<String> {
        let response = self.send(request).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice::<DetailResponse>(&bytes)
            .map(|body| body.detail)
            .unwrap_or_default())
    }

    /// Send a request and discard its body
    pub async fn send_empty(&self, request: ApiRequest) -> ApiResult<()> {
        self.send(request).await.map(|_| ())
    }

    async fn attempt(
        &self,
        request: &ApiRequest,
        token: Option<&str>,
        budget: RetryBudget,
    ) -> ApiResult<Attempt> {
        let mut builder = self
            .http
            .request(request.method.clone(), self.url(&request.path));

        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        debug!(
            "{} {} -> {}",
            request.method,
            request.path,
            response.status()
        );

        let retryable = response.status() == StatusCode::UNAUTHORIZED
            && request.auth == Auth::Bearer
            && budget == RetryBudget::Available;

        Ok(if retryable {
            Attempt::Expired(response)
        } else {
            Attempt::Done(response)
        })
    }

    /// Obtain a usable access token after `stale` was rejected
    async fn recover(&self, stale: Option<&str>, rejected: Response) -> ApiResult<String> {
        let _gate = self.refresh_gate.lock().await;

        // Another request refreshed while this one waited
        if let Some(current) = self.tokens.access_token() {
            if stale != Some(current.as_str()) {
                return Ok(current);
            }
        }

        let Some(refresh_token) = self.tokens.refresh_token() else {
            return Err(ApiError::from_response(rejected).await);
        };

        match self.refresh(&refresh_token).await {
            Ok(refreshed) => {
                self.tokens.set_access_token(&refreshed.access);
                if let Some(rotated) = &refreshed.refresh {
                    self.tokens.set_refresh_token(rotated);
                }
                info!("Access token refreshed");
                Ok(refreshed.access)
            }
            Err(e) => {
                warn!("Token refresh rejected, ending session: {}", e);
                self.tokens.clear();
                for listener in self.invalidation_listeners.lock().iter() {
                    listener();
                }
                self.navigator.reload(routes::LOGIN);
                Err(ApiError::SessionInvalid(Box::new(e)))
            }
        }
    }

    /// Exchange a refresh token, bypassing 401 recovery
    async fn refresh(&self, refresh_token: &str) -> ApiResult<RefreshResponse> {
        let response = self
            .http
            .post(self.url(REFRESH_PATH))
            .json(&RefreshRequest {
                refresh: refresh_token,
            })
            .send()
            .await?;

        let response = ensure_success(response).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

async fn ensure_success(response: Response) -> ApiResult<Response> {
    if response.status().is_success() {
        Ok(response)
    } else {
        Err(ApiError::from_response(response).await)
    }
}
