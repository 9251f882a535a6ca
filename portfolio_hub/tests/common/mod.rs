//! In-process mock of the PortfolioHub backend for integration tests.
#![allow(dead_code)]

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use parking_lot::Mutex;
use portfolio_hub::navigation::Navigator;
use portfolio_hub::{ApiConfig, Hub, TokenPair, TokenStore};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;

pub const ADMIN_ID: i64 = 1;
pub const DEMO_ID: i64 = 2;
pub const ALICE_ID: i64 = 3;

#[derive(Debug, Clone)]
struct Account {
    id: i64,
    username: String,
    password: String,
    email: String,
    full_name: String,
    is_platform_admin: bool,
    is_active: bool,
}

impl Account {
    fn new(id: i64, username: &str, password: &str, is_platform_admin: bool) -> Self {
        Self {
            id,
            username: username.to_string(),
            password: password.to_string(),
            email: format!("{}@example.com", username),
            full_name: format!("{} user", username),
            is_platform_admin,
            is_active: true,
        }
    }

    fn user_json(&self) -> Value {
        json!({
            "id": self.id,
            "username": self.username,
            "email": self.email,
            "full_name": self.full_name,
            "is_platform_admin": self.is_platform_admin,
            "profile": {
                "username_slug": self.username,
                "full_name": self.full_name,
                "is_platform_admin": self.is_platform_admin,
            }
        })
    }

    fn platform_json(&self) -> Value {
        json!({
            "id": self.id,
            "username": self.username,
            "email": self.email,
            "date_joined": "2025-01-15T10:00:00Z",
            "is_active": self.is_active,
            "full_name": self.full_name,
            "username_slug": self.username,
            "avatar": null,
            "is_platform_admin": self.is_platform_admin,
            "projects_count": 2,
            "skills_count": 5,
        })
    }
}

struct MockState {
    accounts: Vec<Account>,
    access: HashMap<String, i64>,
    refresh: HashMap<String, i64>,
    issued: u64,
    rotate_refresh: bool,
    fail_stop: bool,
    users_page_size: Option<usize>,
    hits: HashMap<&'static str, usize>,
    bearers: Vec<Option<String>>,
}

impl MockState {
    fn new() -> Self {
        Self {
            accounts: vec![
                Account::new(ADMIN_ID, "admin", "adminpass", true),
                Account::new(DEMO_ID, "demo", "demopass", false),
                Account::new(ALICE_ID, "alice", "alicepass", false),
            ],
            access: HashMap::new(),
            refresh: HashMap::new(),
            issued: 0,
            rotate_refresh: true,
            fail_stop: false,
            users_page_size: Some(2),
            hits: HashMap::new(),
            bearers: Vec::new(),
        }
    }

    fn hit(&mut self, name: &'static str) {
        *self.hits.entry(name).or_default() += 1;
    }

    fn issue(&mut self, user_id: i64) -> TokenPair {
        self.issued += 1;
        let pair = TokenPair {
            access: format!("access-{}-{}", user_id, self.issued),
            refresh: format!("refresh-{}-{}", user_id, self.issued),
        };
        self.access.insert(pair.access.clone(), user_id);
        self.refresh.insert(pair.refresh.clone(), user_id);
        pair
    }

    fn account(&self, id: i64) -> Option<&Account> {
        self.accounts.iter().find(|a| a.id == id)
    }

    fn authenticate(&mut self, headers: &HeaderMap) -> Result<Account, Response> {
        let bearer = bearer(headers);
        self.bearers.push(bearer.clone());

        bearer
            .and_then(|token| self.access.get(&token).copied())
            .and_then(|id| self.account(id).cloned())
            .ok_or_else(|| {
                reply(
                    StatusCode::UNAUTHORIZED,
                    json!({
                        "detail": "Given token not valid for any token type",
                        "code": "token_not_valid"
                    }),
                )
            })
    }

    fn authenticate_admin(&mut self, headers: &HeaderMap) -> Result<Account, Response> {
        let account = self.authenticate(headers)?;
        if account.is_platform_admin {
            Ok(account)
        } else {
            Err(reply(
                StatusCode::FORBIDDEN,
                json!({"detail": "You do not have permission to perform this action."}),
            ))
        }
    }
}

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::to_string)
}

fn reply(status: StatusCode, body: Value) -> Response {
    (status, Json(body)).into_response()
}

fn id_field(body: &Value, field: &str) -> Option<i64> {
    match body.get(field)? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// Handle to a running mock backend
#[derive(Clone)]
pub struct MockBackend {
    state: Arc<Mutex<MockState>>,
    base_url: String,
}

impl MockBackend {
    /// Start a backend on an ephemeral port
    pub async fn spawn() -> Self {
        let state = Arc::new(Mutex::new(MockState::new()));
        let router = Router::new().nest("/api", routes()).with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        Self {
            state,
            base_url: format!("http://{}/api", addr),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Issue a valid token pair directly, as if the user had signed in earlier
    pub fn issue_tokens(&self, user_id: i64) -> TokenPair {
        self.state.lock().issue(user_id)
    }

    /// Invalidate every access token; refresh tokens stay valid
    pub fn expire_access_tokens(&self) {
        self.state.lock().access.clear();
    }

    /// Invalidate every refresh token
    pub fn revoke_refresh_tokens(&self) {
        self.state.lock().refresh.clear();
    }

    pub fn set_rotate_refresh(&self, rotate: bool) {
        self.state.lock().rotate_refresh = rotate;
    }

    pub fn set_fail_stop(&self, fail: bool) {
        self.state.lock().fail_stop = fail;
    }

    /// Page size of the user listing; `None` serves a bare array
    pub fn set_users_page_size(&self, page_size: Option<usize>) {
        self.state.lock().users_page_size = page_size;
    }

    /// Number of requests an endpoint has received
    pub fn hits(&self, name: &str) -> usize {
        self.state.lock().hits.get(name).copied().unwrap_or(0)
    }

    /// Bearer tokens seen by authenticated endpoints, in order
    pub fn bearers(&self) -> Vec<Option<String>> {
        self.state.lock().bearers.clone()
    }

    /// User id an access token belongs to
    pub fn owner_of(&self, access_token: &str) -> Option<i64> {
        self.state.lock().access.get(access_token).copied()
    }

    pub fn is_active(&self, user_id: i64) -> Option<bool> {
        self.state.lock().account(user_id).map(|a| a.is_active)
    }
}

type Shared = Arc<Mutex<MockState>>;

fn routes() -> Router<Shared> {
    Router::new()
        .route("/auth/token/", post(login))
        .route("/auth/token/refresh/", post(refresh))
        .route("/auth/me/", get(me))
        .route("/auth/register/", post(register))
        .route("/auth/forgot-password/", post(forgot_password))
        .route("/auth/reset-password/", post(reset_password))
        .route("/auth/change-password/", post(change_password))
        .route("/admin/dashboard/", get(dashboard))
        .route("/admin/impersonate/{id}/", post(impersonate))
        .route("/admin/stop-impersonation/", post(stop_impersonation))
        .route("/superadmin/stats/", get(stats))
        .route("/superadmin/users/", get(list_users))
        .route(
            "/superadmin/users/{id}/",
            get(get_user).patch(set_active).delete(delete_user),
        )
        .route("/always-unauthorized/", get(always_unauthorized))
        .route("/broken/", get(broken))
}

async fn login(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let mut state = state.lock();
    state.hit("token");

    let username = body["username"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();
    let account = state
        .accounts
        .iter()
        .find(|a| a.username == username && a.password == password && a.is_active)
        .cloned();

    match account {
        Some(account) => {
            let pair = state.issue(account.id);
            reply(StatusCode::OK, json!({"access": pair.access, "refresh": pair.refresh}))
        }
        None => reply(
            StatusCode::BAD_REQUEST,
            json!({"detail": "No active account found with the given credentials"}),
        ),
    }
}

async fn refresh(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let mut state = state.lock();
    state.hit("refresh");

    let token = body["refresh"].as_str().unwrap_or_default().to_string();
    let Some(user_id) = state.refresh.get(&token).copied() else {
        return reply(
            StatusCode::UNAUTHORIZED,
            json!({"detail": "Token is invalid or expired", "code": "token_not_valid"}),
        );
    };

    let pair = state.issue(user_id);
    if state.rotate_refresh {
        state.refresh.remove(&token);
        reply(StatusCode::OK, json!({"access": pair.access, "refresh": pair.refresh}))
    } else {
        state.refresh.remove(&pair.refresh);
        reply(StatusCode::OK, json!({"access": pair.access}))
    }
}

async fn me(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let mut state = state.lock();
    state.hit("me");
    match state.authenticate(&headers) {
        Ok(account) => reply(StatusCode::OK, account.user_json()),
        Err(rejection) => rejection,
    }
}

async fn register(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let mut state = state.lock();
    state.hit("register");

    let username = body["username"].as_str().unwrap_or_default().to_lowercase();
    if state.accounts.iter().any(|a| a.username == username) {
        return reply(
            StatusCode::BAD_REQUEST,
            json!({"username": ["This username is already taken."]}),
        );
    }

    let id = state.accounts.iter().map(|a| a.id).max().unwrap_or(0) + 1;
    let mut account = Account::new(
        id,
        &username,
        body["password"].as_str().unwrap_or_default(),
        false,
    );
    account.email = body["email"].as_str().unwrap_or_default().to_string();
    account.full_name = body["full_name"].as_str().unwrap_or_default().to_string();
    let user = account.user_json();
    state.accounts.push(account);

    let pair = state.issue(id);
    reply(
        StatusCode::CREATED,
        json!({"user": user, "tokens": {"access": pair.access, "refresh": pair.refresh}}),
    )
}

async fn forgot_password(State(state): State<Shared>) -> Response {
    state.lock().hit("forgot_password");
    reply(
        StatusCode::OK,
        json!({"detail": "If an account with that email exists, a reset link has been sent."}),
    )
}

async fn reset_password(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    state.lock().hit("reset_password");
    if body["token"] == "valid-token" {
        reply(StatusCode::OK, json!({"detail": "Password has been reset."}))
    } else {
        reply(
            StatusCode::BAD_REQUEST,
            json!({"detail": "Reset link is invalid or expired."}),
        )
    }
}

async fn change_password(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut state = state.lock();
    state.hit("change_password");
    let account = match state.authenticate(&headers) {
        Ok(account) => account,
        Err(rejection) => return rejection,
    };

    if body["old_password"].as_str() != Some(account.password.as_str()) {
        return reply(
            StatusCode::BAD_REQUEST,
            json!({"old_password": ["Current password is incorrect."]}),
        );
    }

    let new_password = body["new_password"].as_str().unwrap_or_default().to_string();
    if let Some(stored) = state.accounts.iter_mut().find(|a| a.id == account.id) {
        stored.password = new_password;
    }
    reply(StatusCode::OK, json!({"detail": "Password updated successfully."}))
}

async fn dashboard(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let mut state = state.lock();
    state.hit("dashboard");
    match state.authenticate(&headers) {
        Ok(account) => reply(StatusCode::OK, json!({"username": account.username})),
        Err(rejection) => rejection,
    }
}

async fn impersonate(
    State(state): State<Shared>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Response {
    let mut state = state.lock();
    state.hit("impersonate");
    let admin = match state.authenticate_admin(&headers) {
        Ok(admin) => admin,
        Err(rejection) => return rejection,
    };

    let Some(target) = state.account(id).cloned() else {
        return reply(StatusCode::NOT_FOUND, json!({"detail": "User not found."}));
    };

    let pair = state.issue(target.id);
    reply(
        StatusCode::OK,
        json!({
            "access": pair.access,
            "refresh": pair.refresh,
            "original_admin_id": admin.id,
            "impersonated_user": {
                "id": target.id,
                "username": target.username,
                "full_name": target.full_name,
            }
        }),
    )
}

async fn stop_impersonation(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut state = state.lock();
    state.hit("stop_impersonation");
    if let Err(rejection) = state.authenticate(&headers) {
        return rejection;
    }
    if state.fail_stop {
        return reply(
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({"detail": "Admin session could not be restored."}),
        );
    }

    let admin = id_field(&body, "original_admin_id")
        .and_then(|id| state.account(id).cloned())
        .filter(|account| account.is_platform_admin);
    match admin {
        Some(admin) => {
            let pair = state.issue(admin.id);
            reply(StatusCode::OK, json!({"access": pair.access, "refresh": pair.refresh}))
        }
        None => reply(
            StatusCode::BAD_REQUEST,
            json!({"detail": "Original admin not found."}),
        ),
    }
}

async fn stats(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let mut state = state.lock();
    state.hit("stats");
    if let Err(rejection) = state.authenticate_admin(&headers) {
        return rejection;
    }
    let total = state.accounts.len();
    let active = state.accounts.iter().filter(|a| a.is_active).count();
    reply(
        StatusCode::OK,
        json!({
            "total_users": total,
            "active_users": active,
            "recent_signups": 1,
            "total_projects": 6,
            "total_skills": 15,
            "total_categories": 3,
            "total_experience": 4,
            "total_messages": 9,
        }),
    )
}

async fn list_users(
    State(state): State<Shared>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    let mut state = state.lock();
    state.hit("users");
    if let Err(rejection) = state.authenticate_admin(&headers) {
        return rejection;
    }
    let users: Vec<Value> = state.accounts.iter().rev().map(Account::platform_json).collect();

    let Some(page_size) = state.users_page_size else {
        return reply(StatusCode::OK, Value::Array(users));
    };

    // Django REST framework page-number pagination
    let page: usize = query.get("page").and_then(|p| p.parse().ok()).unwrap_or(1);
    let host = headers
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("localhost");
    let link = |n: usize| format!("http://{}/api/superadmin/users/?page={}", host, n);
    let count = users.len();
    if page == 0 || (page > 1 && (page - 1) * page_size >= count) {
        return reply(StatusCode::NOT_FOUND, json!({"detail": "Invalid page."}));
    }
    let start = (page - 1) * page_size;
    let results: Vec<Value> = users.into_iter().skip(start).take(page_size).collect();
    let next = (start + page_size < count).then(|| link(page + 1));
    let previous = (page > 1).then(|| link(page - 1));

    reply(
        StatusCode::OK,
        json!({"count": count, "next": next, "previous": previous, "results": results}),
    )
}

async fn get_user(
    State(state): State<Shared>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Response {
    let mut state = state.lock();
    if let Err(rejection) = state.authenticate_admin(&headers) {
        return rejection;
    }
    match state.account(id) {
        Some(account) => reply(StatusCode::OK, account.platform_json()),
        None => reply(StatusCode::NOT_FOUND, json!({"detail": "User not found."})),
    }
}

async fn set_active(
    State(state): State<Shared>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut state = state.lock();
    let admin = match state.authenticate_admin(&headers) {
        Ok(admin) => admin,
        Err(rejection) => return rejection,
    };
    if admin.id == id {
        return reply(
            StatusCode::BAD_REQUEST,
            json!({"detail": "You cannot deactivate your own account."}),
        );
    }

    let Some(account) = state.accounts.iter_mut().find(|a| a.id == id) else {
        return reply(StatusCode::NOT_FOUND, json!({"detail": "User not found."}));
    };
    if let Some(is_active) = body["is_active"].as_bool() {
        account.is_active = is_active;
    }
    reply(
        StatusCode::OK,
        json!({"id": account.id, "is_active": account.is_active}),
    )
}

async fn delete_user(
    State(state): State<Shared>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Response {
    let mut state = state.lock();
    let admin = match state.authenticate_admin(&headers) {
        Ok(admin) => admin,
        Err(rejection) => return rejection,
    };
    if admin.id == id {
        return reply(
            StatusCode::BAD_REQUEST,
            json!({"detail": "You cannot delete your own account."}),
        );
    }

    let Some(position) = state.accounts.iter().position(|a| a.id == id) else {
        return reply(StatusCode::NOT_FOUND, json!({"detail": "User not found."}));
    };
    let removed = state.accounts.remove(position);
    reply(
        StatusCode::OK,
        json!({"detail": format!("User \"{}\" and all their data have been deleted.", removed.username)}),
    )
}

async fn always_unauthorized(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let mut state = state.lock();
    state.hit("always_unauthorized");
    state.bearers.push(bearer(&headers));
    reply(
        StatusCode::UNAUTHORIZED,
        json!({"detail": "Authentication credentials were not provided."}),
    )
}

async fn broken(State(state): State<Shared>) -> Response {
    state.lock().hit("broken");
    reply(StatusCode::INTERNAL_SERVER_ERROR, json!({"detail": "boom"}))
}

/// Navigation request observed by the test host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavEvent {
    Navigate(String),
    Reload(String),
}

/// Navigator that records every request
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    events: Mutex<Vec<NavEvent>>,
}

impl RecordingNavigator {
    pub fn events(&self) -> Vec<NavEvent> {
        self.events.lock().clone()
    }

    pub fn reloads(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                NavEvent::Reload(path) => Some(path),
                NavEvent::Navigate(_) => None,
            })
            .collect()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, path: &str) {
        self.events.lock().push(NavEvent::Navigate(path.to_string()));
    }

    fn reload(&self, path: &str) {
        self.events.lock().push(NavEvent::Reload(path.to_string()));
    }
}

/// A host process: one hub over a shared token store
pub struct TestHost {
    pub backend: MockBackend,
    pub tokens: Arc<TokenStore>,
    pub navigator: Arc<RecordingNavigator>,
    pub hub: Hub,
}

impl TestHost {
    pub async fn new() -> Self {
        let backend = MockBackend::spawn().await;
        let tokens = Arc::new(TokenStore::in_memory());
        let navigator = Arc::new(RecordingNavigator::default());
        let hub = build_hub(&backend, tokens.clone(), navigator.clone());
        Self {
            backend,
            tokens,
            navigator,
            hub,
        }
    }

    /// Host with a stored session for `user_id`
    pub async fn signed_in_as(user_id: i64) -> Self {
        let host = Self::new().await;
        host.tokens.store_tokens(&host.backend.issue_tokens(user_id));
        host
    }

    /// Simulate a full page reload: fresh hub, same token store
    pub fn reload(&mut self) {
        self.hub = build_hub(&self.backend, self.tokens.clone(), self.navigator.clone());
    }
}

fn build_hub(backend: &MockBackend, tokens: Arc<TokenStore>, navigator: Arc<RecordingNavigator>) -> Hub {
    Hub::new(ApiConfig::new(backend.base_url()), tokens, navigator).unwrap()
}
