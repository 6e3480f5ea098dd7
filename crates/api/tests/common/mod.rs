#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE, COOKIE, SET_COOKIE};
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use cookie::SameSite;
use http_body_util::BodyExt;
use resumate_api::auth::jwt::{JwtConfig, TokenService};
use resumate_api::auth::password::hash_password;
use resumate_api::auth::rotation::SessionManager;
use resumate_api::config::{CookieConfig, ServerConfig};
use resumate_api::router::build_app_router;
use resumate_api::state::AppState;
use resumate_db::models::user::CreateUser;
use resumate_db::store::{AccountStore, MemoryAccountStore, MemorySessionStore};
use tower::ServiceExt;

pub const REFRESH_COOKIE: &str = "refresh_token";

/// Build a test `ServerConfig` with safe defaults and distinct token secrets.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        session_cleanup_interval_secs: 3600,
        jwt: JwtConfig {
            access_secret: "test-access-secret-that-is-long-enough".to_string(),
            refresh_secret: "test-refresh-secret-that-is-long-enough".to_string(),
            access_token_expiry_mins: 15,
            refresh_token_expiry_days: 30,
        },
        cookies: CookieConfig {
            refresh_cookie_name: REFRESH_COOKIE.to_string(),
            secure: false,
            same_site: SameSite::Lax,
        },
    }
}

/// The production router over in-memory stores, plus handles on those stores
/// so tests can inspect session rows directly.
pub struct TestApp {
    pub router: Router,
    pub sessions: Arc<MemorySessionStore>,
    pub accounts: Arc<MemoryAccountStore>,
}

impl TestApp {
    pub fn app(&self) -> Router {
        self.router.clone()
    }
}

pub fn build_test_app() -> TestApp {
    let config = test_config();
    let sessions = Arc::new(MemorySessionStore::new());
    let accounts = Arc::new(MemoryAccountStore::new());
    let tokens = Arc::new(TokenService::new(config.jwt.clone()));

    let state = AppState {
        config: Arc::new(config.clone()),
        accounts: accounts.clone(),
        auth: SessionManager::new(tokens, sessions.clone(), accounts.clone()),
    };

    TestApp {
        router: build_app_router(state, &config),
        sessions,
        accounts,
    }
}

pub async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    let request = Request::builder()
        .uri(uri)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn post_auth(app: Router, uri: &str, token: &str) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

/// POST with no body, carrying the refresh token in the cookie header.
pub async fn post_with_refresh_cookie(app: Router, uri: &str, refresh_token: &str) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(COOKIE, format!("{REFRESH_COOKIE}={refresh_token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn post_empty(app: Router, uri: &str) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// The raw `Set-Cookie` header for the refresh-token cookie, if any.
pub fn refresh_set_cookie(response: &Response) -> Option<String> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with(&format!("{REFRESH_COOKIE}=")))
        .map(str::to_string)
}

/// The refresh token value carried by the response's `Set-Cookie` header.
pub fn refresh_token_of(response: &Response) -> Option<String> {
    let header = refresh_set_cookie(response)?;
    let pair = header.split(';').next()?;
    let value = pair.strip_prefix(&format!("{REFRESH_COOKIE}="))?;
    (!value.is_empty()).then(|| value.to_string())
}

/// Sign up through the API and return `(access_token, refresh_token)`.
pub async fn sign_up(app: Router, email: &str, password: &str) -> (String, String) {
    let body = serde_json::json!({ "email": email, "password": password, "name": "Test" });
    let response = post_json(app, "/api/v1/auth/signup", body).await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    let refresh = refresh_token_of(&response).expect("signup must set the refresh cookie");
    let json = body_json(response).await;
    (json["accessToken"].as_str().unwrap().to_string(), refresh)
}

/// Sign in through the API and return `(access_token, refresh_token)`.
pub async fn sign_in(app: Router, email: &str, password: &str) -> (String, String) {
    let body = serde_json::json!({ "email": email, "password": password });
    let response = post_json(app, "/api/v1/auth/signin", body).await;
    assert_eq!(response.status(), axum::http::StatusCode::OK);
    let refresh = refresh_token_of(&response).expect("signin must set the refresh cookie");
    let json = body_json(response).await;
    (json["accessToken"].as_str().unwrap().to_string(), refresh)
}

/// Insert an account with the given role straight into the store.
pub async fn seed_account(app: &TestApp, email: &str, password: &str, role: &str) -> i64 {
    let user = app
        .accounts
        .create(&CreateUser {
            email: email.to_string(),
            name: None,
            password_hash: hash_password(password).unwrap(),
            role: role.to_string(),
        })
        .await
        .unwrap();
    user.id
}
