#![allow(dead_code)]

use std::sync::Arc;

use artefolio_session::client::{RecordingNavigator, SessionClient, SessionCookies};
use artefolio_session::config::ApiConfig;
use artefolio_session::session::SessionStore;
use mockito::{Matcher, Mock, ServerGuard};
use reqwest::cookie::CookieStore;
use reqwest::Url;

pub const STALE: &str = "access_token=stale";
pub const FRESH: &str = "access_token=fresh";

pub fn user_json(username: &str, email_verified: bool) -> String {
    serde_json::json!({
        "user": {
            "id": 42,
            "name": "Test Artist",
            "username": username,
            "email": format!("{}@example.com", username),
            "emailVerified": email_verified,
            "createdAt": "2025-01-02T03:04:05Z",
            "updatedAt": "2025-01-02T03:04:05Z"
        }
    })
    .to_string()
}

pub fn error_json(message: &str) -> String {
    serde_json::json!({ "message": message }).to_string()
}

pub struct Harness {
    pub client: Arc<SessionClient>,
    pub navigator: Arc<RecordingNavigator>,
    pub cookies: Arc<SessionCookies>,
    pub url: Url,
}

impl Harness {
    /// A client against `server`, optionally already holding a session cookie.
    pub fn new(server: &ServerGuard, cookie: Option<&str>) -> Self {
        let url = Url::parse(&server.url()).expect("mock server URL should parse");
        let cookies = Arc::new(SessionCookies::new());
        if let Some(cookie) = cookie {
            cookies.add_cookie_str(&format!("{}; Path=/", cookie), &url);
        }
        let navigator = Arc::new(RecordingNavigator::new());
        let client = SessionClient::builder(ApiConfig::new(server.url()))
            .cookies(cookies.clone())
            .navigator(navigator.clone())
            .build()
            .expect("client should build");

        Harness {
            client: Arc::new(client),
            navigator,
            cookies,
            url,
        }
    }

    pub fn store(&self) -> SessionStore {
        SessionStore::new(self.client.clone())
    }

    /// The `Cookie` header the client would send next, if any.
    pub fn cookie_header(&self) -> Option<String> {
        self.cookies
            .cookies(&self.url)
            .and_then(|h| h.to_str().ok().map(str::to_string))
    }
}

/// GET /auth/me answered according to which cookie the request carries.
pub async fn mock_me(server: &mut ServerGuard, cookie: Matcher, status: usize, body: &str) -> Mock {
    server
        .mock("GET", "/auth/me")
        .match_header("cookie", cookie)
        .with_status(status)
        .with_header("content-type", "application/json")
        .with_body(body)
        .create_async()
        .await
}

/// POST /auth/refresh that rotates the stale cookie into the fresh one.
pub async fn mock_refresh_ok(server: &mut ServerGuard, hits: usize) -> Mock {
    server
        .mock("POST", "/auth/refresh")
        .with_status(200)
        .with_header("set-cookie", &format!("{}; Path=/; HttpOnly", FRESH))
        .expect(hits)
        .create_async()
        .await
}

pub async fn mock_refresh_rejected(server: &mut ServerGuard) -> Mock {
    server
        .mock("POST", "/auth/refresh")
        .with_status(401)
        .with_header("content-type", "application/json")
        .with_body(error_json("Refresh token expired"))
        .expect(1)
        .create_async()
        .await
}
