#![allow(dead_code)]

//! Shared helpers for wiremock-backed integration tests.
//!
//! The mock server's URI never ends in `.cloud`, so every test client
//! authenticates through the local login flow against the same server that
//! serves the API mocks.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Utc;
use cribl_search_client::CriblSearchClient;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const SEARCH_QUERY_PATH: &str = "/api/v1/m/default_search/search/query";
pub const LOGIN_PATH: &str = "/api/v1/auth/login";

/// Build an unsigned JWT whose `exp` claim is `lifetime_secs` from now.
pub fn make_jwt(lifetime_secs: i64) -> String {
    let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"none"}"#);
    let exp = Utc::now().timestamp() + lifetime_secs;
    let claims = URL_SAFE_NO_PAD.encode(json!({"sub": "admin", "exp": exp}).to_string());
    format!("{header}.{claims}.sig")
}

/// Mount a login endpoint that hands out a long-lived token.
pub async fn mount_login(server: &MockServer) -> String {
    let token = make_jwt(3600);
    Mock::given(method("POST"))
        .and(path(LOGIN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": token})))
        .mount(server)
        .await;
    token
}

/// A client pointed at the mock server with default settings.
pub fn test_client(server: &MockServer) -> CriblSearchClient {
    CriblSearchClient::builder()
        .base_url(server.uri())
        .credentials("admin", "password")
        .build()
        .expect("client should build against mock server uri")
}

/// An NDJSON query response body: header line plus one line per event.
pub fn ndjson_page(header: serde_json::Value, events: &[serde_json::Value]) -> String {
    let mut body = header.to_string();
    for event in events {
        body.push('\n');
        body.push_str(&event.to_string());
    }
    body.push('\n');
    body
}
