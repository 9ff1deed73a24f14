#![allow(dead_code)]

use std::sync::Arc;

use airsoft_hub::auth::JwtTokenService;
use airsoft_hub::config::Config;
use airsoft_hub::db::MemoryStore;
use airsoft_hub::routes::create_routes;
use airsoft_hub::state::AppState;
use airsoft_hub::uploads::{ThumbnailStore, DEFAULT_MAX_THUMBNAIL_BYTES};
use chrono::Duration;
use reqwest::StatusCode;
use serde_json::{json, Value};
use tempfile::TempDir;

pub const JWT_SECRET: &str = "integration-test-secret";
pub const ADMIN_EMAIL: &str = "boss@example.com";

pub struct TestServer {
    pub base_url: String,
    pub client: reqwest::Client,
    pub uploads: TempDir,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    pub async fn spawn() -> Self {
        Self::spawn_with_env(&[]).await
    }

    /// Same router as production, backed by the in-memory store and a
    /// throwaway uploads directory, bound to an ephemeral port. `env` feeds
    /// the config the router is built from.
    pub async fn spawn_with_env(env: &[(&str, &str)]) -> Self {
        let config = Config::from_lookup(|key| {
            env.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        })
        .expect("invalid test config");

        let uploads = tempfile::tempdir().expect("failed to create uploads dir");
        let state = AppState::new(
            Arc::new(MemoryStore::new()),
            Arc::new(JwtTokenService::new(JWT_SECRET, Duration::hours(1))),
            ThumbnailStore::new(uploads.path(), DEFAULT_MAX_THUMBNAIL_BYTES),
        )
        .with_admin_emails(vec![ADMIN_EMAIL.to_string()]);

        let app = create_routes(state, &config);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            client: reqwest::Client::new(),
            uploads,
            handle,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn create_event(&self, body: Value) -> (StatusCode, Value) {
        let res = self
            .client
            .post(self.url("/api/events"))
            .json(&body)
            .send()
            .await
            .unwrap();
        let status = res.status();
        (status, res.json().await.unwrap())
    }

    pub async fn register(&self, email: &str, username: &str, password: &str) -> reqwest::Response {
        self.client
            .post(self.url("/api/auth/register"))
            .json(&json!({
                "email": email,
                "password": password,
                "username": username,
            }))
            .send()
            .await
            .unwrap()
    }

    /// Registers a fresh account and returns its bearer token.
    pub async fn token_for(&self, email: &str, username: &str) -> String {
        let res = self.register(email, username, "hunter22").await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let body: Value = res.json().await.unwrap();
        body["token"].as_str().unwrap().to_string()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
