#![allow(dead_code)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use coursemart_api::auth::{issue_token, Claims, Role};
use coursemart_api::config::AppConfig;
use coursemart_api::database::MemoryStore;
use coursemart_api::{app, AppState};
use reqwest::{RequestBuilder, StatusCode};
use serde_json::{json, Value};

pub const SECRET: &str = "integration-test-secret";

/// An in-process API server backed by a fresh memory store
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub client: reqwest::Client,
}

impl TestServer {
    async fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let mut config = AppConfig::development();
        config.security.jwt_secret = SECRET.to_string();
        config.api.enable_request_logging = false;
        config.api.max_request_size_bytes = 64 * 1024;

        let state = AppState::with_jwt(config, Arc::new(MemoryStore::new()));
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind test port")?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app(state)).await;
        });

        Ok(Self {
            port,
            base_url,
            client: reqwest::Client::new(),
        })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            if let Ok(resp) = self.client.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn get(&self, path: &str) -> RequestBuilder {
        self.client.get(self.url(path))
    }

    pub fn post(&self, path: &str) -> RequestBuilder {
        self.client.post(self.url(path))
    }

    pub fn put(&self, path: &str) -> RequestBuilder {
        self.client.put(self.url(path))
    }

    pub fn delete(&self, path: &str) -> RequestBuilder {
        self.client.delete(self.url(path))
    }

    /// Create a course as `token` and return its id
    pub async fn create_course(&self, token: &str, body: Value) -> Result<String> {
        let res = self.post("/api/courses").bearer_auth(token).json(&body).send().await?;
        anyhow::ensure!(res.status() == StatusCode::CREATED, "create failed: {}", res.status());
        let course: Value = res.json().await?;
        course["id"]
            .as_str()
            .map(str::to_string)
            .context("created course has no id")
    }
}

/// Each test gets its own server and store. The server lives on the test's runtime.
pub async fn spawn_server() -> Result<TestServer> {
    let server = TestServer::spawn().await?;
    server.wait_ready(Duration::from_secs(5)).await?;
    Ok(server)
}

pub fn token(uid: &str, name: &str, role: Option<Role>) -> String {
    let mut claims = Claims::new(uid, 1).email(format!("{}@example.com", uid)).name(name);
    if let Some(role) = role {
        claims = claims.role(role);
    }
    issue_token(SECRET, &claims).expect("token")
}

pub fn instructor_token(uid: &str) -> String {
    token(uid, &format!("Instructor {}", uid), Some(Role::Instructor))
}

pub fn student_token(uid: &str) -> String {
    token(uid, &format!("Student {}", uid), Some(Role::Student))
}

pub fn course_body(title: &str, price: f64, category: &str) -> Value {
    json!({
        "title": title,
        "price": price,
        "description": "A course used by the integration tests",
        "category": { "name": category }
    })
}
