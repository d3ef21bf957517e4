//! # Common Test Utilities
//!
//! This module centralizes the test harness used across the `medquery-server`
//! integration tests.
//!
//! - `TestApp`: A full application harness that spawns a real server on a random port,
//!   backed by a seeded temporary SQLite file and an AI provider pointed at an
//!   `httpmock::MockServer` instance.
//! - Helpers for programming the mock model and sending authorized requests.

// Allow unused code because this is a test utility module, and not all
// functions might be used by every test file that includes it.
#![allow(unused)]

use anyhow::Result;
use axum::serve;
use httpmock::{Method::POST, Mock, MockServer};
use medquery_server::{
    config, router,
    state::{build_app_state, AppState},
};
use medquery_test_utils::SEED_DATA_SQL;
use reqwest::{Client, RequestBuilder};
use serde_json::json;
use std::{fs::File, io::Write, net::SocketAddr};
use tempfile::{tempdir, TempDir};
use tokio::{net::TcpListener, task::JoinHandle};

pub const TEST_TOKEN: &str = "test-token";

/// A harness for end-to-end testing of the Axum server.
pub struct TestApp {
    pub address: String,
    pub client: Client,
    pub mock_server: MockServer,
    pub app_state: AppState,
    _data_dir: TempDir,
    _server_handle: JoinHandle<()>,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestApp {
    /// Spawns the application server with the bearer token enabled.
    pub async fn spawn() -> Result<Self> {
        Self::spawn_with_token(Some(TEST_TOKEN)).await
    }

    /// Spawns the application server. `None` leaves authentication disabled.
    pub async fn spawn_with_token(token: Option<&str>) -> Result<Self> {
        dotenvy::dotenv().ok();
        // `try_init` is used to prevent panic if the logger is already initialized.
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .compact()
            .try_init();

        let mock_server = MockServer::start_async().await;

        let data_dir = tempdir()?;
        let db_path = data_dir.path().join("medical.db");
        let config_path = data_dir.path().join("config.yml");
        let config_content = format!(
            r#"
port: 0
db_url: "{}"
api_token: "{}"
extraction_mode: "code_fence"
model_timeout_secs: 5
query_timeout_secs: 5
pool:
  min_connections: 1
  max_connections: 4
providers:
  local_default:
    provider: "local"
    api_url: "{}"
    api_key: null
    model_name: "mock-chat-model"
tasks:
  query_generation:
    provider: "local_default"
"#,
            db_path.display(),
            token.unwrap_or_default(),
            mock_server.url("/v1/chat/completions")
        );
        let mut file = File::create(&config_path)?;
        file.write_all(config_content.as_bytes())?;

        let config = config::get_config(Some(config_path.to_str().unwrap()))?;
        let app_state = build_app_state(config).await?;
        app_state
            .sqlite_provider
            .initialize_with_data(SEED_DATA_SQL)
            .await?;
        let app_state_for_harness = app_state.clone();

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr: SocketAddr = listener.local_addr()?;
        let address = format!("http://{addr}");

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
        let server_handle = tokio::spawn(async move {
            let app = router::create_router(app_state);
            let server = serve(listener, app).with_graceful_shutdown(async {
                shutdown_rx.await.ok();
            });
            if let Err(e) = server.await {
                tracing::error!("[TestApp] Server error: {}", e);
            }
        });

        Ok(Self {
            address,
            client: Client::new(),
            mock_server,
            app_state: app_state_for_harness,
            _data_dir: data_dir,
            _server_handle: server_handle,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    /// A GET request carrying the test bearer token.
    pub fn get(&self, path: &str) -> RequestBuilder {
        self.client.get(self.url(path)).bearer_auth(TEST_TOKEN)
    }

    /// A POST request carrying the test bearer token.
    pub fn post(&self, path: &str) -> RequestBuilder {
        self.client.post(self.url(path)).bearer_auth(TEST_TOKEN)
    }

    /// Programs the mock model to answer `content` whenever the request body
    /// contains `needle`.
    pub async fn mock_model_answer(&self, needle: &str, content: &str) -> Mock<'_> {
        let body = json!({
            "choices": [{"message": {"role": "assistant", "content": content}}]
        });
        let needle = needle.to_string();
        self.mock_server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v1/chat/completions")
                    .body_contains(needle);
                then.status(200).json_body(body);
            })
            .await
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
