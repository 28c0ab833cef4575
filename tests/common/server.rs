//! Test server lifecycle management
//!
//! This module manages spawning and shutting down test HTTP servers.
//! Each test gets an isolated server with its own lessons database.

use super::constants::*;
use super::fixtures::{midnight_wait, seed_fixtures};
use lifenotes_server::config::ReportingSettings;
use lifenotes_server::server::{server::make_app, RequestsLoggingLevel, ServerConfig};
use lifenotes_server::SqliteLessonStore;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;

/// Test server instance with an isolated database
///
/// When dropped, the server gracefully shuts down and temp resources are cleaned up.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// The port the server is listening on
    pub port: u16,

    /// Lesson store for seeding and inspecting the database directly
    pub store: Arc<SqliteLessonStore>,

    // Private fields - keep resources alive until drop
    _temp_db_dir: TempDir,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    /// Spawns a server over an empty database with default reporting settings
    pub async fn spawn() -> Self {
        Self::spawn_with_settings(ReportingSettings::default()).await
    }

    /// Spawns a server over a database seeded with the shared fixtures
    #[allow(dead_code)]
    pub async fn spawn_with_fixtures() -> Self {
        let server = Self::spawn().await;
        seed_fixtures(server.store.as_ref()).expect("Failed to seed fixtures");
        server
    }

    /// Spawns a new test server on a random port
    ///
    /// This function:
    /// 1. Waits out the last minute before UTC midnight, if needed
    /// 2. Creates a temporary lessons database
    /// 3. Binds to a random port (127.0.0.1:0)
    /// 4. Spawns the server in a background task
    /// 5. Waits for the server to be ready
    ///
    /// # Panics
    ///
    /// Panics if database creation, port binding or server startup fails.
    pub async fn spawn_with_settings(reporting: ReportingSettings) -> Self {
        // Fixtures and the server both read "today" from the wall clock
        if let Some(wait) = midnight_wait(chrono::Utc::now()) {
            tokio::time::sleep(wait).await;
        }

        let temp_db_dir = TempDir::new().expect("Failed to create temp dir");
        let store = Arc::new(
            SqliteLessonStore::new(
                temp_db_dir.path().join("lessons.db"),
                reporting.read_pool_size,
            )
            .expect("Failed to open lesson store"),
        );

        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");

        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();

        let base_url = format!("http://127.0.0.1:{}", port);

        // Create shutdown channel
        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        let config = ServerConfig {
            port,
            requests_logging_level: RequestsLoggingLevel::None,
            ..Default::default()
        };

        let app = make_app(config, store.clone(), reporting).expect("Failed to build app");

        // Spawn server in background task with graceful shutdown
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Server failed");
        });

        let server = Self {
            base_url,
            port,
            store,
            _temp_db_dir: temp_db_dir,
            _shutdown_tx: Some(shutdown_tx),
        };

        server.wait_for_ready().await;

        server
    }

    /// Waits for the server to become ready by polling the home endpoint
    async fn wait_for_ready(&self) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("Failed to build reqwest client");

        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(SERVER_READY_TIMEOUT_MS);

        loop {
            if start.elapsed() > timeout {
                panic!(
                    "Server did not become ready within {}ms",
                    SERVER_READY_TIMEOUT_MS
                );
            }

            match client.get(format!("{}/", self.base_url)).send().await {
                Ok(response) if response.status().is_success() => return,
                _ => {
                    tokio::time::sleep(Duration::from_millis(SERVER_READY_POLL_INTERVAL_MS)).await;
                }
            }
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        // Send shutdown signal
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
