//! Test server lifecycle management
//!
//! Spawns an isolated server per test: its own temp SQLite database, its
//! own guest store directory and a no-op metadata provider so no test ever
//! talks to the real enrichment API.

use shelfmark_server::book_store::{BookService, LocalBookStore, SqliteBookStore};
use shelfmark_server::enrichment::NoopMetadataProvider;
use shelfmark_server::server::config::ServerConfig;
use shelfmark_server::server::server::make_app;
use shelfmark_server::server::state::ServerState;
use shelfmark_server::server::RequestsLoggingLevel;
use std::sync::Arc;
use std::time::Instant;
use tempfile::TempDir;
use tokio::net::TcpListener;

pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    pub client: reqwest::Client,

    // Keep temp storage alive until drop
    _temp_dir: TempDir,
}

impl TestServer {
    /// Spawns a new test server on a random port.
    pub async fn spawn() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");

        let remote = Arc::new(
            SqliteBookStore::new(&temp_dir.path().join("books.db"))
                .expect("Failed to open book store"),
        );
        let local = Arc::new(
            LocalBookStore::open(temp_dir.path().join("guest_store"))
                .expect("Failed to open guest store"),
        );
        let book_service = Arc::new(BookService::new(
            remote,
            local,
            Arc::new(NoopMetadataProvider),
        ));

        let state = ServerState {
            config: ServerConfig {
                requests_logging_level: RequestsLoggingLevel::None,
                port: 0,
                frontend_dir_path: None,
            },
            start_time: Instant::now(),
            book_service,
            hash: "test".to_string(),
        };

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let port = listener.local_addr().expect("Failed to get local addr").port();

        let app = make_app(state);
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Server crashed");
        });

        TestServer {
            base_url: format!("http://127.0.0.1:{}", port),
            client: reqwest::Client::new(),
            _temp_dir: temp_dir,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}
