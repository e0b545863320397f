use std::net::SocketAddr;

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use sqlx::SqlitePool;
use tempfile::TempDir;

use maintlog::config::ServerConfig;

/// A running test server backed by a fresh database file.
pub struct TestApp {
    pub addr: SocketAddr,
    pub pool: SqlitePool,
    pub client: Client,
    _dir: TempDir,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// POST a raw JSON body to /log, return (body, status).
    pub async fn post_log(&self, body: &Value) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url("/log"))
            .json(body)
            .send()
            .await
            .expect("post log request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// Submit a well-formed entry and assert it was accepted.
    pub async fn log(&self, timestamp: &str, user: &str, system: &str, action: &str) {
        let (body, status) = self
            .post_log(&json!({
                "timestamp": timestamp,
                "user": user,
                "action": action,
                "system": system,
            }))
            .await;
        assert_eq!(status, StatusCode::OK, "log submission failed: {body}");
    }

    /// GET a path, return (text body, status).
    pub async fn get_text(&self, path: &str) -> (String, StatusCode) {
        let resp = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("get request failed");
        let status = resp.status();
        (resp.text().await.unwrap_or_default(), status)
    }

    /// Data rows of a CSV export (header excluded), split on CRLF.
    pub async fn export_rows(&self, query: &str) -> Vec<String> {
        let (body, status) = self.get_text(&format!("/export/csv{query}")).await;
        assert_eq!(status, StatusCode::OK, "export failed: {body}");
        body.split("\r\n")
            .skip(1)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Spawn a test app on a random port with a database in a temp directory.
pub async fn spawn_app() -> TestApp {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let database_url = format!("sqlite://{}", dir.path().join("logs.db").display());

    let pool = maintlog::db::connect(&database_url)
        .await
        .expect("Failed to open test database");
    maintlog::db::migrate(&pool)
        .await
        .expect("Failed to run migrations on test database");

    let config = ServerConfig {
        database_url,
        host: "127.0.0.1".parse().unwrap(),
        port: 0, // unused, we bind to random port
        time_zone: chrono_tz::America::New_York,
        max_body_size: 65_536,
        log_level: "warn".to_string(),
    };

    let app = maintlog::build_app(pool.clone(), config);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });

    TestApp {
        addr,
        pool,
        client: Client::new(),
        _dir: dir,
    }
}
