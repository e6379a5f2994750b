#![allow(dead_code)]

pub mod fixtures;

use std::process::{Child, Command, Stdio};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use coursehub_api::auth::{generate_jwt_with_secret, Claims};
use coursehub_api::types::Role;
use reqwest::StatusCode;
use sqlx::postgres::{PgPool, PgPoolOptions};

pub const TEST_JWT_SECRET: &str = "integration-test-secret";

static SERVER: OnceLock<TestServer> = OnceLock::new();

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    child: Child,
}

impl TestServer {
    fn spawn(database_url: &str) -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let mut cmd = Command::new(env!("CARGO_BIN_EXE_coursehub-api"));
        cmd.env("APP_ENV", "test")
            .env("DATABASE_URL", database_url)
            .env("DATABASE_RUN_MIGRATIONS", "true")
            .env("HOST", "127.0.0.1")
            .env("PORT", port.to_string())
            .env("JWT_SECRET", TEST_JWT_SECRET)
            .env("API_ENABLE_REQUEST_LOGGING", "false")
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self { port, base_url, child })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

pub fn database_url() -> Option<String> {
    let _ = dotenvy::dotenv();
    std::env::var("DATABASE_URL").ok().filter(|url| !url.trim().is_empty())
}

/// Running server, or `None` when no database is configured for this run
pub async fn ensure_server() -> Result<Option<&'static TestServer>> {
    let Some(database_url) = database_url() else {
        eprintln!("DATABASE_URL not set; skipping integration test");
        return Ok(None);
    };

    let server = SERVER.get_or_init(|| TestServer::spawn(&database_url).expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(20)).await?;
    Ok(Some(server))
}

/// Fresh pool per test; each `#[tokio::test]` has its own runtime
pub async fn pool() -> Result<PgPool> {
    let url = database_url().context("DATABASE_URL not set")?;
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&url)
        .await
        .context("failed to connect fixture pool")?;
    Ok(pool)
}

pub fn bearer(user_id: i64, role: Role) -> String {
    let claims = Claims::with_expiry(user_id, role, 1);
    let token = generate_jwt_with_secret(&claims, TEST_JWT_SECRET).expect("sign test token");
    format!("Bearer {}", token)
}
