pub mod github_stub;

use std::process::{Child, Command, Stdio};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};

static SERVER: OnceLock<TestServer> = OnceLock::new();

pub const TEST_JWT_SECRET: &str = "integration-test-secret";

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    #[allow(dead_code)]
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        // DATABASE_URL is inherited, so DB-backed tests run when one is configured
        let child = Command::new(env!("CARGO_BIN_EXE_collab-api-rust"))
            .env("PORT", port.to_string())
            .env("JWT_SECRET", TEST_JWT_SECRET)
            .env("APP_ENV", "development")
            .env("API_ENABLE_RATE_LIMITING", "false")
            .env("GITHUB_API_URL", github_stub::base_url())
            .env("UPLOAD_DIR", upload_dir())
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
            .context("failed to spawn server binary")?;

        Ok(Self { port, base_url, child })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            let url = format!("{}/api/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                // Ready once the health route answers, with or without a database
                if resp.status() == StatusCode::OK || resp.status() == StatusCode::SERVICE_UNAVAILABLE {
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

    /// True when the server reports a connected database
    pub async fn has_database(&self) -> bool {
        match reqwest::get(self.url("/api/health")).await {
            Ok(resp) => resp.status() == StatusCode::OK,
            Err(_) => false,
        }
    }

    /// Register a fresh account and return (token, user id)
    pub async fn register(&self, client: &reqwest::Client, name: &str) -> Result<(String, String)> {
        let email = format!("{}-{}@example.com", name.to_lowercase(), uuid::Uuid::new_v4().simple());
        let res = client
            .post(self.url("/api/auth/register"))
            .json(&json!({
                "name": name,
                "email": email,
                "password": "secret123",
                "year": "Third Year",
                "branch": "Computer Science",
                "skills": "rust, postgres"
            }))
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::CREATED, "register failed: {}", res.status());

        let body: Value = res.json().await?;
        let token = body["data"]["token"].as_str().context("missing token")?.to_string();
        let id = body["data"]["user"]["_id"].as_str().context("missing user id")?.to_string();
        Ok((token, id))
    }
}

/// Where the spawned server writes uploads for this test binary
pub fn upload_dir() -> String {
    std::env::temp_dir()
        .join(format!("collab-test-uploads-{}", std::process::id()))
        .to_string_lossy()
        .into_owned()
}

/// A GitHub URL no other test run has used; the prefix picks the stub's behavior
#[allow(dead_code)]
pub fn unique_repo_url(prefix: &str) -> String {
    format!("https://github.com/collab-tests/{}-{}", prefix, uuid::Uuid::new_v4().simple())
}

pub async fn ensure_server() -> Result<&'static TestServer> {
    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(20)).await?;
    Ok(server)
}
