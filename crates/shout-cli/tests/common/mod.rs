use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde_json::{Value, json};
use tempfile::TempDir;
use wiremock::MockServer;

/// An isolated session file plus a mock PDS to run the CLI against.
pub struct TestEnv {
    pub server: MockServer,
    dir: TempDir,
}

impl TestEnv {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
            dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    pub fn pds_url(&self) -> String {
        format!("http://127.0.0.1:{}", self.server.address().port())
    }

    pub fn session_file(&self) -> PathBuf {
        self.dir.path().join("shout").join("session.json")
    }

    /// Store a session as if a previous `shout login` had written it.
    pub fn seed_session(&self, access: &str, refresh: &str) {
        let path = self.session_file();
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(
            &path,
            serde_json::to_string_pretty(&json!({
                "did": "did:plc:alice",
                "handle": "alice.test",
                "accessToken": access,
                "refreshToken": refresh
            }))
            .unwrap(),
        )
        .unwrap();
    }

    /// The stored session record, or `None` if there is no file.
    pub fn stored_session(&self) -> Option<Value> {
        let contents = std::fs::read_to_string(self.session_file()).ok()?;
        Some(serde_json::from_str(&contents).expect("session file is not JSON"))
    }

    /// Run the CLI binary against the mock PDS.
    ///
    /// Runs on a blocking thread so the mock server keeps serving.
    pub async fn run(&self, args: &[&str]) -> Output {
        let pds = self.pds_url();
        let session_file = self.session_file();
        let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();

        tokio::task::spawn_blocking(move || run_cli(&args, &pds, &session_file))
            .await
            .expect("CLI task panicked")
    }
}

fn run_cli(args: &[String], pds: &str, session_file: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_shout"))
        .args(args)
        .env("SHOUT_PDS", pds)
        .env("SHOUT_SESSION_FILE", session_file)
        .env("NO_COLOR", "1")
        .env_remove("SHOUT_PASSWORD")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute CLI")
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}
