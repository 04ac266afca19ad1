//! Shared helpers for the in-process end-to-end tests
//!
//! Each test builds a real supervisor (real executor, in-memory repository),
//! loads a generated ecosystem file and drives it through the public use
//! cases, supervising /bin/sh workers.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;

use sup_engine::application::Application;
use sup_engine::domain::commands::{LoadConfigCommand, LoadConfigResponse, StopInstanceCommand};
use sup_engine::domain::queries::InstanceStatus;
use sup_engine::infrastructure::{InMemoryInstanceRepository, TokioProcessExecutor};

pub const WAIT_TIMEOUT: Duration = Duration::from_secs(15);
const POLL_INTERVAL: Duration = Duration::from_millis(50);

pub struct TestSupervisor {
    pub app: Arc<Application>,
    cancellation_token: CancellationToken,
}

impl TestSupervisor {
    pub fn start() -> Self {
        let repository = Arc::new(InMemoryInstanceRepository::new());
        let executor = Arc::new(TokioProcessExecutor::new());
        let app = Arc::new(Application::new(repository, executor));
        let cancellation_token = CancellationToken::new();
        app.spawn_background_tasks(cancellation_token.clone());
        Self {
            app,
            cancellation_token,
        }
    }

    pub async fn load(&self, path: PathBuf, env_mode: Option<&str>) -> LoadConfigResponse {
        self.app
            .load_config()
            .execute(LoadConfigCommand {
                path,
                env_mode: env_mode.map(str::to_string),
            })
            .await
            .expect("config load failed")
    }

    /// All instances of a spec name; empty when none are registered
    pub async fn statuses(&self, name: &str) -> Vec<InstanceStatus> {
        let all = self
            .app
            .list_instances()
            .execute()
            .await
            .expect("list failed");
        all.instances
            .into_iter()
            .filter(|i| i.name == name)
            .collect()
    }

    /// Poll until every instance of the name reaches the wanted state
    pub async fn wait_for_state(&self, name: &str, state: &str) -> Vec<InstanceStatus> {
        let deadline = Instant::now() + WAIT_TIMEOUT;
        loop {
            let statuses = self.statuses(name).await;
            if !statuses.is_empty() && statuses.iter().all(|s| s.state == state) {
                return statuses;
            }
            if Instant::now() > deadline {
                panic!(
                    "timed out waiting for '{}' to reach {}: {:?}",
                    name, state, statuses
                );
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    /// Poll until a predicate holds for the named instances
    pub async fn wait_until<F>(&self, name: &str, description: &str, predicate: F) -> Vec<InstanceStatus>
    where
        F: Fn(&[InstanceStatus]) -> bool,
    {
        let deadline = Instant::now() + WAIT_TIMEOUT;
        loop {
            let statuses = self.statuses(name).await;
            if predicate(&statuses) {
                return statuses;
            }
            if Instant::now() > deadline {
                panic!(
                    "timed out waiting for '{}' ({}): {:?}",
                    name, description, statuses
                );
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    /// Best-effort stop of everything this test started
    pub async fn shutdown(self) {
        if let Ok(all) = self.app.list_instances().execute().await {
            let mut names: Vec<String> = all.instances.into_iter().map(|i| i.name).collect();
            names.sort();
            names.dedup();
            for name in names {
                let _ = self
                    .app
                    .stop_instance()
                    .execute(StopInstanceCommand::by_name(name))
                    .await;
            }
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
        self.cancellation_token.cancel();
    }
}

/// Write an ecosystem file into the given directory
pub fn write_config(dir: &tempfile::TempDir, contents: &str) -> PathBuf {
    let path = dir.path().join("ecosystem.json");
    std::fs::write(&path, contents).expect("cannot write config");
    path
}

/// A shell worker entry with extra JSON fields spliced in
pub fn sh_app(name: &str, command: &str, extra_fields: &str) -> String {
    let command_json = serde_json::to_string(command).unwrap();
    let extra = if extra_fields.is_empty() {
        String::new()
    } else {
        format!(", {}", extra_fields)
    };
    format!(
        r#"{{"name": "{}", "script": "/bin/sh", "args": ["-c", {}]{}}}"#,
        name, command_json, extra
    )
}

pub fn ecosystem(apps: &[String]) -> String {
    format!(r#"{{"apps": [{}]}}"#, apps.join(", "))
}
