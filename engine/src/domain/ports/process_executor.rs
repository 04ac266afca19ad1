use std::collections::HashMap;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

use async_trait::async_trait;
use tokio::io::AsyncRead;

use crate::domain::entities::ProcessSpec;
use crate::domain::error::Result;
use crate::domain::value_objects::ProcessExit;

/// Future resolving when the spawned process leaves the process table
pub type ExitHandle = Pin<Box<dyn Future<Output = Result<ProcessExit>> + Send>>;

/// Piped output stream of a spawned process
pub type OutputStream = Box<dyn AsyncRead + Send + Unpin>;

/// Everything the executor needs to spawn one OS process
#[derive(Debug, Clone)]
pub struct SpawnConfig {
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
    pub env_vars: HashMap<String, String>,
}

impl SpawnConfig {
    /// Derive the spawn invocation from a spec: with an interpreter the
    /// script becomes its first argument, otherwise the script is executed
    /// directly.
    pub fn from_spec(spec: &ProcessSpec) -> Self {
        let (program, args) = match spec.interpreter() {
            Some(interpreter) => {
                let mut args = vec![spec.script().to_string()];
                args.extend(spec.args().iter().cloned());
                (interpreter.to_string(), args)
            }
            None => (spec.script().to_string(), spec.args().to_vec()),
        };

        Self {
            program,
            args,
            working_dir: spec.cwd().cloned(),
            env_vars: spec.env().clone(),
        }
    }
}

/// Outcome of a successful spawn
pub struct SpawnResult {
    pub pid: u32,
    /// Resolves on exit; absent for executors that cannot report exits
    pub exit_handle: Option<ExitHandle>,
    pub stdout: Option<OutputStream>,
    pub stderr: Option<OutputStream>,
}

impl std::fmt::Debug for SpawnResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpawnResult")
            .field("pid", &self.pid)
            .field("has_exit_handle", &self.exit_handle.is_some())
            .field("has_stdout", &self.stdout.is_some())
            .field("has_stderr", &self.stderr.is_some())
            .finish()
    }
}

/// Driving port for OS process control
#[async_trait]
pub trait ProcessExecutor: Send + Sync {
    /// Spawn a process with piped stdout/stderr
    async fn spawn(&self, config: SpawnConfig) -> Result<SpawnResult>;

    /// Send a signal to a process
    async fn kill(&self, pid: u32, signal: i32) -> Result<()>;

    /// Whether a pid still occupies the process table
    async fn is_running(&self, pid: u32) -> Result<bool>;
}
