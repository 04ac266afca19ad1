use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::domain::error::{DomainError, Result};
use crate::domain::ports::{ExitHandle, OutputStream, ProcessExecutor, SpawnConfig, SpawnResult};
use crate::domain::value_objects::ProcessExit;

/// Real process executor on top of `tokio::process`
///
/// Children are placed in their own session so signals target the whole
/// process group. stdout/stderr are piped; the log router owns the files.
pub struct TokioProcessExecutor;

impl TokioProcessExecutor {
    pub fn new() -> Self {
        Self
    }

    fn exit_from_status(status: std::process::ExitStatus) -> ProcessExit {
        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = status.signal() {
                return ProcessExit::from_signal(signal);
            }
        }
        ProcessExit::from_code(status.code().unwrap_or(-1))
    }

    fn create_exit_handle(mut child: tokio::process::Child) -> ExitHandle {
        let (tx, rx) = tokio::sync::oneshot::channel();

        tokio::spawn(async move {
            let result = match child.wait().await {
                Ok(status) => Ok(Self::exit_from_status(status)),
                Err(e) => Err(DomainError::Internal(format!(
                    "waiting for child failed: {}",
                    e
                ))),
            };
            let _ = tx.send(result);
        });

        Box::pin(async move {
            rx.await.unwrap_or_else(|_| {
                Err(DomainError::Internal("exit monitor task died".to_string()))
            })
        })
    }
}

impl Default for TokioProcessExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProcessExecutor for TokioProcessExecutor {
    async fn spawn(&self, config: SpawnConfig) -> Result<SpawnResult> {
        let mut command = Command::new(&config.program);
        command
            .args(&config.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        if let Some(dir) = &config.working_dir {
            command.current_dir(dir);
        }

        // Config variables override ambient environment on collision
        for (key, value) in &config.env_vars {
            command.env(key, value);
        }

        #[cfg(unix)]
        unsafe {
            command.pre_exec(|| {
                // New session: the child leads its own process group so the
                // whole tree can be signalled via the negative pgid
                libc::setsid();
                Ok(())
            });
        }

        let mut child = command.spawn().map_err(|e| {
            DomainError::SpawnFailed(format!("cannot spawn '{}': {}", config.program, e))
        })?;

        let pid = child.id().ok_or_else(|| {
            DomainError::SpawnFailed(format!("'{}' exited before pid was known", config.program))
        })?;

        debug!(program = %config.program, pid = pid, "spawned process");

        let stdout = child
            .stdout
            .take()
            .map(|s| Box::new(s) as OutputStream);
        let stderr = child
            .stderr
            .take()
            .map(|s| Box::new(s) as OutputStream);
        let exit_handle = Some(Self::create_exit_handle(child));

        Ok(SpawnResult {
            pid,
            exit_handle,
            stdout,
            stderr,
        })
    }

    async fn kill(&self, pid: u32, signal: i32) -> Result<()> {
        #[cfg(unix)]
        {
            // Negative pid: signal the whole process group created by setsid
            let target = -(pid as i32);
            let rc = unsafe { libc::kill(target, signal) };
            if rc != 0 {
                // Fall back to the single pid when the group is already gone
                let rc = unsafe { libc::kill(pid as i32, signal) };
                if rc != 0 {
                    let err = std::io::Error::last_os_error();
                    warn!(pid = pid, signal = signal, error = %err, "kill failed");
                    return Err(DomainError::SignalFailed(format!(
                        "signal {} to pid {}: {}",
                        signal, pid, err
                    )));
                }
            }
            Ok(())
        }
        #[cfg(not(unix))]
        {
            let _ = (pid, signal);
            Err(DomainError::SignalFailed(
                "signals are only supported on unix".to_string(),
            ))
        }
    }

    async fn is_running(&self, pid: u32) -> Result<bool> {
        #[cfg(unix)]
        {
            // Signal 0 probes existence without delivering anything
            let rc = unsafe { libc::kill(pid as i32, 0) };
            Ok(rc == 0)
        }
        #[cfg(not(unix))]
        {
            let _ = pid;
            Ok(false)
        }
    }
}
