use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::constants::supervision::STOP_POLL_INTERVAL_MS;
use crate::domain::entities::ProcessInstance;
use crate::domain::error::{DomainError, Result};
use crate::domain::ports::{InstanceRepository, ProcessExecutor, SpawnConfig};
use crate::domain::services::{InstanceWatchingService, LogRoutingService, SupervisorEvent};
use crate::domain::value_objects::{InstanceId, InstanceState, ProcessExit};

/// Shared spawn/terminate mechanics behind the start, stop, restart and
/// supervision paths
pub struct InstanceLifecycleService {
    repository: Arc<dyn InstanceRepository>,
    executor: Arc<dyn ProcessExecutor>,
    watcher: Arc<InstanceWatchingService>,
    log_router: Arc<LogRoutingService>,
    event_tx: mpsc::UnboundedSender<SupervisorEvent>,
}

impl InstanceLifecycleService {
    pub fn new(
        repository: Arc<dyn InstanceRepository>,
        executor: Arc<dyn ProcessExecutor>,
        watcher: Arc<InstanceWatchingService>,
        log_router: Arc<LogRoutingService>,
        event_tx: mpsc::UnboundedSender<SupervisorEvent>,
    ) -> Self {
        Self {
            repository,
            executor,
            watcher,
            log_router,
            event_tx,
        }
    }

    /// Spawn the OS process for an instance and wire up exit watching, log
    /// routing and the min-uptime reset timer
    ///
    /// On spawn failure the instance is marked crashed and a synthetic exit
    /// event enters the coordinator queue, so failures follow the same
    /// restart policy as real crashes.
    pub async fn spawn_and_register(&self, id: &InstanceId) -> Result<()> {
        let mut instance = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::ProcessNotFound(id.to_string()))?;

        instance.mark_starting()?;
        self.repository.save(instance.clone()).await?;

        let config = SpawnConfig::from_spec(instance.spec());
        match self.executor.spawn(config).await {
            Ok(result) => {
                instance.mark_running(result.pid)?;
                self.repository.save(instance.clone()).await?;
                info!(
                    instance = %instance.label(),
                    pid = result.pid,
                    "process started"
                );

                self.log_router.attach(&instance, result.stdout, result.stderr);
                if let Some(exit_handle) = result.exit_handle {
                    self.watcher.watch_instance(&instance, exit_handle);
                }
                self.start_uptime_reset_timer(&instance);
                Ok(())
            }
            Err(e) => {
                warn!(instance = %instance.label(), error = %e, "spawn failed");
                let exit = ProcessExit::spawn_failure();
                instance.mark_exited(exit)?;
                self.repository.save(instance.clone()).await?;
                let _ = self.event_tx.send(SupervisorEvent::Exited {
                    instance_id: instance.id(),
                    pid: 0,
                    exit,
                });
                Err(e)
            }
        }
    }

    /// Reset the restart counter once the instance has stayed up for its
    /// configured minimum uptime
    fn start_uptime_reset_timer(&self, instance: &ProcessInstance) {
        let min_uptime = instance.spec().restart_policy().min_uptime;
        if min_uptime.is_zero() || instance.restart_count() == 0 {
            return;
        }

        let id = instance.id();
        let label = instance.label();
        let pid = instance.pid();
        let repository = self.repository.clone();

        tokio::spawn(async move {
            tokio::time::sleep(min_uptime).await;

            match repository.find_by_id(&id).await {
                Ok(Some(mut current))
                    if current.state() == InstanceState::Running
                        && current.pid() == pid
                        && current.restart_count() > 0 =>
                {
                    debug!(instance = %label, "stable past min_uptime, resetting restart counter");
                    current.reset_restarts();
                    if let Err(e) = repository.save(current).await {
                        error!(instance = %label, error = %e, "failed to persist counter reset");
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    error!(instance = %label, error = %e, "uptime timer lookup failed");
                }
            }
        });
    }

    /// Signal the process to stop, escalating to SIGKILL after the grace
    /// period. Returns immediately; the exit event completes the stop.
    pub async fn terminate_with_grace(&self, instance: &ProcessInstance) -> Result<()> {
        let pid = instance
            .pid()
            .ok_or_else(|| DomainError::NotRunning(instance.label()))?;
        let grace = instance.spec().kill_timeout();
        let label = instance.label();

        self.executor.kill(pid, libc::SIGTERM).await?;
        debug!(instance = %label, pid = pid, "sent SIGTERM");

        let executor = self.executor.clone();
        tokio::spawn(async move {
            tokio::time::sleep(grace).await;
            if executor.is_running(pid).await.unwrap_or(false) {
                warn!(instance = %label, pid = pid, "grace period expired, sending SIGKILL");
                let _ = executor.kill(pid, libc::SIGKILL).await;
            }
        });

        Ok(())
    }

    /// Stop the process and wait for it to leave the process table, used by
    /// the synchronous restart path
    pub async fn stop_and_wait(&self, instance: &ProcessInstance) -> Result<()> {
        let Some(pid) = instance.pid() else {
            return Ok(());
        };
        let grace = instance.spec().kill_timeout();
        let label = instance.label();

        if let Err(e) = self.executor.kill(pid, libc::SIGTERM).await {
            debug!(instance = %label, error = %e, "SIGTERM failed, process likely gone");
            return Ok(());
        }

        let deadline = tokio::time::Instant::now() + grace;
        while tokio::time::Instant::now() < deadline {
            if !self.executor.is_running(pid).await.unwrap_or(false) {
                return Ok(());
            }
            tokio::time::sleep(Duration::from_millis(STOP_POLL_INTERVAL_MS)).await;
        }

        warn!(instance = %label, pid = pid, "grace period expired, sending SIGKILL");
        let _ = self.executor.kill(pid, libc::SIGKILL).await;

        // brief window for the exit to be reaped
        for _ in 0..10 {
            if !self.executor.is_running(pid).await.unwrap_or(false) {
                break;
            }
            tokio::time::sleep(Duration::from_millis(STOP_POLL_INTERVAL_MS)).await;
        }
        Ok(())
    }
}
