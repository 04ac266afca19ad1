use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::domain::entities::ProcessInstance;
use crate::domain::error::Result;
use crate::domain::ports::InstanceRepository;
use crate::domain::services::{InstanceLifecycleService, SupervisorEvent};
use crate::domain::value_objects::{InstanceId, InstanceState, ProcessExit};

/// The lifecycle coordinator
///
/// Every state decision flows through a single ordered event queue: process
/// exits, memory ceiling violations, and the synthetic exits produced by
/// failed spawns. Handlers mutate instances through the repository and ask
/// the lifecycle service to respawn when the policy says so.
pub struct SupervisionService {
    repository: Arc<dyn InstanceRepository>,
    lifecycle: Arc<InstanceLifecycleService>,
}

impl SupervisionService {
    pub fn new(
        repository: Arc<dyn InstanceRepository>,
        lifecycle: Arc<InstanceLifecycleService>,
    ) -> Self {
        Self {
            repository,
            lifecycle,
        }
    }

    /// Consume events until cancellation
    pub async fn run(
        &self,
        mut event_rx: mpsc::UnboundedReceiver<SupervisorEvent>,
        cancellation_token: CancellationToken,
    ) {
        info!("supervision coordinator started");

        loop {
            tokio::select! {
                _ = cancellation_token.cancelled() => {
                    info!("supervision coordinator shutting down");
                    break;
                }
                event = event_rx.recv() => {
                    match event {
                        Some(event) => {
                            if let Err(e) = self.handle_event(event).await {
                                error!(error = %e, "event handling failed");
                            }
                        }
                        None => {
                            warn!("event channel closed, coordinator exiting");
                            break;
                        }
                    }
                }
            }
        }
    }

    async fn handle_event(&self, event: SupervisorEvent) -> Result<()> {
        match event {
            SupervisorEvent::Exited {
                instance_id,
                pid,
                exit,
            } => self.handle_exited(instance_id, pid, exit).await,
            SupervisorEvent::MemoryExceeded {
                instance_id, pid, ..
            } => self.handle_memory_exceeded(instance_id, pid).await,
        }
    }

    async fn handle_exited(
        &self,
        instance_id: InstanceId,
        pid: u32,
        exit: ProcessExit,
    ) -> Result<()> {
        let Some(mut instance) = self.repository.find_by_id(&instance_id).await? else {
            warn!(instance_id = %instance_id, "exit event for unknown instance");
            return Ok(());
        };

        // An exit event carrying an old pid after a respawn is stale.
        // Synthetic spawn-failure exits carry pid 0 and the instance holds
        // no pid, so they pass this guard.
        if let Some(current_pid) = instance.pid() {
            if pid != 0 && current_pid != pid {
                debug!(
                    instance = %instance.label(),
                    event_pid = pid,
                    current_pid = current_pid,
                    "ignoring stale exit event"
                );
                return Ok(());
            }
        }

        let run_duration = instance.current_run_duration();
        let pending_restart = instance.take_restart_after_stop();
        instance.mark_exited(exit)?;

        if instance.state() == InstanceState::Stopped && !pending_restart {
            info!(instance = %instance.label(), exit = %exit, "stopped");
            self.repository.save(instance).await?;
            return Ok(());
        }

        info!(instance = %instance.label(), exit = %exit, "exited");

        // run_duration is None when the process never reached Running, so a
        // failed spawn can never count as a stable run
        let min_uptime = instance.spec().restart_policy().min_uptime;
        let stable = run_duration.map_or(false, |d| d >= min_uptime);
        if stable && instance.restart_count() > 0 {
            debug!(instance = %instance.label(), "run outlived min_uptime, resetting restart counter");
            instance.reset_restarts();
        }

        self.repository.save(instance.clone()).await?;
        self.attempt_restart(instance).await
    }

    async fn handle_memory_exceeded(&self, instance_id: InstanceId, pid: u32) -> Result<()> {
        let Some(mut instance) = self.repository.find_by_id(&instance_id).await? else {
            return Ok(());
        };

        // Ignore stale reports: the instance may already be stopping or the
        // pid may belong to a previous run
        if instance.state() != InstanceState::Running || instance.pid() != Some(pid) {
            debug!(instance = %instance.label(), "ignoring stale memory event");
            return Ok(());
        }

        warn!(instance = %instance.label(), pid = pid, "stopping for memory-triggered restart");
        instance.mark_stopping()?;
        instance.set_restart_after_stop(true);
        self.repository.save(instance.clone()).await?;

        if let Err(e) = self.lifecycle.terminate_with_grace(&instance).await {
            warn!(instance = %instance.label(), error = %e, "memory-triggered stop failed");
        }
        Ok(())
    }

    /// Apply the restart policy to an instance whose process is gone
    async fn attempt_restart(&self, mut instance: ProcessInstance) -> Result<()> {
        let policy = instance.spec().restart_policy().clone();
        let label = instance.label();

        if !policy.autorestart {
            info!(instance = %label, "autorestart disabled, leaving stopped");
            instance.mark_stopped()?;
            self.repository.save(instance).await?;
            return Ok(());
        }

        if instance.restart_count() >= policy.max_restarts {
            warn!(
                instance = %label,
                restarts = instance.restart_count(),
                max_restarts = policy.max_restarts,
                "restart limit exceeded, giving up"
            );
            instance.mark_failed()?;
            self.repository.save(instance).await?;
            return Ok(());
        }

        instance.increment_restarts();
        info!(
            instance = %label,
            attempt = instance.restart_count(),
            max_restarts = policy.max_restarts,
            "restarting"
        );
        let id = instance.id();
        self.repository.save(instance).await?;

        if let Err(e) = self.lifecycle.spawn_and_register(&id).await {
            // the synthetic exit event already queued by the lifecycle
            // service retries this under the same policy
            warn!(instance = %label, error = %e, "restart spawn failed");
        }
        Ok(())
    }
}
