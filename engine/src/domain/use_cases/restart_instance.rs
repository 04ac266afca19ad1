use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::domain::commands::{RestartInstanceCommand, RestartInstanceResponse};
use crate::domain::error::{DomainError, Result};
use crate::domain::ports::InstanceRepository;
use crate::domain::services::InstanceLifecycleService;
use crate::domain::value_objects::InstanceState;

#[async_trait]
pub trait RestartInstance: Send + Sync {
    async fn execute(&self, command: RestartInstanceCommand) -> Result<RestartInstanceResponse>;
}

/// Synchronous stop-then-start
///
/// Like a manual start, a restart is external intervention and resets the
/// restart counter and the failure record.
pub struct RestartInstanceUseCase {
    repository: Arc<dyn InstanceRepository>,
    lifecycle: Arc<InstanceLifecycleService>,
}

impl RestartInstanceUseCase {
    pub fn new(
        repository: Arc<dyn InstanceRepository>,
        lifecycle: Arc<InstanceLifecycleService>,
    ) -> Self {
        Self {
            repository,
            lifecycle,
        }
    }
}

#[async_trait]
impl RestartInstance for RestartInstanceUseCase {
    async fn execute(&self, command: RestartInstanceCommand) -> Result<RestartInstanceResponse> {
        let targets = self
            .repository
            .find_targets(command.instance_id.as_ref(), command.name.as_deref())
            .await?;

        let mut restarted = Vec::new();
        for instance in targets {
            let id = instance.id();
            let label = instance.label();

            if instance.state().can_stop() {
                let mut stopping = instance.clone();
                stopping.mark_stopping()?;
                self.repository.save(stopping.clone()).await?;
                self.lifecycle.stop_and_wait(&stopping).await?;
            }

            // the exit event may already have completed the stop; converge
            // on Stopped before respawning
            let mut current = self
                .repository
                .find_by_id(&id)
                .await?
                .ok_or_else(|| DomainError::ProcessNotFound(id.to_string()))?;
            if current.state() != InstanceState::Stopped {
                current.mark_stopped()?;
            }
            current.reset_restarts();
            current.clear_failed();
            self.repository.save(current).await?;

            self.lifecycle.spawn_and_register(&id).await?;
            info!(instance = %label, "restarted");
            restarted.push(label);
        }

        Ok(RestartInstanceResponse { restarted })
    }
}
