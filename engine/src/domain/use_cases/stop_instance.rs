use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::domain::commands::{StopInstanceCommand, StopInstanceResponse};
use crate::domain::error::Result;
use crate::domain::ports::InstanceRepository;
use crate::domain::services::InstanceLifecycleService;

#[async_trait]
pub trait StopInstance: Send + Sync {
    async fn execute(&self, command: StopInstanceCommand) -> Result<StopInstanceResponse>;
}

/// Explicitly stop instances
///
/// Marking the instance Stopping before signalling is what suppresses the
/// restart policy when the exit event arrives.
pub struct StopInstanceUseCase {
    repository: Arc<dyn InstanceRepository>,
    lifecycle: Arc<InstanceLifecycleService>,
}

impl StopInstanceUseCase {
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
impl StopInstance for StopInstanceUseCase {
    async fn execute(&self, command: StopInstanceCommand) -> Result<StopInstanceResponse> {
        let targets = self
            .repository
            .find_targets(command.instance_id.as_ref(), command.name.as_deref())
            .await?;

        let mut stopped = Vec::new();
        for mut instance in targets {
            if !instance.state().can_stop() {
                debug!(instance = %instance.label(), state = %instance.state(), "not running, skipping");
                continue;
            }

            instance.mark_stopping()?;
            self.repository.save(instance.clone()).await?;

            self.lifecycle.terminate_with_grace(&instance).await?;
            info!(instance = %instance.label(), "stop requested");
            stopped.push(instance.label());
        }

        Ok(StopInstanceResponse { stopped })
    }
}
