use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::domain::commands::{StartInstanceCommand, StartInstanceResponse};
use crate::domain::error::Result;
use crate::domain::ports::InstanceRepository;
use crate::domain::services::InstanceLifecycleService;

#[async_trait]
pub trait StartInstance: Send + Sync {
    async fn execute(&self, command: StartInstanceCommand) -> Result<StartInstanceResponse>;
}

/// Manually start stopped or crashed instances
///
/// A manual start is external intervention: it clears the failure record and
/// resets the restart counter before spawning.
pub struct StartInstanceUseCase {
    repository: Arc<dyn InstanceRepository>,
    lifecycle: Arc<InstanceLifecycleService>,
}

impl StartInstanceUseCase {
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
impl StartInstance for StartInstanceUseCase {
    async fn execute(&self, command: StartInstanceCommand) -> Result<StartInstanceResponse> {
        let targets = self
            .repository
            .find_targets(command.instance_id.as_ref(), command.name.as_deref())
            .await?;

        let mut started = Vec::new();
        for mut instance in targets {
            if !instance.state().can_start() {
                debug!(instance = %instance.label(), state = %instance.state(), "not startable, skipping");
                continue;
            }

            instance.reset_restarts();
            instance.clear_failed();
            let id = instance.id();
            let label = instance.label();
            self.repository.save(instance).await?;

            self.lifecycle.spawn_and_register(&id).await?;
            info!(instance = %label, "started");
            started.push(label);
        }

        Ok(StartInstanceResponse { started })
    }
}
