use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::domain::commands::{FailedApp, LoadConfigCommand, LoadConfigResponse};
use crate::domain::constants::DEFAULT_ENV_MODE;
use crate::domain::entities::ProcessInstance;
use crate::domain::error::{DomainError, Result};
use crate::domain::ports::InstanceRepository;
use crate::domain::services::{ConfigParsingService, InstanceLifecycleService};
use crate::infrastructure::config::EcosystemConfig;

#[async_trait]
pub trait LoadConfig: Send + Sync {
    async fn execute(&self, command: LoadConfigCommand) -> Result<LoadConfigResponse>;
}

/// Parse an ecosystem file and spawn every valid entry
///
/// Per-entry failures (bad config, duplicate name, spawn error) are reported
/// in the response and do not abort the remaining entries.
pub struct LoadConfigUseCase {
    repository: Arc<dyn InstanceRepository>,
    lifecycle: Arc<InstanceLifecycleService>,
}

impl LoadConfigUseCase {
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
impl LoadConfig for LoadConfigUseCase {
    async fn execute(&self, command: LoadConfigCommand) -> Result<LoadConfigResponse> {
        let config = EcosystemConfig::load(&command.path)?;
        let mode = command
            .env_mode
            .unwrap_or_else(|| DEFAULT_ENV_MODE.to_string());

        info!(
            path = %command.path.display(),
            mode = %mode,
            apps = config.apps.len(),
            "loading ecosystem configuration"
        );

        let mut started = Vec::new();
        let mut failed = Vec::new();
        let mut seen_names: HashSet<String> = HashSet::new();

        for app in &config.apps {
            let spec = match ConfigParsingService::parse(app, &mode) {
                Ok(spec) => spec,
                Err(e) => {
                    warn!(process = %app.name, error = %e, "skipping invalid entry");
                    failed.push(FailedApp {
                        name: app.name.clone(),
                        error: e.to_string(),
                    });
                    continue;
                }
            };

            if !seen_names.insert(spec.name().to_string())
                || self.repository.exists_by_name(spec.name()).await?
            {
                let e = DomainError::DuplicateProcess(spec.name().to_string());
                warn!(process = %spec.name(), "skipping duplicate entry");
                failed.push(FailedApp {
                    name: spec.name().to_string(),
                    error: e.to_string(),
                });
                continue;
            }

            let spec = Arc::new(spec);
            for index in 0..spec.instances() {
                let instance = ProcessInstance::new(spec.clone(), index);
                let id = instance.id();
                let label = instance.label();
                self.repository.save(instance).await?;

                match self.lifecycle.spawn_and_register(&id).await {
                    Ok(()) => started.push(label),
                    Err(e) => {
                        // the instance stays registered; the supervision loop
                        // retries it under the restart policy
                        failed.push(FailedApp {
                            name: label,
                            error: e.to_string(),
                        });
                    }
                }
            }
        }

        info!(
            started = started.len(),
            failed = failed.len(),
            "configuration loaded"
        );
        Ok(LoadConfigResponse { started, failed })
    }
}
