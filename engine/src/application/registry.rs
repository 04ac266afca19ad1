use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::constants::supervision::MEMORY_POLL_INTERVAL_MS;
use crate::domain::ports::{InstanceRepository, ProcessExecutor};
use crate::domain::services::{
    InstanceLifecycleService, InstanceWatchingService, LogRoutingService,
    MemoryMonitoringService, SupervisionService, SupervisorEvent,
};
use crate::domain::use_cases::{
    GetInstanceStatus, GetInstanceStatusUseCase, ListInstances, ListInstancesUseCase, LoadConfig,
    LoadConfigUseCase, RestartInstance, RestartInstanceUseCase, StartInstance,
    StartInstanceUseCase, StopInstance, StopInstanceUseCase,
};

/// Composition root wiring ports, services and use cases
pub struct Application {
    load_config: Arc<dyn LoadConfig>,
    start_instance: Arc<dyn StartInstance>,
    stop_instance: Arc<dyn StopInstance>,
    restart_instance: Arc<dyn RestartInstance>,
    get_instance_status: Arc<dyn GetInstanceStatus>,
    list_instances: Arc<dyn ListInstances>,
    supervision: Arc<SupervisionService>,
    memory_monitor: Arc<MemoryMonitoringService>,
    /// Taken once by `spawn_background_tasks`
    event_rx: Mutex<Option<mpsc::UnboundedReceiver<SupervisorEvent>>>,
}

impl Application {
    pub fn new(
        repository: Arc<dyn InstanceRepository>,
        executor: Arc<dyn ProcessExecutor>,
    ) -> Self {
        let (watcher, event_rx) = InstanceWatchingService::new();
        let watcher = Arc::new(watcher);
        let event_tx = watcher.event_sender();
        let log_router = Arc::new(LogRoutingService::new());

        let lifecycle = Arc::new(InstanceLifecycleService::new(
            repository.clone(),
            executor,
            watcher,
            log_router,
            event_tx.clone(),
        ));

        let supervision = Arc::new(SupervisionService::new(
            repository.clone(),
            lifecycle.clone(),
        ));
        let memory_monitor = Arc::new(MemoryMonitoringService::new(
            repository.clone(),
            event_tx,
            Duration::from_millis(MEMORY_POLL_INTERVAL_MS),
        ));

        Self {
            load_config: Arc::new(LoadConfigUseCase::new(
                repository.clone(),
                lifecycle.clone(),
            )),
            start_instance: Arc::new(StartInstanceUseCase::new(
                repository.clone(),
                lifecycle.clone(),
            )),
            stop_instance: Arc::new(StopInstanceUseCase::new(
                repository.clone(),
                lifecycle.clone(),
            )),
            restart_instance: Arc::new(RestartInstanceUseCase::new(
                repository.clone(),
                lifecycle,
            )),
            get_instance_status: Arc::new(GetInstanceStatusUseCase::new(repository.clone())),
            list_instances: Arc::new(ListInstancesUseCase::new(repository)),
            supervision,
            memory_monitor,
            event_rx: Mutex::new(Some(event_rx)),
        }
    }

    /// Start the coordinator and the memory monitor; call once
    pub fn spawn_background_tasks(&self, cancellation_token: CancellationToken) {
        let event_rx = self
            .event_rx
            .lock()
            .expect("event receiver mutex poisoned")
            .take()
            .expect("background tasks already spawned");

        let supervision = self.supervision.clone();
        let supervision_token = cancellation_token.clone();
        tokio::spawn(async move {
            supervision.run(event_rx, supervision_token).await;
        });

        let memory_monitor = self.memory_monitor.clone();
        tokio::spawn(async move {
            memory_monitor.run(cancellation_token).await;
        });
    }

    pub fn load_config(&self) -> &Arc<dyn LoadConfig> {
        &self.load_config
    }

    pub fn start_instance(&self) -> &Arc<dyn StartInstance> {
        &self.start_instance
    }

    pub fn stop_instance(&self) -> &Arc<dyn StopInstance> {
        &self.stop_instance
    }

    pub fn restart_instance(&self) -> &Arc<dyn RestartInstance> {
        &self.restart_instance
    }

    pub fn get_instance_status(&self) -> &Arc<dyn GetInstanceStatus> {
        &self.get_instance_status
    }

    pub fn list_instances(&self) -> &Arc<dyn ListInstances> {
        &self.list_instances
    }
}
