use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::domain::entities::ProcessInstance;
use crate::domain::ports::ExitHandle;
use crate::domain::value_objects::{InstanceId, ProcessExit};

/// Events consumed by the supervision coordinator, in arrival order
#[derive(Debug, Clone)]
pub enum SupervisorEvent {
    /// A watched process left the process table
    Exited {
        instance_id: InstanceId,
        pid: u32,
        exit: ProcessExit,
    },
    /// A running process exceeded its memory ceiling
    MemoryExceeded {
        instance_id: InstanceId,
        pid: u32,
        rss_bytes: u64,
        limit_bytes: u64,
    },
}

/// Watches spawned processes for exit, one task per instance
///
/// Exit handles resolve when the OS reaps the child; no polling. Events are
/// forwarded into the unbounded coordinator queue.
pub struct InstanceWatchingService {
    event_tx: mpsc::UnboundedSender<SupervisorEvent>,
}

impl InstanceWatchingService {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<SupervisorEvent>) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        (Self { event_tx }, event_rx)
    }

    /// A sender for other event producers (memory monitor, spawn failures)
    pub fn event_sender(&self) -> mpsc::UnboundedSender<SupervisorEvent> {
        self.event_tx.clone()
    }

    /// Spawn the exit-watch task for a freshly started instance
    pub fn watch_instance(&self, instance: &ProcessInstance, exit_handle: ExitHandle) {
        let instance_id = instance.id();
        let label = instance.label();
        let pid = instance.pid().unwrap_or(0);
        let event_tx = self.event_tx.clone();

        tokio::spawn(async move {
            let exit = match exit_handle.await {
                Ok(exit) => exit,
                Err(e) => {
                    warn!(instance = %label, error = %e, "exit watch failed");
                    ProcessExit::spawn_failure()
                }
            };

            debug!(instance = %label, pid = pid, exit = %exit, "process exited");

            if event_tx
                .send(SupervisorEvent::Exited {
                    instance_id,
                    pid,
                    exit,
                })
                .is_err()
            {
                debug!(instance = %label, "coordinator gone, dropping exit event");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::domain::entities::ProcessSpec;
    use crate::domain::error::DomainError;

    fn running_instance() -> ProcessInstance {
        let spec = Arc::new(ProcessSpec::builder("worker", "/bin/true").build().unwrap());
        let mut instance = ProcessInstance::new(spec, 0);
        instance.mark_starting().unwrap();
        instance.mark_running(4242).unwrap();
        instance
    }

    #[tokio::test]
    async fn test_exit_event_delivered() {
        let (watcher, mut event_rx) = InstanceWatchingService::new();
        let instance = running_instance();
        let id = instance.id();

        let handle: ExitHandle = Box::pin(async { Ok(ProcessExit::from_code(3)) });
        watcher.watch_instance(&instance, handle);

        match event_rx.recv().await.unwrap() {
            SupervisorEvent::Exited {
                instance_id,
                pid,
                exit,
            } => {
                assert_eq!(instance_id, id);
                assert_eq!(pid, 4242);
                assert_eq!(exit.code, Some(3));
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_watch_error_reported_as_failure_exit() {
        let (watcher, mut event_rx) = InstanceWatchingService::new();
        let instance = running_instance();

        let handle: ExitHandle =
            Box::pin(async { Err(DomainError::Internal("broken".to_string())) });
        watcher.watch_instance(&instance, handle);

        match event_rx.recv().await.unwrap() {
            SupervisorEvent::Exited { exit, .. } => {
                assert_eq!(exit, ProcessExit::spawn_failure());
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }
}
