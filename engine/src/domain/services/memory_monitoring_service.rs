use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use crate::domain::ports::InstanceRepository;
use crate::domain::services::SupervisorEvent;
use crate::domain::value_objects::InstanceState;

/// Polls resident set size of running instances against their configured
/// memory ceiling and reports violations to the coordinator
pub struct MemoryMonitoringService {
    repository: Arc<dyn InstanceRepository>,
    event_tx: mpsc::UnboundedSender<SupervisorEvent>,
    poll_interval: Duration,
}

impl MemoryMonitoringService {
    pub fn new(
        repository: Arc<dyn InstanceRepository>,
        event_tx: mpsc::UnboundedSender<SupervisorEvent>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            repository,
            event_tx,
            poll_interval,
        }
    }

    pub async fn run(&self, cancellation_token: CancellationToken) {
        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = cancellation_token.cancelled() => {
                    debug!("memory monitor shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    self.poll_once().await;
                }
            }
        }
    }

    async fn poll_once(&self) {
        let instances = match self.repository.find_all().await {
            Ok(instances) => instances,
            Err(e) => {
                error!(error = %e, "memory monitor cannot list instances");
                return;
            }
        };

        for instance in instances {
            if instance.state() != InstanceState::Running {
                continue;
            }
            let Some(limit) = instance.spec().restart_policy().max_memory_restart else {
                continue;
            };
            let Some(pid) = instance.pid() else {
                continue;
            };

            match read_rss_bytes(pid) {
                Some(rss) if rss > limit => {
                    warn!(
                        instance = %instance.label(),
                        pid = pid,
                        rss_bytes = rss,
                        limit_bytes = limit,
                        "memory ceiling exceeded"
                    );
                    let _ = self.event_tx.send(SupervisorEvent::MemoryExceeded {
                        instance_id: instance.id(),
                        pid,
                        rss_bytes: rss,
                        limit_bytes: limit,
                    });
                }
                _ => {}
            }
        }
    }
}

/// Resident set size of a pid in bytes, from /proc
#[cfg(target_os = "linux")]
pub fn read_rss_bytes(pid: u32) -> Option<u64> {
    let status = std::fs::read_to_string(format!("/proc/{}/status", pid)).ok()?;
    for line in status.lines() {
        if let Some(rest) = line.strip_prefix("VmRSS:") {
            let kb: u64 = rest.trim().trim_end_matches("kB").trim().parse().ok()?;
            return Some(kb * 1024);
        }
    }
    None
}

#[cfg(not(target_os = "linux"))]
pub fn read_rss_bytes(_pid: u32) -> Option<u64> {
    None
}
