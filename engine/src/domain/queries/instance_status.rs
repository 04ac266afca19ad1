use serde::{Deserialize, Serialize};

use crate::domain::entities::ProcessInstance;

/// Operator-facing view of one instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceStatus {
    pub id: String,
    pub name: String,
    pub instance_index: u32,
    pub state: String,
    pub pid: Option<u32>,
    pub restart_count: u32,
    /// The restart limit was exhausted; only a manual restart revives it
    pub failed: bool,
    pub uptime_secs: Option<u64>,
    pub exit_code: Option<i32>,
    pub exit_signal: Option<i32>,
}

impl From<&ProcessInstance> for InstanceStatus {
    fn from(instance: &ProcessInstance) -> Self {
        Self {
            id: instance.id().to_string(),
            name: instance.spec().name().to_string(),
            instance_index: instance.instance_index(),
            state: instance.state().to_string(),
            pid: instance.pid(),
            restart_count: instance.restart_count(),
            failed: instance.is_failed(),
            uptime_secs: instance.uptime().map(|d| d.as_secs()),
            exit_code: instance.last_exit().and_then(|e| e.code),
            exit_signal: instance.last_exit().and_then(|e| e.signal),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::domain::entities::ProcessSpec;
    use crate::domain::value_objects::ProcessExit;

    #[test]
    fn test_status_view() {
        let spec = Arc::new(
            ProcessSpec::builder("api", "/bin/true")
                .instances(2)
                .build()
                .unwrap(),
        );
        let mut instance = ProcessInstance::new(spec, 1);
        instance.mark_starting().unwrap();
        instance.mark_running(77).unwrap();
        instance.mark_exited(ProcessExit::from_code(3)).unwrap();

        let status = InstanceStatus::from(&instance);
        assert_eq!(status.name, "api");
        assert_eq!(status.instance_index, 1);
        assert_eq!(status.state, "crashed");
        assert_eq!(status.pid, None);
        assert_eq!(status.exit_code, Some(3));
        assert_eq!(status.uptime_secs, None);
    }
}
