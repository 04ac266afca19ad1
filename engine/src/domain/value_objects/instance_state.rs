use serde::{Deserialize, Serialize};

/// Lifecycle state of a managed process instance
///
/// Crashed covers every spontaneous exit, clean or not; the restart policy
/// decides what happens next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum InstanceState {
    /// Spawn requested, process not yet confirmed running
    Starting,
    /// Process is running with a known pid
    Running,
    /// Stop requested, waiting for the process to exit
    Stopping,
    /// Process exited without being asked to
    Crashed,
    /// Not running; initial state, and terminal unless restarted
    #[default]
    Stopped,
}

impl InstanceState {
    /// Whether a transition to the given state is valid
    pub fn can_transition_to(&self, new_state: InstanceState) -> bool {
        use InstanceState::*;

        if *self == new_state {
            return true;
        }

        matches!(
            (*self, new_state),
            (Starting, Running)
                | (Starting, Stopping)
                | (Starting, Crashed)
                | (Running, Stopping)
                | (Running, Crashed)
                | (Stopping, Stopped)
                | (Crashed, Starting)
                | (Crashed, Stopped)
                | (Stopped, Starting)
        )
    }

    /// Whether the instance occupies the OS process table
    pub fn is_running(&self) -> bool {
        matches!(self, InstanceState::Starting | InstanceState::Running)
    }

    /// Whether a start command is accepted in this state
    pub fn can_start(&self) -> bool {
        matches!(self, InstanceState::Stopped | InstanceState::Crashed)
    }

    /// Whether a stop command is accepted in this state
    pub fn can_stop(&self) -> bool {
        matches!(self, InstanceState::Starting | InstanceState::Running)
    }
}

impl std::fmt::Display for InstanceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            InstanceState::Starting => "starting",
            InstanceState::Running => "running",
            InstanceState::Stopping => "stopping",
            InstanceState::Crashed => "crashed",
            InstanceState::Stopped => "stopped",
        };
        write!(f, "{}", s)
    }
}
