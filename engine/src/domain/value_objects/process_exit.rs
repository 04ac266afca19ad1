use serde::{Deserialize, Serialize};

use crate::domain::constants::{SPAWN_FAILURE_EXIT_CODE, SUCCESS_EXIT_CODE};

/// How a process left the process table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessExit {
    /// Exit code, absent when the process was killed by a signal
    pub code: Option<i32>,
    /// Terminating signal number, if any
    pub signal: Option<i32>,
}

impl ProcessExit {
    pub fn from_code(code: i32) -> Self {
        Self {
            code: Some(code),
            signal: None,
        }
    }

    pub fn from_signal(signal: i32) -> Self {
        Self {
            code: None,
            signal: Some(signal),
        }
    }

    /// Exit recorded when the spawn attempt itself failed
    pub fn spawn_failure() -> Self {
        Self::from_code(SPAWN_FAILURE_EXIT_CODE)
    }

    pub fn is_success(&self) -> bool {
        self.code == Some(SUCCESS_EXIT_CODE)
    }
}

impl std::fmt::Display for ProcessExit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.code, self.signal) {
            (Some(code), _) => write!(f, "exit code {}", code),
            (None, Some(signal)) => write!(f, "signal {}", signal),
            (None, None) => write!(f, "unknown exit"),
        }
    }
}
