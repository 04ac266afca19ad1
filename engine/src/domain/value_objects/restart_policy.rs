use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::constants::{
    BYTES_PER_GB, BYTES_PER_KB, BYTES_PER_MB, DEFAULT_MAX_RESTARTS, DEFAULT_MIN_UPTIME_MS,
};

/// Restart policy for a process spec
///
/// The policy decides whether a restart is due; the supervision coordinator
/// acts on the decision and owns the counter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestartPolicy {
    /// Whether spontaneous exits trigger a restart at all
    pub autorestart: bool,
    /// Consecutive restarts tolerated before the instance is given up on
    pub max_restarts: u32,
    /// Continuous uptime after which the restart counter resets
    pub min_uptime: Duration,
    /// Resident set size ceiling triggering a forced restart, in bytes
    pub max_memory_restart: Option<u64>,
}

impl Default for RestartPolicy {
    fn default() -> Self {
        Self {
            autorestart: true,
            max_restarts: DEFAULT_MAX_RESTARTS,
            min_uptime: Duration::from_millis(DEFAULT_MIN_UPTIME_MS),
            max_memory_restart: None,
        }
    }
}

impl RestartPolicy {
    /// Whether another restart is due given the current consecutive count
    pub fn should_restart(&self, restart_count: u32) -> bool {
        self.autorestart && restart_count < self.max_restarts
    }

    /// Parse a duration string: bare number is milliseconds, otherwise a
    /// numeric value with an `ms`/`s`/`m`/`h` suffix (e.g. "10s", "5m")
    pub fn parse_duration(s: &str) -> Result<Duration, String> {
        let s = s.trim();
        if s.is_empty() {
            return Err("empty duration".to_string());
        }

        if let Ok(millis) = s.parse::<u64>() {
            return Ok(Duration::from_millis(millis));
        }

        let split = s
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(|| format!("invalid duration: {}", s))?;
        let (value, unit) = s.split_at(split);
        let value: u64 = value
            .parse()
            .map_err(|_| format!("invalid duration: {}", s))?;

        match unit.trim() {
            "ms" => Ok(Duration::from_millis(value)),
            "s" => Ok(Duration::from_secs(value)),
            "m" => Ok(Duration::from_secs(value * 60)),
            "h" => Ok(Duration::from_secs(value * 3600)),
            other => Err(format!("unknown duration unit: {}", other)),
        }
    }

    /// Parse a memory size string: bare number is bytes, otherwise a numeric
    /// value with a `K`/`M`/`G` suffix (e.g. "512M", "1G")
    pub fn parse_memory(s: &str) -> Result<u64, String> {
        let s = s.trim();
        if s.is_empty() {
            return Err("empty memory size".to_string());
        }

        if let Ok(bytes) = s.parse::<u64>() {
            return Ok(bytes);
        }

        let split = s
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(|| format!("invalid memory size: {}", s))?;
        let (value, unit) = s.split_at(split);
        let value: u64 = value
            .parse()
            .map_err(|_| format!("invalid memory size: {}", s))?;

        match unit.trim().to_uppercase().as_str() {
            "K" | "KB" => Ok(value * BYTES_PER_KB),
            "M" | "MB" => Ok(value * BYTES_PER_MB),
            "G" | "GB" => Ok(value * BYTES_PER_GB),
            other => Err(format!("unknown memory unit: {}", other)),
        }
    }
}
