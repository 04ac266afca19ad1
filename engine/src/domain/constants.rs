//! Domain constants for process supervision defaults

/// Environment mode used when none is selected
pub const DEFAULT_ENV_MODE: &str = "production";

/// Default number of instances per spec (fork mode)
pub const DEFAULT_INSTANCES: u32 = 1;

/// Default maximum consecutive restarts before giving up
pub const DEFAULT_MAX_RESTARTS: u32 = 16;

/// Default minimum uptime before the restart counter resets (milliseconds)
pub const DEFAULT_MIN_UPTIME_MS: u64 = 1000;

/// Default grace period between SIGTERM and SIGKILL (milliseconds)
pub const DEFAULT_KILL_TIMEOUT_MS: u64 = 1600;

/// Default timestamp prefix format (moment.js tokens)
pub const DEFAULT_LOG_DATE_FORMAT: &str = "YYYY-MM-DD HH:mm:ss";

/// Exit code considered a clean exit
pub const SUCCESS_EXIT_CODE: i32 = 0;

/// Exit code recorded when a spawn attempt fails outright
pub const SPAWN_FAILURE_EXIT_CODE: i32 = 1;

/// Bytes per kilobyte (for memory ceiling parsing)
pub const BYTES_PER_KB: u64 = 1024;

/// Bytes per megabyte
pub const BYTES_PER_MB: u64 = 1024 * 1024;

/// Bytes per gigabyte
pub const BYTES_PER_GB: u64 = 1024 * 1024 * 1024;
