//! Application-wide constants and default values
//!
//! Centralizes magic numbers and default configurations for better maintainability

/// HTTP status surface configuration
pub mod http {
    /// Default bind address for the REST status adapter
    pub const DEFAULT_HTTP_ADDR: &str = "127.0.0.1:9615";
}

/// Supervision loop configuration
pub mod supervision {
    /// Interval between memory ceiling checks (milliseconds)
    pub const MEMORY_POLL_INTERVAL_MS: u64 = 1000;

    /// Poll interval while waiting for a stopped process to exit (milliseconds)
    pub const STOP_POLL_INTERVAL_MS: u64 = 50;
}

/// Log routing configuration
pub mod logging {
    /// Capacity of the per-destination line buffer; lines beyond this are
    /// dropped with a warning rather than blocking the supervised process
    pub const LOG_CHANNEL_CAPACITY: usize = 256;

    /// Emit a dropped-lines warning every this many drops
    pub const DROP_WARN_EVERY: u64 = 100;
}
