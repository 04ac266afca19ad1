use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Load an ecosystem file and start its applications
#[derive(Debug, Clone)]
pub struct LoadConfigCommand {
    pub path: PathBuf,
    /// Environment mode selecting the `env_<mode>` overlay; defaults to
    /// "production" (the bare `env` table)
    pub env_mode: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfigResponse {
    /// Labels of instances that were spawned
    pub started: Vec<String>,
    /// Entries that could not be loaded or spawned, with the reason
    pub failed: Vec<FailedApp>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailedApp {
    pub name: String,
    pub error: String,
}
