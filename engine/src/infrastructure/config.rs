use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::error::{DomainError, Result};

/// Declarative ecosystem file: a list of application entries
///
/// Field names follow the conventional ecosystem format so existing
/// configuration files load unchanged. Loads from JSON or YAML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EcosystemConfig {
    #[serde(default)]
    pub apps: Vec<AppConfig>,
}

/// One application entry of the ecosystem file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub name: String,
    #[serde(default)]
    pub script: String,
    #[serde(default)]
    pub interpreter: Option<String>,
    #[serde(default)]
    pub args: Option<Vec<String>>,
    #[serde(default)]
    pub cwd: Option<String>,
    #[serde(default)]
    pub instances: Option<u32>,
    #[serde(default)]
    pub exec_mode: Option<String>,
    #[serde(default)]
    pub watch: Option<bool>,
    #[serde(default)]
    pub autorestart: Option<bool>,
    #[serde(default)]
    pub max_restarts: Option<u32>,
    #[serde(default)]
    pub min_uptime: Option<DurationValue>,
    #[serde(default)]
    pub max_memory_restart: Option<MemoryValue>,
    /// Base environment, applied in the default mode and under every overlay
    #[serde(default)]
    pub env: HashMap<String, EnvValue>,
    #[serde(default)]
    pub out_file: Option<String>,
    #[serde(default)]
    pub error_file: Option<String>,
    #[serde(default)]
    pub log_file: Option<String>,
    /// Prefix log lines with a timestamp
    #[serde(default)]
    pub time: Option<bool>,
    #[serde(default)]
    pub merge_logs: Option<bool>,
    #[serde(default)]
    pub log_date_format: Option<String>,
    /// Grace period between SIGTERM and SIGKILL, milliseconds
    #[serde(default)]
    pub kill_timeout: Option<u64>,
    /// Mode-specific tables (`env_development`, `env_staging`, ...) and any
    /// unrecognized keys land here
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// Duration that configuration files write either as bare milliseconds or as
/// a suffixed string like "10s"
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DurationValue {
    Millis(u64),
    Text(String),
}

/// Memory size as bare bytes or a suffixed string like "512M"
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MemoryValue {
    Bytes(u64),
    Text(String),
}

/// Environment values may be written as strings, numbers or booleans; all are
/// passed to the child as strings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EnvValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
}

impl EnvValue {
    pub fn render(&self) -> String {
        match self {
            EnvValue::Text(s) => s.clone(),
            EnvValue::Integer(n) => n.to_string(),
            EnvValue::Float(n) => n.to_string(),
            EnvValue::Bool(b) => b.to_string(),
        }
    }
}

impl AppConfig {
    /// Look up a mode-specific environment table captured by the flatten map
    pub fn env_overlay(&self, mode: &str) -> Option<Result<HashMap<String, EnvValue>>> {
        let key = format!("env_{}", mode);
        let value = self.extra.get(&key)?;
        Some(
            serde_json::from_value(value.clone()).map_err(|e| {
                DomainError::InvalidConfiguration(format!("bad {} table: {}", key, e))
            }),
        )
    }

    /// Names of all mode-specific environment tables present on this entry
    pub fn env_modes(&self) -> Vec<String> {
        self.extra
            .keys()
            .filter_map(|k| k.strip_prefix("env_"))
            .map(str::to_string)
            .collect()
    }
}

impl EcosystemConfig {
    /// Load from a JSON or YAML file, chosen by extension
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            DomainError::InvalidConfiguration(format!(
                "cannot read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        let is_yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml") | Some("yml")
        );

        if is_yaml {
            serde_yaml::from_str(&contents).map_err(|e| {
                DomainError::InvalidConfiguration(format!(
                    "invalid YAML in {}: {}",
                    path.display(),
                    e
                ))
            })
        } else {
            serde_json::from_str(&contents).map_err(|e| {
                DomainError::InvalidConfiguration(format!(
                    "invalid JSON in {}: {}",
                    path.display(),
                    e
                ))
            })
        }
    }
}
