use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::constants::{DEFAULT_INSTANCES, DEFAULT_KILL_TIMEOUT_MS};
use crate::domain::error::{DomainError, Result};
use crate::domain::value_objects::{ExecMode, LogConfig, RestartPolicy};

/// Immutable description of a managed application
///
/// Built once from a configuration entry and shared between its instances.
/// Runtime state lives on `ProcessInstance`, never here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessSpec {
    name: String,
    script: String,
    interpreter: Option<String>,
    args: Vec<String>,
    cwd: Option<PathBuf>,
    instances: u32,
    exec_mode: ExecMode,
    watch: bool,
    restart_policy: RestartPolicy,
    env: HashMap<String, String>,
    log: LogConfig,
    kill_timeout: Duration,
}

impl ProcessSpec {
    pub fn builder(name: impl Into<String>, script: impl Into<String>) -> ProcessSpecBuilder {
        ProcessSpecBuilder::new(name, script)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn script(&self) -> &str {
        &self.script
    }

    pub fn interpreter(&self) -> Option<&str> {
        self.interpreter.as_deref()
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn cwd(&self) -> Option<&PathBuf> {
        self.cwd.as_ref()
    }

    pub fn instances(&self) -> u32 {
        self.instances
    }

    pub fn exec_mode(&self) -> ExecMode {
        self.exec_mode
    }

    pub fn watch(&self) -> bool {
        self.watch
    }

    pub fn restart_policy(&self) -> &RestartPolicy {
        &self.restart_policy
    }

    pub fn env(&self) -> &HashMap<String, String> {
        &self.env
    }

    pub fn log(&self) -> &LogConfig {
        &self.log
    }

    pub fn kill_timeout(&self) -> Duration {
        self.kill_timeout
    }
}

/// Fluent builder with validation for `ProcessSpec`
pub struct ProcessSpecBuilder {
    name: String,
    script: String,
    interpreter: Option<String>,
    args: Vec<String>,
    cwd: Option<PathBuf>,
    instances: u32,
    exec_mode: ExecMode,
    watch: bool,
    restart_policy: RestartPolicy,
    env: HashMap<String, String>,
    log: LogConfig,
    kill_timeout: Duration,
}

impl ProcessSpecBuilder {
    pub fn new(name: impl Into<String>, script: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            script: script.into(),
            interpreter: None,
            args: Vec::new(),
            cwd: None,
            instances: DEFAULT_INSTANCES,
            exec_mode: ExecMode::default(),
            watch: false,
            restart_policy: RestartPolicy::default(),
            env: HashMap::new(),
            log: LogConfig::default(),
            kill_timeout: Duration::from_millis(DEFAULT_KILL_TIMEOUT_MS),
        }
    }

    pub fn interpreter(mut self, interpreter: impl Into<String>) -> Self {
        self.interpreter = Some(interpreter.into());
        self
    }

    pub fn args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    pub fn cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    pub fn instances(mut self, instances: u32) -> Self {
        self.instances = instances;
        self
    }

    pub fn exec_mode(mut self, exec_mode: ExecMode) -> Self {
        self.exec_mode = exec_mode;
        self
    }

    pub fn watch(mut self, watch: bool) -> Self {
        self.watch = watch;
        self
    }

    pub fn restart_policy(mut self, restart_policy: RestartPolicy) -> Self {
        self.restart_policy = restart_policy;
        self
    }

    pub fn env(mut self, env: HashMap<String, String>) -> Self {
        self.env = env;
        self
    }

    pub fn log(mut self, log: LogConfig) -> Self {
        self.log = log;
        self
    }

    pub fn kill_timeout(mut self, kill_timeout: Duration) -> Self {
        self.kill_timeout = kill_timeout;
        self
    }

    pub fn build(self) -> Result<ProcessSpec> {
        if self.name.trim().is_empty() {
            return Err(DomainError::InvalidName(
                "process name cannot be empty".to_string(),
            ));
        }
        if self.name.contains(char::is_whitespace) {
            return Err(DomainError::InvalidName(format!(
                "process name cannot contain whitespace: '{}'",
                self.name
            )));
        }
        if self.script.trim().is_empty() {
            return Err(DomainError::MissingScript(self.name));
        }
        if self.instances == 0 {
            return Err(DomainError::InvalidConfiguration(format!(
                "process '{}' must have at least one instance",
                self.name
            )));
        }

        Ok(ProcessSpec {
            name: self.name,
            script: self.script,
            interpreter: self.interpreter,
            args: self.args,
            cwd: self.cwd,
            instances: self.instances,
            exec_mode: self.exec_mode,
            watch: self.watch,
            restart_policy: self.restart_policy,
            env: self.env,
            log: self.log,
            kill_timeout: self.kill_timeout,
        })
    }
}
