use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::warn;

use crate::domain::constants::{DEFAULT_ENV_MODE, DEFAULT_KILL_TIMEOUT_MS};
use crate::domain::entities::ProcessSpec;
use crate::domain::error::{DomainError, Result};
use crate::domain::value_objects::{ExecMode, LogConfig, RestartPolicy};
use crate::infrastructure::config::{AppConfig, DurationValue, MemoryValue};

/// Translates ecosystem entries into validated `ProcessSpec` values
pub struct ConfigParsingService;

impl ConfigParsingService {
    /// Parse one application entry under the selected environment mode
    pub fn parse(app: &AppConfig, mode: &str) -> Result<ProcessSpec> {
        if app.script.trim().is_empty() {
            return Err(DomainError::MissingScript(app.name.clone()));
        }

        let cwd = Self::parse_cwd(app)?;
        Self::check_script(app, cwd.as_deref())?;

        let env = Self::resolve_env(app, mode)?;
        let restart_policy = Self::parse_restart_policy(app)?;
        let log = Self::parse_log_config(app, cwd.as_deref());
        let exec_mode = Self::parse_exec_mode(app);

        let mut builder = ProcessSpec::builder(&app.name, &app.script)
            .exec_mode(exec_mode)
            .watch(app.watch.unwrap_or(false))
            .restart_policy(restart_policy)
            .env(env)
            .log(log)
            .kill_timeout(Duration::from_millis(
                app.kill_timeout.unwrap_or(DEFAULT_KILL_TIMEOUT_MS),
            ));

        if let Some(interpreter) = &app.interpreter {
            builder = builder.interpreter(interpreter);
        }
        if let Some(args) = &app.args {
            builder = builder.args(args.clone());
        }
        if let Some(cwd) = cwd {
            builder = builder.cwd(cwd);
        }
        if let Some(instances) = app.instances {
            builder = builder.instances(instances);
        }

        builder.build()
    }

    fn parse_cwd(app: &AppConfig) -> Result<Option<PathBuf>> {
        match &app.cwd {
            Some(cwd) => {
                let path = PathBuf::from(cwd);
                if !path.is_dir() {
                    return Err(DomainError::WorkingDirNotFound(cwd.clone()));
                }
                Ok(Some(path))
            }
            None => Ok(None),
        }
    }

    /// Verify the entry point is resolvable. Bare program names without an
    /// interpreter are left to PATH lookup at spawn time.
    fn check_script(app: &AppConfig, cwd: Option<&Path>) -> Result<()> {
        let script = Path::new(&app.script);
        let is_pathlike = app.script.contains('/') || app.interpreter.is_some();
        if !is_pathlike {
            return Ok(());
        }

        let resolved = if script.is_absolute() {
            script.to_path_buf()
        } else if let Some(cwd) = cwd {
            cwd.join(script)
        } else {
            // Relative script with no cwd resolves against the supervisor's
            // own working directory at spawn time
            return Ok(());
        };

        if !resolved.exists() {
            return Err(DomainError::ScriptNotFound(resolved.display().to_string()));
        }
        Ok(())
    }

    /// Resolve the environment for a mode: the base `env` table overlaid by
    /// `env_<mode>` when one is present. The default mode needs no overlay;
    /// any other mode without a matching table is an error.
    fn resolve_env(app: &AppConfig, mode: &str) -> Result<HashMap<String, String>> {
        let mut env: HashMap<String, String> = app
            .env
            .iter()
            .map(|(k, v)| (k.clone(), v.render()))
            .collect();

        match app.env_overlay(mode) {
            Some(overlay) => {
                for (k, v) in overlay? {
                    env.insert(k, v.render());
                }
            }
            None => {
                if mode != DEFAULT_ENV_MODE {
                    return Err(DomainError::UnknownEnvMode(format!(
                        "{} (process '{}' defines: {})",
                        mode,
                        app.name,
                        Self::known_modes(app)
                    )));
                }
            }
        }

        Ok(env)
    }

    fn known_modes(app: &AppConfig) -> String {
        let mut modes = vec![DEFAULT_ENV_MODE.to_string()];
        modes.extend(app.env_modes());
        modes.join(", ")
    }

    fn parse_restart_policy(app: &AppConfig) -> Result<RestartPolicy> {
        let mut policy = RestartPolicy::default();

        if let Some(autorestart) = app.autorestart {
            policy.autorestart = autorestart;
        }
        if let Some(max_restarts) = app.max_restarts {
            policy.max_restarts = max_restarts;
        }
        if let Some(min_uptime) = &app.min_uptime {
            policy.min_uptime = match min_uptime {
                DurationValue::Millis(ms) => Duration::from_millis(*ms),
                DurationValue::Text(s) => RestartPolicy::parse_duration(s).map_err(|e| {
                    DomainError::InvalidConfiguration(format!(
                        "min_uptime for '{}': {}",
                        app.name, e
                    ))
                })?,
            };
        }
        if let Some(max_memory) = &app.max_memory_restart {
            policy.max_memory_restart = Some(match max_memory {
                MemoryValue::Bytes(bytes) => *bytes,
                MemoryValue::Text(s) => RestartPolicy::parse_memory(s).map_err(|e| {
                    DomainError::InvalidConfiguration(format!(
                        "max_memory_restart for '{}': {}",
                        app.name, e
                    ))
                })?,
            });
        }

        Ok(policy)
    }

    fn parse_log_config(app: &AppConfig, cwd: Option<&Path>) -> LogConfig {
        let resolve = |p: &String| -> PathBuf {
            let path = PathBuf::from(p);
            if path.is_relative() {
                if let Some(cwd) = cwd {
                    return cwd.join(path);
                }
            }
            path
        };

        let mut log = LogConfig {
            out_file: app.out_file.as_ref().map(resolve),
            error_file: app.error_file.as_ref().map(resolve),
            combined_file: app.log_file.as_ref().map(resolve),
            timestamps: app.time.unwrap_or(false),
            merge_logs: app.merge_logs.unwrap_or(false),
            ..Default::default()
        };
        if let Some(format) = &app.log_date_format {
            log.date_format = format.clone();
        }
        log
    }

    fn parse_exec_mode(app: &AppConfig) -> ExecMode {
        match &app.exec_mode {
            Some(s) => ExecMode::parse(s).unwrap_or_else(|| {
                warn!(
                    process = %app.name,
                    exec_mode = %s,
                    "unknown exec_mode, defaulting to fork"
                );
                ExecMode::Fork
            }),
            None => ExecMode::Fork,
        }
    }
}
