use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::constants::DEFAULT_LOG_DATE_FORMAT;

/// Log routing configuration for a process spec
///
/// Streams can go to separate files, a combined file, or both. The combined
/// file receives stdout and stderr interleaved in arrival order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    pub out_file: Option<PathBuf>,
    pub error_file: Option<PathBuf>,
    pub combined_file: Option<PathBuf>,
    /// Prefix each line with a rendered timestamp
    pub timestamps: bool,
    /// Merge cluster instance output into shared files instead of per-index files
    pub merge_logs: bool,
    /// Timestamp format in moment.js tokens, as configuration files write it
    pub date_format: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            out_file: None,
            error_file: None,
            combined_file: None,
            timestamps: false,
            merge_logs: false,
            date_format: DEFAULT_LOG_DATE_FORMAT.to_string(),
        }
    }
}

impl LogConfig {
    /// Resolve the destinations one cluster instance writes to
    ///
    /// With several instances and `merge_logs` off, each instance gets its
    /// own files, the index inserted before the extension
    /// ("out.log" becomes "out-2.log"). A single instance, or
    /// `merge_logs: true`, keeps the configured shared paths.
    pub fn for_instance(&self, instance_index: u32, instances: u32) -> LogConfig {
        if instances <= 1 || self.merge_logs {
            return self.clone();
        }
        LogConfig {
            out_file: self.out_file.as_deref().map(|p| indexed(p, instance_index)),
            error_file: self
                .error_file
                .as_deref()
                .map(|p| indexed(p, instance_index)),
            combined_file: self
                .combined_file
                .as_deref()
                .map(|p| indexed(p, instance_index)),
            ..self.clone()
        }
    }

    /// Destinations receiving stdout lines
    pub fn stdout_destinations(&self) -> Vec<PathBuf> {
        [self.out_file.clone(), self.combined_file.clone()]
            .into_iter()
            .flatten()
            .collect()
    }

    /// Destinations receiving stderr lines
    pub fn stderr_destinations(&self) -> Vec<PathBuf> {
        [self.error_file.clone(), self.combined_file.clone()]
            .into_iter()
            .flatten()
            .collect()
    }

    /// Whether any destination is configured at all
    pub fn has_destinations(&self) -> bool {
        self.out_file.is_some() || self.error_file.is_some() || self.combined_file.is_some()
    }

    /// Translate the moment.js-style date format into a chrono format string
    ///
    /// Unrecognized characters pass through as literals; `%` is escaped so the
    /// result is always a valid chrono format.
    pub fn chrono_format(&self) -> String {
        let mut out = String::with_capacity(self.date_format.len() * 2);
        let chars: Vec<char> = self.date_format.chars().collect();
        let mut i = 0;

        while i < chars.len() {
            let rest: String = chars[i..].iter().collect();
            let (token, len) = if rest.starts_with("YYYY") {
                ("%Y", 4)
            } else if rest.starts_with("YY") {
                ("%y", 2)
            } else if rest.starts_with("MM") {
                ("%m", 2)
            } else if rest.starts_with("DD") {
                ("%d", 2)
            } else if rest.starts_with("HH") {
                ("%H", 2)
            } else if rest.starts_with("mm") {
                ("%M", 2)
            } else if rest.starts_with("SSS") {
                ("%3f", 3)
            } else if rest.starts_with("ss") {
                ("%S", 2)
            } else if rest.starts_with('Z') {
                ("%:z", 1)
            } else if rest.starts_with('%') {
                ("%%", 1)
            } else {
                out.push(chars[i]);
                i += 1;
                continue;
            };
            out.push_str(token);
            i += len;
        }

        out
    }
}

fn indexed(path: &Path, index: u32) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{}-{}.{}", stem, index, ext.to_string_lossy()),
        None => format!("{}-{}", stem, index),
    };
    path.with_file_name(name)
}
