use std::collections::HashMap;
use std::path::PathBuf;

use chrono::Local;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::constants::logging::{DROP_WARN_EVERY, LOG_CHANNEL_CAPACITY};
use crate::domain::entities::ProcessInstance;
use crate::domain::ports::OutputStream;

/// Routes instance stdout/stderr to configured append-mode files
///
/// One reader task per stream, one writer task per destination file. Streams
/// sharing a destination (combined mode) share its writer, so lines interleave
/// in arrival order. Readers never block on slow destinations: lines are
/// forwarded through a bounded channel and dropped with a warning when the
/// buffer is full or the destination is unwritable.
pub struct LogRoutingService;

impl LogRoutingService {
    pub fn new() -> Self {
        Self
    }

    /// Attach a freshly spawned instance's output streams
    ///
    /// Cluster instances write to per-index files unless `merge_logs`
    /// requests shared ones.
    pub fn attach(
        &self,
        instance: &ProcessInstance,
        stdout: Option<OutputStream>,
        stderr: Option<OutputStream>,
    ) {
        let spec = instance.spec();
        let log = spec
            .log()
            .for_instance(instance.instance_index(), spec.instances());
        if !log.has_destinations() {
            // Nothing configured: drain the pipes so the child never blocks
            // on a full pipe buffer
            if let Some(stream) = stdout {
                Self::spawn_drain(stream);
            }
            if let Some(stream) = stderr {
                Self::spawn_drain(stream);
            }
            return;
        }

        let label = instance.label();
        let timestamps = log.timestamps;
        let format = log.chrono_format();

        let mut writers: HashMap<PathBuf, mpsc::Sender<String>> = HashMap::new();
        let mut senders_for = |paths: Vec<PathBuf>| -> Vec<mpsc::Sender<String>> {
            paths
                .into_iter()
                .map(|path| {
                    writers
                        .entry(path.clone())
                        .or_insert_with(|| Self::spawn_writer(path))
                        .clone()
                })
                .collect()
        };

        let out_senders = senders_for(log.stdout_destinations());
        let err_senders = senders_for(log.stderr_destinations());

        if let Some(stream) = stdout {
            Self::spawn_reader(label.clone(), "stdout", stream, out_senders, timestamps, format.clone());
        }
        if let Some(stream) = stderr {
            Self::spawn_reader(label, "stderr", stream, err_senders, timestamps, format);
        }
    }

    fn spawn_drain(stream: OutputStream) {
        tokio::spawn(async move {
            let mut lines = BufReader::new(stream).lines();
            while let Ok(Some(_)) = lines.next_line().await {}
        });
    }

    /// Reader task: line-split one stream, render the prefix, fan out
    fn spawn_reader(
        label: String,
        stream_name: &'static str,
        stream: OutputStream,
        senders: Vec<mpsc::Sender<String>>,
        timestamps: bool,
        format: String,
    ) {
        tokio::spawn(async move {
            let mut lines = BufReader::new(stream).lines();
            let mut dropped: u64 = 0;

            loop {
                let line = match lines.next_line().await {
                    Ok(Some(line)) => line,
                    Ok(None) => break,
                    Err(e) => {
                        debug!(instance = %label, stream = stream_name, error = %e, "log stream read ended");
                        break;
                    }
                };

                let rendered = if timestamps {
                    format!("{} {}\n", Local::now().format(&format), line)
                } else {
                    format!("{}\n", line)
                };

                for sender in &senders {
                    if sender.try_send(rendered.clone()).is_err() {
                        dropped += 1;
                        if dropped == 1 || dropped % DROP_WARN_EVERY == 0 {
                            warn!(
                                instance = %label,
                                stream = stream_name,
                                dropped = dropped,
                                "log destination cannot keep up, dropping lines"
                            );
                        }
                    }
                }
            }
        });
    }

    /// Writer task: open the destination lazily in append mode, creating
    /// parent directories; on write failure drop lines, warn, and retry the
    /// open on subsequent lines so a recovered destination resumes
    fn spawn_writer(path: PathBuf) -> mpsc::Sender<String> {
        let (tx, mut rx) = mpsc::channel::<String>(LOG_CHANNEL_CAPACITY);

        tokio::spawn(async move {
            let mut file: Option<tokio::fs::File> = None;
            let mut failures: u64 = 0;

            while let Some(line) = rx.recv().await {
                if file.is_none() {
                    match Self::open_append(&path).await {
                        Ok(f) => {
                            file = Some(f);
                            failures = 0;
                        }
                        Err(e) => {
                            failures += 1;
                            if failures == 1 || failures % DROP_WARN_EVERY == 0 {
                                warn!(path = %path.display(), error = %e, "cannot open log file, dropping line");
                            }
                            continue;
                        }
                    }
                }

                if let Some(f) = file.as_mut() {
                    if let Err(e) = f.write_all(line.as_bytes()).await {
                        warn!(path = %path.display(), error = %e, "log write failed, dropping line");
                        file = None;
                    }
                }
            }
        });

        tx
    }

    async fn open_append(path: &PathBuf) -> std::io::Result<tokio::fs::File> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await
    }
}

impl Default for LogRoutingService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::domain::entities::ProcessSpec;
    use crate::domain::value_objects::LogConfig;

    fn instance_with_log(log: LogConfig) -> ProcessInstance {
        let spec = Arc::new(
            ProcessSpec::builder("logger", "/bin/true")
                .log(log)
                .build()
                .unwrap(),
        );
        let mut instance = ProcessInstance::new(spec, 0);
        instance.mark_starting().unwrap();
        instance.mark_running(1).unwrap();
        instance
    }

    fn stream_of(content: &str) -> OutputStream {
        Box::new(std::io::Cursor::new(content.as_bytes().to_vec()))
    }

    async fn wait_for_content(path: &std::path::Path, needle: &str) -> String {
        for _ in 0..100 {
            if let Ok(content) = tokio::fs::read_to_string(path).await {
                if content.contains(needle) {
                    return content;
                }
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("log file never contained {:?}", needle);
    }

    #[tokio::test]
    async fn test_separate_files() {
        let dir = tempfile::tempdir().unwrap();
        let out_path = dir.path().join("out.log");
        let err_path = dir.path().join("err.log");

        let instance = instance_with_log(LogConfig {
            out_file: Some(out_path.clone()),
            error_file: Some(err_path.clone()),
            ..Default::default()
        });

        let router = LogRoutingService::new();
        router.attach(
            &instance,
            Some(stream_of("out line 1\nout line 2\n")),
            Some(stream_of("err line 1\n")),
        );

        let out = wait_for_content(&out_path, "out line 2").await;
        assert_eq!(out, "out line 1\nout line 2\n");
        let err = wait_for_content(&err_path, "err line 1").await;
        assert_eq!(err, "err line 1\n");
    }

    #[tokio::test]
    async fn test_combined_file_receives_both_streams() {
        let dir = tempfile::tempdir().unwrap();
        let combined = dir.path().join("app.log");

        let instance = instance_with_log(LogConfig {
            combined_file: Some(combined.clone()),
            merge_logs: true,
            ..Default::default()
        });

        let router = LogRoutingService::new();
        router.attach(
            &instance,
            Some(stream_of("from stdout\n")),
            Some(stream_of("from stderr\n")),
        );

        let content = wait_for_content(&combined, "from stdout").await;
        let content = if content.contains("from stderr") {
            content
        } else {
            wait_for_content(&combined, "from stderr").await
        };
        assert!(content.contains("from stdout\n"));
        assert!(content.contains("from stderr\n"));
    }

    #[tokio::test]
    async fn test_timestamp_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let out_path = dir.path().join("out.log");

        let instance = instance_with_log(LogConfig {
            out_file: Some(out_path.clone()),
            timestamps: true,
            date_format: "YYYY".to_string(),
            ..Default::default()
        });

        let router = LogRoutingService::new();
        router.attach(&instance, Some(stream_of("hello\n")), None);

        let content = wait_for_content(&out_path, "hello").await;
        let year = Local::now().format("%Y").to_string();
        assert_eq!(content, format!("{} hello\n", year));
    }

    #[tokio::test]
    async fn test_parent_directory_created() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("logs").join("deep").join("out.log");

        let instance = instance_with_log(LogConfig {
            out_file: Some(nested.clone()),
            ..Default::default()
        });

        let router = LogRoutingService::new();
        router.attach(&instance, Some(stream_of("created\n")), None);

        let content = wait_for_content(&nested, "created").await;
        assert_eq!(content, "created\n");
    }

    #[tokio::test]
    async fn test_lines_preserve_order() {
        let dir = tempfile::tempdir().unwrap();
        let out_path = dir.path().join("out.log");

        let mut input = String::new();
        for i in 0..50 {
            input.push_str(&format!("line {}\n", i));
        }

        let instance = instance_with_log(LogConfig {
            out_file: Some(out_path.clone()),
            ..Default::default()
        });

        let router = LogRoutingService::new();
        router.attach(&instance, Some(stream_of(&input)), None);

        let content = wait_for_content(&out_path, "line 49").await;
        assert_eq!(content, input);
    }

    #[tokio::test]
    async fn test_cluster_instance_writes_indexed_file() {
        let dir = tempfile::tempdir().unwrap();
        let out_path = dir.path().join("out.log");

        let spec = Arc::new(
            ProcessSpec::builder("pool", "/bin/true")
                .instances(2)
                .log(LogConfig {
                    out_file: Some(out_path.clone()),
                    ..Default::default()
                })
                .build()
                .unwrap(),
        );
        let mut instance = ProcessInstance::new(spec, 1);
        instance.mark_starting().unwrap();
        instance.mark_running(1).unwrap();

        let router = LogRoutingService::new();
        router.attach(&instance, Some(stream_of("indexed\n")), None);

        let content = wait_for_content(&dir.path().join("out-1.log"), "indexed").await;
        assert_eq!(content, "indexed\n");
        assert!(!out_path.exists());
    }
}
