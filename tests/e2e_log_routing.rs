use std::path::Path;
use std::time::{Duration, Instant};

use serial_test::serial;

use sup_e2e_tests::{ecosystem, write_config, TestSupervisor, WAIT_TIMEOUT};

/// Writer tasks flush asynchronously after the process exits; poll the file
async fn wait_for_file_containing(path: &Path, needle: &str) -> String {
    let deadline = Instant::now() + WAIT_TIMEOUT;
    loop {
        if let Ok(content) = std::fs::read_to_string(path) {
            if content.contains(needle) {
                return content;
            }
        }
        if Instant::now() > deadline {
            panic!("{} never contained {:?}", path.display(), needle);
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}

#[tokio::test]
#[serial]
async fn separate_files_with_timestamp_prefix() {
    let dir = tempfile::tempdir().unwrap();
    let out_path = dir.path().join("logs").join("out.log");
    let err_path = dir.path().join("logs").join("err.log");

    let config = write_config(
        &dir,
        &ecosystem(&[format!(
            r#"{{
                "name": "talker",
                "script": "/bin/sh",
                "args": ["-c", "echo out1; echo err1 1>&2; echo out2"],
                "autorestart": false,
                "time": true,
                "log_date_format": "YYYY",
                "out_file": "{}",
                "error_file": "{}"
            }}"#,
            out_path.display(),
            err_path.display()
        )]),
    );

    let sup = TestSupervisor::start();
    sup.load(config, None).await;
    sup.wait_for_state("talker", "stopped").await;

    let year = chrono_year();
    let out = wait_for_file_containing(&out_path, "out2").await;
    let out_lines: Vec<&str> = out.lines().collect();
    assert_eq!(out_lines, vec![
        format!("{} out1", year).as_str(),
        format!("{} out2", year).as_str(),
    ]);

    let err = wait_for_file_containing(&err_path, "err1").await;
    assert_eq!(err, format!("{} err1\n", year));

    sup.shutdown().await;
}

#[tokio::test]
#[serial]
async fn merged_file_interleaves_both_streams() {
    let dir = tempfile::tempdir().unwrap();
    let combined = dir.path().join("app.log");

    let config = write_config(
        &dir,
        &ecosystem(&[format!(
            r#"{{
                "name": "merged",
                "script": "/bin/sh",
                "args": ["-c", "echo from-stdout; echo from-stderr 1>&2"],
                "autorestart": false,
                "merge_logs": true,
                "log_file": "{}"
            }}"#,
            combined.display()
        )]),
    );

    let sup = TestSupervisor::start();
    sup.load(config, None).await;
    sup.wait_for_state("merged", "stopped").await;

    let content = wait_for_file_containing(&combined, "from-stdout").await;
    let content = if content.contains("from-stderr") {
        content
    } else {
        wait_for_file_containing(&combined, "from-stderr").await
    };
    assert!(content.contains("from-stdout\n"));
    assert!(content.contains("from-stderr\n"));

    sup.shutdown().await;
}

#[tokio::test]
#[serial]
async fn stdout_lines_appear_in_emission_order() {
    let dir = tempfile::tempdir().unwrap();
    let out_path = dir.path().join("ordered.log");

    let config = write_config(
        &dir,
        &ecosystem(&[format!(
            r#"{{
                "name": "counter",
                "script": "/bin/sh",
                "args": ["-c", "i=1; while [ $i -le 20 ]; do echo line-$i; i=$((i+1)); done"],
                "autorestart": false,
                "out_file": "{}"
            }}"#,
            out_path.display()
        )]),
    );

    let sup = TestSupervisor::start();
    sup.load(config, None).await;
    sup.wait_for_state("counter", "stopped").await;

    let content = wait_for_file_containing(&out_path, "line-20").await;
    let expected: Vec<String> = (1..=20).map(|i| format!("line-{}", i)).collect();
    let actual: Vec<&str> = content.lines().collect();
    assert_eq!(actual, expected);

    sup.shutdown().await;
}

#[tokio::test]
#[serial]
async fn restarted_instance_appends_to_the_same_file() {
    let dir = tempfile::tempdir().unwrap();
    let out_path = dir.path().join("append.log");

    let config = write_config(
        &dir,
        &ecosystem(&[format!(
            r#"{{
                "name": "appender",
                "script": "/bin/sh",
                "args": ["-c", "echo ran"],
                "autorestart": true,
                "max_restarts": 2,
                "min_uptime": "30s",
                "out_file": "{}"
            }}"#,
            out_path.display()
        )]),
    );

    let sup = TestSupervisor::start();
    sup.load(config, None).await;

    // initial run plus 2 restarts before the limit trips
    sup.wait_until("appender", "gave up", |s| s.len() == 1 && s[0].failed)
        .await;

    let content = wait_for_file_containing(&out_path, "ran\nran\nran").await;
    assert_eq!(content, "ran\nran\nran\n");

    sup.shutdown().await;
}

#[tokio::test]
#[serial]
async fn cluster_instances_split_into_indexed_files() {
    let dir = tempfile::tempdir().unwrap();
    let out_path = dir.path().join("pool.log");

    let config = write_config(
        &dir,
        &ecosystem(&[format!(
            r#"{{
                "name": "pool",
                "script": "/bin/sh",
                "args": ["-c", "echo hello"],
                "instances": 2,
                "exec_mode": "cluster",
                "autorestart": false,
                "out_file": "{}"
            }}"#,
            out_path.display()
        )]),
    );

    let sup = TestSupervisor::start();
    sup.load(config, None).await;
    sup.wait_for_state("pool", "stopped").await;

    // merge_logs defaults to off: each instance owns an indexed file
    for index in 0..2 {
        let indexed = dir.path().join(format!("pool-{}.log", index));
        let content = wait_for_file_containing(&indexed, "hello").await;
        assert_eq!(content, "hello\n");
    }
    assert!(!out_path.exists());

    sup.shutdown().await;
}

fn chrono_year() -> String {
    chrono::Local::now().format("%Y").to_string()
}
