use std::time::Duration;

use serial_test::serial;

use sup_e2e_tests::{ecosystem, sh_app, write_config, TestSupervisor};
use sup_engine::domain::commands::{
    RestartInstanceCommand, StartInstanceCommand, StopInstanceCommand,
};

#[tokio::test]
#[serial]
async fn stop_suppresses_the_restart_policy() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(
        &dir,
        &ecosystem(&[sh_app("svc", "sleep 30", r#""autorestart": true"#)]),
    );

    let sup = TestSupervisor::start();
    sup.load(config, None).await;
    sup.wait_for_state("svc", "running").await;

    let response = sup
        .app
        .stop_instance()
        .execute(StopInstanceCommand::by_name("svc"))
        .await
        .unwrap();
    assert_eq!(response.stopped, vec!["svc".to_string()]);

    let statuses = sup.wait_for_state("svc", "stopped").await;
    assert!(!statuses[0].failed);
    assert_eq!(statuses[0].restart_count, 0);

    // a stopped instance is not a crash: no restart follows
    tokio::time::sleep(Duration::from_millis(500)).await;
    let statuses = sup.statuses("svc").await;
    assert_eq!(statuses[0].state, "stopped");
    assert_eq!(statuses[0].pid, None);

    sup.shutdown().await;
}

#[tokio::test]
#[serial]
async fn manual_start_revives_a_stopped_instance() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(
        &dir,
        &ecosystem(&[sh_app("svc", "sleep 30", r#""autorestart": false"#)]),
    );

    let sup = TestSupervisor::start();
    sup.load(config, None).await;
    let statuses = sup.wait_for_state("svc", "running").await;
    let first_pid = statuses[0].pid;

    sup.app
        .stop_instance()
        .execute(StopInstanceCommand::by_name("svc"))
        .await
        .unwrap();
    sup.wait_for_state("svc", "stopped").await;

    let response = sup
        .app
        .start_instance()
        .execute(StartInstanceCommand::by_name("svc"))
        .await
        .unwrap();
    assert_eq!(response.started, vec!["svc".to_string()]);

    let statuses = sup.wait_for_state("svc", "running").await;
    assert_ne!(statuses[0].pid, first_pid);

    sup.shutdown().await;
}

#[tokio::test]
#[serial]
async fn restart_resets_the_counter() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(
        &dir,
        &ecosystem(&[sh_app(
            "svc",
            "sleep 30",
            r#""max_restarts": 5, "min_uptime": "30s""#,
        )]),
    );

    let sup = TestSupervisor::start();
    sup.load(config, None).await;
    let statuses = sup.wait_for_state("svc", "running").await;
    let first_pid = statuses[0].pid.unwrap();

    // bump the counter with one real crash
    unsafe {
        libc::kill(first_pid as i32, libc::SIGKILL);
    }
    sup.wait_until("svc", "respawned once", |s| {
        s.len() == 1 && s[0].state == "running" && s[0].restart_count == 1
    })
    .await;

    let response = sup
        .app
        .restart_instance()
        .execute(RestartInstanceCommand::by_name("svc"))
        .await
        .unwrap();
    assert_eq!(response.restarted, vec!["svc".to_string()]);

    let statuses = sup
        .wait_until("svc", "running after manual restart", |s| {
            s.len() == 1 && s[0].state == "running"
        })
        .await;
    assert_eq!(statuses[0].restart_count, 0);
    assert_ne!(statuses[0].pid, Some(first_pid));

    sup.shutdown().await;
}

#[tokio::test]
#[serial]
async fn manual_restart_revives_a_failed_instance() {
    let dir = tempfile::tempdir().unwrap();
    // limit of zero: the very first crash exhausts the policy
    let config = write_config(
        &dir,
        &ecosystem(&[sh_app(
            "fragile",
            "exit 1",
            r#""autorestart": true, "max_restarts": 0, "min_uptime": "30s""#,
        )]),
    );

    let sup = TestSupervisor::start();
    sup.load(config, None).await;
    sup.wait_until("fragile", "failed", |s| s.len() == 1 && s[0].failed)
        .await;

    let response = sup
        .app
        .restart_instance()
        .execute(RestartInstanceCommand::by_name("fragile"))
        .await
        .unwrap();
    assert_eq!(response.restarted, vec!["fragile".to_string()]);

    // the revived process crashes and fails again, proving it really ran
    let statuses = sup
        .wait_until("fragile", "failed again after revival", |s| {
            s.len() == 1 && s[0].failed
        })
        .await;
    assert_eq!(statuses[0].restart_count, 0);

    sup.shutdown().await;
}

#[tokio::test]
#[serial]
async fn stop_applies_to_every_cluster_instance() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(
        &dir,
        &ecosystem(&[r#"{
            "name": "pool",
            "script": "/bin/sh",
            "args": ["-c", "sleep 30"],
            "instances": 2,
            "exec_mode": "cluster"
        }"#
        .to_string()]),
    );

    let sup = TestSupervisor::start();
    sup.load(config, None).await;
    sup.wait_for_state("pool", "running").await;

    let response = sup
        .app
        .stop_instance()
        .execute(StopInstanceCommand::by_name("pool"))
        .await
        .unwrap();
    assert_eq!(response.stopped.len(), 2);

    let statuses = sup.wait_for_state("pool", "stopped").await;
    assert_eq!(statuses.len(), 2);

    sup.shutdown().await;
}
