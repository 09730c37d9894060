//! Supervisor tests against real short-lived processes.

#![cfg(unix)]

use std::collections::BTreeMap;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use toolgate_core::LaunchSpec;
use toolgate_runtime::{
    ProcessControl, ProcessGuard, SpawnError, TeardownOutcome, TeardownPolicy, WaitOutcome,
    spawn, teardown,
};

fn spec(command: &str, args: &[&str]) -> LaunchSpec {
    LaunchSpec {
        command: command.to_string(),
        args: args.iter().map(|a| (*a).to_string()).collect(),
        env: BTreeMap::new(),
    }
}

fn short_grace() -> TeardownPolicy {
    TeardownPolicy {
        grace_period: Duration::from_millis(300),
    }
}

#[tokio::test]
async fn stdio_channels_carry_lines_in_order() {
    let (process, stdio) = spawn(&spec("cat", &[])).unwrap();
    let guard = ProcessGuard::new(process, short_grace());

    let mut stdin = stdio.stdin;
    let mut lines = BufReader::new(stdio.stdout).lines();

    stdin.write_all(b"first\nsecond\n").await.unwrap();
    stdin.flush().await.unwrap();

    assert_eq!(lines.next_line().await.unwrap().as_deref(), Some("first"));
    assert_eq!(lines.next_line().await.unwrap().as_deref(), Some("second"));

    drop(stdin);
    assert_eq!(lines.next_line().await.unwrap(), None);

    // cat exits on stdin EOF
    let outcome = guard.teardown().await;
    assert!(matches!(
        outcome,
        TeardownOutcome::AlreadyExited | TeardownOutcome::Graceful
    ));
}

#[tokio::test]
async fn env_reaches_the_process() {
    let mut launch = spec("sh", &["-c", "echo \"$TOOLGATE_PROBE\""]);
    launch
        .env
        .insert("TOOLGATE_PROBE".to_string(), "visible".to_string());

    let (_process, stdio) = spawn(&launch).unwrap();
    let mut lines = BufReader::new(stdio.stdout).lines();

    assert_eq!(lines.next_line().await.unwrap().as_deref(), Some("visible"));
}

#[tokio::test]
async fn missing_binary_is_a_spawn_error() {
    let err = spawn(&spec("/nonexistent/toolgate-connector", &[])).unwrap_err();
    assert!(matches!(err, SpawnError::Io { ref command, .. } if command == "/nonexistent/toolgate-connector"));
}

#[tokio::test]
async fn sleeping_process_stops_on_sigterm() {
    let (mut process, _stdio) = spawn(&spec("sleep", &["30"])).unwrap();
    assert!(process.is_running());

    let outcome = teardown(Some(&mut process), &TeardownPolicy::default()).await;

    assert!(matches!(outcome, TeardownOutcome::Graceful));
    assert!(!process.is_running());
}

#[tokio::test]
async fn process_ignoring_sigterm_is_killed() {
    let (mut process, _stdio) =
        spawn(&spec("sh", &["-c", "trap '' TERM; exec sleep 30"])).unwrap();
    // Let the shell install its trap before signalling.
    tokio::time::sleep(Duration::from_millis(200)).await;

    let outcome = teardown(Some(&mut process), &short_grace()).await;

    assert!(matches!(outcome, TeardownOutcome::Killed));
    assert_eq!(
        process.wait(Duration::from_secs(5)).await.unwrap(),
        WaitOutcome::Exited
    );
}

#[tokio::test]
async fn exited_process_needs_no_teardown() {
    let (mut process, _stdio) = spawn(&spec("true", &[])).unwrap();
    assert_eq!(
        process.wait(Duration::from_secs(5)).await.unwrap(),
        WaitOutcome::Exited
    );

    let outcome = teardown(Some(&mut process), &short_grace()).await;

    assert!(matches!(outcome, TeardownOutcome::AlreadyExited));
}
