//! Tests for the atomic file writer.

mod common;

use common::*;
use piforge::connection::CommandResult;
use piforge::{fs, Error};
use pretty_assertions::assert_eq;
use std::sync::Arc;

#[tokio::test]
async fn test_write_file_round_trip() {
    let conn = Arc::new(MockConnection::new("test-host"));
    let ctx = test_context(&conn);

    fs::write_file(&ctx.target, "/etc/example.conf", "hello\n", 0o644)
        .await
        .unwrap();

    assert_eq!(conn.file_string("/etc/example.conf").unwrap(), "hello\n");
    assert_eq!(conn.mode("/etc/example.conf").unwrap(), 0o644);
}

#[tokio::test]
async fn test_write_file_step_order() {
    let conn = Arc::new(MockConnection::new("test-host"));
    let ctx = test_context(&conn);

    fs::write_file(&ctx.target, "/etc/example.conf", "hello\n", 0o600)
        .await
        .unwrap();

    let commands = conn.commands();
    assert_eq!(commands.len(), 4);
    assert_eq!(commands[0].line, "mktemp");
    assert!(!commands[0].escalated);
    assert_eq!(commands[1].line, "cp /tmp/piforge.mock.0 /etc/example.conf");
    assert_eq!(commands[2].line, "chmod 600 /etc/example.conf");
    assert_eq!(commands[3].line, "rm /tmp/piforge.mock.0");
    assert!(commands[1..].iter().all(|c| c.escalated));

    // The staging file is gone after a successful write
    assert!(conn.file("/tmp/piforge.mock.0").is_none());
}

#[tokio::test]
async fn test_write_file_crash_before_move_leaves_target_unchanged() {
    let conn = Arc::new(MockConnection::new("test-host"));
    conn.add_file("/etc/example.conf", "old contents");
    conn.set_fail_uploads(true);
    let ctx = test_context(&conn);

    let result = fs::write_file(&ctx.target, "/etc/example.conf", "new contents", 0o644).await;

    assert!(matches!(result, Err(Error::Connection(_))));
    assert_eq!(conn.file_string("/etc/example.conf").unwrap(), "old contents");
    // Only the mktemp ran; the privileged steps were never issued
    assert_eq!(conn.command_lines(), vec!["mktemp".to_string()]);
}

#[tokio::test]
async fn test_write_file_failed_move_leaves_target_unchanged() {
    let conn = Arc::new(MockConnection::new("test-host"));
    conn.add_file("/etc/example.conf", "old contents");
    conn.set_result("cp ", CommandResult::failure(1, String::new(), "permission denied".into()));
    let ctx = test_context(&conn);

    let result = fs::write_file(&ctx.target, "/etc/example.conf", "new contents", 0o644).await;

    match result {
        Err(Error::RemoteCommand { command, exit_code, .. }) => {
            assert!(command.starts_with("cp "));
            assert_eq!(exit_code, 1);
        }
        other => panic!("expected RemoteCommand error, got {:?}", other),
    }
    assert_eq!(conn.file_string("/etc/example.conf").unwrap(), "old contents");
    assert_eq!(conn.mode("/etc/example.conf"), None);
    // Failure-path cleanup is best-effort: the staging file stays behind
    assert!(conn.file("/tmp/piforge.mock.0").is_some());
}

#[tokio::test]
async fn test_write_file_rejects_empty_mktemp_output() {
    let conn = Arc::new(MockConnection::new("test-host"));
    conn.set_result("mktemp", CommandResult::success(String::new(), String::new()));
    let ctx = test_context(&conn);

    let result = fs::write_file(&ctx.target, "/etc/example.conf", "x", 0o644).await;
    assert!(matches!(result, Err(Error::RemoteCommand { .. })));
    assert!(conn.file("/etc/example.conf").is_none());
}

#[tokio::test]
async fn test_append_line_creates_and_deduplicates() {
    let conn = Arc::new(MockConnection::new("test-host"));
    let ctx = test_context(&conn);

    assert!(fs::append_line(&ctx.target, ".bashrc", "export FOO=1")
        .await
        .unwrap());
    assert!(!fs::append_line(&ctx.target, ".bashrc", "export FOO=1")
        .await
        .unwrap());
    assert!(fs::append_line(&ctx.target, ".bashrc", "export BAR=2")
        .await
        .unwrap());

    assert_eq!(
        conn.file_string(".bashrc").unwrap(),
        "export FOO=1\nexport BAR=2\n"
    );
}

#[tokio::test]
async fn test_append_line_preserves_existing_content() {
    let conn = Arc::new(MockConnection::new("test-host"));
    conn.add_file(".bashrc", "# existing rc");
    let ctx = test_context(&conn);

    fs::append_line(&ctx.target, ".bashrc", "export FOO=1")
        .await
        .unwrap();

    assert_eq!(
        conn.file_string(".bashrc").unwrap(),
        "# existing rc\nexport FOO=1\n"
    );
}
