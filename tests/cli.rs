//! Integration tests for top-level CLI behavior.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;

fn chatrelay() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_chatrelay"));
    cmd.env_remove("DISCORD_BOT_TOKEN")
        .env_remove("GROQ_API_KEY")
        .env_remove("CHATRELAY_PERSONA")
        .env_remove("CHATRELAY_RECORD")
        .env("RUST_LOG", "warn");
    cmd
}

fn with_secrets(mut cmd: Command) -> Command {
    cmd.env("DISCORD_BOT_TOKEN", "test-token").env("GROQ_API_KEY", "test-key");
    cmd
}

fn write_cassette(dir: &Path, name: &str, output_yaml: &str) -> PathBuf {
    std::fs::create_dir_all(dir).unwrap();
    let path = dir.join(format!("{name}.cassette.yaml"));
    let yaml = format!(
        "name: {name}\nrecorded_at: 2025-03-15T14:30:00Z\ninteractions:\n  - seq: 0\n    port: completion\n    method: complete\n    input: {{}}\n    output:\n      {output_yaml}\n"
    );
    std::fs::write(&path, yaml).unwrap();
    path
}

#[test]
fn missing_discord_token_fails_fast() {
    let output = chatrelay().env("GROQ_API_KEY", "k").args(["ask", "hi"]).output().unwrap();
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!output.status.success());
    assert!(stderr.contains("DISCORD_BOT_TOKEN environment variable is required"));
}

#[test]
fn missing_api_key_fails_fast_for_run() {
    let output = chatrelay().env("DISCORD_BOT_TOKEN", "t").arg("run").output().unwrap();
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!output.status.success());
    assert!(stderr.contains("GROQ_API_KEY environment variable is required"));
}

#[test]
fn ask_replays_and_bounds_reply() {
    let dir = std::env::temp_dir().join("chatrelay_cli_replay_ok");
    let long = "Rust is a systems language. ".repeat(20);
    let cassette = write_cassette(&dir, "ok", &format!("Ok: \"{long}\""));

    let output = with_secrets(chatrelay())
        .args(["ask", "what is rust?", "--replay"])
        .arg(&cassette)
        .output()
        .unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    let reply = stdout.trim_end_matches('\n');

    assert!(output.status.success());
    assert!(reply.chars().count() <= 250);
    assert!(reply.starts_with("Rust is a systems language."));
    assert!(reply.ends_with('.'));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn ask_prints_fallback_on_recorded_failure() {
    let dir = std::env::temp_dir().join("chatrelay_cli_replay_err");
    let cassette = write_cassette(&dir, "err", "Err: \"request failed: timeout\"");

    let output = with_secrets(chatrelay())
        .args(["ask", "hello", "--replay"])
        .arg(&cassette)
        .output()
        .unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert!(stdout.contains("is currently unavailable, try using me later.. Error details:"));
    assert!(stdout.contains("timeout"));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn ask_with_missing_cassette_fails() {
    let output = with_secrets(chatrelay())
        .args(["ask", "hello", "--replay", "/nonexistent/x.cassette.yaml"])
        .output()
        .unwrap();
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!output.status.success());
    assert!(stderr.contains("Failed to read cassette file"));
}

#[test]
fn help_lists_subcommands() {
    let output = chatrelay().arg("--help").output().unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.contains("run"));
    assert!(stdout.contains("ask"));
}

#[test]
fn invalid_subcommand_exits_with_error() {
    let output = chatrelay().arg("nonsense").output().unwrap();
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!output.status.success());
    assert!(stderr.contains("unrecognized subcommand"));
}

#[tokio::test]
async fn rejected_bot_token_exits_with_failure() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let connections = Arc::new(AtomicUsize::new(0));

    let seen = Arc::clone(&connections);
    tokio::spawn(async move {
        loop {
            let (tcp, _) = listener.accept().await.unwrap();
            seen.fetch_add(1, Ordering::SeqCst);
            let mut ws = tokio_tungstenite::accept_async(tcp).await.unwrap();
            let hello = serde_json::json!({"op": 10, "d": {"heartbeat_interval": 45_000}});
            ws.send(Message::Text(hello.to_string())).await.unwrap();
            let _identify = ws.next().await;
            ws.close(Some(CloseFrame {
                code: CloseCode::from(4004),
                reason: "Authentication failed.".into(),
            }))
            .await
            .unwrap();
            while ws.next().await.is_some() {}
        }
    });

    let mut cmd = with_secrets(chatrelay());
    cmd.env("DISCORD_GATEWAY_URL", format!("ws://{addr}")).arg("run");
    let output = tokio::time::timeout(
        Duration::from_secs(20),
        tokio::task::spawn_blocking(move || cmd.output().unwrap()),
    )
    .await
    .expect("bot should exit after the gateway rejects its token")
    .unwrap();
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr.contains("close code 4004"), "{stderr}");
    assert_eq!(connections.load(Ordering::SeqCst), 1);
}
