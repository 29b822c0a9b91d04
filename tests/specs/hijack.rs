// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Slipway Contributors

//! Hijack scenario: a raw duplex connection is upgraded and bridged to
//! a real process, with the client driving stdin and mirroring the exit.

use tokio::io::{AsyncReadExt, AsyncWriteExt, BufReader};

use slipway_relay::accept;
use slipway_wire::{read_frame, write_frame, HijackProcessSpec, InputFrame, OutputFrame};

async fn open_session(
    spec: &HijackProcessSpec,
) -> (
    BufReader<tokio::io::ReadHalf<tokio::io::DuplexStream>>,
    tokio::io::WriteHalf<tokio::io::DuplexStream>,
    tokio::task::JoinHandle<Result<(), slipway_relay::SessionError>>,
) {
    let (client, server) = tokio::io::duplex(16 * 1024);

    let server_task = tokio::spawn(async move {
        let accepted = accept(server).await?;
        assert_eq!(accepted.handle, "some-handle");
        accepted.serve().await
    });

    let (read_half, mut write_half) = tokio::io::split(client);
    let payload = serde_json::to_string(spec).unwrap();
    let request = format!(
        "POST /api/v1/containers/some-handle/hijack HTTP/1.1\r\nHost: test\r\nContent-Length: {}\r\n\r\n{}",
        payload.len(),
        payload
    );
    write_half.write_all(request.as_bytes()).await.unwrap();

    // Consume the switching-protocols response head.
    let mut reader = BufReader::new(read_half);
    let mut head = [0u8; 1];
    let mut seen = Vec::new();
    while !seen.ends_with(b"\r\n\r\n") {
        reader.read_exact(&mut head).await.unwrap();
        seen.push(head[0]);
    }
    assert!(seen.starts_with(b"HTTP/1.1 101"));

    (reader, write_half, server_task)
}

async fn drain<R: tokio::io::AsyncBufRead + Unpin>(
    reader: &mut R,
) -> (Vec<u8>, Vec<u8>, OutputFrame) {
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    loop {
        match read_frame::<_, OutputFrame>(reader).await.unwrap() {
            Some(OutputFrame::Stdout(bytes)) => stdout.extend(bytes),
            Some(OutputFrame::Stderr(bytes)) => stderr.extend(bytes),
            Some(terminal) => return (stdout, stderr, terminal),
            None => panic!("stream closed without a terminal frame"),
        }
    }
}

fn shell(script: &str) -> HijackProcessSpec {
    HijackProcessSpec {
        user: "root".to_string(),
        dir: String::new(),
        env: Vec::new(),
        path: "/bin/sh".to_string(),
        args: vec!["-c".to_string(), script.to_string()],
    }
}

#[tokio::test]
async fn interactive_process_echoes_and_exits() {
    let (mut reader, mut writer, server) = open_session(&shell("cat; echo done")).await;

    write_frame(&mut writer, &InputFrame::Stdin(b"hello\n".to_vec()))
        .await
        .unwrap();
    // Local EOF half-closes the process's stdin; the session keeps
    // running until the process finishes on its own.
    writer.shutdown().await.unwrap();

    let (stdout, stderr, terminal) = drain(&mut reader).await;
    assert_eq!(String::from_utf8_lossy(&stdout), "hello\ndone\n");
    assert!(stderr.is_empty());
    assert_eq!(terminal, OutputFrame::ExitStatus(0));

    server.await.unwrap().unwrap();
}

#[tokio::test]
async fn remote_exit_status_reaches_the_client() {
    let (mut reader, mut writer, server) = open_session(&shell("exit 4")).await;
    writer.shutdown().await.unwrap();

    let (_, _, terminal) = drain(&mut reader).await;
    assert_eq!(terminal, OutputFrame::ExitStatus(4));
    server.await.unwrap().unwrap();
}

#[tokio::test]
async fn spawn_failure_reports_an_error_frame() {
    let spec = HijackProcessSpec {
        path: "/no/such/binary".to_string(),
        ..HijackProcessSpec::default()
    };
    let (mut reader, mut writer, server) = open_session(&spec).await;
    writer.shutdown().await.unwrap();

    match read_frame::<_, OutputFrame>(&mut reader).await.unwrap() {
        Some(OutputFrame::Error(message)) => {
            assert!(message.contains("/no/such/binary"), "{message}");
        }
        other => panic!("expected error frame, got {other:?}"),
    }
    server.await.unwrap().unwrap();
}
