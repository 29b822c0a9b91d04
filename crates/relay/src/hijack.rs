// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Slipway Contributors

//! Server side of the hijack protocol.
//!
//! A hijack request arrives as a normal HTTP request; on acceptance the
//! handler relinquishes request/response framing and takes the raw
//! connection over for full-duplex frame exchange. This is a deliberate
//! capability boundary: [`accept`] consumes the stream and hands back an
//! [`AcceptedHijack`] that owns it outright.

use std::process::Stdio;

use thiserror::Error;
use tokio::io::{
    AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader, ReadHalf,
    WriteHalf,
};
use tokio::sync::mpsc;

use slipway_wire::{read_frame, write_frame, HijackProcessSpec, InputFrame, OutputFrame, ProtocolError};

/// Hijack session failures on the relay side.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("malformed hijack request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error("transport: {0}")]
    Transport(#[from] std::io::Error),
}

/// An upgraded connection plus the process spec the client sent.
///
/// The original request is gone; the stream now speaks only
/// newline-delimited frames.
#[derive(Debug)]
pub struct AcceptedHijack<S> {
    /// Container handle from the request path.
    pub handle: String,
    pub spec: HijackProcessSpec,
    reader: BufReader<ReadHalf<S>>,
    writer: WriteHalf<S>,
}

/// Accept a hijack request: parse `POST /api/v1/containers/{handle}/hijack`,
/// read the [`HijackProcessSpec`] body, confirm the upgrade, and return
/// the raw duplex stream.
pub async fn accept<S>(stream: S) -> Result<AcceptedHijack<S>, SessionError>
where
    S: AsyncRead + AsyncWrite + Send,
{
    let (read_half, mut write_half) = tokio::io::split(stream);
    let mut reader = BufReader::new(read_half);

    let mut request_line = String::new();
    reader.read_line(&mut request_line).await?;
    let handle = parse_request_line(request_line.trim_end())?;

    let mut content_length = 0usize;
    loop {
        let mut line = String::new();
        let n = reader.read_line(&mut line).await?;
        if n == 0 {
            return Err(SessionError::BadRequest("truncated request".into()));
        }
        if line == "\r\n" || line == "\n" {
            break;
        }
        let lower = line.to_ascii_lowercase();
        if let Some(value) = lower.strip_prefix("content-length:") {
            content_length = value
                .trim()
                .parse()
                .map_err(|_| SessionError::BadRequest("bad content-length".into()))?;
        }
    }

    let mut body = vec![0u8; content_length];
    reader.read_exact(&mut body).await?;
    let spec: HijackProcessSpec = serde_json::from_slice(&body)
        .map_err(|e| SessionError::BadRequest(format!("bad process spec: {}", e)))?;

    // From here on the connection is ours: no further request semantics.
    write_half
        .write_all(b"HTTP/1.1 101 Switching Protocols\r\nConnection: Upgrade\r\n\r\n")
        .await?;
    write_half.flush().await?;

    tracing::debug!(handle = %handle, path = %spec.path, "hijack accepted");

    Ok(AcceptedHijack { handle, spec, reader, writer: write_half })
}

fn parse_request_line(line: &str) -> Result<String, SessionError> {
    let mut parts = line.split_whitespace();
    let method = parts.next().unwrap_or_default();
    let path = parts.next().unwrap_or_default();
    if method != "POST" {
        return Err(SessionError::BadRequest(format!("unexpected method {}", method)));
    }
    let handle = path
        .strip_prefix("/api/v1/containers/")
        .and_then(|rest| rest.strip_suffix("/hijack"))
        .filter(|h| !h.is_empty())
        .ok_or_else(|| SessionError::BadRequest(format!("unexpected path {}", path)))?;
    Ok(handle.to_string())
}

impl<S> AcceptedHijack<S>
where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    /// Spawn the requested process in the container's working directory
    /// and bridge it to the connection until a terminal frame is sent.
    ///
    /// Frame stream EOF from the client half-closes the process's stdin
    /// without tearing the session down; the remote process observes EOF
    /// on its input and exits on its own terms.
    ///
    /// The spec's `user` field is not applied here: this bridge runs the
    /// process directly as the daemon's own user, and switching users is
    /// a container-runtime concern.
    pub async fn serve(mut self) -> Result<(), SessionError> {
        let mut command = tokio::process::Command::new(&self.spec.path);
        command
            .args(&self.spec.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if !self.spec.dir.is_empty() {
            command.current_dir(&self.spec.dir);
        }
        for entry in &self.spec.env {
            if let Some((key, value)) = entry.split_once('=') {
                command.env(key, value);
            }
        }

        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(e) => {
                // The process could not be started: exactly one terminal
                // error frame, then the session is over.
                let frame = OutputFrame::Error(format!("{}: {}", self.spec.path, e));
                write_frame(&mut self.writer, &frame).await?;
                return Ok(());
            }
        };

        let mut stdin = child.stdin.take();
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        // Client input → process stdin, until frame EOF (half-close).
        let mut frame_reader = self.reader;
        tokio::spawn(async move {
            loop {
                match read_frame::<_, InputFrame>(&mut frame_reader).await {
                    Ok(Some(InputFrame::Stdin(bytes))) => {
                        if let Some(handle) = stdin.as_mut() {
                            if handle.write_all(&bytes).await.is_err() {
                                break;
                            }
                        }
                    }
                    Ok(None) => {
                        // EOF: close the process's stdin only.
                        drop(stdin.take());
                        break;
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "hijack input stream broke");
                        break;
                    }
                }
            }
        });

        // Process output → tagged frames. Each stream keeps its own
        // ordering; the merge order across streams is not promised.
        let (tx, mut rx) = mpsc::channel::<OutputFrame>(16);
        if let Some(out) = stdout {
            tokio::spawn(pump_output(out, tx.clone(), OutputFrame::Stdout));
        }
        if let Some(err) = stderr {
            tokio::spawn(pump_output(err, tx.clone(), OutputFrame::Stderr));
        }
        drop(tx);

        while let Some(frame) = rx.recv().await {
            write_frame(&mut self.writer, &frame).await?;
        }

        // All output drained; now the terminal frame.
        let status = child.wait().await?;
        let frame = OutputFrame::ExitStatus(status.code().unwrap_or(-1));
        write_frame(&mut self.writer, &frame).await?;
        Ok(())
    }
}

async fn pump_output<R>(
    mut source: R,
    tx: mpsc::Sender<OutputFrame>,
    wrap: fn(Vec<u8>) -> OutputFrame,
) where
    R: AsyncRead + Unpin,
{
    let mut buf = [0u8; 4096];
    loop {
        match source.read(&mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(n) => {
                if tx.send(wrap(buf[..n].to_vec())).await.is_err() {
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "hijack_tests.rs"]
mod tests;
