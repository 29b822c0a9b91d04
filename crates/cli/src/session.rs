// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Slipway Contributors

//! Client side of a hijack session.
//!
//! After the upgrade the wire is newline-delimited frames both ways.
//! Local input is forwarded verbatim as it arrives; remote output is
//! written through immediately. Exactly one terminal frame decides the
//! outcome.

use tokio::io::{AsyncBufRead, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use slipway_wire::{read_frame, write_frame, InputFrame, OutputFrame, ProtocolError};

/// How the remote side ended the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionResult {
    /// The remote process exited; the client mirrors this status.
    Exited(i32),
    /// The process could not be started or crashed abnormally; the
    /// client reports the message and exits with the sentinel status.
    RemoteError(String),
}

/// Drive a session to its terminal frame.
///
/// `local_in` reaching EOF is a half-close: the frame stream is shut
/// down so the remote process sees EOF on its own input, but the
/// session keeps running until the remote side sends its terminal
/// frame. The peer closing without one is a premature termination.
pub async fn run_session<FR, FW, I, O, E>(
    mut frame_reader: FR,
    mut frame_writer: FW,
    mut local_in: I,
    mut local_out: O,
    mut local_err: E,
) -> Result<SessionResult, ProtocolError>
where
    FR: AsyncBufRead + Unpin,
    FW: AsyncWrite + Unpin + Send + 'static,
    I: AsyncRead + Unpin + Send + 'static,
    O: AsyncWrite + Unpin,
    E: AsyncWrite + Unpin,
{
    // Local input → stdin frames, forwarded as reads complete.
    let forwarder = tokio::spawn(async move {
        let mut buf = [0u8; 4096];
        loop {
            match local_in.read(&mut buf).await {
                Ok(0) | Err(_) => break,
                Ok(n) => {
                    let frame = InputFrame::Stdin(buf[..n].to_vec());
                    if write_frame(&mut frame_writer, &frame).await.is_err() {
                        break;
                    }
                }
            }
        }
        // Half-close: EOF for the remote process's input.
        let _ = frame_writer.shutdown().await;
    });

    let result = loop {
        match read_frame::<_, OutputFrame>(&mut frame_reader).await? {
            Some(OutputFrame::Stdout(bytes)) => {
                local_out.write_all(&bytes).await?;
                local_out.flush().await?;
            }
            Some(OutputFrame::Stderr(bytes)) => {
                local_err.write_all(&bytes).await?;
                local_err.flush().await?;
            }
            Some(OutputFrame::ExitStatus(status)) => break Ok(SessionResult::Exited(status)),
            Some(OutputFrame::Error(message)) => break Ok(SessionResult::RemoteError(message)),
            None => break Err(ProtocolError::PrematureClose),
        }
    };

    forwarder.abort();
    result
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
