// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Slipway Contributors

//! HTTP client for the control plane's TCP API.
//!
//! Sends HTTP/1.1 requests over plain TCP sockets. Short requests read
//! responses using Content-Length framing; the event feed and hijack
//! endpoints hand the connection back to the caller instead, since
//! those streams outlive request/response framing.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;

use slipway_wire::{HijackProcessSpec, SseReader};

/// Covers connect + write + read of short requests. Streaming endpoints
/// are exempt: builds run for as long as they run.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("connection to {addr} failed: {source}")]
    Connect {
        addr: String,
        source: std::io::Error,
    },

    #[error("request failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("request timed out")]
    Timeout,

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Client for one control-plane target (`host:port`).
#[derive(Debug, Clone)]
pub struct ApiClient {
    pub addr: String,
}

impl ApiClient {
    pub fn new(addr: impl Into<String>) -> Self {
        Self { addr: addr.into() }
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let request = format!("GET {} HTTP/1.1\r\nHost: {}\r\n\r\n", path, self.addr);
        let body = self.timed_request(&request.into_bytes()).await?;
        serde_json::from_str(&body).map_err(|e| ClientError::Malformed(e.to_string()))
    }

    pub async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let payload =
            serde_json::to_string(body).map_err(|e| ClientError::Malformed(e.to_string()))?;
        let request = format!(
            "POST {} HTTP/1.1\r\nHost: {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{}",
            path, self.addr, payload.len(), payload
        );
        let body = self.timed_request(&request.into_bytes()).await?;
        serde_json::from_str(&body).map_err(|e| ClientError::Malformed(e.to_string()))
    }

    /// PUT a binary body. Used to stream input archives to a pipe's
    /// write endpoint; no timeout, the pipe applies backpressure.
    pub async fn put_bytes(&self, path: &str, body: &[u8]) -> Result<(), ClientError> {
        let mut stream = self.connect().await?;
        let header = format!(
            "PUT {} HTTP/1.1\r\nHost: {}\r\nContent-Type: application/gzip\r\nContent-Length: {}\r\n\r\n",
            path, self.addr, body.len()
        );
        stream.write_all(header.as_bytes()).await?;
        stream.write_all(body).await?;
        stream.flush().await?;

        let mut reader = BufReader::new(stream);
        read_http_response(&mut reader).await?;
        Ok(())
    }

    /// Open the server-push event feed for a build. Returns a feed
    /// reader positioned after the response headers.
    pub async fn open_events(
        &self,
        path: &str,
    ) -> Result<SseReader<BufReader<TcpStream>>, ClientError> {
        let mut stream = self.connect().await?;
        let request = format!("GET {} HTTP/1.1\r\nHost: {}\r\n\r\n", path, self.addr);
        stream.write_all(request.as_bytes()).await?;

        let mut reader = BufReader::new(stream);
        read_response_head(&mut reader).await?;
        Ok(SseReader::new(reader))
    }

    /// Open a hijack session: POST the process spec, then relinquish
    /// request/response framing and hand the raw connection back as
    /// split halves. The read half is split off before buffering so no
    /// post-upgrade frames are stranded in a combined buffer.
    pub async fn open_hijack(
        &self,
        handle: &str,
        spec: &HijackProcessSpec,
    ) -> Result<(BufReader<OwnedReadHalf>, OwnedWriteHalf), ClientError> {
        let payload =
            serde_json::to_string(spec).map_err(|e| ClientError::Malformed(e.to_string()))?;
        let mut stream = self.connect().await?;
        let request = format!(
            "POST /api/v1/containers/{}/hijack HTTP/1.1\r\nHost: {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{}",
            handle, self.addr, payload.len(), payload
        );
        stream.write_all(request.as_bytes()).await?;

        let (read_half, write_half) = stream.into_split();
        let mut reader = BufReader::new(read_half);
        read_response_head(&mut reader).await?;
        Ok((reader, write_half))
    }

    async fn connect(&self) -> Result<TcpStream, ClientError> {
        TcpStream::connect(&self.addr).await.map_err(|source| ClientError::Connect {
            addr: self.addr.clone(),
            source,
        })
    }

    async fn timed_request(&self, request: &[u8]) -> Result<String, ClientError> {
        let send = async {
            let mut stream = self.connect().await?;
            stream.write_all(request).await?;
            let mut reader = BufReader::new(stream);
            read_http_response(&mut reader).await
        };
        tokio::time::timeout(REQUEST_TIMEOUT, send)
            .await
            .map_err(|_| ClientError::Timeout)?
    }
}

/// Read a status line and headers, failing on error statuses. Leaves
/// the reader positioned at the body.
async fn read_response_head<R: tokio::io::AsyncRead + Unpin>(
    reader: &mut BufReader<R>,
) -> Result<(u16, usize), ClientError> {
    let mut status_line = String::new();
    reader.read_line(&mut status_line).await?;

    let status_code = status_line
        .split_whitespace()
        .nth(1)
        .and_then(|s| s.parse::<u16>().ok())
        .ok_or_else(|| ClientError::Malformed(format!("bad status line: {}", status_line.trim())))?;

    let mut content_length = 0usize;
    loop {
        let mut line = String::new();
        let n = reader.read_line(&mut line).await?;
        if n == 0 || line == "\r\n" || line == "\n" {
            break;
        }
        let lower = line.to_ascii_lowercase();
        if let Some(value) = lower.strip_prefix("content-length:") {
            content_length = value.trim().parse().unwrap_or(0);
        }
    }

    if status_code >= 400 {
        let mut body = vec![0u8; content_length];
        if content_length > 0 {
            reader.read_exact(&mut body).await?;
        }
        return Err(ClientError::Status {
            status: status_code,
            body: String::from_utf8_lossy(&body).trim().to_string(),
        });
    }

    Ok((status_code, content_length))
}

/// Read and return a complete Content-Length framed response body.
async fn read_http_response<R: tokio::io::AsyncRead + Unpin>(
    reader: &mut BufReader<R>,
) -> Result<String, ClientError> {
    let (_, content_length) = read_response_head(reader).await?;
    let mut body = vec![0u8; content_length];
    if content_length > 0 {
        reader.read_exact(&mut body).await?;
    }
    Ok(String::from_utf8_lossy(&body).into_owned())
}

/// Split an absolute `http://host:port/path` URL into address and path.
/// Pipe read/write URLs arrive in this form from the pipe API.
pub fn split_url(url: &str) -> Result<(String, String), ClientError> {
    let rest = url
        .strip_prefix("http://")
        .ok_or_else(|| ClientError::Malformed(format!("unsupported url: {}", url)))?;
    match rest.split_once('/') {
        Some((addr, path)) => Ok((addr.to_string(), format!("/{}", path))),
        None => Ok((rest.to_string(), "/".to_string())),
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
