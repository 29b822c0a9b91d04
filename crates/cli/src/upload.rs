// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Slipway Contributors

//! Input uploads: archive a local directory and stream it to a pipe.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use flate2::write::GzEncoder;
use flate2::Compression;

use crate::client::{split_url, ApiClient};

/// Build a gzip-compressed tar archive of `dir`'s contents.
///
/// Archiving is CPU and filesystem bound, so it runs off the async
/// runtime's worker threads.
pub async fn archive_dir(dir: &Path) -> Result<Vec<u8>> {
    let dir: PathBuf = dir.to_path_buf();
    let archived = tokio::task::spawn_blocking(move || -> Result<Vec<u8>> {
        let encoder = GzEncoder::new(Vec::new(), Compression::default());
        let mut builder = tar::Builder::new(encoder);
        builder
            .append_dir_all(".", &dir)
            .with_context(|| format!("archiving {}", dir.display()))?;
        let encoder = builder.into_inner().context("finishing archive")?;
        Ok(encoder.finish().context("finishing gzip stream")?)
    })
    .await
    .context("archive task panicked")??;
    Ok(archived)
}

/// Archive one declared input and PUT it to its pipe's write endpoint.
/// Each upload owns its own connection; independent inputs upload in
/// parallel with no ordering between them.
pub async fn upload_input(name: &str, dir: &Path, write_url: &str) -> Result<()> {
    tracing::debug!(input = name, url = write_url, "uploading input");
    let archive = archive_dir(dir).await?;

    let (addr, path) = split_url(write_url)?;
    let client = ApiClient::new(addr);
    client
        .put_bytes(&path, &archive)
        .await
        .with_context(|| format!("uploading input {}", name))?;
    Ok(())
}

#[cfg(test)]
#[path = "upload_tests.rs"]
mod tests;
