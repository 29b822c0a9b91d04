// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Slipway Contributors

//! Resolves an operator's coarse container query to one sandbox.

use thiserror::Error;

use slipway_core::ContainerRecord;
use slipway_wire::{BuildSummary, ContainerFilter};

use crate::chooser::{self, ChooseError};
use crate::client::{ApiClient, ClientError};

#[derive(Debug, Error)]
pub enum SelectError {
    /// Terminal: the fixed message is printed and the client exits with
    /// the low-severity status, never attempting a hijack.
    #[error("{}", chooser::NO_MATCHES_MESSAGE)]
    NoMatches,

    #[error("no builds matched your search parameters")]
    NoBuilds,

    #[error(transparent)]
    Choose(#[from] ChooseError),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("reading selection: {0}")]
    Prompt(std::io::Error),
}

/// Pick the most recent build satisfying the filter: highest build id
/// wins. With no pipeline/job constraint, only one-off builds qualify.
pub fn pick_latest_build(builds: &[BuildSummary], filter: &ContainerFilter) -> Option<u64> {
    builds
        .iter()
        .filter(|b| match (&filter.pipeline_name, &filter.job_name) {
            (None, None) => b.is_one_off(),
            (pipeline, job) => {
                pipeline.as_ref().map_or(true, |p| b.pipeline_name == *p)
                    && job.as_ref().map_or(true, |j| b.job_name == *j)
                    && filter.build_name.as_ref().map_or(true, |n| b.name == *n)
            }
        })
        .map(|b| b.id)
        .max()
}

/// Zero matches is terminal; one resolves directly; several go through
/// the operator prompt.
pub fn disambiguate<F>(
    mut candidates: Vec<ContainerRecord>,
    prompt: F,
) -> Result<ContainerRecord, SelectError>
where
    F: FnOnce(&str) -> Result<String, std::io::Error>,
{
    match candidates.len() {
        0 => Err(SelectError::NoMatches),
        1 => Ok(candidates.remove(0)),
        _ => {
            let menu = chooser::render_menu(&candidates);
            let line = prompt(&menu).map_err(SelectError::Prompt)?;
            let index = chooser::choose(&candidates, &line)?;
            Ok(candidates.remove(index))
        }
    }
}

/// Resolve a filter to one container, querying the build index first
/// when the filter under-specifies which build is meant.
pub async fn select_container<F>(
    client: &ApiClient,
    mut filter: ContainerFilter,
    prompt: F,
) -> Result<ContainerRecord, SelectError>
where
    F: FnOnce(&str) -> Result<String, std::io::Error>,
{
    if filter.build_id.is_none() {
        let builds: Vec<BuildSummary> = client.get_json("/api/v1/builds").await?;
        filter.build_id = Some(pick_latest_build(&builds, &filter).ok_or(SelectError::NoBuilds)?);
    }

    let path = format!("/api/v1/containers?{}", filter.to_query_string());
    let candidates: Vec<ContainerRecord> = client.get_json(&path).await?;
    disambiguate(candidates, prompt)
}

#[cfg(test)]
#[path = "selector_tests.rs"]
mod tests;
