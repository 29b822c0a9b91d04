// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Slipway Contributors

//! `slipway execute` - Run a one-off task build from local inputs

use std::io::Write;
use std::path::PathBuf;
use std::pin::pin;

use anyhow::{Context, Result};
use clap::Args;
use tokio::io::AsyncBufRead;

use slipway_core::{BuildStatus, Event, Plan, PlanFactory, Source, Step, TaskConfig};
use slipway_wire::{BuildSummary, PipeResource, ProtocolError, SseReader};

use crate::client::ApiClient;
use crate::exit_error::ExitError;
use crate::upload;

#[derive(Args)]
pub struct ExecuteArgs {
    /// Task configuration file
    #[arg(short = 'c', long = "config", default_value = "slipway.toml")]
    pub config: PathBuf,

    /// Local directory for a declared input (name=path, repeatable).
    /// Inputs without a mapping default to `./<name>`.
    #[arg(short = 'i', long = "input", value_parser = parse_input)]
    pub inputs: Vec<(String, PathBuf)>,

    /// Reopen the event feed if the connection drops before the build
    /// reaches a terminal status
    #[arg(long)]
    pub reconnect: bool,
}

fn parse_input(value: &str) -> Result<(String, PathBuf), String> {
    match value.split_once('=') {
        Some((name, path)) if !name.is_empty() && !path.is_empty() => {
            Ok((name.to_string(), PathBuf::from(path)))
        }
        _ => Err(format!("expected name=path, got {:?}", value)),
    }
}

pub async fn run(client: &ApiClient, args: ExecuteArgs) -> Result<()> {
    let raw = std::fs::read_to_string(&args.config)
        .with_context(|| format!("reading {}", args.config.display()))?;
    let config: TaskConfig =
        toml::from_str(&raw).with_context(|| format!("parsing {}", args.config.display()))?;

    let dirs = resolve_inputs(&config, &args.inputs)?;

    // One pipe per declared input; its read side becomes the get step's
    // source, its write side receives the archived directory.
    let mut pipes: Vec<(String, PathBuf, PipeResource)> = Vec::with_capacity(dirs.len());
    for (name, dir) in dirs {
        let pipe: PipeResource = client
            .post_json("/api/v1/pipes", &serde_json::json!({}))
            .await
            .context("allocating pipe")?;
        pipes.push((name, dir, pipe));
    }

    let plan = assemble_plan(config, &pipes);
    let build: BuildSummary = client
        .post_json("/api/v1/builds", &plan)
        .await
        .context("submitting build")?;
    println!("executing build {}", build.id);

    let handles: Vec<_> = pipes
        .into_iter()
        .map(|(name, dir, pipe)| {
            tokio::spawn(async move { upload::upload_input(&name, &dir, &pipe.write_url).await })
        })
        .collect();

    // Tail the feed while uploads run; an upload failure aborts the
    // invocation instead of leaving the tail waiting on input that will
    // never arrive.
    let mut tail = pin!(tail_events(client, build.id, args.reconnect));
    let mut uploads = pin!(async {
        for handle in handles {
            handle.await.context("upload task panicked")??;
        }
        anyhow::Ok(())
    });
    let mut uploads_done = false;
    let status = loop {
        tokio::select! {
            status = &mut tail => break status?,
            result = &mut uploads, if !uploads_done => {
                result?;
                uploads_done = true;
            }
        }
    };

    match status.exit_code() {
        0 => Ok(()),
        code => Err(ExitError::silent(code).into()),
    }
}

/// Pair each declared input with its local directory: the operator's
/// explicit `name=path` mapping, else `./<name>`. Mappings naming
/// undeclared inputs are an error rather than silently ignored.
pub fn resolve_inputs(
    config: &TaskConfig,
    overrides: &[(String, PathBuf)],
) -> Result<Vec<(String, PathBuf)>> {
    for (name, _) in overrides {
        if !config.inputs.iter().any(|i| i.name == *name) {
            anyhow::bail!("unknown input {:?}: not declared by the task", name);
        }
    }
    Ok(config
        .inputs
        .iter()
        .map(|input| {
            let dir = overrides
                .iter()
                .find(|(name, _)| *name == input.name)
                .map(|(_, path)| path.clone())
                .unwrap_or_else(|| PathBuf::from(&input.name));
            (input.name.clone(), dir)
        })
        .collect())
}

/// One-off build plan: fetch every input archive in parallel, then run
/// the task.
pub fn assemble_plan(config: TaskConfig, pipes: &[(String, PathBuf, PipeResource)]) -> Plan {
    let factory = PlanFactory::new(0);
    let gets: Vec<Plan> = pipes
        .iter()
        .map(|(name, _, pipe)| {
            factory.new_plan(Step::Get {
                name: name.clone(),
                resource_type: "archive".to_string(),
                source: Source::from_iter([("uri", pipe.read_url.clone())]),
                version: None,
            })
        })
        .collect();

    let task = factory.new_plan(Step::Task {
        name: "one-off".to_string(),
        config,
    });

    if gets.is_empty() {
        return factory.new_plan(Step::Do(vec![task]));
    }
    let aggregate = factory.new_plan(Step::Aggregate(gets));
    factory.new_plan(Step::Do(vec![aggregate, task]))
}

/// Follow the build's event feed to its terminal status. With
/// `reconnect`, a dropped connection reopens the feed and resumes past
/// already-rendered records; without it, the drop is fatal.
async fn tail_events(client: &ApiClient, build_id: u64, reconnect: bool) -> Result<BuildStatus> {
    let path = format!("/api/v1/builds/{}/events", build_id);
    let mut last_seen: Option<u64> = None;
    loop {
        let mut feed = client.open_events(&path).await?;
        match drain_feed(&mut feed, &mut last_seen).await {
            Ok(Some(status)) => return Ok(status),
            Ok(None) => anyhow::bail!("event feed ended without a terminal status"),
            Err(ProtocolError::PrematureClose) | Err(ProtocolError::Transport(_)) if reconnect => {
                tracing::warn!(build = build_id, "event feed dropped, reconnecting");
            }
            Err(err) => return Err(err.into()),
        }
    }
}

/// Render records until a terminal status arrives; the feed's end
/// marker without one means the build is still unresolved. Records at
/// or below `last_seen` were already rendered by a previous connection
/// and are skipped.
async fn drain_feed<R: AsyncBufRead + Unpin>(
    feed: &mut SseReader<R>,
    last_seen: &mut Option<u64>,
) -> Result<Option<BuildStatus>, ProtocolError> {
    loop {
        let record = match feed.next().await? {
            None => return Err(ProtocolError::PrematureClose),
            Some(record) if record.is_end() => return Ok(None),
            Some(record) => record,
        };
        if record.name != "event" {
            tracing::debug!(name = %record.name, "skipping unknown feed record");
            continue;
        }
        if let Some(id) = record.id {
            if last_seen.is_some_and(|seen| id <= seen) {
                continue;
            }
            *last_seen = Some(id);
        }
        if let Some(status) = render_event(record.event()?)? {
            return Ok(Some(status));
        }
    }
}

/// Write one event to the terminal; terminal statuses bubble up.
fn render_event(event: Event) -> Result<Option<BuildStatus>, ProtocolError> {
    match event {
        Event::Log { payload, .. } => {
            let mut stdout = std::io::stdout();
            stdout.write_all(payload.as_bytes())?;
            stdout.flush()?;
        }
        Event::Status { status, .. } => {
            if status.is_terminal() {
                return Ok(Some(status));
            }
        }
        Event::Error { message, .. } => {
            eprintln!("{}", message);
        }
        Event::FinishGet { origin, exit_status, .. }
        | Event::FinishPut { origin, exit_status, .. }
        | Event::FinishTask { origin, exit_status } => {
            tracing::debug!(plan = origin.id, exit_status, "step finished");
        }
        Event::InitializeTask { origin } | Event::StartTask { origin, .. } => {
            tracing::debug!(plan = origin.id, "task starting");
        }
    }
    Ok(None)
}

#[cfg(test)]
#[path = "execute_tests.rs"]
mod tests;
