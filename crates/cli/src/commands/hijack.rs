// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Slipway Contributors

//! `slipway hijack` - Attach an interactive process to a build container

use std::io::Write;

use anyhow::Result;
use clap::Args;

use slipway_core::Attempt;
use slipway_wire::{ContainerFilter, HijackProcessSpec, ProtocolError};

use crate::client::ApiClient;
use crate::exit_error::{ExitError, HIJACK_FAILED, NO_CONTAINERS};
use crate::selector::{self, SelectError};
use crate::session::{self, SessionResult};

/// Shell started when no command is given.
const DEFAULT_COMMAND: &str = "/bin/sh";

#[derive(Args)]
pub struct HijackArgs {
    /// Exact build to search within
    #[arg(short = 'b', long = "build")]
    pub build_id: Option<u64>,

    /// Pipeline the build belongs to
    #[arg(short = 'p', long = "pipeline")]
    pub pipeline: Option<String>,

    /// Job the build belongs to
    #[arg(short = 'j', long = "job")]
    pub job: Option<String>,

    /// Build name within the job (defaults to the latest build)
    #[arg(long = "build-name")]
    pub build_name: Option<String>,

    /// Step name within the build
    #[arg(short = 's', long = "step")]
    pub step: Option<String>,

    /// Step type (get, put, task, check)
    #[arg(long = "step-type")]
    pub step_type: Option<String>,

    /// Resource whose check container to attach to
    #[arg(long = "check")]
    pub check: Option<String>,

    /// Attempt path for retried steps, dot-joined (e.g. 1.2)
    #[arg(long, value_parser = parse_attempt)]
    pub attempt: Option<Attempt>,

    /// Command to run in the container (defaults to an interactive shell)
    #[arg(trailing_var_arg = true)]
    pub command: Vec<String>,
}

fn parse_attempt(value: &str) -> Result<Attempt, String> {
    Attempt::parse(value).map_err(|e| format!("bad attempt path {:?}: {}", value, e))
}

impl HijackArgs {
    fn filter(&self) -> ContainerFilter {
        ContainerFilter {
            build_id: self.build_id,
            pipeline_name: self.pipeline.clone(),
            job_name: self.job.clone(),
            build_name: self.build_name.clone(),
            step_name: self.step.clone(),
            step_type: self.step_type.clone(),
            resource_name: self.check.clone(),
            attempt: self.attempt.clone(),
        }
    }
}

pub async fn run(client: &ApiClient, args: HijackArgs) -> Result<()> {
    let container = match selector::select_container(client, args.filter(), prompt_operator).await {
        Ok(container) => container,
        Err(err @ SelectError::NoMatches) => {
            return Err(ExitError::new(NO_CONTAINERS, err.to_string()).into());
        }
        Err(err) => return Err(ExitError::new(HIJACK_FAILED, err.to_string()).into()),
    };
    tracing::debug!(handle = %container.handle, "attaching to container");

    let (path, command_args) = match args.command.split_first() {
        Some((path, rest)) => (path.clone(), rest.to_vec()),
        None => (DEFAULT_COMMAND.to_string(), Vec::new()),
    };
    let spec = HijackProcessSpec {
        user: container.user.clone(),
        dir: container.working_directory.clone(),
        env: container.env.clone(),
        path,
        args: command_args,
    };

    let (frame_reader, frame_writer) = client
        .open_hijack(&container.handle, &spec)
        .await
        .map_err(|e| ExitError::new(HIJACK_FAILED, format!("hijack failed: {}", e)))?;

    let outcome = session::run_session(
        frame_reader,
        frame_writer,
        tokio::io::stdin(),
        tokio::io::stdout(),
        tokio::io::stderr(),
    )
    .await;

    session_exit(outcome)
}

/// Map the session outcome to the process exit contract: a zero remote
/// status is success, any other status is mirrored silently, and error
/// frames or transport failures use the sentinel status.
fn session_exit(outcome: Result<SessionResult, ProtocolError>) -> Result<()> {
    match outcome {
        Ok(SessionResult::Exited(0)) => Ok(()),
        Ok(SessionResult::Exited(code)) => Err(ExitError::silent(code).into()),
        Ok(SessionResult::RemoteError(message)) => {
            Err(ExitError::new(HIJACK_FAILED, message).into())
        }
        Err(err) => Err(ExitError::new(HIJACK_FAILED, err.to_string()).into()),
    }
}

/// Show the disambiguation menu and read the operator's reply.
fn prompt_operator(menu: &str) -> std::io::Result<String> {
    let mut stdout = std::io::stdout();
    stdout.write_all(menu.as_bytes())?;
    stdout.flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line)
}

#[cfg(test)]
#[path = "hijack_tests.rs"]
mod tests;
