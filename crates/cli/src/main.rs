// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Slipway Contributors

//! `slipway` - client for the Slipway control plane.

#![cfg_attr(
    test,
    allow(clippy::panic, clippy::unwrap_used, clippy::expect_used)
)]

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod chooser;
mod client;
mod commands;
mod exit_error;
mod selector;
mod session;
mod upload;

use client::ApiClient;
use exit_error::ExitError;

#[derive(Parser)]
#[command(name = "slipway", version, about = "Slipway control plane client")]
struct Cli {
    /// Control plane address (`host:port`); falls back to SLIPWAY_TARGET
    #[arg(short = 't', long = "target", global = true)]
    target: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a one-off task build from local inputs
    Execute(commands::execute::ExecuteArgs),
    /// Attach an interactive process to a build container
    Hijack(commands::hijack::HijackArgs),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_env("SLIPWAY_LOG"))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = run(cli).await;

    if let Err(err) = result {
        match err.downcast::<ExitError>() {
            Ok(exit) => {
                if !exit.message.is_empty() {
                    eprintln!("{}", exit.message);
                }
                std::process::exit(exit.code);
            }
            Err(other) => {
                eprintln!("error: {:#}", other);
                std::process::exit(2);
            }
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let target = cli
        .target
        .or_else(|| std::env::var("SLIPWAY_TARGET").ok())
        .ok_or_else(|| anyhow::anyhow!("no target: pass --target or set SLIPWAY_TARGET"))?;
    let client = ApiClient::new(target);

    match cli.command {
        Command::Execute(args) => commands::execute::run(&client, args).await,
        Command::Hijack(args) => commands::hijack::run(&client, args).await,
    }
}
