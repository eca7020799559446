// SPDX-License-Identifier: GPL-3.0-only

//! onefs-runner - execute declarative OneFS storage tasks
//!
//! Reads a task file naming the task, the array connection and the task
//! parameters, reconciles the array to the desired state, and prints the
//! task report as JSON on stdout. On failure a `{"failed": true, "msg"}`
//! document is printed instead and the exit code is non-zero.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

mod dispatch;
mod taskfile;

#[derive(Debug, Parser)]
#[command(name = "onefs-runner")]
#[command(about = "Declarative storage automation for OneFS arrays", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Execute the task a file describes
    Run {
        /// Task file (.json, .yaml or .yml)
        task_file: PathBuf,

        /// Append log lines to this file instead of stderr
        #[arg(long)]
        log_file: Option<PathBuf>,

        /// Log filter, overriding RUST_LOG (e.g. "debug", "onefs_papi=trace")
        #[arg(long)]
        log_level: Option<String>,

        /// Pretty-print the report JSON
        #[arg(long)]
        pretty: bool,
    },

    /// List the available task names
    Tasks,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Command::Tasks => {
            for name in onefs_tasks::tasks::NAMES {
                println!("{name}");
            }
            ExitCode::SUCCESS
        }
        Command::Run { task_file, log_file, log_level, pretty } => {
            let _guard = match init_logging(log_file.as_deref(), log_level.as_deref()) {
                Ok(guard) => guard,
                Err(e) => {
                    eprintln!("failed to initialize logging: {e:#}");
                    return ExitCode::FAILURE;
                }
            };

            let invocation = Uuid::new_v4();
            let span = tracing::info_span!("task_run", %invocation);
            let _enter = span.enter();
            tracing::info!(path = %task_file.display(), "executing task file");

            match run(&task_file).await {
                Ok(report) => {
                    tracing::info!(changed = report["changed"].as_bool(), "task finished");
                    print_json(&report, pretty);
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    tracing::error!(error = format!("{e:#}"), "task failed");
                    print_json(&json!({"failed": true, "msg": format!("{e:#}")}), pretty);
                    ExitCode::FAILURE
                }
            }
        }
    }
}

async fn run(task_file: &std::path::Path) -> Result<serde_json::Value> {
    let file = taskfile::load(task_file)?;
    tracing::info!(task = %file.task, host = %file.connection.onefs_host, "loaded task file");
    dispatch::execute(&file).await
}

fn print_json(value: &serde_json::Value, pretty: bool) {
    if pretty {
        println!("{value:#}");
    } else {
        println!("{value}");
    }
}

/// Line-oriented logs on stderr, or appended to a file when requested. The
/// returned guard must stay alive until exit so buffered lines are flushed.
fn init_logging(
    log_file: Option<&std::path::Path>,
    log_level: Option<&str>,
) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let filter = match log_level {
        Some(level) => EnvFilter::try_new(level).context("invalid --log-level filter")?,
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("onefs_runner=info,onefs_tasks=info,warn")),
    };

    match log_file {
        Some(path) => {
            let directory = path.parent().filter(|p| !p.as_os_str().is_empty());
            let file_name = path
                .file_name()
                .context("--log-file must name a file")?;
            let appender = tracing_appender::rolling::never(
                directory.unwrap_or_else(|| std::path::Path::new(".")),
                file_name,
            );
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .init();
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
            Ok(None)
        }
    }
}
