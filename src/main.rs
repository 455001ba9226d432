use anyhow::{Context, Result};
use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

mod apt;
mod builddeps;
mod cli;
mod collect;
mod config;
mod debian;
mod detect;
mod exec;
mod gpg;
mod model;
mod output;
mod package;
mod pipeline;
mod preflight;
mod prompt;
mod register;
mod remote;
mod report;
mod upload;
mod validate;
mod vcs;
mod workspace;

use cli::RootArgs;
use config::Settings;
use exec::SystemRunner;
use pipeline::{Capabilities, RunContext};
use prompt::TerminalInput;

fn main() -> ExitCode {
    let args = RootArgs::parse();
    init_tracing(args.verbose);
    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            output::error(&format!("{err:#}"));
            ExitCode::FAILURE
        }
    }
}

/// Diagnostics go to stderr; `RUST_LOG` overrides the verbosity flag.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .try_init()
        .ok();
}

fn run(args: &RootArgs) -> Result<bool> {
    let settings = Settings::resolve(args.config.as_deref(), args.work_root.as_deref())?;
    tracing::debug!(
        config = %settings.config_path.display(),
        work_root = %settings.work_root.display(),
        "resolved settings"
    );
    let cwd = std::env::current_dir().context("read current directory")?;
    let distribution = debian::changelog::host_distribution();
    let started_at = chrono::Local::now().fixed_offset();
    let mut ctx = RunContext::new(settings, cwd, distribution, started_at);

    let runner = SystemRunner;
    let mut input = TerminalInput;
    let mut caps = Capabilities {
        runner: &runner,
        input: &mut input,
    };
    let summary = pipeline::run_steps(pipeline::steps::STEPS, &mut ctx, &mut caps);
    report::persist_run(&ctx, &summary);

    match summary.aborted_at {
        Some(step) => {
            tracing::debug!(step, "run aborted");
            Ok(false)
        }
        None => {
            if summary.advisories() > 0 {
                output::warn(&format!(
                    "finished with {} warning(s)",
                    summary.advisories()
                ));
            }
            Ok(true)
        }
    }
}
