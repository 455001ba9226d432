//! Host dependency preflight.
use crate::apt;
use crate::exec::CommandRunner;
use crate::output;
use anyhow::{Context, Result};

/// Host packages the pipeline drives.
pub const REQUIRED_PACKAGES: &[&str] = &[
    "build-essential",
    "devscripts",
    "debhelper",
    "dput",
    "gnupg",
    "git",
    "equivs",
    "cmake",
];

/// Check required host packages and install any that are missing.
pub fn run_preflight(runner: &dyn CommandRunner) -> Result<()> {
    let installed = apt::ensure_installed(runner, REQUIRED_PACKAGES)
        .context("install required host packages")?;
    if installed.is_empty() {
        output::success("all required host packages are installed");
    } else {
        output::success(&format!("installed {}", installed.join(", ")));
    }
    Ok(())
}
