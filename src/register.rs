//! Optional registration of the new PPA as a local software source.
use crate::apt;
use crate::exec::{run_checked, CommandRunner, Invocation};
use anyhow::{Context, Result};

pub const HELPER_PROGRAM: &str = "add-apt-repository";
pub const HELPER_PACKAGE: &str = "software-properties-common";

pub fn add_repository_invocation(ppa_ref: &str) -> Invocation {
    Invocation::new(HELPER_PROGRAM)
        .args(["-y", ppa_ref])
        .elevated()
        .inherit_stdio()
}

/// Add `ppa_ref` (`ppa:user/name`) to the system sources and refresh the index.
pub fn register_ppa(runner: &dyn CommandRunner, ppa_ref: &str) -> Result<()> {
    if !runner.has_program(HELPER_PROGRAM) {
        apt::ensure_installed(runner, &[HELPER_PACKAGE])
            .with_context(|| format!("install {HELPER_PACKAGE}"))?;
    }
    run_checked(
        runner,
        &add_repository_invocation(ppa_ref),
        &format!("add {ppa_ref}"),
    )?;
    run_checked(
        runner,
        &Invocation::new("apt-get")
            .arg("update")
            .elevated()
            .inherit_stdio(),
        "refresh package index",
    )?;
    Ok(())
}
