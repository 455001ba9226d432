//! Host package manager helpers shared by the install stages.
use crate::exec::{run_checked, CommandRunner, Invocation};
use anyhow::Result;

/// Whether `package` is installed according to dpkg.
pub fn is_installed(runner: &dyn CommandRunner, package: &str) -> bool {
    let query = Invocation::new("dpkg-query").args(["-W", "-f=${Status}", package]);
    match runner.run(&query) {
        Ok(output) => output.success() && output.stdout.contains("install ok installed"),
        Err(err) => {
            tracing::debug!(package, error = %err, "dpkg-query unavailable");
            false
        }
    }
}

/// The subset of `packages` that is not installed, in input order.
pub fn missing_packages(runner: &dyn CommandRunner, packages: &[String]) -> Vec<String> {
    packages
        .iter()
        .filter(|package| !is_installed(runner, package))
        .cloned()
        .collect()
}

/// Refresh the index and install `packages` non-interactively, elevated.
pub fn install(runner: &dyn CommandRunner, packages: &[String]) -> Result<()> {
    if packages.is_empty() {
        return Ok(());
    }
    run_checked(
        runner,
        &Invocation::new("apt-get")
            .arg("update")
            .elevated()
            .inherit_stdio(),
        "refresh package index",
    )?;
    run_checked(
        runner,
        &Invocation::new("apt-get")
            .args(["install", "-y"])
            .args(packages.iter().cloned())
            .elevated()
            .inherit_stdio(),
        &format!("install {}", packages.join(" ")),
    )?;
    Ok(())
}

/// Install whatever part of `packages` is missing. Returns what was installed.
pub fn ensure_installed(runner: &dyn CommandRunner, packages: &[&str]) -> Result<Vec<String>> {
    let wanted: Vec<String> = packages.iter().map(|p| p.to_string()).collect();
    let missing = missing_packages(runner, &wanted);
    if missing.is_empty() {
        tracing::debug!(?wanted, "packages already installed");
        return Ok(missing);
    }
    install(runner, &missing)?;
    Ok(missing)
}
