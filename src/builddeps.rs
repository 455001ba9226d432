//! Build-dependency installation for the generated control file.
use crate::apt;
use crate::debian::control::parse_build_depends;
use crate::exec::{run_checked, CommandRunner, Invocation};
use crate::output;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Packages providing `mk-build-deps` and the baseline toolchain.
pub const HELPER_PACKAGES: &[&str] = &["devscripts", "equivs", "build-essential"];

/// Install the Build-Depends of `<workspace>/debian/control`.
pub fn install_build_deps(runner: &dyn CommandRunner, workspace_dir: &Path) -> Result<()> {
    let control_path = workspace_dir.join("debian").join("control");
    let control = fs::read_to_string(&control_path)
        .with_context(|| format!("read {}", control_path.display()))?;
    let packages = parse_build_depends(&control)
        .with_context(|| format!("read Build-Depends from {}", control_path.display()))?;
    output::info(&format!("build dependencies: {}", packages.join(" ")));

    apt::ensure_installed(runner, HELPER_PACKAGES).context("install build helpers")?;

    let missing = apt::missing_packages(runner, &packages);
    if missing.is_empty() {
        output::success("build dependencies already satisfied");
        return Ok(());
    }
    run_checked(
        runner,
        &Invocation::new("mk-build-deps")
            .args([
                "--install",
                "--remove",
                "--tool",
                "apt-get -y --no-install-recommends",
                "debian/control",
            ])
            .current_dir(workspace_dir)
            .elevated()
            .inherit_stdio(),
        "install build dependencies",
    )?;
    output::success(&format!("installed {}", missing.join(", ")));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::testing::RecordingRunner;
    use tempfile::TempDir;

    fn workspace(build_depends: &str) -> TempDir {
        let dir = TempDir::new().expect("temp dir");
        fs::create_dir_all(dir.path().join("debian")).expect("debian dir");
        fs::write(
            dir.path().join("debian/control"),
            format!("Source: hello\nBuild-Depends: {build_depends}\n\nPackage: hello\n"),
        )
        .expect("control");
        dir
    }

    fn mark_installed(runner: &RecordingRunner, packages: &[&str]) {
        for package in packages {
            runner.respond(
                &format!("dpkg-query -W -f=${{Status}} {package}"),
                0,
                "install ok installed",
            );
        }
    }

    #[test]
    fn satisfied_dependencies_skip_helper() {
        let dir = workspace("debhelper (>= 10), cmake");
        let runner = RecordingRunner::new();
        mark_installed(&runner, HELPER_PACKAGES);
        mark_installed(&runner, &["debhelper", "cmake"]);
        install_build_deps(&runner, dir.path()).expect("install");
        assert!(runner.lines().iter().all(|l| !l.starts_with("mk-build-deps")));
    }

    #[test]
    fn missing_dependencies_run_helper_in_workspace() {
        let dir = workspace("debhelper (>= 10), libcurl4-openssl-dev");
        let runner = RecordingRunner::new();
        mark_installed(&runner, HELPER_PACKAGES);
        mark_installed(&runner, &["debhelper"]);
        install_build_deps(&runner, dir.path()).expect("install");

        let calls = runner.calls.borrow();
        let helper = calls
            .iter()
            .find(|inv| inv.program == "mk-build-deps")
            .expect("helper call");
        assert!(helper.elevate);
        assert_eq!(helper.cwd.as_deref(), Some(dir.path()));
        assert_eq!(helper.args.last().map(String::as_str), Some("debian/control"));
    }

    #[test]
    fn helper_failure_is_fatal() {
        let dir = workspace("libfoo-dev");
        let runner = RecordingRunner::new();
        mark_installed(&runner, HELPER_PACKAGES);
        runner.respond("mk-build-deps", 1, "");
        assert!(install_build_deps(&runner, dir.path()).is_err());
    }
}
