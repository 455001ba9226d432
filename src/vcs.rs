//! Git history for the packaged tree.
use crate::apt;
use crate::exec::{run_checked, CommandRunner, Invocation};
use crate::model::{MaintainerProfile, PackageSpec};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Build byproducts kept out of the mirrored history.
pub fn gitignore_patterns(package: &PackageSpec) -> Vec<String> {
    let mut patterns: Vec<String> = [
        "*.deb",
        "*.changes",
        "*.dsc",
        "*.buildinfo",
        "*.build",
        "*.upload",
        "*.tar.*",
        "debian/.debhelper/",
        "debian/files",
        "debian/*.substvars",
        "debian/*.debhelper.log",
        "obj-*/",
        "build/",
    ]
    .iter()
    .map(|p| p.to_string())
    .collect();
    patterns.push(format!("debian/{}/", package.name));
    patterns
}

pub fn commit_message(package: &PackageSpec) -> String {
    format!("Initial import of {} {}", package.name, package.version)
}

/// Initialize a repository in `dir` and commit everything as the maintainer.
pub fn init_and_commit(
    runner: &dyn CommandRunner,
    dir: &Path,
    package: &PackageSpec,
    maintainer: &MaintainerProfile,
) -> Result<()> {
    if !runner.has_program("git") {
        apt::ensure_installed(runner, &["git"]).context("install git")?;
    }

    git(runner, dir, &["init", "--quiet"], "initialize repository")?;

    let mut ignore = gitignore_patterns(package).join("\n");
    ignore.push('\n');
    let ignore_path = dir.join(".gitignore");
    fs::write(&ignore_path, ignore).with_context(|| format!("write {}", ignore_path.display()))?;

    git(runner, dir, &["add", "-A"], "stage files")?;
    let name = format!("user.name={}", maintainer.name);
    let email = format!("user.email={}", maintainer.email);
    let message = commit_message(package);
    git(
        runner,
        dir,
        &[
            "-c",
            name.as_str(),
            "-c",
            email.as_str(),
            "commit",
            "--quiet",
            "-m",
            message.as_str(),
        ],
        "commit",
    )?;
    Ok(())
}

pub(crate) fn git(
    runner: &dyn CommandRunner,
    dir: &Path,
    args: &[&str],
    what: &str,
) -> Result<()> {
    run_checked(
        runner,
        &Invocation::new("git")
            .args(args.iter().copied())
            .current_dir(dir),
        what,
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::testing::RecordingRunner;
    use std::collections::BTreeSet;
    use tempfile::TempDir;

    fn package() -> PackageSpec {
        PackageSpec {
            name: "hello".to_string(),
            version: "1.0.0".to_string(),
            description: String::new(),
            dependencies: BTreeSet::new(),
        }
    }

    fn maintainer() -> MaintainerProfile {
        MaintainerProfile {
            name: "Alice Example".to_string(),
            email: "alice@example.org".to_string(),
            launchpad_username: "alice".to_string(),
            gpg_key_id: None,
        }
    }

    #[test]
    fn commits_as_maintainer_with_ignore_file() {
        let dir = TempDir::new().expect("dir");
        let runner = RecordingRunner::new().with_programs(&["git"]);
        init_and_commit(&runner, dir.path(), &package(), &maintainer()).expect("commit");

        assert_eq!(
            runner.lines(),
            vec![
                "git init --quiet",
                "git add -A",
                "git -c user.name=Alice Example -c user.email=alice@example.org commit --quiet -m Initial import of hello 1.0.0",
            ]
        );
        let ignore = fs::read_to_string(dir.path().join(".gitignore")).expect("gitignore");
        assert!(ignore.lines().any(|l| l == "*.changes"));
        assert!(ignore.lines().any(|l| l == "debian/hello/"));
    }

    #[test]
    fn installs_git_when_absent() {
        let dir = TempDir::new().expect("dir");
        let runner = RecordingRunner::new();
        init_and_commit(&runner, dir.path(), &package(), &maintainer()).expect("commit");
        assert!(runner.lines().contains(&"apt-get install -y git".to_string()));
    }

    #[test]
    fn commit_failure_is_reported() {
        let dir = TempDir::new().expect("dir");
        let runner = RecordingRunner::new().with_programs(&["git"]);
        runner.respond("git -c", 1, "");
        assert!(init_and_commit(&runner, dir.path(), &package(), &maintainer()).is_err());
    }
}
