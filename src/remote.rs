//! Launchpad code hosting: guided setup and push.
//!
//! Launchpad project and repository creation is manual; this stage prints
//! the steps, waits for the user, then wires the remote and pushes.
use crate::exec::{CommandRunner, Invocation};
use crate::model::PackageSpec;
use crate::output;
use crate::prompt::{self, InputProvider};
use crate::vcs::git;
use anyhow::{anyhow, Result};
use std::path::Path;

pub const NEW_PROJECT_URL: &str = "https://launchpad.net/projects/+new";
pub const REMOTE_NAME: &str = "origin";
pub const DEFAULT_BRANCH: &str = "main";

/// SSH push URL of the package's personal repository.
pub fn remote_url(launchpad_username: &str, package: &PackageSpec) -> String {
    format!(
        "git+ssh://{user}@git.launchpad.net/~{user}/{name}",
        user = launchpad_username,
        name = package.name
    )
}

/// Walk the user through project setup, add the remote and push.
///
/// A push failure is returned as an error for the caller to report; nothing
/// is retried.
pub fn setup_and_push(
    runner: &dyn CommandRunner,
    input: &mut dyn InputProvider,
    dir: &Path,
    launchpad_username: &str,
    package: &PackageSpec,
) -> Result<()> {
    let url = remote_url(launchpad_username, package);
    output::info("create the Launchpad project for this package:");
    output::detail(&format!("1. open {NEW_PROJECT_URL}"));
    output::detail(&format!("2. use the name \"{}\"", package.name));
    output::detail("3. register an SSH key at https://launchpad.net/~/+editsshkeys if you have not");
    prompt::pause(input, "Project created?")?;

    output::info("the code repository is created on first push to:");
    output::detail(&url);
    prompt::pause(input, "Ready to push?")?;

    // A stale remote from an earlier attempt would shadow the new URL.
    match runner.run(
        &Invocation::new("git")
            .args(["remote", "remove", REMOTE_NAME])
            .current_dir(dir),
    ) {
        Ok(out) if !out.success() => {
            tracing::debug!(detail = %out.failure_detail(), "no previous remote to remove");
        }
        Ok(_) => tracing::debug!(remote = REMOTE_NAME, "removed previous remote"),
        Err(err) => tracing::debug!(error = %format!("{err:#}"), "remove previous remote"),
    }
    git(runner, dir, &["remote", "add", REMOTE_NAME, url.as_str()], "add remote")?;

    let refspec = format!("HEAD:{DEFAULT_BRANCH}");
    let push = runner.run(
        &Invocation::new("git")
            .args(["push", "-u", REMOTE_NAME, refspec.as_str()])
            .current_dir(dir)
            .inherit_stdio(),
    )?;
    if !push.success() {
        return Err(anyhow!(
            "push to {url} failed ({}); push manually with: git -C {} push -u {REMOTE_NAME} {refspec}",
            push.failure_detail(),
            dir.display()
        ));
    }
    output::success(&format!("pushed to {url}"));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::testing::RecordingRunner;
    use crate::prompt::testing::ScriptedInput;
    use std::collections::BTreeSet;

    fn package() -> PackageSpec {
        PackageSpec {
            name: "hello".to_string(),
            version: "1.0.0".to_string(),
            description: String::new(),
            dependencies: BTreeSet::new(),
        }
    }

    #[test]
    fn url_points_at_personal_repository() {
        assert_eq!(
            remote_url("alice", &package()),
            "git+ssh://alice@git.launchpad.net/~alice/hello"
        );
    }

    #[test]
    fn waits_twice_then_pushes() {
        let runner = RecordingRunner::new();
        let mut input = ScriptedInput::new(&["", ""]);
        setup_and_push(&runner, &mut input, Path::new("/w"), "alice", &package()).expect("push");
        assert_eq!(input.remaining(), 0);
        assert_eq!(
            runner.lines(),
            vec![
                "git remote remove origin",
                "git remote add origin git+ssh://alice@git.launchpad.net/~alice/hello",
                "git push -u origin HEAD:main",
            ]
        );
    }

    #[test]
    fn push_failure_is_returned_not_retried() {
        let runner = RecordingRunner::new();
        runner.respond("git push", 128, "");
        let mut input = ScriptedInput::new(&["", ""]);
        let err = setup_and_push(&runner, &mut input, Path::new("/w"), "alice", &package())
            .expect_err("push fails");
        assert!(err.to_string().contains("push manually"));
        assert_eq!(
            runner.lines().iter().filter(|l| l.starts_with("git push")).count(),
            1
        );
    }

    #[test]
    fn stale_remote_removal_errors_do_not_stop_the_push() {
        let runner = RecordingRunner::new();
        runner.fail_to_spawn("git remote remove");
        let mut input = ScriptedInput::new(&["", ""]);
        setup_and_push(&runner, &mut input, Path::new("/w"), "alice", &package()).expect("push");

        let runner_missing_remote = RecordingRunner::new();
        runner_missing_remote.respond("git remote remove", 2, "");
        let mut input = ScriptedInput::new(&["", ""]);
        setup_and_push(
            &runner_missing_remote,
            &mut input,
            Path::new("/w"),
            "alice",
            &package(),
        )
        .expect("push");

        for lines in [runner.lines(), runner_missing_remote.lines()] {
            assert_eq!(lines.len(), 3);
            assert_eq!(lines[2], "git push -u origin HEAD:main");
        }
    }
}
