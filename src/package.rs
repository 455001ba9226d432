//! Source package build and signing with `debuild`.
use crate::exec::{run_checked, CommandRunner, Invocation};
use crate::workspace::WorkspaceLayout;
use anyhow::{anyhow, Result};
use std::path::PathBuf;

/// Answers fed to debuild's confirmation prompts.
const AUTO_CONFIRM: &str = "y\n";
const AUTO_CONFIRM_REPEAT: usize = 32;

/// Signed artifacts of a successful build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildArtifacts {
    pub changes: PathBuf,
    pub dsc: PathBuf,
}

pub fn debuild_invocation(layout: &WorkspaceLayout, key_id: &str) -> Invocation {
    Invocation::new("debuild")
        .args(["-S", "-sa"])
        .arg(format!("-k{key_id}"))
        .current_dir(&layout.dir())
        .stdin(AUTO_CONFIRM.repeat(AUTO_CONFIRM_REPEAT))
        .inherit_stdio()
}

/// Build and sign the source package. Any failure is fatal to the run.
pub fn build_source_package(
    runner: &dyn CommandRunner,
    layout: &WorkspaceLayout,
    key_id: &str,
) -> Result<BuildArtifacts> {
    run_checked(
        runner,
        &debuild_invocation(layout, key_id),
        "build source package",
    )?;
    tracing::debug!(workspace = %layout.dir().display(), "debuild finished");

    let changes = layout.changes_path();
    if !changes.is_file() {
        return Err(anyhow!(
            "debuild succeeded but {} was not produced",
            changes.display()
        ));
    }
    Ok(BuildArtifacts {
        changes,
        dsc: layout.dsc_path(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::testing::RecordingRunner;
    use crate::exec::StdioMode;
    use crate::model::PackageSpec;
    use std::collections::BTreeSet;
    use tempfile::TempDir;

    fn layout(root: &std::path::Path) -> WorkspaceLayout {
        let spec = PackageSpec {
            name: "hello".to_string(),
            version: "1.0.0".to_string(),
            description: String::new(),
            dependencies: BTreeSet::new(),
        };
        WorkspaceLayout::new(root, &spec)
    }

    #[test]
    fn invocation_signs_with_key_and_confirms() {
        let inv = debuild_invocation(&layout(std::path::Path::new("/w")), "ABCD");
        assert_eq!(inv.args, vec!["-S", "-sa", "-kABCD"]);
        assert_eq!(inv.cwd, Some(PathBuf::from("/w/hello-1.0.0")));
        assert!(inv.stdin.as_deref().is_some_and(|s| s.starts_with("y\ny\n")));
        assert_eq!(inv.stdio, StdioMode::Inherited);
    }

    #[test]
    fn successful_build_reports_artifacts() {
        let root = TempDir::new().expect("root");
        let layout = layout(root.path());
        std::fs::write(layout.changes_path(), "Format: 1.8\n").expect("changes");
        let runner = RecordingRunner::new();
        let artifacts = build_source_package(&runner, &layout, "ABCD").expect("build");
        assert_eq!(artifacts.changes, layout.changes_path());
    }

    #[test]
    fn failed_build_is_fatal() {
        let root = TempDir::new().expect("root");
        let runner = RecordingRunner::new();
        runner.respond("debuild", 2, "");
        let err = build_source_package(&runner, &layout(root.path()), "ABCD").expect_err("fails");
        assert!(err.to_string().contains("build source package failed"));
    }

    #[test]
    fn missing_changes_file_is_fatal() {
        let root = TempDir::new().expect("root");
        let runner = RecordingRunner::new();
        assert!(build_source_package(&runner, &layout(root.path()), "ABCD").is_err());
    }
}
