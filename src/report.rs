//! Run report snapshot and history log.
//!
//! The report sits next to the build artifacts; the history is one JSON
//! line per run. Neither may fail a run.
use crate::pipeline::{PipelineSummary, RunContext, StepRecord};
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

const REPORT_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Serialize)]
pub struct RunReport {
    pub schema_version: u32,
    pub tool_version: &'static str,
    pub started_at: String,
    pub finished_at_epoch_ms: u128,
    pub succeeded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aborted_at: Option<&'static str>,
    pub distribution: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maintainer: Option<MaintainerReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package: Option<PackageReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifacts: Option<ArtifactsReport>,
    pub steps: Vec<StepRecord>,
}

/// Maintainer identity without key material.
#[derive(Debug, Serialize)]
pub struct MaintainerReport {
    pub name: String,
    pub email: String,
    pub launchpad_username: String,
}

#[derive(Debug, Serialize)]
pub struct PackageReport {
    pub name: String,
    pub version: String,
    pub description: String,
    pub ppa: String,
    pub detected_deps: Vec<String>,
    pub build_depends: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ArtifactsReport {
    pub workspace: PathBuf,
    pub tarball: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changes: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dsc: Option<PathBuf>,
}

/// Compact history line.
#[derive(Debug, Serialize)]
pub struct HistoryEntry {
    pub finished_at_epoch_ms: u128,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub succeeded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aborted_at: Option<&'static str>,
    pub advisories: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<PathBuf>,
}

pub fn now_epoch_ms() -> Result<u128> {
    Ok(SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .context("compute timestamp")?
        .as_millis())
}

pub fn build_report(
    ctx: &RunContext,
    summary: &PipelineSummary,
    finished_at_epoch_ms: u128,
) -> RunReport {
    let maintainer = ctx.maintainer.as_ref().map(|profile| MaintainerReport {
        name: profile.name.clone(),
        email: profile.email.clone(),
        launchpad_username: profile.launchpad_username.clone(),
    });
    let package = ctx.package.as_ref().map(|spec| PackageReport {
        name: spec.name.clone(),
        version: spec.version.clone(),
        description: spec.description.clone(),
        ppa: ctx
            .maintainer
            .as_ref()
            .map(|profile| spec.ppa_ref(&profile.launchpad_username))
            .unwrap_or_default(),
        detected_deps: ctx
            .workspace
            .as_ref()
            .map(|workspace| workspace.detected_deps.iter().cloned().collect())
            .unwrap_or_default(),
        build_depends: ctx
            .workspace
            .as_ref()
            .map(|workspace| workspace.build_depends.clone())
            .unwrap_or_default(),
    });
    let artifacts = ctx.workspace.as_ref().map(|workspace| ArtifactsReport {
        workspace: workspace.layout.dir(),
        tarball: workspace.layout.tarball_path(),
        changes: ctx.artifacts.as_ref().map(|built| built.changes.clone()),
        dsc: ctx.artifacts.as_ref().map(|built| built.dsc.clone()),
    });
    RunReport {
        schema_version: REPORT_SCHEMA_VERSION,
        tool_version: env!("CARGO_PKG_VERSION"),
        started_at: ctx.started_at.to_rfc3339(),
        finished_at_epoch_ms,
        succeeded: summary.succeeded(),
        aborted_at: summary.aborted_at,
        distribution: ctx.distribution.clone(),
        maintainer,
        package,
        artifacts,
        steps: summary.steps.clone(),
    }
}

/// Write the report snapshot, replacing any previous one.
pub fn write_report(path: &Path, report: &RunReport) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    let text = serde_json::to_string_pretty(report).context("serialize run report")?;
    fs::write(path, text.as_bytes()).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

/// Append a history entry as JSONL.
pub fn append_history(path: &Path, entry: &HistoryEntry) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    let mut file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open {}", path.display()))?;
    let mut line = serde_json::to_string(entry).context("serialize history entry")?;
    line.push('\n');
    file.write_all(line.as_bytes())
        .with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

/// Record the run. The report is only written once a workspace exists.
pub fn persist_run(ctx: &RunContext, summary: &PipelineSummary) {
    let finished_at_epoch_ms = match now_epoch_ms() {
        Ok(ms) => ms,
        Err(err) => {
            tracing::warn!(error = %err, "skipping run report");
            return;
        }
    };
    let report = build_report(ctx, summary, finished_at_epoch_ms);
    let report_path = ctx
        .workspace
        .as_ref()
        .map(|workspace| workspace.layout.report_path());
    let written = report_path.filter(|path| match write_report(path, &report) {
        Ok(()) => {
            tracing::info!(path = %path.display(), "wrote run report");
            true
        }
        Err(err) => {
            tracing::warn!(error = %format!("{err:#}"), "failed to write run report");
            false
        }
    });

    let Some(history_path) = ctx.settings.history_path.as_deref() else {
        return;
    };
    let entry = HistoryEntry {
        finished_at_epoch_ms,
        package: report.package.as_ref().map(|p| p.name.clone()),
        version: report.package.as_ref().map(|p| p.version.clone()),
        succeeded: report.succeeded,
        aborted_at: report.aborted_at,
        advisories: summary.advisories(),
        report: written,
    };
    if let Err(err) = append_history(history_path, &entry) {
        tracing::warn!(error = %format!("{err:#}"), "failed to append run history");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::model::{MaintainerProfile, PackageSpec};
    use crate::pipeline::{StepPolicy, StepStatus};
    use chrono::{FixedOffset, TimeZone};
    use std::collections::BTreeSet;
    use tempfile::TempDir;

    fn context(root: &Path) -> RunContext {
        let settings = Settings {
            config_path: root.join("maintainer.conf"),
            work_root: root.join("work"),
            history_path: Some(root.join("state").join("history.jsonl")),
        };
        let started_at = FixedOffset::east_opt(0)
            .expect("offset")
            .timestamp_opt(1_420_000_000, 0)
            .single()
            .expect("timestamp");
        let mut ctx = RunContext::new(
            settings,
            root.to_path_buf(),
            "noble".to_string(),
            started_at,
        );
        ctx.maintainer = Some(MaintainerProfile {
            name: "Alice".to_string(),
            email: "alice@example.org".to_string(),
            launchpad_username: "alice".to_string(),
            gpg_key_id: Some("SECRETKEYID".to_string()),
        });
        ctx.package = Some(PackageSpec {
            name: "hello".to_string(),
            version: "1.0.0".to_string(),
            description: "Says hello".to_string(),
            dependencies: BTreeSet::new(),
        });
        ctx
    }

    fn aborted_summary() -> PipelineSummary {
        PipelineSummary {
            steps: vec![StepRecord {
                name: "preflight",
                policy: StepPolicy::AbortOnFatal,
                status: StepStatus::Fatal,
                message: Some("install required host packages".to_string()),
            }],
            aborted_at: Some("preflight"),
        }
    }

    #[test]
    fn report_omits_key_material() {
        let root = TempDir::new().expect("root");
        let ctx = context(root.path());
        let report = build_report(&ctx, &aborted_summary(), 42);
        let json = serde_json::to_string(&report).expect("json");
        assert!(!json.contains("SECRETKEYID"));
        assert!(json.contains("\"ppa\":\"ppa:alice/hello\""));
        assert!(json.contains("\"aborted_at\":\"preflight\""));
        assert!(json.contains("\"started_at\":\"2014-12-31T04:26:40+00:00\""));
    }

    #[test]
    fn history_appends_one_line_per_run() {
        let root = TempDir::new().expect("root");
        let ctx = context(root.path());
        persist_run(&ctx, &aborted_summary());
        persist_run(&ctx, &aborted_summary());

        let path = ctx.settings.history_path.as_ref().expect("history path");
        let text = fs::read_to_string(path).expect("history");
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let entry: serde_json::Value = serde_json::from_str(lines[0]).expect("json line");
        assert_eq!(entry["package"], "hello");
        assert_eq!(entry["succeeded"], false);
        assert!(entry.get("report").is_none());
    }

    #[test]
    fn report_write_failure_is_not_an_error_for_the_run() {
        let root = TempDir::new().expect("root");
        let mut ctx = context(root.path());
        // A file where the history directory should be.
        fs::write(root.path().join("state"), "").expect("blocker");
        ctx.settings.history_path = Some(root.path().join("state").join("history.jsonl"));
        persist_run(&ctx, &aborted_summary());
        assert!(append_history(
            ctx.settings.history_path.as_deref().expect("path"),
            &HistoryEntry {
                finished_at_epoch_ms: 0,
                package: None,
                version: None,
                succeeded: true,
                aborted_at: None,
                advisories: 0,
                report: None,
            }
        )
        .is_err());
    }
}
