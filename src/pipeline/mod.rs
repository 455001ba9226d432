//! Step sequencer for the upload run.
//!
//! Steps are listed in a table ([`steps::STEPS`]) with a failure policy
//! each. The sequencer owns the policy decisions; steps only report what
//! happened.
use crate::config::Settings;
use crate::exec::CommandRunner;
use crate::model::{MaintainerProfile, PackageSpec};
use crate::output;
use crate::package::BuildArtifacts;
use crate::prompt::InputProvider;
use crate::workspace::BuildWorkspace;
use anyhow::{anyhow, Result};
use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use std::path::{Path, PathBuf};

pub mod steps;

/// What a step reports back to the sequencer.
#[derive(Debug)]
pub enum StepOutcome {
    Success,
    /// Nothing to do this run.
    Skipped(String),
    /// Completed with a problem the run can live with.
    Advisory(String),
    Fatal(anyhow::Error),
}

impl From<Result<StepOutcome>> for StepOutcome {
    fn from(result: Result<StepOutcome>) -> Self {
        result.unwrap_or_else(StepOutcome::Fatal)
    }
}

/// How the sequencer treats a fatal outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepPolicy {
    /// An error ends the run with a failure exit code.
    AbortOnFatal,
    /// An error is downgraded to a warning and the run continues.
    ContinueOnAdvisory,
}

pub type StepFn = fn(&mut RunContext, &mut Capabilities<'_>) -> Result<StepOutcome>;

/// One row of the step table.
pub struct Step {
    pub name: &'static str,
    pub title: &'static str,
    pub policy: StepPolicy,
    pub run: StepFn,
}

/// Host capabilities a step may use.
pub struct Capabilities<'a> {
    pub runner: &'a dyn CommandRunner,
    pub input: &'a mut dyn InputProvider,
}

/// State threaded through every step of a run.
#[derive(Debug)]
pub struct RunContext {
    pub settings: Settings,
    pub cwd: PathBuf,
    pub distribution: String,
    pub started_at: DateTime<FixedOffset>,
    pub saved_profile: Option<MaintainerProfile>,
    pub maintainer: Option<MaintainerProfile>,
    pub source_dir: Option<PathBuf>,
    pub package: Option<PackageSpec>,
    pub register_ppa: bool,
    pub workspace: Option<BuildWorkspace>,
    pub artifacts: Option<BuildArtifacts>,
    pub vcs_ready: bool,
}

impl RunContext {
    pub fn new(
        settings: Settings,
        cwd: PathBuf,
        distribution: String,
        started_at: DateTime<FixedOffset>,
    ) -> Self {
        Self {
            settings,
            cwd,
            distribution,
            started_at,
            saved_profile: None,
            maintainer: None,
            source_dir: None,
            package: None,
            register_ppa: false,
            workspace: None,
            artifacts: None,
            vcs_ready: false,
        }
    }

    pub fn maintainer(&self) -> Result<&MaintainerProfile> {
        self.maintainer
            .as_ref()
            .ok_or_else(|| anyhow!("maintainer details were not collected"))
    }

    pub fn package(&self) -> Result<&PackageSpec> {
        self.package
            .as_ref()
            .ok_or_else(|| anyhow!("package details were not collected"))
    }

    pub fn source_dir(&self) -> Result<&Path> {
        self.source_dir
            .as_deref()
            .ok_or_else(|| anyhow!("source directory was not collected"))
    }

    pub fn workspace(&self) -> Result<&BuildWorkspace> {
        self.workspace
            .as_ref()
            .ok_or_else(|| anyhow!("workspace was not built"))
    }

    pub fn artifacts(&self) -> Result<&BuildArtifacts> {
        self.artifacts
            .as_ref()
            .ok_or_else(|| anyhow!("source package was not built"))
    }

    pub fn key_id(&self) -> Result<&str> {
        self.maintainer()?
            .gpg_key_id
            .as_deref()
            .ok_or_else(|| anyhow!("no signing key selected"))
    }
}

/// Final status of one step, as recorded in the run report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Success,
    Skipped,
    Advisory,
    Fatal,
}

#[derive(Debug, Clone, Serialize)]
pub struct StepRecord {
    pub name: &'static str,
    pub policy: StepPolicy,
    pub status: StepStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Result of running a step table.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineSummary {
    pub steps: Vec<StepRecord>,
    /// Name of the step that ended the run, if one did.
    pub aborted_at: Option<&'static str>,
}

impl PipelineSummary {
    pub fn succeeded(&self) -> bool {
        self.aborted_at.is_none()
    }

    pub fn advisories(&self) -> usize {
        self.steps
            .iter()
            .filter(|record| record.status == StepStatus::Advisory)
            .count()
    }
}

/// Run `table` in order, applying each step's policy.
pub fn run_steps(
    table: &[Step],
    ctx: &mut RunContext,
    caps: &mut Capabilities<'_>,
) -> PipelineSummary {
    let mut records = Vec::with_capacity(table.len());
    for step in table {
        output::step(step.title);
        let span = tracing::info_span!("step", name = step.name);
        let _guard = span.enter();
        let outcome = StepOutcome::from((step.run)(ctx, caps));
        let (status, message) = match outcome {
            StepOutcome::Success => (StepStatus::Success, None),
            StepOutcome::Skipped(reason) => {
                output::info(&format!("skipped: {reason}"));
                (StepStatus::Skipped, Some(reason))
            }
            StepOutcome::Advisory(message) => {
                output::warn(&message);
                (StepStatus::Advisory, Some(message))
            }
            StepOutcome::Fatal(err) => match step.policy {
                StepPolicy::AbortOnFatal => {
                    output::error(&format!("{}: {err:#}", step.title));
                    tracing::debug!(error = ?err, "fatal step error");
                    (StepStatus::Fatal, Some(format!("{err:#}")))
                }
                StepPolicy::ContinueOnAdvisory => {
                    output::warn(&format!("{}: {err:#}", step.title));
                    (StepStatus::Advisory, Some(format!("{err:#}")))
                }
            },
        };
        tracing::debug!(?status, "step finished");
        records.push(StepRecord {
            name: step.name,
            policy: step.policy,
            status,
            message,
        });
        if status == StepStatus::Fatal {
            return PipelineSummary {
                steps: records,
                aborted_at: Some(step.name),
            };
        }
    }
    PipelineSummary {
        steps: records,
        aborted_at: None,
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
