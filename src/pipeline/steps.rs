//! The upload run as a table of steps.
use super::{Capabilities, RunContext, Step, StepOutcome, StepPolicy};
use crate::debian::ScaffoldInputs;
use crate::output;
use crate::upload::DputTarget;
use crate::workspace::{self, WorkspaceLayout};
use crate::{
    builddeps, collect, config, gpg, package, preflight, register, remote, upload, vcs,
};
use anyhow::{Context, Result};

pub const STEPS: &[Step] = &[
    Step {
        name: "preflight",
        title: "Checking host dependencies",
        policy: StepPolicy::AbortOnFatal,
        run: preflight_step,
    },
    Step {
        name: "maintainer",
        title: "Maintainer details",
        policy: StepPolicy::AbortOnFatal,
        run: maintainer_step,
    },
    Step {
        name: "signing-key",
        title: "Signing key",
        policy: StepPolicy::AbortOnFatal,
        run: signing_key_step,
    },
    Step {
        name: "save-profile",
        title: "Saving maintainer profile",
        policy: StepPolicy::ContinueOnAdvisory,
        run: save_profile_step,
    },
    Step {
        name: "source-dir",
        title: "Source directory",
        policy: StepPolicy::AbortOnFatal,
        run: source_dir_step,
    },
    Step {
        name: "package",
        title: "Package details",
        policy: StepPolicy::AbortOnFatal,
        run: package_step,
    },
    Step {
        name: "confirm-registration",
        title: "System registration",
        policy: StepPolicy::AbortOnFatal,
        run: confirm_registration_step,
    },
    Step {
        name: "workspace",
        title: "Preparing build workspace",
        policy: StepPolicy::AbortOnFatal,
        run: workspace_step,
    },
    Step {
        name: "build-deps",
        title: "Installing build dependencies",
        policy: StepPolicy::AbortOnFatal,
        run: build_deps_step,
    },
    Step {
        name: "build",
        title: "Building signed source package",
        policy: StepPolicy::AbortOnFatal,
        run: build_step,
    },
    Step {
        name: "vcs",
        title: "Recording sources in git",
        policy: StepPolicy::ContinueOnAdvisory,
        run: vcs_step,
    },
    Step {
        name: "remote",
        title: "Launchpad code repository",
        policy: StepPolicy::ContinueOnAdvisory,
        run: remote_step,
    },
    Step {
        name: "upload",
        title: "Uploading to PPA",
        policy: StepPolicy::AbortOnFatal,
        run: upload_step,
    },
    Step {
        name: "register",
        title: "Adding PPA to software sources",
        policy: StepPolicy::ContinueOnAdvisory,
        run: register_step,
    },
    Step {
        name: "summary",
        title: "Summary",
        policy: StepPolicy::ContinueOnAdvisory,
        run: summary_step,
    },
];

fn preflight_step(_ctx: &mut RunContext, caps: &mut Capabilities<'_>) -> Result<StepOutcome> {
    preflight::run_preflight(caps.runner)?;
    Ok(StepOutcome::Success)
}

fn maintainer_step(ctx: &mut RunContext, caps: &mut Capabilities<'_>) -> Result<StepOutcome> {
    let path = &ctx.settings.config_path;
    ctx.saved_profile = match config::load_profile(path) {
        Ok(profile) => profile,
        Err(err) => {
            output::warn(&format!("ignoring saved profile: {err:#}"));
            None
        }
    };
    let profile = collect::collect_maintainer(caps.input, ctx.saved_profile.as_ref())?;
    ctx.maintainer = Some(profile);
    Ok(StepOutcome::Success)
}

fn signing_key_step(ctx: &mut RunContext, caps: &mut Capabilities<'_>) -> Result<StepOutcome> {
    let key_id = gpg::ensure_signing_key(caps.runner, ctx.maintainer()?)?;
    if let Some(profile) = ctx.maintainer.as_mut() {
        profile.gpg_key_id = Some(key_id);
    }
    Ok(StepOutcome::Success)
}

fn save_profile_step(ctx: &mut RunContext, _caps: &mut Capabilities<'_>) -> Result<StepOutcome> {
    let profile = ctx.maintainer()?;
    if ctx.saved_profile.as_ref() == Some(profile) {
        return Ok(StepOutcome::Skipped("profile unchanged".to_string()));
    }
    config::save_profile(&ctx.settings.config_path, profile)?;
    output::success(&format!(
        "saved profile to {}",
        ctx.settings.config_path.display()
    ));
    Ok(StepOutcome::Success)
}

fn source_dir_step(ctx: &mut RunContext, caps: &mut Capabilities<'_>) -> Result<StepOutcome> {
    let dir = collect::collect_source_dir(caps.input, &ctx.cwd)?;
    ctx.source_dir = Some(dir);
    Ok(StepOutcome::Success)
}

fn package_step(ctx: &mut RunContext, caps: &mut Capabilities<'_>) -> Result<StepOutcome> {
    let spec = collect::collect_package(caps.input, ctx.source_dir()?)?;
    output::info(&format!(
        "detected build dependencies: {}",
        spec.dependencies
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    ));
    ctx.package = Some(spec);
    Ok(StepOutcome::Success)
}

fn confirm_registration_step(
    ctx: &mut RunContext,
    caps: &mut Capabilities<'_>,
) -> Result<StepOutcome> {
    let ppa_ref = ctx.package()?.ppa_ref(&ctx.maintainer()?.launchpad_username);
    ctx.register_ppa = collect::confirm_registration(caps.input, &ppa_ref)?;
    Ok(StepOutcome::Success)
}

fn workspace_step(ctx: &mut RunContext, _caps: &mut Capabilities<'_>) -> Result<StepOutcome> {
    let package = ctx.package()?;
    let layout = WorkspaceLayout::new(&ctx.settings.work_root, package);
    let inputs = ScaffoldInputs {
        package,
        maintainer: ctx.maintainer()?,
        detected_deps: &package.dependencies,
        distribution: &ctx.distribution,
        date: ctx.started_at,
    };
    let built = workspace::build_workspace(layout, ctx.source_dir()?, &inputs)?;
    output::success(&format!("workspace ready at {}", built.layout.dir().display()));
    ctx.workspace = Some(built);
    Ok(StepOutcome::Success)
}

fn build_deps_step(ctx: &mut RunContext, caps: &mut Capabilities<'_>) -> Result<StepOutcome> {
    builddeps::install_build_deps(caps.runner, &ctx.workspace()?.layout.dir())?;
    Ok(StepOutcome::Success)
}

fn build_step(ctx: &mut RunContext, caps: &mut Capabilities<'_>) -> Result<StepOutcome> {
    let artifacts =
        package::build_source_package(caps.runner, &ctx.workspace()?.layout, ctx.key_id()?)?;
    output::success(&format!("built {}", artifacts.changes.display()));
    ctx.artifacts = Some(artifacts);
    Ok(StepOutcome::Success)
}

fn vcs_step(ctx: &mut RunContext, caps: &mut Capabilities<'_>) -> Result<StepOutcome> {
    vcs::init_and_commit(
        caps.runner,
        &ctx.workspace()?.layout.dir(),
        ctx.package()?,
        ctx.maintainer()?,
    )?;
    ctx.vcs_ready = true;
    output::success("committed workspace to a local git repository");
    Ok(StepOutcome::Success)
}

fn remote_step(ctx: &mut RunContext, caps: &mut Capabilities<'_>) -> Result<StepOutcome> {
    if !ctx.vcs_ready {
        return Ok(StepOutcome::Skipped(
            "no local repository to push".to_string(),
        ));
    }
    remote::setup_and_push(
        caps.runner,
        caps.input,
        &ctx.workspace()?.layout.dir(),
        &ctx.maintainer()?.launchpad_username,
        ctx.package()?,
    )?;
    Ok(StepOutcome::Success)
}

fn upload_step(ctx: &mut RunContext, caps: &mut Capabilities<'_>) -> Result<StepOutcome> {
    let target = DputTarget::for_ppa(&ctx.maintainer()?.launchpad_username, ctx.package()?);
    upload::upload(
        caps.runner,
        &target,
        &ctx.workspace()?.layout.dput_config_path(),
        &ctx.artifacts()?.changes,
    )?;
    Ok(StepOutcome::Success)
}

fn register_step(ctx: &mut RunContext, caps: &mut Capabilities<'_>) -> Result<StepOutcome> {
    let ppa_ref = ctx.package()?.ppa_ref(&ctx.maintainer()?.launchpad_username);
    if !ctx.register_ppa {
        return Ok(StepOutcome::Skipped(format!(
            "add it later with: {}",
            register::add_repository_invocation(&ppa_ref).display()
        )));
    }
    register::register_ppa(caps.runner, &ppa_ref).with_context(|| {
        format!(
            "add it manually with: {}",
            register::add_repository_invocation(&ppa_ref).display()
        )
    })?;
    output::success(&format!("{ppa_ref} added to software sources"));
    Ok(StepOutcome::Success)
}

fn summary_step(ctx: &mut RunContext, _caps: &mut Capabilities<'_>) -> Result<StepOutcome> {
    let package = ctx.package()?;
    let user = &ctx.maintainer()?.launchpad_username;
    let artifacts = ctx.artifacts()?;
    output::success(&format!(
        "{} {} uploaded to {}",
        package.name,
        package.version,
        package.ppa_ref(user)
    ));
    output::detail(&format!("changes: {}", artifacts.changes.display()));
    output::detail(&format!("dsc:     {}", artifacts.dsc.display()));
    output::detail(&format!("PPA:     {}", package.ppa_homepage(user)));
    output::info("Launchpad emails the maintainer once the upload is accepted and built");
    Ok(StepOutcome::Success)
}
