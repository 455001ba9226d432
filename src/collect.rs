//! Interactive collection of maintainer, source and package details.
//!
//! Blank answers to yes/no questions accept the default (yes). Invalid
//! email, package name or version abort the run; a bad source directory is
//! asked for again.
use crate::detect;
use crate::model::{MaintainerProfile, PackageSpec};
use crate::output;
use crate::prompt::{self, InputProvider};
use crate::validate;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Reuse a saved profile if the user agrees, otherwise ask for a new one.
pub fn collect_maintainer(
    input: &mut dyn InputProvider,
    saved: Option<&MaintainerProfile>,
) -> Result<MaintainerProfile> {
    if let Some(saved) = saved.filter(|profile| profile.is_complete()) {
        output::info(&format!(
            "saved maintainer: {} (Launchpad: {})",
            saved.maintainer_line(),
            saved.launchpad_username
        ));
        if prompt::confirm(input, "Use these details?")? {
            return Ok(saved.clone());
        }
    }

    let name = prompt::ask_required(input, "Maintainer full name:")?;
    let email = validate::validate_email(&prompt::ask(input, "Maintainer email:")?)?;
    let launchpad_username = prompt::ask_required(input, "Launchpad username:")?;
    // A saved key still belongs to this identity only if the email is unchanged.
    let gpg_key_id = saved
        .filter(|profile| profile.email == email)
        .and_then(|profile| profile.gpg_key_id.clone());
    Ok(MaintainerProfile {
        name,
        email,
        launchpad_username,
        gpg_key_id,
    })
}

/// Ask until an existing directory is given; returns its canonical path.
pub fn collect_source_dir(input: &mut dyn InputProvider, cwd: &Path) -> Result<PathBuf> {
    loop {
        let answer = prompt::ask(input, "Path to the source directory:")?;
        if answer.is_empty() {
            output::warn("a source directory is required");
            continue;
        }
        let candidate = resolve_user_path(&answer, cwd);
        if !candidate.is_dir() {
            output::warn(&format!("{} is not a directory", candidate.display()));
            continue;
        }
        return candidate
            .canonicalize()
            .with_context(|| format!("resolve {}", candidate.display()));
    }
}

/// Expand a leading `~` and anchor relative paths at `cwd`.
pub fn resolve_user_path(raw: &str, cwd: &Path) -> PathBuf {
    let expanded = if raw == "~" {
        dirs::home_dir().unwrap_or_else(|| PathBuf::from(raw))
    } else if let Some(rest) = raw.strip_prefix("~/") {
        dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| PathBuf::from(raw))
    } else {
        PathBuf::from(raw)
    };
    if expanded.is_absolute() {
        expanded
    } else {
        cwd.join(expanded)
    }
}

/// Ask for name, version and description; dependencies come from the
/// heuristic over `source_dir`.
pub fn collect_package(input: &mut dyn InputProvider, source_dir: &Path) -> Result<PackageSpec> {
    let suggested = suggested_package_name(source_dir);
    let raw_name = match suggested.as_deref() {
        Some(suggested) => prompt::ask_with_default(input, "Package name", suggested)?,
        None => prompt::ask(input, "Package name:")?,
    };
    let name = validate::validate_package_name(&raw_name)?;
    let version = validate::validate_version(&prompt::ask_with_default(
        input,
        "Package version",
        "1.0.0",
    )?)?;
    let default_description = format!("{name} packaged for Launchpad");
    let description =
        prompt::ask_with_default(input, "Short description", &default_description)?;
    let dependencies = detect::detect_build_deps(source_dir)?;
    Ok(PackageSpec {
        name,
        version,
        description,
        dependencies,
    })
}

/// The directory name lowercased, if that is already a valid package name.
pub fn suggested_package_name(source_dir: &Path) -> Option<String> {
    let name = source_dir.file_name()?.to_str()?.to_ascii_lowercase();
    validate::is_valid_package_name(&name).then_some(name)
}

pub fn confirm_registration(input: &mut dyn InputProvider, ppa_ref: &str) -> Result<bool> {
    prompt::confirm(
        input,
        &format!("Add {ppa_ref} to this system's software sources when done?"),
    )
}
