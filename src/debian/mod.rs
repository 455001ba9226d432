//! Generated `debian/` metadata.
//!
//! Each document has its own typed renderer; [`scaffold`] writes the full
//! set for one package.
use crate::model::{MaintainerProfile, PackageSpec};
use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset};
use std::collections::BTreeSet;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

pub mod changelog;
pub mod control;
pub mod rules;

pub use changelog::ChangelogEntry;
pub use control::ControlFile;
pub use rules::RulesScript;

/// debhelper compatibility level written to `debian/compat`.
pub const COMPAT_LEVEL: u32 = 10;
pub const SOURCE_FORMAT: &str = "3.0 (native)";

/// Inputs that vary per run besides the package and maintainer.
#[derive(Debug, Clone)]
pub struct ScaffoldInputs<'a> {
    pub package: &'a PackageSpec,
    pub maintainer: &'a MaintainerProfile,
    pub detected_deps: &'a BTreeSet<String>,
    pub distribution: &'a str,
    pub date: DateTime<FixedOffset>,
}

impl ScaffoldInputs<'_> {
    pub fn control(&self) -> ControlFile {
        ControlFile {
            source: self.package.name.clone(),
            section: "utils".to_string(),
            priority: "optional".to_string(),
            maintainer: self.maintainer.maintainer_line(),
            build_depends: control::merge_build_depends(
                control::BASELINE_BUILD_DEPENDS,
                self.detected_deps,
            ),
            homepage: self
                .package
                .ppa_homepage(&self.maintainer.launchpad_username),
            package: self.package.name.clone(),
            depends: "${shlibs:Depends}, ${misc:Depends}".to_string(),
            synopsis: self.package.description.clone(),
        }
    }

    pub fn changelog(&self) -> ChangelogEntry {
        ChangelogEntry {
            package: self.package.name.clone(),
            version: self.package.version.clone(),
            distribution: self.distribution.to_string(),
            urgency: "medium".to_string(),
            changes: vec![format!("Initial release of {}.", self.package.name)],
            maintainer: self.maintainer.maintainer_line(),
            date: self.date,
        }
    }
}

/// Write control, rules, compat, changelog and source/format under
/// `<root>/debian`, replacing any previous contents.
pub fn scaffold(root: &Path, inputs: &ScaffoldInputs<'_>) -> Result<PathBuf> {
    let debian_dir = root.join("debian");
    if debian_dir.exists() {
        fs::remove_dir_all(&debian_dir)
            .with_context(|| format!("remove {}", debian_dir.display()))?;
    }
    fs::create_dir_all(debian_dir.join("source"))
        .with_context(|| format!("create {}", debian_dir.display()))?;

    write_text(&debian_dir.join("control"), &inputs.control().render())?;
    let rules_path = debian_dir.join("rules");
    write_text(&rules_path, &RulesScript::default().render())?;
    fs::set_permissions(&rules_path, fs::Permissions::from_mode(0o755))
        .with_context(|| format!("chmod {}", rules_path.display()))?;
    write_text(&debian_dir.join("compat"), &format!("{COMPAT_LEVEL}\n"))?;
    write_text(&debian_dir.join("changelog"), &inputs.changelog().render())?;
    write_text(
        &debian_dir.join("source").join("format"),
        &format!("{SOURCE_FORMAT}\n"),
    )?;
    tracing::debug!(dir = %debian_dir.display(), "wrote debian metadata");
    Ok(debian_dir)
}

fn write_text(path: &Path, text: &str) -> Result<()> {
    fs::write(path, text.as_bytes()).with_context(|| format!("write {}", path.display()))
}
