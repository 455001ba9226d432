//! Upload of the signed source package with `dput`.
//!
//! The dput configuration is written next to the artifacts and passed with
//! `-c`, leaving `~/.dput.cf` alone.
use crate::exec::{run_checked, CommandRunner, Invocation};
use crate::model::PackageSpec;
use crate::output;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

pub const PPA_HOST: &str = "ppa.launchpad.net";

/// dput stanza for one PPA.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DputTarget {
    pub name: String,
    pub fqdn: String,
    pub incoming: String,
}

impl DputTarget {
    pub fn for_ppa(launchpad_username: &str, package: &PackageSpec) -> Self {
        Self {
            name: format!("ppa-{}", package.name),
            fqdn: PPA_HOST.to_string(),
            incoming: format!("~{}/ubuntu/{}/", launchpad_username, package.name),
        }
    }

    pub fn render(&self) -> String {
        format!(
            "[{}]\nfqdn = {}\nmethod = ftp\nincoming = {}\nlogin = anonymous\nallow_unsigned_uploads = 0\n",
            self.name, self.fqdn, self.incoming
        )
    }
}

/// Write the dput config and upload `changes`.
pub fn upload(
    runner: &dyn CommandRunner,
    target: &DputTarget,
    config_path: &Path,
    changes: &Path,
) -> Result<()> {
    fs::write(config_path, target.render())
        .with_context(|| format!("write {}", config_path.display()))?;
    let changes_arg = changes.display().to_string();
    let config_arg = config_path.display().to_string();
    run_checked(
        runner,
        &Invocation::new("dput")
            .args(["-c", config_arg.as_str(), target.name.as_str(), changes_arg.as_str()])
            .inherit_stdio(),
        "upload to PPA",
    )?;
    output::success(&format!("uploaded {} to {}", changes_arg, target.incoming));
    Ok(())
}
