//! `debian/changelog` entries.
//!
//! See https://www.debian.org/doc/debian-policy/ch-source.html#debian-changelog-debian-changelog
use chrono::{DateTime, FixedOffset};

/// Series used when the host does not report one.
pub const FALLBACK_DISTRIBUTION: &str = "jammy";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangelogEntry {
    pub package: String,
    pub version: String,
    pub distribution: String,
    pub urgency: String,
    pub changes: Vec<String>,
    pub maintainer: String,
    pub date: DateTime<FixedOffset>,
}

impl ChangelogEntry {
    /*
    package (version) distribution; urgency=urgency

      * change details

     -- maintainer name <email address>  date
    */
    pub fn render(&self) -> String {
        let mut out = format!(
            "{} ({}) {}; urgency={}\n\n",
            self.package, self.version, self.distribution, self.urgency
        );
        for change in &self.changes {
            out.push_str("  * ");
            out.push_str(&super::control::single_line(change));
            out.push('\n');
        }
        out.push_str(&format!(
            "\n -- {}  {}\n",
            self.maintainer,
            self.date.to_rfc2822()
        ));
        out
    }
}

/// Codename of the running release from os-release text, if any.
pub fn codename_from_os_release(text: &str) -> Option<String> {
    let mut version_codename = None;
    let mut ubuntu_codename = None;
    for line in text.lines() {
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let value = value.trim().trim_matches('"').trim_matches('\'');
        if value.is_empty() {
            continue;
        }
        match key.trim() {
            "UBUNTU_CODENAME" => ubuntu_codename = Some(value.to_string()),
            "VERSION_CODENAME" => version_codename = Some(value.to_string()),
            _ => {}
        }
    }
    ubuntu_codename.or(version_codename)
}

/// Target series for the upload: the host's codename, else the fallback.
pub fn host_distribution() -> String {
    std::fs::read_to_string("/etc/os-release")
        .ok()
        .and_then(|text| codename_from_os_release(&text))
        .unwrap_or_else(|| FALLBACK_DISTRIBUTION.to_string())
}
