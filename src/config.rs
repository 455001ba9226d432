//! Maintainer profile persistence and resolved runtime paths.
//!
//! The profile file is plain shell-sourceable `KEY="value"` text so it can
//! be inspected or sourced by hand. Only the owner may read it.
use crate::model::MaintainerProfile;
use anyhow::{anyhow, Context, Result};
use std::fs;
use std::io::Write;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

const KEY_NAME: &str = "MAINTAINER_NAME";
const KEY_EMAIL: &str = "MAINTAINER_EMAIL";
const KEY_LAUNCHPAD: &str = "LAUNCHPAD_USERNAME";
const KEY_GPG: &str = "GPG_KEY";

/// Mode applied to the profile file.
pub const CONFIG_FILE_MODE: u32 = 0o600;

/// Paths a run reads and writes, resolved once at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    pub config_path: PathBuf,
    pub work_root: PathBuf,
    pub history_path: Option<PathBuf>,
}

impl Settings {
    /// Resolve settings from CLI overrides, falling back to per-user defaults.
    pub fn resolve(config: Option<&Path>, work_root: Option<&Path>) -> Result<Self> {
        let config_path = match config {
            Some(path) => path.to_path_buf(),
            None => default_config_path()?,
        };
        let work_root = work_root
            .map(Path::to_path_buf)
            .unwrap_or_else(|| std::env::temp_dir().join("ppa-upload"));
        let history_path = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .map(|dir| dir.join("ppa-upload").join("history.jsonl"));
        Ok(Self {
            config_path,
            work_root,
            history_path,
        })
    }
}

fn default_config_path() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .or_else(dirs::home_dir)
        .ok_or_else(|| anyhow!("cannot determine home directory"))?;
    Ok(config_dir.join("ppa-upload").join("maintainer.conf"))
}

/// Load a saved profile. A missing file is `Ok(None)`, not an error.
pub fn load_profile(path: &Path) -> Result<Option<MaintainerProfile>> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "no saved maintainer profile");
            return Ok(None);
        }
        Err(err) => {
            return Err(err).with_context(|| format!("read config {}", path.display()));
        }
    };
    Ok(Some(parse_profile(&text)))
}

/// Persist a profile atomically with owner-only permissions.
pub fn save_profile(path: &Path, profile: &MaintainerProfile) -> Result<()> {
    let parent = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;

    let mut tmp = tempfile::NamedTempFile::new_in(parent)
        .with_context(|| format!("create temp file in {}", parent.display()))?;
    tmp.as_file()
        .set_permissions(fs::Permissions::from_mode(CONFIG_FILE_MODE))
        .context("restrict config permissions")?;
    tmp.write_all(render_profile(profile).as_bytes())
        .context("write config")?;
    tmp.persist(path)
        .map_err(|err| err.error)
        .with_context(|| format!("write {}", path.display()))?;
    tracing::debug!(path = %path.display(), "saved maintainer profile");
    Ok(())
}

/// Render a profile as shell-sourceable assignments.
pub fn render_profile(profile: &MaintainerProfile) -> String {
    let mut out = String::new();
    let fields = [
        (KEY_NAME, profile.name.as_str()),
        (KEY_EMAIL, profile.email.as_str()),
        (KEY_LAUNCHPAD, profile.launchpad_username.as_str()),
        (KEY_GPG, profile.gpg_key_id.as_deref().unwrap_or("")),
    ];
    for (key, value) in fields {
        out.push_str(key);
        out.push('=');
        out.push_str(&shell_double_quote(value));
        out.push('\n');
    }
    out
}

/// Parse assignments back into a profile; unknown keys and comments are ignored.
pub fn parse_profile(text: &str) -> MaintainerProfile {
    let mut profile = MaintainerProfile::default();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line);
        let Some((key, raw)) = line.split_once('=') else {
            continue;
        };
        let value = shell_unquote(raw.trim());
        match key.trim() {
            KEY_NAME => profile.name = value,
            KEY_EMAIL => profile.email = value,
            KEY_LAUNCHPAD => profile.launchpad_username = value,
            KEY_GPG => profile.gpg_key_id = Some(value).filter(|v| !v.is_empty()),
            _ => {}
        }
    }
    profile
}

fn shell_double_quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        if matches!(ch, '"' | '\\' | '$' | '`') {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push('"');
    out
}

fn shell_unquote(raw: &str) -> String {
    if let Some(inner) = raw
        .strip_prefix('\'')
        .and_then(|rest| rest.strip_suffix('\''))
    {
        return inner.to_string();
    }
    let Some(inner) = raw.strip_prefix('"').and_then(|rest| rest.strip_suffix('"')) else {
        return raw.to_string();
    };
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            match chars.next() {
                Some(next @ ('"' | '\\' | '$' | '`')) => out.push(next),
                Some(other) => {
                    out.push('\\');
                    out.push(other);
                }
                None => out.push('\\'),
            }
        } else {
            out.push(ch);
        }
    }
    out
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
