//! Input validation for maintainer and package fields.
//!
//! Each check returns the trimmed value on success so callers never carry
//! untrimmed input forward.
use anyhow::{anyhow, Result};
use regex::Regex;
use std::sync::OnceLock;

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$")
            .expect("regex for maintainer email")
    })
}

fn package_name_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-z][a-z0-9-]*$").expect("regex for package name"))
}

fn version_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+\.\d+\.\d+$").expect("regex for package version"))
}

pub fn is_valid_email(email: &str) -> bool {
    email_regex().is_match(email)
}

pub fn is_valid_package_name(name: &str) -> bool {
    package_name_regex().is_match(name)
}

pub fn is_valid_version(version: &str) -> bool {
    version_regex().is_match(version)
}

/// Validate a maintainer email, rejecting anything without a `domain.tld` part.
pub fn validate_email(raw: &str) -> Result<String> {
    let email = raw.trim();
    if !is_valid_email(email) {
        return Err(anyhow!("invalid email address {email:?} (expected user@domain.tld)"));
    }
    Ok(email.to_string())
}

/// Validate a Debian source package name.
pub fn validate_package_name(raw: &str) -> Result<String> {
    let name = raw.trim();
    if !is_valid_package_name(name) {
        return Err(anyhow!(
            "invalid package name {name:?} (lowercase letters, digits and hyphens, starting with a letter)"
        ));
    }
    Ok(name.to_string())
}

/// Validate a strict `MAJOR.MINOR.PATCH` version.
pub fn validate_version(raw: &str) -> Result<String> {
    let version = raw.trim();
    if !is_valid_version(version) {
        return Err(anyhow!(
            "invalid version {version:?} (expected MAJOR.MINOR.PATCH, e.g. 1.0.0)"
        ));
    }
    Ok(version.to_string())
}
