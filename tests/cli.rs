//! Command-line surface of the compiled binary.
//!
//! The interactive run installs packages and talks to Launchpad, so only
//! the non-interactive paths are exercised here.

mod common;

use common::{ppa_upload, run, stderr, stdout};
use tempfile::TempDir;

#[test]
fn help_lists_flags_and_prompt_order() {
    let home = TempDir::new().expect("home");
    let output = run(ppa_upload(home.path()).arg("--help"));
    assert!(output.status.success());
    let text = stdout(&output);
    for flag in ["--config", "--work-root", "--verbose"] {
        assert!(text.contains(flag), "missing {flag} in:\n{text}");
    }
    assert!(text.contains("PPA_UPLOAD_CONFIG"));
    assert!(text.contains("maintainer identity -> signing key"));
}

#[test]
fn version_matches_package() {
    let home = TempDir::new().expect("home");
    let output = run(ppa_upload(home.path()).arg("--version"));
    assert!(output.status.success());
    assert_eq!(
        stdout(&output).trim(),
        format!("ppa-upload {}", env!("CARGO_PKG_VERSION"))
    );
}

#[test]
fn unknown_flag_is_a_usage_error() {
    let home = TempDir::new().expect("home");
    let output = run(ppa_upload(home.path()).arg("--no-such-flag"));
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("--no-such-flag"));
    assert!(!home.path().join(".config/ppa-upload").exists());
}
