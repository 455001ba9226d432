//! Signing key lookup and generation via `gpg`.
use crate::exec::{run_checked, CommandRunner, Invocation};
use crate::model::MaintainerProfile;
use crate::output;
use anyhow::{anyhow, Context, Result};

pub const KEYSERVER: &str = "keyserver.ubuntu.com";
pub const LAUNCHPAD_KEYS_PAGE: &str = "https://launchpad.net/~/+editpgpkeys";

/// Find or create the maintainer's signing key and return its id.
pub fn ensure_signing_key(
    runner: &dyn CommandRunner,
    profile: &MaintainerProfile,
) -> Result<String> {
    let key_id = locate_or_generate(runner, profile)?;
    print_publish_instructions(&key_id);
    Ok(key_id)
}

fn locate_or_generate(runner: &dyn CommandRunner, profile: &MaintainerProfile) -> Result<String> {
    if let Some(key_id) = profile.gpg_key_id.as_deref() {
        if secret_key_exists(runner, key_id) {
            output::success(&format!("using saved signing key {key_id}"));
            return Ok(key_id.to_string());
        }
        output::warn(&format!("saved signing key {key_id} is not in the keyring"));
    }

    if let Some(key_id) = find_secret_key(runner, &profile.email)? {
        output::success(&format!("found signing key {key_id} for {}", profile.email));
        return Ok(key_id);
    }

    output::info(&format!(
        "no signing key for {}; generating one (gpg will ask for a passphrase)",
        profile.email
    ));
    generate_key(runner, profile)?;
    let key_id = find_secret_key(runner, &profile.email)?
        .ok_or_else(|| anyhow!("no secret key for {} after generation", profile.email))?;
    output::success(&format!("generated signing key {key_id}"));
    Ok(key_id)
}

fn secret_key_exists(runner: &dyn CommandRunner, key_id: &str) -> bool {
    let inv = Invocation::new("gpg").args(["--batch", "--list-secret-keys", key_id]);
    runner.run(&inv).map(|out| out.success()).unwrap_or(false)
}

/// Key id of the first secret key matching `email`, if any.
pub fn find_secret_key(runner: &dyn CommandRunner, email: &str) -> Result<Option<String>> {
    let inv = Invocation::new("gpg").args([
        "--batch",
        "--list-secret-keys",
        "--with-colons",
        email,
    ]);
    let output = runner
        .run(&inv)
        .with_context(|| format!("list secret keys for {email}"))?;
    if !output.success() {
        // gpg exits non-zero when nothing matches.
        return Ok(None);
    }
    Ok(first_secret_key_id(&output.stdout))
}

/// Parse the key id (field 5) of the first `sec` record in colon output.
pub fn first_secret_key_id(colons: &str) -> Option<String> {
    colons
        .lines()
        .filter(|line| line.starts_with("sec:"))
        .filter_map(|line| line.split(':').nth(4))
        .find(|id| !id.is_empty())
        .map(str::to_string)
}

fn generate_key(runner: &dyn CommandRunner, profile: &MaintainerProfile) -> Result<()> {
    let uid = profile.maintainer_line();
    run_checked(
        runner,
        &Invocation::new("gpg")
            .args(["--quick-generate-key", uid.as_str(), "rsa4096", "sign", "2y"])
            .inherit_stdio(),
        "generate signing key",
    )?;
    Ok(())
}

fn print_publish_instructions(key_id: &str) {
    output::info("publish the key so Launchpad can verify uploads:");
    output::detail(&shell_words::join([
        "gpg",
        "--keyserver",
        KEYSERVER,
        "--send-keys",
        key_id,
    ]));
    output::info(&format!("then import its fingerprint at {LAUNCHPAD_KEYS_PAGE}"));
}
