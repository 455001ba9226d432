//! Shared helpers for running the compiled binary.

use std::path::Path;
use std::process::{Command, Output, Stdio};

/// Command for the built binary with user paths pointed into `home`.
pub fn ppa_upload(home: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_ppa-upload"));
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env("XDG_DATA_HOME", home.join(".local/share"))
        .env_remove("PPA_UPLOAD_CONFIG")
        .env_remove("PPA_UPLOAD_WORK_ROOT")
        .env_remove("RUST_LOG")
        .stdin(Stdio::null());
    cmd
}

pub fn run(cmd: &mut Command) -> Output {
    cmd.output().expect("spawn ppa-upload")
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}
