//! CLI argument parsing for the upload pipeline.
//!
//! The flow itself is interactive; flags only relocate the files the run
//! reads and writes or turn up diagnostics.
use clap::Parser;
use std::path::PathBuf;

/// Root CLI entrypoint.
#[derive(Parser, Debug)]
#[command(
    name = "ppa-upload",
    version,
    about = "Build a Debian source package and upload it to a Launchpad PPA",
    after_help = "The run is interactive. Prompts follow this order:\n  maintainer identity -> signing key -> source directory -> package info -> PPA registration\n\nExamples:\n  ppa-upload\n  ppa-upload --work-root /var/tmp/ppa --verbose"
)]
pub struct RootArgs {
    /// Maintainer profile file (shell-sourceable KEY="value" lines)
    #[arg(long, value_name = "PATH", env = "PPA_UPLOAD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory that holds build workspaces and produced artifacts
    #[arg(long, value_name = "DIR", env = "PPA_UPLOAD_WORK_ROOT")]
    pub work_root: Option<PathBuf>,

    /// Emit debug diagnostics on stderr
    #[arg(long, short)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn parses_without_flags() {
        let args = RootArgs::try_parse_from(["ppa-upload"]).expect("parse");
        assert!(!args.verbose);
    }

    #[test]
    fn path_flags_read_their_environment_variables() {
        let command = RootArgs::command();
        let env_of = |id: &str| {
            command
                .get_arguments()
                .find(|arg| arg.get_id() == id)
                .and_then(|arg| arg.get_env())
                .map(|name| name.to_string_lossy().into_owned())
        };
        assert_eq!(env_of("config").as_deref(), Some("PPA_UPLOAD_CONFIG"));
        assert_eq!(env_of("work_root").as_deref(), Some("PPA_UPLOAD_WORK_ROOT"));
    }

    #[test]
    fn parses_path_overrides() {
        let args = RootArgs::try_parse_from([
            "ppa-upload",
            "--config",
            "/tmp/maint.conf",
            "--work-root",
            "/tmp/ppa",
            "-v",
        ])
        .expect("parse");
        assert_eq!(args.config, Some(PathBuf::from("/tmp/maint.conf")));
        assert_eq!(args.work_root, Some(PathBuf::from("/tmp/ppa")));
        assert!(args.verbose);
    }

    #[test]
    fn rejects_positional_arguments() {
        assert!(RootArgs::try_parse_from(["ppa-upload", "extra"]).is_err());
    }
}
