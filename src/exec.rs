//! External command execution.
//!
//! Every tool the pipeline drives goes through [`CommandRunner`], so tests
//! can record invocations instead of touching the host.
use anyhow::{anyhow, Context, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Instant;

/// How a command's standard streams are wired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StdioMode {
    /// Capture stdout and stderr for inspection.
    Captured,
    /// Share the terminal with the child (pinentry, ssh prompts, apt progress).
    Inherited,
}

/// A fully described external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    pub stdin: Option<String>,
    pub elevate: bool,
    pub stdio: StdioMode,
}

impl Invocation {
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
            args: Vec::new(),
            cwd: None,
            stdin: None,
            elevate: false,
            stdio: StdioMode::Captured,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: &Path) -> Self {
        self.cwd = Some(dir.to_path_buf());
        self
    }

    /// Feed `input` on stdin, then close it.
    pub fn stdin(mut self, input: impl Into<String>) -> Self {
        self.stdin = Some(input.into());
        self
    }

    /// Run with root privileges, via `sudo` unless already elevated.
    pub fn elevated(mut self) -> Self {
        self.elevate = true;
        self
    }

    pub fn inherit_stdio(mut self) -> Self {
        self.stdio = StdioMode::Inherited;
        self
    }

    /// Shell-quoted command line, for logs and printed instructions.
    pub fn display(&self) -> String {
        let mut words = Vec::with_capacity(self.args.len() + 2);
        if self.elevate {
            words.push("sudo".to_string());
        }
        words.push(self.program.clone());
        words.extend(self.args.iter().cloned());
        shell_words::join(words)
    }
}

/// Exit status and captured streams of a finished command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// First non-empty stderr line, or the exit status when stderr is silent.
    pub fn failure_detail(&self) -> String {
        let line = self
            .stderr
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty());
        match (line, self.code) {
            (Some(line), _) => line.to_string(),
            (None, Some(code)) => format!("exit status {code}"),
            (None, None) => "terminated by signal".to_string(),
        }
    }
}

/// Abstraction over host process execution.
pub trait CommandRunner {
    /// Run a command to completion. `Err` means it could not be spawned;
    /// a non-zero exit is reported through [`CommandOutput`].
    fn run(&self, invocation: &Invocation) -> Result<CommandOutput>;

    /// Whether `program` resolves on `PATH`.
    fn has_program(&self, program: &str) -> bool;

    /// Whether the current process already runs as root.
    fn is_elevated(&self) -> bool;
}

/// Run a command and turn a non-zero exit into an error naming `what`.
pub fn run_checked(
    runner: &dyn CommandRunner,
    invocation: &Invocation,
    what: &str,
) -> Result<CommandOutput> {
    let output = runner
        .run(invocation)
        .with_context(|| format!("{what}: run {}", invocation.display()))?;
    if !output.success() {
        return Err(anyhow!("{what} failed: {}", output.failure_detail()));
    }
    Ok(output)
}

/// Executes commands on the host system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, invocation: &Invocation) -> Result<CommandOutput> {
        let needs_sudo = invocation.elevate && !self.is_elevated();
        let mut cmd = if needs_sudo {
            let mut cmd = Command::new("sudo");
            cmd.arg(&invocation.program);
            cmd
        } else {
            Command::new(&invocation.program)
        };
        cmd.args(&invocation.args);
        if let Some(cwd) = &invocation.cwd {
            cmd.current_dir(cwd);
        }
        match invocation.stdio {
            StdioMode::Captured => {
                cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
            }
            StdioMode::Inherited => {
                cmd.stdout(Stdio::inherit()).stderr(Stdio::inherit());
            }
        }
        cmd.stdin(if invocation.stdin.is_some() {
            Stdio::piped()
        } else if invocation.stdio == StdioMode::Inherited {
            Stdio::inherit()
        } else {
            Stdio::null()
        });

        let start = Instant::now();
        let mut child = cmd
            .spawn()
            .with_context(|| format!("spawn {}", invocation.program))?;
        if let Some(input) = &invocation.stdin {
            if let Some(mut stdin) = child.stdin.take() {
                // The child may exit before draining its input; a broken pipe is fine.
                if let Err(err) = stdin.write_all(input.as_bytes()) {
                    tracing::debug!(error = %err, "stdin closed early");
                }
            }
        }
        let output = child
            .wait_with_output()
            .with_context(|| format!("wait for {}", invocation.program))?;
        let elapsed_ms = start.elapsed().as_millis();

        tracing::info!(
            command = %invocation.display(),
            code = ?output.status.code(),
            elapsed_ms,
            "command finished"
        );

        Ok(CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }

    fn has_program(&self, program: &str) -> bool {
        which::which(program).is_ok()
    }

    fn is_elevated(&self) -> bool {
        // SAFETY: geteuid has no preconditions and cannot fail.
        unsafe { libc::geteuid() == 0 }
    }
}
