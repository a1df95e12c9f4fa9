//! Process runner: executes an external command and captures its output.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

use tracing::{debug, trace};

use crate::{BenchError, BenchResult};

/// How the child's environment is built.
#[derive(Debug, Clone)]
pub enum EnvPolicy {
    /// Ambient environment plus the listed overrides.
    Inherit(Vec<(String, OsString)>),
    /// Cleared environment containing only the listed variables.
    Exact(Vec<(String, OsString)>),
}

impl Default for EnvPolicy {
    fn default() -> Self {
        EnvPolicy::Inherit(Vec::new())
    }
}

/// A fully described external command.
#[derive(Debug, Clone)]
pub struct CommandSpec {
    pub program: PathBuf,
    pub args: Vec<OsString>,
    pub dir: Option<PathBuf>,
    pub env: EnvPolicy,
}

impl CommandSpec {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        CommandSpec {
            program: program.into(),
            args: Vec::new(),
            dir: None,
            env: EnvPolicy::default(),
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.dir = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn env_policy(mut self, env: EnvPolicy) -> Self {
        self.env = env;
        self
    }

    fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        if let Some(dir) = &self.dir {
            cmd.current_dir(dir);
        }
        match &self.env {
            EnvPolicy::Inherit(vars) => {
                cmd.envs(vars.iter().map(|(k, v)| (k, v)));
            }
            EnvPolicy::Exact(vars) => {
                cmd.env_clear();
                cmd.envs(vars.iter().map(|(k, v)| (k, v)));
            }
        }
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd
    }
}

/// Reconstruct a shell-pasteable command line.
pub fn command_string(spec: &CommandSpec) -> String {
    let parts: Vec<String> = std::iter::once(spec.program.as_os_str())
        .chain(spec.args.iter().map(|a| a.as_os_str()))
        .map(|p| p.to_string_lossy().into_owned())
        .collect();
    shlex::try_join(parts.iter().map(String::as_str)).unwrap_or_else(|_| parts.join(" "))
}

/// Exit status and combined output of a finished process.
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    pub status: ExitStatus,
    /// stdout followed by stderr, trimmed
    pub text: String,
}

/// Run without treating a nonzero exit as an error.
pub fn run_unchecked(spec: &CommandSpec) -> std::io::Result<ProcessOutput> {
    debug!("Running {}", command_string(spec));
    let output = spec.to_command().output()?;
    // Streams are captured separately, so stderr lands after stdout rather than interleaved.
    let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
    combined.push_str(&String::from_utf8_lossy(&output.stderr));
    trace!("{}", combined);
    Ok(ProcessOutput {
        status: output.status,
        text: combined.trim().to_string(),
    })
}

/// Run and fail on launch errors or nonzero exit.
pub fn run_checked(spec: &CommandSpec) -> BenchResult<String> {
    match run_unchecked(spec) {
        Ok(out) if out.status.success() => Ok(out.text),
        Ok(out) => Err(BenchError::CommandFailed {
            command: command_string(spec),
            cause: out.status.to_string(),
            output: out.text,
        }),
        Err(e) => Err(BenchError::CommandFailed {
            command: command_string(spec),
            cause: e.to_string(),
            output: String::new(),
        }),
    }
}
