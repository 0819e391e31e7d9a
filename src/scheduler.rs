use crate::command::{CommandLine, ExitCode};
use crate::env::Environment;
use crate::error::ShellError;
use crate::external::{StdinMode, launch};
use crate::reaper::Reaper;
use std::io::Write;
use std::process::ExitStatus;

/// What happened to a dispatched command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// The command ran to completion with this exit code.
    Foreground(ExitCode),
    /// The command is running detached under this pid.
    Background(u32),
}

type InstallReaper = fn() -> Result<Reaper, ShellError>;

/// Decides between blocking and detached execution for non-builtin commands.
///
/// Foreground children are waited on by pid, background children are moved into a
/// [`Reaper`]. A child is disposed of by exactly one of the two paths.
pub struct Scheduler {
    reaper: Option<Reaper>,
    install: InstallReaper,
}

impl Scheduler {
    /// A scheduler backed by the process-wide [`Reaper::global`].
    pub fn new() -> Self {
        Self {
            reaper: None,
            install: || Reaper::global().cloned(),
        }
    }

    /// A scheduler handing background children to `reaper`.
    pub fn with_reaper(reaper: Reaper) -> Self {
        Self {
            reaper: Some(reaper),
            install: || Reaper::global().cloned(),
        }
    }

    /// The reaper, if a background command has needed it yet.
    pub fn reaper(&self) -> Option<&Reaper> {
        self.reaper.as_ref()
    }

    /// Runs `line` and, for background commands, announces the child's pid on `notice`.
    pub fn dispatch(
        &mut self,
        line: &CommandLine,
        env: &Environment,
        notice: &mut dyn Write,
    ) -> Result<Dispatch, ShellError> {
        if line.is_background() {
            self.run_background(line, env, notice)
        } else {
            self.run_foreground(line, env)
        }
    }

    fn ensure_reaper(&mut self) -> Result<&Reaper, ShellError> {
        let reaper = match self.reaper.take() {
            Some(reaper) => reaper,
            None => (self.install)()?,
        };
        Ok(self.reaper.insert(reaper))
    }

    fn run_background(
        &mut self,
        line: &CommandLine,
        env: &Environment,
        notice: &mut dyn Write,
    ) -> Result<Dispatch, ShellError> {
        // Without a reaper the child would linger as a zombie, so fail before spawning.
        let reaper = self.ensure_reaper()?;
        let child = launch(line.argv(), StdinMode::Detached, env)?;
        let pid = child.id();
        reaper.adopt(child)?;

        tracing::debug!(pid, name = line.name(), "running in background");
        if let Err(e) = writeln!(notice, "[{pid}]") {
            tracing::warn!(error = %e, "cannot print background pid");
        }
        Ok(Dispatch::Background(pid))
    }

    fn run_foreground(
        &mut self,
        line: &CommandLine,
        env: &Environment,
    ) -> Result<Dispatch, ShellError> {
        let mut child = launch(line.argv(), StdinMode::Inherit, env)?;
        let pid = child.id();
        let status = child.wait().map_err(|source| ShellError::WaitFailed {
            name: line.name().to_owned(),
            source,
        })?;

        let code = exit_code(status);
        tracing::debug!(pid, code, "foreground child exited");
        Ok(Dispatch::Foreground(code))
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

fn exit_code(exit_status: ExitStatus) -> ExitCode {
    use std::os::unix::process::ExitStatusExt;
    match exit_status.code() {
        Some(code) => code,
        None => match exit_status.signal() {
            Some(signal) => 128 + signal,
            None if exit_status.core_dumped() => 255,
            None => -1,
        },
    }
}
