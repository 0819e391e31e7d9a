use crate::env::Environment;
use crate::error::ShellError;
use crate::lexer;
use anyhow::Result;
use std::io::Write;

/// Conventional process exit code type used by this crate.
///
/// A value of 0 indicates success; any non-zero value indicates failure.
/// Children killed by a signal are reported as `128 + signal`, like POSIX shells do.
pub type ExitCode = i32;

/// Token marking a command for background execution when it is the last token.
pub const BACKGROUND_MARKER: &str = "&";

/// One tokenized input line.
///
/// Token 0 is the command name, the remaining tokens are its arguments. A trailing
/// [`BACKGROUND_MARKER`] is recorded in [`CommandLine::is_background`] and is not
/// part of [`CommandLine::argv`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    argv: Vec<String>,
    background: bool,
}

impl CommandLine {
    /// Tokenizes `line`.
    ///
    /// Fails with [`ShellError::EmptyCommand`] when nothing but whitespace (or a
    /// lone `&`) was entered.
    pub fn parse(line: &str) -> Result<Self, ShellError> {
        Self::from_tokens(lexer::split_into_tokens(line))
    }

    pub fn from_tokens(mut tokens: Vec<String>) -> Result<Self, ShellError> {
        let background = tokens.last().is_some_and(|t| t == BACKGROUND_MARKER);
        if background {
            tokens.pop();
        }
        if tokens.is_empty() {
            return Err(ShellError::EmptyCommand);
        }
        Ok(Self {
            argv: tokens,
            background,
        })
    }

    pub fn name(&self) -> &str {
        &self.argv[0]
    }

    pub fn args(&self) -> &[String] {
        &self.argv[1..]
    }

    /// Full argument vector, command name first.
    pub fn argv(&self) -> &[String] {
        &self.argv
    }

    pub fn is_background(&self) -> bool {
        self.background
    }
}

/// Object-safe trait for a command executed inside the interpreter process.
pub trait ExecutableCommand {
    /// Executes the command, writing any output to `stdout`.
    fn execute(self: Box<Self>, stdout: &mut dyn Write, env: &mut Environment)
    -> Result<ExitCode>;
}

/// Factory that tries to create a command from a name and its arguments.
///
/// Returns `None` when the factory doesn't recognize the `name`.
pub trait CommandFactory {
    fn try_create(
        &self,
        env: &Environment,
        name: &str,
        args: &[&str],
    ) -> Option<Box<dyn ExecutableCommand>>;
}
