use crate::command::{CommandFactory, CommandLine, ExitCode};
use crate::env::Environment;
use crate::error::ShellError;
use crate::scheduler::{Dispatch, Scheduler};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::io::{self, Write};

/// Factory allows creating instances of ExecutableCommand.
///
/// Only supports commands defined in this crate, see [`crate::builtin`].
pub(crate) struct Factory<T> {
    _phantom: std::marker::PhantomData<T>,
}

impl<T> Default for Factory<T> {
    fn default() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

/// A minimal interactive shell: builtins run in-process, everything else is
/// handed to a [`Scheduler`].
///
/// Example
/// ```no_run
/// use hello_shell::Interpreter;
/// let mut sh = Interpreter::default();
/// let code = sh.execute_line("ls -la", &mut std::io::stdout()).unwrap();
/// assert_eq!(code, 0);
/// ```
pub struct Interpreter {
    env: Environment,
    builtins: Vec<Box<dyn CommandFactory>>,
    scheduler: Scheduler,
}

impl Interpreter {
    /// Create a new interpreter with a custom set of builtins.
    pub fn new(builtins: Vec<Box<dyn CommandFactory>>, scheduler: Scheduler) -> Self {
        Self {
            env: Environment::new(),
            builtins,
            scheduler,
        }
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Whether `exit` has been run.
    pub fn should_exit(&self) -> bool {
        self.env.should_exit
    }

    /// Tokenizes and runs one input line.
    ///
    /// Builtin output and background pid notices go to `stdout`. A background
    /// command yields 0 as soon as it has been started.
    pub fn execute_line(&mut self, line: &str, stdout: &mut dyn Write) -> anyhow::Result<ExitCode> {
        let command = CommandLine::parse(line)?;
        let args: Vec<&str> = command.args().iter().map(String::as_str).collect();

        for factory in &self.builtins {
            if let Some(builtin) = factory.try_create(&self.env, command.name(), &args) {
                return builtin.execute(stdout, &mut self.env);
            }
        }

        match self.scheduler.dispatch(&command, &self.env, stdout)? {
            Dispatch::Foreground(code) => Ok(code),
            Dispatch::Background(_) => Ok(0),
        }
    }

    /// Read-Eval-Print Loop.
    ///
    /// Returns when `exit` is run or input ends. Recoverable errors are printed and
    /// the next line is read; only fatal errors are returned.
    pub fn repl(&mut self, prompt: &str) -> anyhow::Result<()> {
        let mut rl = DefaultEditor::new()?;

        while !self.env.should_exit {
            match rl.readline(prompt) {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        rl.add_history_entry(line.as_str())?;
                    }
                    let mut stdout = io::stdout();
                    if let Err(err) = self.execute_line(&line, &mut stdout) {
                        report(err, &mut stdout)?;
                    }
                    stdout.flush()?;
                }
                Err(ReadlineError::Interrupted) => continue,
                Err(ReadlineError::Eof) => break,
                Err(err) => return Err(err.into()),
            }
        }

        Ok(())
    }
}

/// Prints a recoverable error to `out`, or hands a fatal one back to the caller.
fn report(err: anyhow::Error, out: &mut dyn Write) -> anyhow::Result<()> {
    match err.downcast_ref::<ShellError>() {
        Some(ShellError::EmptyCommand) => Ok(()),
        Some(e) if e.is_fatal() => Err(err),
        _ => {
            tracing::debug!(error = %err, "command failed");
            writeln!(out, "hello_shell: {err}")?;
            Ok(())
        }
    }
}

impl Default for Interpreter {
    /// Create an interpreter with the builtins `cd`, `help` and `exit`, backed by the
    /// process-wide reaper.
    fn default() -> Self {
        use crate::builtin::*;
        Self::new(
            vec![
                Box::new(Factory::<Cd>::default()),
                Box::new(Factory::<Help>::default()),
                Box::new(Factory::<Exit>::default()),
            ],
            Scheduler::new(),
        )
    }
}
