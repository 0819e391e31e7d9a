//! A tiny interactive command interpreter.
//!
//! A line typed at the prompt is split into whitespace-separated tokens. The
//! builtins `cd`, `help` and `exit` run inside the interpreter; any other command
//! names a program that is started as a child process. By default the interpreter
//! waits for that child. A line ending in a separate `&` token starts it in the
//! background instead, and a [`Reaper`] collects its exit status once it terminates.
//!
//! The main entry point is [`Interpreter`]. [`Scheduler`] and [`Reaper`] can be used
//! on their own to run [`CommandLine`]s without the read loop.

mod builtin;
pub mod command;
pub mod config;
pub mod env;
pub mod error;
pub mod external;
mod interpreter;
pub mod lexer;
pub mod reaper;
pub mod scheduler;

pub use command::CommandLine;
pub use error::ShellError;
/// Just a convenient re-export of the interactive command runner.
pub use interpreter::Interpreter;
pub use reaper::Reaper;
pub use scheduler::{Dispatch, Scheduler};
