use argh::FromArgs;
use tracing_subscriber::EnvFilter;

/// Default `tracing` filter when neither `--log` nor `RUST_LOG` is given.
pub const DEFAULT_LOG_FILTER: &str = "warn";

#[derive(FromArgs, Debug)]
/// A minimal interactive command interpreter.
pub struct Options {
    #[argh(option, default = "String::from(\">> \")")]
    /// text shown before every input line
    pub prompt: String,

    #[argh(switch, short = 'q')]
    /// do not print the welcome banner and the start-up directory
    pub quiet: bool,

    #[argh(option)]
    /// tracing filter directive, e.g. `debug` or `hello_shell=trace`; overrides RUST_LOG
    pub log: Option<String>,
}

impl Options {
    /// Builds the log filter: `--log`, then `RUST_LOG`, then [`DEFAULT_LOG_FILTER`].
    pub fn log_filter(&self) -> EnvFilter {
        match &self.log {
            Some(directive) => EnvFilter::try_new(directive)
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
            None => EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        }
    }
}
