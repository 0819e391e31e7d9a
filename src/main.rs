use hello_shell::Interpreter;
use hello_shell::config::Options;
use std::io::IsTerminal;
use std::process::ExitCode;

const BANNER: &str = "\
*******************************
*******************************
**********HELLO SHELL**********
*******************************
*******************************";

fn main() -> ExitCode {
    let options: Options = argh::from_env();

    tracing_subscriber::fmt()
        .with_env_filter(options.log_filter())
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .init();

    let mut sh = Interpreter::default();
    if !options.quiet {
        println!("{BANNER}");
        println!("{}", sh.env().current_dir.display());
    }

    match sh.repl(&options.prompt) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "interpreter stopped");
            println!("hello_shell: {err}");
            ExitCode::FAILURE
        }
    }
}
