//! nasm-t CLI - run, update, list and scaffold assembler tests

use clap::Parser;
use std::process::ExitCode;

use nasm_t::cli::Cli;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();

    match cli.execute() {
        Ok(status) => ExitCode::from(status.exit_code()),
        Err(e) => {
            let code = e.exit_code();
            eprintln!("{:?}", miette::Report::new(e));
            ExitCode::from(code)
        }
    }
}
