//! esorun - run esoteric language programs
//!
//! Usage:
//!   esorun <language> [options] {file}+
//!   esorun --help

mod cli;

use cli::{parse_args, print_help, print_version, run};
use esorun::EngineConfig;
use std::env;
use std::io::IsTerminal;
use std::process::ExitCode;
use tracing_subscriber::{fmt, EnvFilter};

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    init_logging();

    let args: Vec<String> = env::args().collect();
    let cli = match parse_args(&args) {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Try 'esorun --help' for more information.");
            return ExitCode::FAILURE;
        }
    };

    if cli.help {
        print_help();
        return ExitCode::SUCCESS;
    }

    if cli.version {
        print_version();
        return ExitCode::SUCCESS;
    }

    if let Err(e) = esorun::signals::setup_interrupt_handler() {
        tracing::warn!("could not install Ctrl-C handler: {}", e);
    }

    run(&cli, &EngineConfig::from_env())
}
