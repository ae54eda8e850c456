//! CLI binary for `pr_agent`.
//!
//! This binary is a thin wrapper that parses arguments and delegates to the
//! library.

use clap::Parser;
use pr_agent::cli::{run, Cli};
use pr_agent::config::Settings;
use pr_agent::logging;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = logging::init_stderr(cli.verbose) {
        eprintln!("Warning: logging init failed: {e}");
    }

    let project_dir = match cli.project_dir.map_or_else(std::env::current_dir, Ok) {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("Error: cannot determine project directory: {e}");
            return ExitCode::from(1);
        }
    };
    let settings = match Settings::resolve(&project_dir) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::from(1);
        }
    };

    let output = run(cli.command, &settings);
    for msg in output.stdout {
        println!("{msg}");
    }
    for msg in output.stderr {
        eprintln!("{msg}");
    }
    output.exit_code
}
