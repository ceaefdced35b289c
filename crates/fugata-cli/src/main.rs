//! Fugata CLI - Command-line interface for deterministic score generation
//!
//! This binary provides commands for validating specs, generating scores,
//! and analyzing generated output.

use clap::Parser;
use std::process::ExitCode;

use fugata_cli::cli_args::{Cli, Commands};
use fugata_cli::commands;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Generate {
            spec,
            output,
            dump_json,
        } => commands::generate::run(&spec, output.as_deref(), dump_json),
        Commands::Validate { spec } => commands::validate::run(&spec),
        Commands::Analyze { spec } => commands::analyze::run(&spec),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", colored::Colorize::red("error"), e);
            ExitCode::from(1)
        }
    }
}
