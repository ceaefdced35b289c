//! Validate command implementation
//!
//! Validates a spec file without generating a score.

use anyhow::Result;
use colored::Colorize;
use fugata_spec::validation::validate_spec;
use std::path::Path;
use std::process::ExitCode;

/// Run the validate command.
///
/// Exit code: 0 when the spec is valid (warnings allowed), 1 otherwise.
pub fn run(spec_path: &str) -> Result<ExitCode> {
    println!("{} {}", "Validating:".cyan().bold(), spec_path);

    let loaded = crate::input::load_spec(Path::new(spec_path))?;
    let result = validate_spec(&loaded.spec);

    for warning in &result.warnings {
        println!(
            "  {} {}: {}",
            "warning".yellow(),
            warning.code.yellow(),
            warning.message
        );
    }

    if result.is_ok() {
        println!("{} {}", "SUCCESS".green().bold(), loaded.spec.name);
        println!("{} {}", "Spec hash:".dimmed(), loaded.spec_hash);
        return Ok(ExitCode::SUCCESS);
    }

    println!("{}", "FAILED".red().bold());
    for error in &result.errors {
        match &error.field {
            Some(field) => println!(
                "  {} {} [{}]: {}",
                "x".red(),
                error.code.red(),
                field,
                error.message
            ),
            None => println!("  {} {}: {}", "x".red(), error.code.red(), error.message),
        }
    }
    Ok(ExitCode::from(1))
}
