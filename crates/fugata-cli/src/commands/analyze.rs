//! Analyze command implementation
//!
//! Generates a score from a spec file and prints quality metrics
//! without writing any output files.

use anyhow::Result;
use colored::Colorize;
use fugata_engine::analysis;
use fugata_spec::validation::validate_spec;
use std::path::Path;
use std::process::ExitCode;

/// Run the analyze command.
///
/// Exit code: 0 success, 1 spec error, 2 generation error.
pub fn run(spec_path: &str) -> Result<ExitCode> {
    println!("{} {}", "Analyzing:".cyan().bold(), spec_path);

    let loaded = crate::input::load_spec(Path::new(spec_path))?;
    let validation = validate_spec(&loaded.spec);
    if !validation.is_ok() {
        println!("{}", "FAILED".red().bold());
        for error in &validation.errors {
            println!("  {} {}: {}", "x".red(), error.code.red(), error.message);
        }
        return Ok(ExitCode::from(1));
    }

    let score = match fugata_engine::generate(&loaded.spec) {
        Ok(score) => score,
        Err(e) => {
            println!("{} {}", "FAILED".red().bold(), e);
            return Ok(ExitCode::from(2));
        }
    };

    let report = analysis::analyze(&score);

    println!("{} {}", "Form:".dimmed(), score.form);
    println!("{} {}", "Key:".dimmed(), score.key.name());
    println!("{} {}", "Voices:".dimmed(), score.num_voices);
    println!("{} {}", "Notes:".dimmed(), report.note_count);
    println!("{} {}", "Sections:".dimmed(), score.sections.len());
    println!("{} {}", "Cadences:".dimmed(), score.cadences.len());
    println!(
        "{} {:.1}%",
        "Repaired notes:".dimmed(),
        report.repaired_fraction * 100.0
    );
    println!(
        "{} {} bars",
        "Widest cadence gap:".dimmed(),
        report.widest_cadence_gap_bars
    );

    if report.overlap_violations > 0 {
        println!(
            "  {} {} same-voice overlaps",
            "x".red(),
            report.overlap_violations
        );
        return Ok(ExitCode::from(2));
    }
    if report.warning_count > 0 {
        println!(
            "  {} {} guard warnings",
            "warning".yellow(),
            report.warning_count
        );
    }

    println!("{}", "SUCCESS".green().bold());
    Ok(ExitCode::SUCCESS)
}
