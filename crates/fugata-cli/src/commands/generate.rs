//! Generate command implementation
//!
//! Generates a score from a spec file and writes the SMF, the report,
//! and optionally a JSON note dump next to it.

use anyhow::{Context, Result};
use colored::Colorize;
use fugata_spec::report::GenerationReport;
use fugata_spec::validation::validate_spec;
use std::path::Path;
use std::process::ExitCode;
use std::time::Instant;

use super::reporting;
use crate::input::load_spec;

/// Run the generate command.
///
/// Exit code: 0 success, 1 spec error, 2 generation error.
pub fn run(spec_path: &str, out_dir: Option<&str>, dump_json: bool) -> Result<ExitCode> {
    let start = Instant::now();
    let out_dir = Path::new(out_dir.unwrap_or("."));

    println!("{} {}", "Generating from:".cyan().bold(), spec_path);
    println!("{} {}", "Output dir:".cyan().bold(), out_dir.display());

    let loaded = load_spec(Path::new(spec_path))?;
    let validation = validate_spec(&loaded.spec);
    for warning in &validation.warnings {
        println!(
            "  {} {}: {}",
            "warning".yellow(),
            warning.code.yellow(),
            warning.message
        );
    }
    if !validation.is_ok() {
        println!("{}", "FAILED".red().bold());
        for error in &validation.errors {
            println!("  {} {}: {}", "x".red(), error.code.red(), error.message);
        }
        return Ok(ExitCode::from(1));
    }

    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create output dir: {}", out_dir.display()))?;

    let score = match fugata_engine::generate(&loaded.spec) {
        Ok(score) => score,
        Err(e) => {
            println!("{} {}", "FAILED".red().bold(), e);
            let report = reporting::failure_report(&loaded.spec_hash, loaded.spec.seed, &e);
            write_report(out_dir, &loaded.spec.name, &report)?;
            return Ok(ExitCode::from(2));
        }
    };

    let smf_path = out_dir.join(format!("{}.mid", loaded.spec.name));
    let bytes = fugata_midi::score_to_bytes(&score)?;
    std::fs::write(&smf_path, &bytes)
        .with_context(|| format!("Failed to write {}", smf_path.display()))?;
    let score_hash = fugata_midi::bytes_hash(&bytes);

    if dump_json {
        let dump_path = out_dir.join(format!("{}.json", loaded.spec.name));
        let dump = fugata_midi::dump_score(&score)?;
        std::fs::write(&dump_path, dump)
            .with_context(|| format!("Failed to write {}", dump_path.display()))?;
        println!("  {} {}", "wrote".dimmed(), dump_path.display());
    }

    let report =
        reporting::success_report(&loaded.spec_hash, &score, &score_hash, &validation.warnings);
    let report_path = write_report(out_dir, &loaded.spec.name, &report)?;

    println!("  {} {}", "wrote".dimmed(), smf_path.display());
    println!("  {} {}", "wrote".dimmed(), report_path.display());
    println!(
        "{} {} ({} notes, {} tracks, {} ms)",
        "SUCCESS".green().bold(),
        loaded.spec.name,
        score.note_count(),
        score.tracks.len(),
        start.elapsed().as_millis()
    );
    println!("{} {}", "Score hash:".dimmed(), score_hash);

    Ok(ExitCode::SUCCESS)
}

fn write_report(
    out_dir: &Path,
    name: &str,
    report: &GenerationReport,
) -> Result<std::path::PathBuf> {
    let path = out_dir.join(GenerationReport::filename(name));
    let json = report.to_json_pretty()?;
    std::fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}
