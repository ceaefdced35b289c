//! Assembly of [`GenerationReport`] documents from generated scores.

use fugata_engine::Score;
use fugata_spec::report::{
    CadenceInfo, GenerationReport, ReportError, ReportWarning, SectionInfo, TonalMoveInfo,
    REPORT_VERSION,
};
use fugata_spec::{EngineError, ValidationWarning};

/// Build a success report for a generated score.
pub fn success_report(
    spec_hash: &str,
    score: &Score,
    score_hash: &str,
    spec_warnings: &[ValidationWarning],
) -> GenerationReport {
    let mut warnings: Vec<ReportWarning> = spec_warnings
        .iter()
        .map(|w| ReportWarning {
            code: w.code.clone(),
            message: w.message.clone(),
        })
        .collect();
    warnings.extend(score.warnings.iter().map(|message| ReportWarning {
        code: "MUS_001".to_string(),
        message: message.clone(),
    }));

    GenerationReport {
        report_version: REPORT_VERSION,
        spec_hash: spec_hash.to_string(),
        ok: true,
        seed: score.seed,
        attempts: score.attempts,
        errors: vec![],
        warnings,
        sections: score
            .sections
            .iter()
            .map(|s| SectionInfo {
                kind: s.kind.name().to_string(),
                phase: s.phase.name().to_string(),
                start_tick: s.start_tick,
                end_tick: s.end_tick,
                key: s.key.name(),
            })
            .collect(),
        tonal_plan: score
            .tonal_plan
            .modulations
            .iter()
            .map(|m| TonalMoveInfo {
                tick: m.tick,
                key: m.key.name(),
                phase: m.phase.name().to_string(),
            })
            .collect(),
        cadences: score
            .cadences
            .iter()
            .map(|c| CadenceInfo {
                tick: c.tick,
                cadence: c.cadence.name().to_string(),
                key: c.key.name(),
            })
            .collect(),
        track_count: score.tracks.len() as u32,
        note_count: score.note_count() as u32,
        score_hash: score_hash.to_string(),
        engine_version: engine_version(),
    }
}

/// Build a failure report carrying one fatal engine error.
pub fn failure_report(spec_hash: &str, seed: u32, error: &dyn EngineError) -> GenerationReport {
    GenerationReport {
        report_version: REPORT_VERSION,
        spec_hash: spec_hash.to_string(),
        ok: false,
        seed,
        attempts: 0,
        errors: vec![ReportError {
            code: error.code().to_string(),
            message: error.to_string(),
        }],
        warnings: vec![],
        sections: vec![],
        tonal_plan: vec![],
        cadences: vec![],
        track_count: 0,
        note_count: 0,
        score_hash: String::new(),
        engine_version: engine_version(),
    }
}

fn engine_version() -> String {
    format!("{} v{}", fugata_engine::ENGINE_ID, fugata_engine::VERSION)
}
