//! Report types for generation results.
//!
//! A [`GenerationReport`] documents one run of the engine: whether it
//! succeeded, the structural plan that was realized, any warnings the
//! constraint passes raised, and the BLAKE3 hash of the serialized
//! score for determinism checks.

use serde::{Deserialize, Serialize};

/// Report schema version.
pub const REPORT_VERSION: u32 = 1;

/// A complete report for one generation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationReport {
    /// Report schema version (always 1).
    pub report_version: u32,
    /// Hex-encoded BLAKE3 hash of the canonicalized spec.
    pub spec_hash: String,
    /// Whether generation succeeded without fatal errors.
    pub ok: bool,
    /// Master seed the run used.
    pub seed: u32,
    /// Number of generation attempts consumed (1 when no retry fired).
    pub attempts: u32,
    /// Fatal errors (empty when `ok`).
    pub errors: Vec<ReportError>,
    /// Non-fatal musical warnings.
    pub warnings: Vec<ReportWarning>,
    /// Realized section layout.
    pub sections: Vec<SectionInfo>,
    /// Realized modulation schedule.
    pub tonal_plan: Vec<TonalMoveInfo>,
    /// Realized cadence plan.
    pub cadences: Vec<CadenceInfo>,
    /// Number of voice tracks emitted.
    pub track_count: u32,
    /// Total note count across all tracks.
    pub note_count: u32,
    /// Hex-encoded BLAKE3 hash of the serialized score.
    pub score_hash: String,
    /// Engine identifier and version (e.g. "fugata-engine v0.1.0").
    pub engine_version: String,
}

impl GenerationReport {
    /// Serializes the report to pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Generates the standard report filename for a given spec name.
    pub fn filename(name: &str) -> String {
        format!("{}.report.json", name)
    }
}

/// A fatal error surfaced in a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportError {
    /// Stable machine-readable code (e.g. "GEN_003").
    pub code: String,
    pub message: String,
}

/// A non-fatal warning surfaced in a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportWarning {
    pub code: String,
    pub message: String,
}

/// One realized section of the structural plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionInfo {
    /// Section kind (e.g. "exposition", "episode", "variation").
    pub kind: String,
    /// Structural phase ("establish", "develop", "resolve").
    pub phase: String,
    pub start_tick: u64,
    pub end_tick: u64,
    /// Key at this section, as a pitch-class name plus mode.
    pub key: String,
}

/// One modulation in the tonal plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TonalMoveInfo {
    pub tick: u64,
    pub key: String,
    pub phase: String,
}

/// One planned cadence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CadenceInfo {
    pub tick: u64,
    /// Cadence type ("perfect", "half", "deceptive", ...).
    pub cadence: String,
    pub key: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn report_round_trips_through_json() {
        let report = GenerationReport {
            report_version: REPORT_VERSION,
            spec_hash: "ab".repeat(32),
            ok: true,
            seed: 42,
            attempts: 1,
            errors: vec![],
            warnings: vec![ReportWarning {
                code: "MUS_001".to_string(),
                message: "no tonic opening".to_string(),
            }],
            sections: vec![SectionInfo {
                kind: "exposition".to_string(),
                phase: "establish".to_string(),
                start_tick: 0,
                end_tick: 7680,
                key: "C major".to_string(),
            }],
            tonal_plan: vec![],
            cadences: vec![],
            track_count: 3,
            note_count: 240,
            score_hash: "cd".repeat(32),
            engine_version: "fugata-engine v0.1.0".to_string(),
        };
        let json = report.to_json_pretty().unwrap();
        let back: GenerationReport = serde_json::from_str(&json).unwrap();
        assert_eq!(report, back);
    }

    #[test]
    fn filename_appends_report_suffix() {
        assert_eq!(GenerationReport::filename("fugue-c-01"), "fugue-c-01.report.json");
    }
}
