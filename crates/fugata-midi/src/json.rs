//! JSON score dump for tooling.

use serde::Serialize;

use fugata_engine::forms::Score;

/// Envelope around a serialized score, tagged with the producing
/// engine so downstream tools can check compatibility.
#[derive(Debug, Serialize)]
pub struct ScoreDump<'a> {
    pub engine: &'static str,
    pub engine_version: &'static str,
    pub score: &'a Score,
}

/// Pretty-printed JSON dump of a score.
pub fn dump_score(score: &Score) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&ScoreDump {
        engine: fugata_engine::ENGINE_ID,
        engine_version: fugata_engine::VERSION,
        score,
    })
}
