//! Form pipelines and the public entry point.
//!
//! Every pipeline walks the same skeleton: build structural material,
//! plan (tonal plan, sections, cadences), generate notes per section,
//! then hand the buffer to [`finish`], which runs the constraint
//! passes in fixed order, applies the instrument guard, splits voices
//! into tracks, and builds the tempo map.

mod chaconne;
mod fantasia;
mod fugue;
mod goldberg;
mod passacaglia;
mod prelude;
mod toccata;


pub use chaconne::generate_chaconne;
pub use fantasia::generate_fantasia;
pub use fugue::generate_fugue;
pub use goldberg::generate_goldberg;
pub use passacaglia::generate_passacaglia;
pub use prelude::generate_prelude;
pub use toccata::generate_toccata;

use serde::Serialize;
use thiserror::Error;

use fugata_spec::{EngineError, FormConfig, InstrumentTag, ScoreSpec};

use crate::guard::{enforce_impossibility_guard, instrument_for};
use crate::harmony::{CadencePoint, HarmonicTimeline};
use crate::passes;
use crate::rng::rng_for;
use crate::structure::FugueStructure;
use crate::tempo::{build_tempo_map, TempoMap};
use crate::tonal::TonalPlan;
use crate::types::{default_registers, Key, NoteEvent, Tick, Track, VoiceRange};

/// A complete generated score.
#[derive(Debug, Clone, Serialize)]
pub struct Score {
    pub form: &'static str,
    pub key: Key,
    pub num_voices: u8,
    pub seed: u32,
    /// 1 on a clean first run; counts per-variation retries.
    pub attempts: u32,
    pub tracks: Vec<Track>,
    pub tempo: TempoMap,
    pub sections: Vec<crate::structure::Section>,
    pub tonal_plan: TonalPlan,
    pub cadences: Vec<CadencePoint>,
    pub warnings: Vec<String>,
}

impl Score {
    pub fn note_count(&self) -> usize {
        self.tracks.iter().map(|t| t.notes.len()).sum()
    }
}

/// Fatal generation failures.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("structural integrity failure: {0}")]
    StructuralFail(String),

    #[error("section layout rejected: {0}")]
    Layout(#[from] crate::structure::StructureError),

    #[error("harmonic timeline rejected: {0}")]
    Timeline(#[from] crate::harmony::TimelineError),

    #[error("variation plan rejected: {0}")]
    Plan(#[from] crate::structure::PlanError),
}

impl EngineError for GenerateError {
    fn code(&self) -> &'static str {
        match self {
            GenerateError::InvalidConfig(_) => "G001",
            GenerateError::StructuralFail(_) => "G002",
            GenerateError::Layout(_) => "G003",
            GenerateError::Timeline(_) => "G004",
            GenerateError::Plan(_) => "G005",
        }
    }

    fn category(&self) -> &'static str {
        match self {
            GenerateError::InvalidConfig(_) => "config",
            _ => "structure",
        }
    }
}

pub type GenerateResult = Result<Score, GenerateError>;

/// Generate a score from a validated spec.
pub fn generate(spec: &ScoreSpec) -> GenerateResult {
    match &spec.config {
        FormConfig::Fugue(cfg) => generate_fugue(cfg, spec.seed),
        FormConfig::Chaconne(cfg) => generate_chaconne(cfg, spec.seed),
        FormConfig::Prelude(cfg) => generate_prelude(cfg, spec.seed),
        FormConfig::Toccata(cfg) => generate_toccata(cfg, spec.seed),
        FormConfig::Fantasia(cfg) => generate_fantasia(cfg, spec.seed),
        FormConfig::Passacaglia(cfg) => generate_passacaglia(cfg, spec.seed),
        FormConfig::Goldberg(cfg) => generate_goldberg(cfg, spec.seed),
    }
}

/// Everything a form pipeline hands to the shared tail.
pub(crate) struct FormOutput {
    pub form: &'static str,
    pub key: Key,
    pub num_voices: u8,
    pub seed: u32,
    pub attempts: u32,
    pub instrument: InstrumentTag,
    pub notes: Vec<NoteEvent>,
    pub timeline: HarmonicTimeline,
    pub tonal_plan: TonalPlan,
    pub structure: FugueStructure,
    pub cadences: Vec<CadencePoint>,
    /// (start tick, tempo offset fraction) per section.
    pub tempo_sections: Vec<(Tick, f64)>,
    pub base_bpm: f64,
}

/// Options threaded into the pass tail, tuned per form.
pub(crate) struct PassTuning {
    pub leap_threshold: u8,
    pub max_consecutive: usize,
    pub coverage: passes::CoverageOptions,
}

impl Default for PassTuning {
    fn default() -> PassTuning {
        PassTuning {
            leap_threshold: passes::DEFAULT_LEAP_THRESHOLD,
            max_consecutive: passes::DEFAULT_MAX_CONSECUTIVE,
            coverage: passes::CoverageOptions::default(),
        }
    }
}

/// Voice registers intersected with the instrument's playable range.
///
/// A narrow intersection (under an octave) slides inside the
/// instrument span instead, so every voice keeps room for each pitch
/// class.
pub(crate) fn registers_for(num_voices: u8, instrument: InstrumentTag) -> Vec<VoiceRange> {
    let guard = instrument_for(instrument);
    let (inst_lo, inst_hi) = guard.range();
    default_registers(num_voices)
        .into_iter()
        .map(|r| {
            let mut low = r.low.max(inst_lo);
            let mut high = r.high.min(inst_hi);
            if high < low.saturating_add(12) {
                if r.center() < inst_lo {
                    low = inst_lo;
                    high = inst_lo.saturating_add(24).min(inst_hi);
                } else {
                    high = inst_hi;
                    low = inst_hi.saturating_sub(24).max(inst_lo);
                }
            }
            VoiceRange { low, high }
        })
        .collect()
}

/// Nearest placement of a pitch class to a register's center.
pub(crate) fn place_pc(range: &VoiceRange, pc: u8) -> u8 {
    let center = i16::from(range.center());
    let mut pitch = (center / 12) * 12 + i16::from(pc % 12);
    if pitch > center + 6 {
        pitch -= 12;
    } else if pitch + 6 < center {
        pitch += 12;
    }
    range.clamp(pitch.clamp(0, 127) as u8)
}

/// An empty success score for degenerate configurations.
pub(crate) fn empty_score(form: &'static str, key: Key, seed: u32) -> Score {
    Score {
        form,
        key,
        num_voices: 0,
        seed,
        attempts: 1,
        tracks: Vec::new(),
        tempo: TempoMap::new(),
        sections: Vec::new(),
        tonal_plan: TonalPlan {
            home: key,
            modulations: Vec::new(),
        },
        cadences: Vec::new(),
        warnings: Vec::new(),
    }
}

/// Shared pipeline tail: constraint passes in fixed order, voice
/// split, instrument guard, tempo map.
pub(crate) fn finish(mut out: FormOutput, tuning: PassTuning) -> Score {
    let registers = registers_for(out.num_voices, out.instrument);
    let mut warnings: Vec<String> = Vec::new();

    // Constraint passes, fixed order.
    passes::resolve_leaps(
        &mut out.notes,
        &out.timeline,
        &registers,
        tuning.leap_threshold,
    );
    passes::repair_repeated_notes(
        &mut out.notes,
        &out.timeline,
        tuning.max_consecutive,
        passes::DEFAULT_RUN_GAP,
    );
    passes::enforce_vertical_safety(&mut out.notes, &out.timeline);
    let structure = (!out.structure.is_empty()).then_some(&out.structure);
    let mut coverage_rng = rng_for(out.seed, "cadential-coverage");
    passes::insert_cadential_coverage(
        &mut out.notes,
        &out.timeline,
        structure,
        out.num_voices,
        tuning.coverage,
        &mut coverage_rng,
    );
    passes::shape_cadence_approaches(&mut out.notes, &out.cadences);

    // Split into per-voice tracks.
    let mut tracks: Vec<Track> = (0..out.num_voices).map(Track::new).collect();
    for note in out.notes {
        if (note.voice as usize) < tracks.len() {
            tracks[note.voice as usize].notes.push(note);
        }
    }
    for track in tracks.iter_mut() {
        track.finalize();
    }

    // Guard runs last.
    let guard = instrument_for(out.instrument);
    let outcome = enforce_impossibility_guard(&mut tracks, guard.as_ref());
    warnings.extend(outcome.warnings.into_iter().map(|w| w.message));

    let cadence_ticks: Vec<Tick> = out.cadences.iter().map(|c| c.tick).collect();
    let tempo = build_tempo_map(out.base_bpm, &out.tempo_sections, &cadence_ticks);

    Score {
        form: out.form,
        key: out.key,
        num_voices: out.num_voices,
        seed: out.seed,
        attempts: out.attempts,
        tracks,
        tempo,
        sections: out.structure.sections().to_vec(),
        tonal_plan: out.tonal_plan,
        cadences: out.cadences,
        warnings,
    }
}
