//! Harmonic model: chords, the tick-indexed harmonic timeline, cadence
//! realization, chord voicing, and tension scoring.

mod chord;
mod event;
mod tension;
mod timeline;
mod voicing;

#[cfg(test)]
mod tests;

pub use chord::{Chord, ChordDegree, ChordQuality};
pub use event::{CadencePoint, CadenceType, HarmonicEvent};
pub use tension::{classify_function, tension_score, HarmonicFunction};
pub use timeline::{HarmonicTimeline, TimelineError};
pub use voicing::{smooth_voice_leading, voice_chord, ChordVoicing};
