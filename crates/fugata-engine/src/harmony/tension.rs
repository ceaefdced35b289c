//! Harmonic function classification and tension scoring.

use super::chord::{Chord, ChordDegree, ChordQuality};

/// Classical functional category of a chord.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HarmonicFunction {
    Tonic,
    Predominant,
    Dominant,
}

/// Functional category by degree.
pub fn classify_function(chord: &Chord) -> HarmonicFunction {
    use ChordDegree::*;
    match chord.degree {
        I | III | VI | FlatIII | FlatVI => HarmonicFunction::Tonic,
        II | IV | FlatII | FlatVII => HarmonicFunction::Predominant,
        V | VII | VofV | VofVI | VofIV | VofII | VofIII => HarmonicFunction::Dominant,
    }
}

/// Tension in 0.0-1.0. Dominant-function and chromatic chords score
/// high, plain tonic triads low; sevenths and inversions add a little.
pub fn tension_score(chord: &Chord) -> f64 {
    let function = match classify_function(chord) {
        HarmonicFunction::Tonic => 0.1,
        HarmonicFunction::Predominant => 0.35,
        HarmonicFunction::Dominant => 0.6,
    };
    let quality = match chord.quality {
        ChordQuality::Major | ChordQuality::Minor => 0.0,
        ChordQuality::Major7 | ChordQuality::Minor7 => 0.1,
        ChordQuality::Dominant7 => 0.15,
        ChordQuality::Diminished | ChordQuality::Augmented => 0.2,
        ChordQuality::HalfDiminished7 => 0.22,
        ChordQuality::Diminished7 => 0.3,
        ChordQuality::Italian6 | ChordQuality::French6 | ChordQuality::German6 => 0.3,
    };
    let chromatic = if chord.degree.is_chromatic() { 0.1 } else { 0.0 };
    let inversion = chord.inversion as f64 * 0.02;
    (function + quality + chromatic + inversion).min(1.0)
}
