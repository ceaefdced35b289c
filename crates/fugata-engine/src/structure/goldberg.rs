//! The Goldberg 32-bar structural grid.

use serde::Serialize;

use crate::harmony::{CadenceType, ChordDegree};

/// Number of bars in the grid.
pub const GOLDBERG_BARS: usize = 32;

/// One bar of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GoldbergBar {
    /// 0-based bar index.
    pub bar: u8,
    /// Bass-motion degree for this bar.
    pub bass_degree: ChordDegree,
    /// Position within the 8-bar phrase, 1-4 (two bars per position).
    pub phrase_position: u8,
    /// Cadence closing this bar, on phrase boundaries.
    pub cadence: Option<CadenceType>,
}

/// The fixed 32-bar grid: four 8-bar phrases over the descending bass,
/// each phrase closing with a cadence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoldbergGrid {
    pub bars: Vec<GoldbergBar>,
}

/// Bass degrees of the four phrases, one degree per bar.
const BASS_DEGREES: [ChordDegree; GOLDBERG_BARS] = [
    // Phrase 1: tonic prolongation to a half close.
    ChordDegree::I,
    ChordDegree::I,
    ChordDegree::VII,
    ChordDegree::VI,
    ChordDegree::V,
    ChordDegree::IV,
    ChordDegree::II,
    ChordDegree::V,
    // Phrase 2: toward the dominant.
    ChordDegree::I,
    ChordDegree::IV,
    ChordDegree::VII,
    ChordDegree::III,
    ChordDegree::VI,
    ChordDegree::II,
    ChordDegree::V,
    ChordDegree::I,
    // Phrase 3: the far point, with secondary-dominant color.
    ChordDegree::VI,
    ChordDegree::III,
    ChordDegree::IV,
    ChordDegree::I,
    ChordDegree::II,
    ChordDegree::VofV,
    ChordDegree::V,
    ChordDegree::VI,
    // Phrase 4: home stretch.
    ChordDegree::IV,
    ChordDegree::I,
    ChordDegree::II,
    ChordDegree::V,
    ChordDegree::I,
    ChordDegree::IV,
    ChordDegree::V,
    ChordDegree::I,
];

impl GoldbergGrid {
    /// Build the standard grid.
    pub fn standard() -> GoldbergGrid {
        let bars = (0..GOLDBERG_BARS)
            .map(|bar| {
                let in_phrase = bar % 8;
                let cadence = match bar {
                    7 => Some(CadenceType::Half),
                    15 => Some(CadenceType::Perfect),
                    23 => Some(CadenceType::Deceptive),
                    31 => Some(CadenceType::Perfect),
                    _ => None,
                };
                GoldbergBar {
                    bar: bar as u8,
                    bass_degree: BASS_DEGREES[bar],
                    phrase_position: (in_phrase / 2) as u8 + 1,
                    cadence,
                }
            })
            .collect();
        GoldbergGrid { bars }
    }
}
