//! Instrument behaviors behind a trait.

use fugata_spec::InstrumentTag;

/// Result of a simultaneous-sounding check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundingVerdict {
    Playable,
    /// The group cannot be played as written.
    Unplayable,
}

/// Physical playability model for one instrument.
pub trait Instrument {
    fn name(&self) -> &'static str;

    /// Inclusive playable range.
    fn range(&self) -> (u8, u8);

    fn is_pitch_playable(&self, pitch: u8) -> bool {
        let (lo, hi) = self.range();
        pitch >= lo && pitch <= hi
    }

    fn clamp_to_range(&self, pitch: u8) -> u8 {
        let (lo, hi) = self.range();
        pitch.clamp(lo, hi)
    }

    /// Check a group of simultaneously sounding pitches.
    fn check_sounding(&self, pitches: &[u8]) -> SoundingVerdict;

    /// Whether sounding repair should stagger starts instead of
    /// deleting (bowed instruments).
    fn prefers_micro_offset(&self) -> bool {
        false
    }
}

/// Bowed strings: at most a double stop, and only when the two
/// pitches sit close enough for adjacent strings.
fn bowed_check(pitches: &[u8]) -> SoundingVerdict {
    match pitches.len() {
        0 | 1 => SoundingVerdict::Playable,
        2 => {
            let spread = i16::from(pitches[0]).abs_diff(i16::from(pitches[1]));
            if spread <= 12 {
                SoundingVerdict::Playable
            } else {
                SoundingVerdict::Unplayable
            }
        }
        _ => SoundingVerdict::Unplayable,
    }
}

struct Violin;
struct Cello;
struct Guitar;
struct Organ;
struct Harpsichord;
struct Piano;

impl Instrument for Violin {
    fn name(&self) -> &'static str {
        "violin"
    }
    fn range(&self) -> (u8, u8) {
        (55, 96)
    }
    fn check_sounding(&self, pitches: &[u8]) -> SoundingVerdict {
        bowed_check(pitches)
    }
    fn prefers_micro_offset(&self) -> bool {
        true
    }
}

impl Instrument for Cello {
    fn name(&self) -> &'static str {
        "cello"
    }
    fn range(&self) -> (u8, u8) {
        (36, 88)
    }
    fn check_sounding(&self, pitches: &[u8]) -> SoundingVerdict {
        bowed_check(pitches)
    }
    fn prefers_micro_offset(&self) -> bool {
        true
    }
}

impl Instrument for Guitar {
    fn name(&self) -> &'static str {
        "guitar"
    }
    fn range(&self) -> (u8, u8) {
        (40, 84)
    }
    // Single-line model: no simultaneous sustained notes.
    fn check_sounding(&self, pitches: &[u8]) -> SoundingVerdict {
        if pitches.len() >= 2 {
            SoundingVerdict::Unplayable
        } else {
            SoundingVerdict::Playable
        }
    }
}

impl Instrument for Organ {
    fn name(&self) -> &'static str {
        "organ"
    }
    fn range(&self) -> (u8, u8) {
        (36, 96)
    }
    fn check_sounding(&self, _pitches: &[u8]) -> SoundingVerdict {
        SoundingVerdict::Playable
    }
}

impl Instrument for Harpsichord {
    fn name(&self) -> &'static str {
        "harpsichord"
    }
    fn range(&self) -> (u8, u8) {
        (29, 89)
    }
    fn check_sounding(&self, _pitches: &[u8]) -> SoundingVerdict {
        SoundingVerdict::Playable
    }
}

impl Instrument for Piano {
    fn name(&self) -> &'static str {
        "piano"
    }
    fn range(&self) -> (u8, u8) {
        (21, 108)
    }
    fn check_sounding(&self, _pitches: &[u8]) -> SoundingVerdict {
        SoundingVerdict::Playable
    }
}

/// Factory: the guard implementation for a config instrument tag.
pub fn instrument_for(tag: InstrumentTag) -> Box<dyn Instrument> {
    match tag {
        InstrumentTag::Violin => Box::new(Violin),
        InstrumentTag::Cello => Box::new(Cello),
        InstrumentTag::Guitar => Box::new(Guitar),
        InstrumentTag::Organ => Box::new(Organ),
        InstrumentTag::Harpsichord => Box::new(Harpsichord),
        InstrumentTag::Piano => Box::new(Piano),
    }
}
