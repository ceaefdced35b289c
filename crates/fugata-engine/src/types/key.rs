//! Keys and scales.

use serde::Serialize;

use fugata_spec::{KeyName, Mode};

/// Scale flavor used for scale-tone lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scale {
    Major,
    NaturalMinor,
    HarmonicMinor,
}

impl Scale {
    /// Semitone offsets of the seven scale degrees above the tonic.
    pub fn intervals(&self) -> [u8; 7] {
        match self {
            Scale::Major => [0, 2, 4, 5, 7, 9, 11],
            Scale::NaturalMinor => [0, 2, 3, 5, 7, 8, 10],
            Scale::HarmonicMinor => [0, 2, 3, 5, 7, 8, 11],
        }
    }
}

/// A key: tonic pitch class plus mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Key {
    /// Tonic pitch class 0-11 (C = 0).
    pub tonic: u8,
    pub minor: bool,
}

impl Key {
    pub fn new(tonic: u8, minor: bool) -> Key {
        Key {
            tonic: tonic % 12,
            minor,
        }
    }

    pub fn from_config(key: KeyName, mode: Mode) -> Key {
        Key::new(key.pitch_class(), mode.is_minor())
    }

    /// Scale used for melodic lookups: harmonic minor in minor keys so
    /// the leading tone is available, major otherwise.
    pub fn scale(&self) -> Scale {
        if self.minor {
            Scale::HarmonicMinor
        } else {
            Scale::Major
        }
    }

    /// Pitch classes of the seven scale degrees.
    pub fn scale_pcs(&self) -> [u8; 7] {
        let mut pcs = self.scale().intervals();
        for pc in &mut pcs {
            *pc = (*pc + self.tonic) % 12;
        }
        pcs
    }

    /// Whether a pitch belongs to the key's scale.
    pub fn contains(&self, pitch: u8) -> bool {
        self.scale_pcs().contains(&(pitch % 12))
    }

    /// 0-based scale degree of a pitch class, when diatonic.
    pub fn degree_of(&self, pitch: u8) -> Option<usize> {
        self.scale_pcs().iter().position(|&pc| pc == pitch % 12)
    }

    /// Dominant pitch class.
    pub fn dominant_pc(&self) -> u8 {
        (self.tonic + 7) % 12
    }

    /// Subdominant pitch class.
    pub fn subdominant_pc(&self) -> u8 {
        (self.tonic + 5) % 12
    }

    /// Leading-tone pitch class (raised seventh in minor).
    pub fn leading_tone_pc(&self) -> u8 {
        (self.tonic + 11) % 12
    }

    /// Key a perfect fifth above, same mode.
    pub fn dominant_key(&self) -> Key {
        Key::new(self.tonic + 7, self.minor)
    }

    /// Key a perfect fourth above, same mode.
    pub fn subdominant_key(&self) -> Key {
        Key::new(self.tonic + 5, self.minor)
    }

    /// Relative major/minor.
    pub fn relative(&self) -> Key {
        if self.minor {
            Key::new(self.tonic + 3, false)
        } else {
            Key::new(self.tonic + 9, true)
        }
    }

    /// Parallel major/minor.
    pub fn parallel(&self) -> Key {
        Key::new(self.tonic, !self.minor)
    }

    /// Nearest scale tone to `pitch` in the given direction
    /// (`dir > 0` searches upward, `dir < 0` downward). Returns `pitch`
    /// unchanged when no scale tone exists within an octave.
    pub fn nearest_scale_tone(&self, pitch: u8, dir: i8) -> u8 {
        let step: i16 = if dir >= 0 { 1 } else { -1 };
        let mut candidate = pitch as i16 + step;
        for _ in 0..12 {
            if (0..=127).contains(&candidate) && self.contains(candidate as u8) {
                return candidate as u8;
            }
            candidate += step;
        }
        pitch
    }

    /// Display name, e.g. "D minor".
    pub fn name(&self) -> String {
        let tonic = KeyName::from_pitch_class(self.tonic);
        format!(
            "{:?} {}",
            tonic,
            if self.minor { "minor" } else { "major" }
        )
    }
}
