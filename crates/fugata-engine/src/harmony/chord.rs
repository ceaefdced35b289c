//! Chord degrees, qualities, and concrete chords.

use serde::Serialize;

use crate::types::Key;

/// Scale-degree identity of a chord, including borrowed degrees and
/// secondary dominants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ChordDegree {
    I,
    II,
    III,
    IV,
    V,
    VI,
    VII,
    /// Neapolitan.
    FlatII,
    FlatIII,
    FlatVI,
    FlatVII,
    /// V/V
    VofV,
    /// V/vi
    VofVI,
    /// V/IV
    VofIV,
    /// V/ii
    VofII,
    /// V/iii
    VofIII,
}

impl ChordDegree {
    /// Canonical root pitch class in the given key.
    ///
    /// Diatonic degrees use the plain mode scale (natural minor in minor
    /// keys), so III and VII in minor come out as the natural-minor
    /// degrees even when melodic lookups use harmonic minor. The one
    /// exception is a leading-tone VII carried by a diminished quality,
    /// which sits on the raised seventh.
    pub fn root_pc(&self, key: Key, quality: ChordQuality) -> u8 {
        let mode_pcs: [u8; 7] = if key.minor {
            [0, 2, 3, 5, 7, 8, 10]
        } else {
            [0, 2, 4, 5, 7, 9, 11]
        };
        let offset = match self {
            ChordDegree::I => mode_pcs[0],
            ChordDegree::II => mode_pcs[1],
            ChordDegree::III => mode_pcs[2],
            ChordDegree::IV => mode_pcs[3],
            ChordDegree::V => mode_pcs[4],
            ChordDegree::VI => mode_pcs[5],
            ChordDegree::VII => {
                if quality.is_diminished() {
                    11
                } else {
                    mode_pcs[6]
                }
            }
            ChordDegree::FlatII => 1,
            ChordDegree::FlatIII => 3,
            ChordDegree::FlatVI => 8,
            ChordDegree::FlatVII => 10,
            ChordDegree::VofV => (mode_pcs[4] + 7) % 12,
            ChordDegree::VofVI => (mode_pcs[5] + 7) % 12,
            ChordDegree::VofIV => (mode_pcs[3] + 7) % 12,
            ChordDegree::VofII => (mode_pcs[1] + 7) % 12,
            ChordDegree::VofIII => (mode_pcs[2] + 7) % 12,
        };
        (key.tonic + offset) % 12
    }

    /// Whether this degree is borrowed or secondary rather than diatonic.
    pub fn is_chromatic(&self) -> bool {
        matches!(
            self,
            ChordDegree::FlatII
                | ChordDegree::FlatIII
                | ChordDegree::FlatVI
                | ChordDegree::FlatVII
                | ChordDegree::VofV
                | ChordDegree::VofVI
                | ChordDegree::VofIV
                | ChordDegree::VofII
                | ChordDegree::VofIII
        )
    }

    /// Default quality of this degree in the given mode.
    pub fn default_quality(&self, minor: bool) -> ChordQuality {
        use ChordDegree::*;
        use ChordQuality::*;
        if minor {
            match self {
                I | IV => Minor,
                II => Diminished,
                III | FlatIII | FlatVI | FlatVII | FlatII => Major,
                V | VofV | VofVI | VofIV | VofII | VofIII => Major,
                VI => Major,
                VII => Major, // subtonic in natural minor
            }
        } else {
            match self {
                I | IV | V => Major,
                II | III | VI => Minor,
                VII => Diminished,
                FlatII | FlatIII | FlatVI | FlatVII => Major,
                VofV | VofVI | VofIV | VofII | VofIII => Major,
            }
        }
    }
}

/// Chord quality: triads, sevenths, and augmented sixths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ChordQuality {
    Major,
    Minor,
    Diminished,
    Augmented,
    Dominant7,
    Minor7,
    Major7,
    Diminished7,
    HalfDiminished7,
    Italian6,
    French6,
    German6,
}

impl ChordQuality {
    /// Semitone intervals above the chord root.
    pub fn intervals(&self) -> &'static [u8] {
        match self {
            ChordQuality::Major => &[0, 4, 7],
            ChordQuality::Minor => &[0, 3, 7],
            ChordQuality::Diminished => &[0, 3, 6],
            ChordQuality::Augmented => &[0, 4, 8],
            ChordQuality::Dominant7 => &[0, 4, 7, 10],
            ChordQuality::Minor7 => &[0, 3, 7, 10],
            ChordQuality::Major7 => &[0, 4, 7, 11],
            ChordQuality::Diminished7 => &[0, 3, 6, 9],
            ChordQuality::HalfDiminished7 => &[0, 3, 6, 10],
            ChordQuality::Italian6 => &[0, 4, 10],
            ChordQuality::French6 => &[0, 4, 6, 10],
            ChordQuality::German6 => &[0, 4, 7, 10],
        }
    }

    pub fn is_seventh(&self) -> bool {
        matches!(
            self,
            ChordQuality::Dominant7
                | ChordQuality::Minor7
                | ChordQuality::Major7
                | ChordQuality::Diminished7
                | ChordQuality::HalfDiminished7
        )
    }

    pub fn is_diminished(&self) -> bool {
        matches!(
            self,
            ChordQuality::Diminished | ChordQuality::Diminished7 | ChordQuality::HalfDiminished7
        )
    }
}

/// A concrete chord: degree identity, quality, a concrete MIDI root
/// placement, and inversion.
///
/// Degree plus key determines the canonical pitch class; `root_pitch`
/// is a concrete placement of that class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Chord {
    pub degree: ChordDegree,
    pub quality: ChordQuality,
    pub root_pitch: u8,
    /// 0-3: which chord member sits in the bass.
    pub inversion: u8,
}

impl Chord {
    /// Build a chord from its degree in a key, with the root placed in
    /// the octave below middle C.
    pub fn from_degree(degree: ChordDegree, quality: ChordQuality, key: Key) -> Chord {
        let pc = degree.root_pc(key, quality);
        Chord {
            degree,
            quality,
            root_pitch: 48 + pc,
            inversion: 0,
        }
    }

    /// Diatonic chord on a degree using the mode's default quality.
    pub fn diatonic(degree: ChordDegree, key: Key) -> Chord {
        Chord::from_degree(degree, degree.default_quality(key.minor), key)
    }

    pub fn with_inversion(mut self, inversion: u8) -> Chord {
        self.inversion = inversion.min(self.quality.intervals().len() as u8 - 1);
        self
    }

    /// Root pitch class in a key.
    pub fn root_pc(&self, key: Key) -> u8 {
        self.degree.root_pc(key, self.quality)
    }

    /// Pitch classes of the chord members, root first.
    pub fn pitch_classes(&self, key: Key) -> Vec<u8> {
        let root = self.root_pc(key);
        self.quality
            .intervals()
            .iter()
            .map(|i| (root + i) % 12)
            .collect()
    }

    /// Whether a pitch belongs to the chord.
    pub fn contains(&self, pitch: u8, key: Key) -> bool {
        self.pitch_classes(key).contains(&(pitch % 12))
    }

    /// Pitch class of the bass member under the current inversion.
    pub fn bass_pc(&self, key: Key) -> u8 {
        let pcs = self.pitch_classes(key);
        pcs[self.inversion as usize % pcs.len()]
    }

    /// Pitch class of the chord third.
    pub fn third_pc(&self, key: Key) -> u8 {
        let intervals = self.quality.intervals();
        (self.root_pc(key) + intervals[1.min(intervals.len() - 1)]) % 12
    }

    /// Pitch class of the chord fifth, when present.
    pub fn fifth_pc(&self, key: Key) -> Option<u8> {
        let intervals = self.quality.intervals();
        intervals.get(2).map(|i| (self.root_pc(key) + i) % 12)
    }

    /// Pitch class of the chord seventh, when present.
    pub fn seventh_pc(&self, key: Key) -> Option<u8> {
        let intervals = self.quality.intervals();
        intervals.get(3).map(|i| (self.root_pc(key) + i) % 12)
    }
}
