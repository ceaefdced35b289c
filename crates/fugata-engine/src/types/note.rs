//! Note events with provenance.

use serde::Serialize;

use super::protection::ProtectionLevel;
use super::tick::Tick;

/// Origin tag for a note. Closed enum: the protection level of every
/// source is derived by an exhaustive match in [`ProtectionLevel::of`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteSource {
    /// Head motif of the subject. Never altered.
    SubjectCore,
    Subject,
    Answer,
    Countersubject,
    /// Episode material (sequences, fortspinnung).
    Episode,
    FreeCounterpoint,
    Pedal,
    Ornament,
    Arpeggio,
    Texture,
    GroundBass,
    Cantus,
    PreludeFiguration,
    ToccataGesture,
    ToccataFigure,
    CanonLeader,
    CanonFollower,
    GoldbergAria,
    GoldbergBass,
    GoldbergFigura,
    CadenceApproach,
    /// Notes of the final cadence. Pitch, octave, duration, tick all fixed.
    FinalCadence,
    GrandPause,
    ChromaticPassing,
    SequenceNote,
    Coda,
    FalseEntry,
    PostProcess,
}

/// Bit flags recording which repair passes altered a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ModifiedBy(pub u16);

impl ModifiedBy {
    pub const PARALLEL_REPAIR: ModifiedBy = ModifiedBy(1 << 0);
    pub const CHORD_SNAP: ModifiedBy = ModifiedBy(1 << 1);
    pub const LEAP_RESOLUTION: ModifiedBy = ModifiedBy(1 << 2);
    pub const OVERLAP_TRIM: ModifiedBy = ModifiedBy(1 << 3);
    pub const OCTAVE_ADJUST: ModifiedBy = ModifiedBy(1 << 4);
    pub const ARTICULATION: ModifiedBy = ModifiedBy(1 << 5);
    pub const REPEATED_NOTE: ModifiedBy = ModifiedBy(1 << 6);

    pub fn none() -> ModifiedBy {
        ModifiedBy(0)
    }

    pub fn contains(&self, flag: ModifiedBy) -> bool {
        self.0 & flag.0 != 0
    }

    pub fn insert(&mut self, flag: ModifiedBy) {
        self.0 |= flag.0;
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

impl std::ops::BitOr for ModifiedBy {
    type Output = ModifiedBy;

    fn bitor(self, rhs: ModifiedBy) -> ModifiedBy {
        ModifiedBy(self.0 | rhs.0)
    }
}

/// One step in a note's transform trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformStep {
    TonalAnswer,
    RealAnswer,
    Inversion,
    Retrograde,
    Augmentation,
    Diminution,
    Sequence,
    CollisionAvoidance,
    RangeClamp,
    OctaveAdjust,
    KeyTranspose,
}

/// Maximum recorded transform steps per note.
pub const TRAIL_CAPACITY: usize = 8;

/// Optional derivation record carried by a note.
///
/// The trail has fixed capacity; pushes past capacity are dropped
/// silently. Early history is preserved over late transforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Provenance {
    /// Pitch first assigned at generation.
    pub original_pitch: u8,
    /// 0-based chord degree the pitch was drawn from, when known.
    pub chord_degree: Option<u8>,
    /// Tick in the source material this note derives from.
    pub source_tick: Tick,
    /// Exposition entry number, for subject/answer notes.
    pub entry_number: Option<u8>,
    steps: [Option<TransformStep>; TRAIL_CAPACITY],
    len: u8,
}

impl Provenance {
    pub fn new(original_pitch: u8, source_tick: Tick) -> Provenance {
        Provenance {
            original_pitch,
            chord_degree: None,
            source_tick,
            entry_number: None,
            steps: [None; TRAIL_CAPACITY],
            len: 0,
        }
    }

    /// Record a transform step. Silently ignored once the trail is full.
    pub fn push(&mut self, step: TransformStep) {
        if (self.len as usize) < TRAIL_CAPACITY {
            self.steps[self.len as usize] = Some(step);
            self.len += 1;
        }
    }

    pub fn trail(&self) -> impl Iterator<Item = TransformStep> + '_ {
        self.steps[..self.len as usize].iter().filter_map(|s| *s)
    }

    pub fn trail_len(&self) -> usize {
        self.len as usize
    }
}

/// A single sounded note.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NoteEvent {
    pub start_tick: Tick,
    /// Greater than zero for live notes; zero marks a note scheduled
    /// for deletion by the guard.
    pub duration: Tick,
    /// 0-127, 12-TET MIDI-compatible.
    pub pitch: u8,
    /// 1-127.
    pub velocity: u8,
    /// 0-based voice id; 0 is the top voice.
    pub voice: u8,
    pub source: NoteSource,
    pub modified_by: ModifiedBy,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provenance: Option<Provenance>,
}

impl NoteEvent {
    pub fn new(start_tick: Tick, duration: Tick, pitch: u8, voice: u8, source: NoteSource) -> Self {
        NoteEvent {
            start_tick,
            duration,
            pitch,
            velocity: 80,
            voice,
            source,
            modified_by: ModifiedBy::none(),
            provenance: None,
        }
    }

    pub fn with_velocity(mut self, velocity: u8) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_provenance(mut self, provenance: Provenance) -> Self {
        self.provenance = Some(provenance);
        self
    }

    /// Mutable access to the derivation record, creating it from the
    /// note's current pitch and tick when absent.
    pub fn trail_mut(&mut self) -> &mut Provenance {
        let (pitch, tick) = (self.pitch, self.start_tick);
        self.provenance
            .get_or_insert_with(|| Provenance::new(pitch, tick))
    }

    /// Record a transform step in the derivation trail.
    pub fn record(&mut self, step: TransformStep) {
        self.trail_mut().push(step);
    }

    /// Protection level derived from the source tag.
    pub fn protection(&self) -> ProtectionLevel {
        ProtectionLevel::of(self.source)
    }

    pub fn end_tick(&self) -> Tick {
        self.start_tick + self.duration
    }

    /// Whether the note sounds at `tick` (sustain-aware, half-open).
    pub fn sounds_at(&self, tick: Tick) -> bool {
        self.duration > 0 && self.start_tick <= tick && tick < self.end_tick()
    }
}
