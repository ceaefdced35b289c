//! Protection levels.
//!
//! Every constraint pass honors this contract. The level is a pure
//! total function of the note source; the exhaustive match below is
//! compiler-enforced, so a new source tag cannot silently fall back to
//! `Flexible`.

use super::note::NoteSource;

/// How much a constraint pass may alter a note.
///
/// Ordered from most to least protected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ProtectionLevel {
    /// Pitch and timing both fixed.
    Immutable,
    /// Pitch, octave, duration, and tick all fixed (final cadence notes).
    Architectural,
    /// Pitch class fixed; octave may shift.
    SemiImmutable,
    /// Octave shift only.
    Structural,
    /// Full modification allowed.
    Flexible,
}

impl ProtectionLevel {
    /// Derive the protection level for a note source.
    pub fn of(source: NoteSource) -> ProtectionLevel {
        match source {
            NoteSource::SubjectCore
            | NoteSource::Cantus
            | NoteSource::GroundBass
            | NoteSource::CanonLeader
            | NoteSource::Coda
            | NoteSource::CadenceApproach => ProtectionLevel::Immutable,

            NoteSource::FinalCadence => ProtectionLevel::Architectural,

            NoteSource::Subject => ProtectionLevel::SemiImmutable,

            NoteSource::Answer
            | NoteSource::Countersubject
            | NoteSource::Pedal
            | NoteSource::ToccataFigure
            | NoteSource::SequenceNote
            | NoteSource::GoldbergAria
            | NoteSource::GoldbergBass => ProtectionLevel::Structural,

            NoteSource::Episode
            | NoteSource::FreeCounterpoint
            | NoteSource::Ornament
            | NoteSource::Arpeggio
            | NoteSource::Texture
            | NoteSource::PreludeFiguration
            | NoteSource::ToccataGesture
            | NoteSource::CanonFollower
            | NoteSource::GoldbergFigura
            | NoteSource::GrandPause
            | NoteSource::ChromaticPassing
            | NoteSource::FalseEntry
            | NoteSource::PostProcess => ProtectionLevel::Flexible,
        }
    }

    /// Whether a pass may change this note's pitch freely.
    pub fn allows_pitch_change(&self) -> bool {
        matches!(self, ProtectionLevel::Flexible)
    }

    /// Whether a pass may shift this note's pitch by whole octaves.
    pub fn allows_octave_shift(&self) -> bool {
        matches!(
            self,
            ProtectionLevel::SemiImmutable | ProtectionLevel::Structural | ProtectionLevel::Flexible
        )
    }
}
