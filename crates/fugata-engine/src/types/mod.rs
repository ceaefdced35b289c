//! Core score types: ticks, keys, note events, provenance, tracks.

mod key;
mod note;
mod protection;
mod tick;
mod track;


pub use key::{Key, Scale};
pub use note::{ModifiedBy, NoteEvent, NoteSource, Provenance, TransformStep, TRAIL_CAPACITY};
pub use protection::ProtectionLevel;
pub use tick::{
    bar_of, beat_in_bar, is_strong_beat, tick_of_bar, Tick, BEATS_PER_BAR, TICKS_PER_BAR,
    TICKS_PER_BEAT,
};
pub use track::Track;

/// Inclusive playable register for one voice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoiceRange {
    pub low: u8,
    pub high: u8,
}

impl VoiceRange {
    pub fn contains(&self, pitch: u8) -> bool {
        pitch >= self.low && pitch <= self.high
    }

    pub fn center(&self) -> u8 {
        ((self.low as u16 + self.high as u16) / 2) as u8
    }

    /// Clamp a pitch into the register.
    pub fn clamp(&self, pitch: u8) -> u8 {
        pitch.clamp(self.low, self.high)
    }
}

/// Standard SATB-style registers for 2-5 voices, top voice first.
///
/// Voice 0 is the soprano; higher indices sit lower. Adjacent registers
/// overlap by roughly a fifth so voice leading has room to move.
pub fn default_registers(num_voices: u8) -> Vec<VoiceRange> {
    const FULL: [VoiceRange; 5] = [
        VoiceRange { low: 60, high: 84 }, // soprano
        VoiceRange { low: 55, high: 79 }, // mezzo
        VoiceRange { low: 48, high: 72 }, // alto/tenor
        VoiceRange { low: 41, high: 65 }, // baritone
        VoiceRange { low: 36, high: 60 }, // bass
    ];
    match num_voices {
        0 => Vec::new(),
        1 => vec![FULL[0]],
        2 => vec![FULL[0], FULL[4]],
        3 => vec![FULL[0], FULL[2], FULL[4]],
        4 => vec![FULL[0], FULL[1], FULL[2], FULL[4]],
        _ => FULL.to_vec(),
    }
}
