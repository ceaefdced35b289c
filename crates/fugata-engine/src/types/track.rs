//! Voice tracks.

use serde::Serialize;

use super::note::{ModifiedBy, NoteEvent};

/// A channel id plus the note events of one voice.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Track {
    pub channel: u8,
    pub notes: Vec<NoteEvent>,
}

impl Track {
    pub fn new(channel: u8) -> Track {
        Track {
            channel,
            notes: Vec::new(),
        }
    }

    /// Sort by start tick and trim within-voice overlaps to at most one
    /// tick of rounding tolerance. Zero-duration notes are dropped.
    ///
    /// Trimming shortens the earlier note rather than moving the later
    /// one, so entry points survive.
    pub fn finalize(&mut self) {
        self.notes.retain(|n| n.duration > 0);
        self.notes
            .sort_by_key(|n| (n.start_tick, n.pitch, n.duration));
        for i in 0..self.notes.len().saturating_sub(1) {
            let next_start = self.notes[i + 1].start_tick;
            let prev = &mut self.notes[i];
            if prev.end_tick() > next_start + 1 {
                let new_duration = (next_start + 1).saturating_sub(prev.start_tick);
                if new_duration > 0 && new_duration < prev.duration {
                    prev.duration = new_duration;
                    prev.modified_by.insert(ModifiedBy::OVERLAP_TRIM);
                }
            }
        }
        self.notes.retain(|n| n.duration > 0);
    }

    /// Last tick covered by any note, or 0 for an empty track.
    pub fn end_tick(&self) -> u64 {
        self.notes.iter().map(|n| n.end_tick()).max().unwrap_or(0)
    }
}
