//! The harmonic timeline: a sorted, append-only sequence of events.

use thiserror::Error;

use crate::types::{Key, Tick, TICKS_PER_BEAT};

use super::chord::{Chord, ChordDegree, ChordQuality};
use super::event::{CadenceType, HarmonicEvent};

/// Errors raised while building a timeline.
#[derive(Debug, Error, PartialEq)]
pub enum TimelineError {
    #[error("event at tick {tick} overlaps previous event ending at {prev_end}")]
    Overlap { tick: Tick, prev_end: Tick },

    #[error("event interval is empty or negative: [{tick}, {end_tick})")]
    EmptyInterval { tick: Tick, end_tick: Tick },
}

/// Ordered sequence of harmonic events.
///
/// Append-only during construction and read-only thereafter; lookups use
/// binary search over the sorted event list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HarmonicTimeline {
    events: Vec<HarmonicEvent>,
}

impl HarmonicTimeline {
    pub fn new() -> HarmonicTimeline {
        HarmonicTimeline { events: Vec::new() }
    }

    /// Append an event. Events must arrive in tick order without
    /// overlap.
    pub fn push(&mut self, event: HarmonicEvent) -> Result<(), TimelineError> {
        if event.end_tick <= event.tick {
            return Err(TimelineError::EmptyInterval {
                tick: event.tick,
                end_tick: event.end_tick,
            });
        }
        if let Some(last) = self.events.last() {
            if event.tick < last.end_tick {
                return Err(TimelineError::Overlap {
                    tick: event.tick,
                    prev_end: last.end_tick,
                });
            }
        }
        self.events.push(event);
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn events(&self) -> &[HarmonicEvent] {
        &self.events
    }

    pub fn end_tick(&self) -> Tick {
        self.events.last().map(|e| e.end_tick).unwrap_or(0)
    }

    /// The event covering `tick`, if any.
    pub fn find_at(&self, tick: Tick) -> Option<&HarmonicEvent> {
        let idx = self.events.partition_point(|e| e.tick <= tick);
        if idx == 0 {
            return None;
        }
        let event = &self.events[idx - 1];
        event.covers(tick).then_some(event)
    }

    /// The event covering `tick`, or a default whole-bar I chord in
    /// C major when the timeline is empty or has a gap there.
    pub fn get_at(&self, tick: Tick) -> HarmonicEvent {
        if let Some(event) = self.find_at(tick) {
            return *event;
        }
        let key = self
            .events
            .first()
            .map(|e| e.key)
            .unwrap_or(Key::new(0, false));
        let beat = tick - tick % TICKS_PER_BEAT;
        HarmonicEvent::new(
            beat,
            beat + TICKS_PER_BEAT,
            key,
            Chord::diatonic(ChordDegree::I, key),
        )
    }

    /// Key at a tick (home key of the nearest covering event).
    pub fn key_at(&self, tick: Tick) -> Key {
        self.get_at(tick).key
    }

    /// All events intersecting `[start, end)`.
    pub fn range(&self, start: Tick, end: Tick) -> &[HarmonicEvent] {
        let lo = self.events.partition_point(|e| e.end_tick <= start);
        let hi = self.events.partition_point(|e| e.tick < end);
        &self.events[lo..hi]
    }

    /// Rewrite the events in `[window_start, window_end)` to realize a
    /// cadence of the given type in `key`.
    ///
    /// The final event in the window becomes the cadence target, the
    /// penultimate one the approach chord; both are marked immutable.
    /// The Picardy third only flips the final chord's quality from
    /// minor to major.
    pub fn apply_cadence(
        &mut self,
        cadence: CadenceType,
        key: Key,
        window_start: Tick,
        window_end: Tick,
    ) {
        let lo = self.events.partition_point(|e| e.end_tick <= window_start);
        let hi = self.events.partition_point(|e| e.tick < window_end);
        if lo >= hi {
            return;
        }
        let window = &mut self.events[lo..hi];
        let len = window.len();

        if cadence == CadenceType::PicardyThird {
            let last = &mut window[len - 1];
            if last.chord.quality == ChordQuality::Minor {
                last.chord.quality = ChordQuality::Major;
            } else if last.chord.quality == ChordQuality::Minor7 {
                last.chord.quality = ChordQuality::Dominant7;
            }
            last.is_immutable = true;
            return;
        }

        let (approach, target) = cadence_chords(cadence, key);
        {
            let last = &mut window[len - 1];
            last.key = key;
            last.chord = target;
            last.bass_pitch = 48 + target.bass_pc(key);
            last.is_immutable = true;
        }
        if len >= 2 {
            let prev = &mut window[len - 2];
            prev.key = key;
            prev.chord = approach;
            prev.bass_pitch = 48 + approach.bass_pc(key);
            prev.is_immutable = true;
        }
    }
}

/// Approach and target chords for a cadence type in a key.
fn cadence_chords(cadence: CadenceType, key: Key) -> (Chord, Chord) {
    let tonic = Chord::diatonic(ChordDegree::I, key);
    let dominant = Chord::from_degree(ChordDegree::V, ChordQuality::Major, key);
    match cadence {
        CadenceType::Perfect => (
            Chord::from_degree(ChordDegree::V, ChordQuality::Dominant7, key),
            tonic,
        ),
        CadenceType::Half => (tonic, dominant),
        CadenceType::Deceptive => {
            let target = if key.minor {
                Chord::from_degree(ChordDegree::FlatVI, ChordQuality::Major, key)
            } else {
                Chord::diatonic(ChordDegree::VI, key)
            };
            (
                Chord::from_degree(ChordDegree::V, ChordQuality::Dominant7, key),
                target,
            )
        }
        CadenceType::Phrygian => (
            Chord::from_degree(ChordDegree::IV, ChordQuality::Minor, key).with_inversion(1),
            dominant,
        ),
        CadenceType::Plagal => {
            let quality = if key.minor {
                ChordQuality::Minor
            } else {
                ChordQuality::Major
            };
            (Chord::from_degree(ChordDegree::IV, quality, key), tonic)
        }
        // Handled in apply_cadence; fall back to a perfect close.
        CadenceType::PicardyThird => (
            Chord::from_degree(ChordDegree::V, ChordQuality::Dominant7, key),
            tonic,
        ),
    }
}
