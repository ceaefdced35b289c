//! Fugue section layout.

use serde::Serialize;
use thiserror::Error;

use crate::tonal::Phase;
use crate::types::{Key, Tick};

/// Kind of a fugue section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Exposition,
    Episode,
    MiddleEntry,
    Stretto,
    Coda,
}

impl SectionKind {
    pub fn name(&self) -> &'static str {
        match self {
            SectionKind::Exposition => "exposition",
            SectionKind::Episode => "episode",
            SectionKind::MiddleEntry => "middle_entry",
            SectionKind::Stretto => "stretto",
            SectionKind::Coda => "coda",
        }
    }

    /// Sections that carry subject entries. The cadential coverage pass
    /// must not insert formulas inside these.
    pub fn has_subject_entries(&self) -> bool {
        matches!(
            self,
            SectionKind::Exposition | SectionKind::MiddleEntry | SectionKind::Stretto
        )
    }
}

/// One section: `[start_tick, end_tick)` in a key.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Section {
    pub kind: SectionKind,
    pub phase: Phase,
    pub start_tick: Tick,
    pub end_tick: Tick,
    pub key: Key,
}

/// Errors rejected at structure-build time.
#[derive(Debug, Error, PartialEq)]
pub enum StructureError {
    #[error("first section must be Exposition in the Establish phase")]
    BadOpening,

    #[error("section at tick {tick} regresses phase")]
    PhaseRegression { tick: Tick },

    #[error("section [{start}, {end}) overlaps the previous section")]
    Overlap { start: Tick, end: Tick },

    #[error("section interval is empty: [{start}, {end})")]
    EmptyInterval { start: Tick, end: Tick },
}

/// Ordered, non-overlapping fugue sections with non-decreasing phases.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FugueStructure {
    sections: Vec<Section>,
}

impl FugueStructure {
    pub fn new() -> FugueStructure {
        FugueStructure {
            sections: Vec::new(),
        }
    }

    /// Append a section. On rejection the structure is unmodified.
    pub fn add_section(&mut self, section: Section) -> Result<(), StructureError> {
        if section.end_tick <= section.start_tick {
            return Err(StructureError::EmptyInterval {
                start: section.start_tick,
                end: section.end_tick,
            });
        }
        match self.sections.last() {
            None => {
                if section.kind != SectionKind::Exposition || section.phase != Phase::Establish {
                    return Err(StructureError::BadOpening);
                }
                if section.start_tick != 0 {
                    return Err(StructureError::BadOpening);
                }
            }
            Some(last) => {
                if section.phase < last.phase {
                    return Err(StructureError::PhaseRegression {
                        tick: section.start_tick,
                    });
                }
                if section.start_tick < last.end_tick {
                    return Err(StructureError::Overlap {
                        start: section.start_tick,
                        end: section.end_tick,
                    });
                }
            }
        }
        self.sections.push(section);
        Ok(())
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn end_tick(&self) -> Tick {
        self.sections.last().map(|s| s.end_tick).unwrap_or(0)
    }

    /// Section covering a tick, if any.
    pub fn section_at(&self, tick: Tick) -> Option<&Section> {
        self.sections
            .iter()
            .find(|s| s.start_tick <= tick && tick < s.end_tick)
    }

    /// Whether a tick falls inside a section carrying subject entries.
    pub fn in_subject_entry_section(&self, tick: Tick) -> bool {
        self.section_at(tick)
            .map(|s| s.kind.has_subject_entries())
            .unwrap_or(false)
    }
}
