//! Structural planners: fugue section layout, chaconne scheme and
//! variation plan, Goldberg 32-bar grid.

mod chaconne;
mod fugue;
mod goldberg;

#[cfg(test)]
mod tests;

pub use chaconne::{
    create_standard_variation_plan, validate_variation_plan, ChaconneScheme, PlanError,
    SchemeEntry, SchemeFailReport, Variation, VariationPlan, VariationRole, VariationType,
};
pub use fugue::{FugueStructure, Section, SectionKind, StructureError};
pub use goldberg::{GoldbergBar, GoldbergGrid, GOLDBERG_BARS};
