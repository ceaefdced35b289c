//! Fugata Canonical Spec Library
//!
//! This crate provides types, validation, and hashing for Fugata score specs.
//! Specs are JSON documents that describe a deterministic generation request
//! for one Baroque form (fugue, chaconne, prelude, toccata, fantasia,
//! passacaglia, Goldberg variations).
//!
//! # Overview
//!
//! A score spec has two layers:
//!
//! - **Contract fields**: `name`, `seed`, and the `form` discriminant
//! - **Form config**: form-specific generation parameters (voice count,
//!   key, character, bar counts, ...)
//!
//! # Example
//!
//! ```
//! use fugata_spec::{ScoreSpec, FormConfig, FugueConfig, KeyName, Mode};
//! use fugata_spec::validation::validate_spec;
//!
//! let spec = ScoreSpec {
//!     name: "fugue-c-major-01".to_string(),
//!     seed: 42,
//!     config: FormConfig::Fugue(FugueConfig {
//!         key: KeyName::C,
//!         mode: Mode::Major,
//!         voices: 3,
//!         ..Default::default()
//!     }),
//! };
//!
//! let result = validate_spec(&spec);
//! assert!(result.is_ok());
//! ```
//!
//! # Modules
//!
//! - [`config`]: Per-form configuration types
//! - [`error`]: Error and warning types for validation
//! - [`hash`]: Canonical hashing and per-subsystem seed derivation
//! - [`report`]: Report types for generation results
//! - [`validation`]: Spec validation functions

pub mod config;
pub mod error;
pub mod hash;
pub mod report;
pub mod validation;

pub use config::{
    Archetype, Character, ChaconneConfig, FantasiaConfig, FormConfig, FugueConfig, GoldbergConfig,
    InstrumentTag, KeyName, MajorSectionTexture, Mode, PassacagliaConfig, PreludeConfig, ScoreSpec,
    ToccataConfig, MAX_VOICES, MIN_VOICES,
};
pub use error::{
    EngineError, ErrorCode, SpecError, ValidationError, ValidationResult, ValidationWarning,
    WarningCode,
};
pub use hash::{canonical_spec_hash, derive_subsystem_seed, MAX_SEED};
pub use report::{
    CadenceInfo, GenerationReport, ReportError, ReportWarning, SectionInfo, TonalMoveInfo,
    REPORT_VERSION,
};
pub use validation::validate_spec;
