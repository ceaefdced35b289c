//! Error types for spec validation and generation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error codes for spec validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// E001: Invalid spec name format
    InvalidName,
    /// E002: Seed out of valid range
    SeedOutOfRange,
    /// E003: Voice count outside 2-5
    InvalidVoiceCount,
    /// E004: Bar count outside its documented range
    InvalidBarCount,
    /// E005: Probability or ratio outside 0.0-1.0
    InvalidRatio,
    /// E006: Malformed variation plan constraint
    InvalidVariationPlan,
    /// E007: Instrument cannot cover the requested voice count
    InstrumentVoiceMismatch,
}

impl ErrorCode {
    /// Returns the error code string (e.g., "E001").
    pub fn code(&self) -> &'static str {
        match self {
            ErrorCode::InvalidName => "E001",
            ErrorCode::SeedOutOfRange => "E002",
            ErrorCode::InvalidVoiceCount => "E003",
            ErrorCode::InvalidBarCount => "E004",
            ErrorCode::InvalidRatio => "E005",
            ErrorCode::InvalidVariationPlan => "E006",
            ErrorCode::InstrumentVoiceMismatch => "E007",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Warning codes for spec validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WarningCode {
    /// W001: Seed near overflow boundary
    SeedNearOverflow,
    /// W002: Unusual combination (e.g. 5-voice violin fugue)
    UnusualCombination,
    /// W003: Climax position outside the customary 0.5-0.8 window
    UnusualClimaxPosition,
}

impl WarningCode {
    pub fn code(&self) -> &'static str {
        match self {
            WarningCode::SeedNearOverflow => "W001",
            WarningCode::UnusualCombination => "W002",
            WarningCode::UnusualClimaxPosition => "W003",
        }
    }
}

impl std::fmt::Display for WarningCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A single validation error with its code and message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    pub code: String,
    pub message: String,
    /// Dotted path to the offending field, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl ValidationError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ValidationError {
            code: code.code().to_string(),
            message: message.into(),
            field: None,
        }
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }
}

/// A single validation warning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationWarning {
    pub code: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(code: WarningCode, message: impl Into<String>) -> Self {
        ValidationWarning {
            code: code.code().to_string(),
            message: message.into(),
        }
    }
}

/// Accumulated result of validating a spec.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    /// True when no errors were recorded (warnings are allowed).
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn push_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn push_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }
}

/// Errors raised while loading or hashing a spec document.
#[derive(Debug, Error)]
pub enum SpecError {
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("spec validation failed: {0}")]
    Invalid(String),
}

/// Trait implemented by engine error types so the CLI and reports can
/// surface stable codes without depending on concrete error enums.
pub trait EngineError: std::error::Error {
    /// Stable machine-readable code (e.g. "GEN_003").
    fn code(&self) -> &'static str;

    /// Subsystem category (e.g. "fugue", "chaconne", "guard").
    fn category(&self) -> &'static str;
}
