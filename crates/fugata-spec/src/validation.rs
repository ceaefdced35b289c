//! Spec validation logic.
//!
//! Validation never mutates the spec and never touches the engine; it
//! checks the documented field ranges so a bad request fails before any
//! generation work starts.

use crate::config::{
    FormConfig, InstrumentTag, ScoreSpec, MAX_VOICES, MIN_VOICES,
};
use crate::error::{
    ErrorCode, ValidationError, ValidationResult, ValidationWarning, WarningCode,
};

/// Threshold for warning about a seed near the overflow boundary.
const SEED_OVERFLOW_WARNING_THRESHOLD: u32 = u32::MAX - 1000;

/// Validates a spec and returns the accumulated errors and warnings.
///
/// # Example
/// ```
/// use fugata_spec::{ScoreSpec, FormConfig, FugueConfig};
/// use fugata_spec::validation::validate_spec;
///
/// let spec = ScoreSpec {
///     name: "fugue-c-01".to_string(),
///     seed: 42,
///     config: FormConfig::Fugue(FugueConfig::default()),
/// };
/// assert!(validate_spec(&spec).is_ok());
/// ```
pub fn validate_spec(spec: &ScoreSpec) -> ValidationResult {
    let mut result = ValidationResult::default();

    validate_name(&spec.name, &mut result);

    // Seeds are u32, so the full range is representable; retry derivation
    // adds small offsets, hence the boundary warning.
    if spec.seed >= SEED_OVERFLOW_WARNING_THRESHOLD {
        result.push_warning(ValidationWarning::new(
            WarningCode::SeedNearOverflow,
            format!("seed {} is near the u32 boundary", spec.seed),
        ));
    }

    let voices = spec.config.voices();
    if !(MIN_VOICES..=MAX_VOICES).contains(&voices) {
        result.push_error(
            ValidationError::new(
                ErrorCode::InvalidVoiceCount,
                format!("voice count {} outside {}-{}", voices, MIN_VOICES, MAX_VOICES),
            )
            .with_field("voices"),
        );
    }

    // Bowed and plucked single-line instruments cannot sustain many voices.
    match spec.config.instrument() {
        InstrumentTag::Violin | InstrumentTag::Cello if voices > 4 => {
            result.push_warning(ValidationWarning::new(
                WarningCode::UnusualCombination,
                format!(
                    "{} voices on a bowed instrument will lean on the simultaneity guard",
                    voices
                ),
            ));
        }
        InstrumentTag::Guitar if voices > 3 => {
            result.push_error(
                ValidationError::new(
                    ErrorCode::InstrumentVoiceMismatch,
                    format!("guitar cannot cover {} voices", voices),
                )
                .with_field("voices"),
            );
        }
        _ => {}
    }

    match &spec.config {
        FormConfig::Fugue(cfg) => {
            check_bar_range("subject_bars", cfg.subject_bars, 1, 4, &mut result);
            check_bar_range("episode_bars", cfg.episode_bars, 2, 8, &mut result);
            check_bar_range("develop_pairs", cfg.develop_pairs, 1, 4, &mut result);
            if !(0.0..=1.0).contains(&cfg.climax_position) {
                result.push_error(
                    ValidationError::new(
                        ErrorCode::InvalidRatio,
                        format!("climax_position {} outside 0.0-1.0", cfg.climax_position),
                    )
                    .with_field("climax_position"),
                );
            } else if !(0.5..=0.8).contains(&cfg.climax_position) {
                result.push_warning(ValidationWarning::new(
                    WarningCode::UnusualClimaxPosition,
                    format!("climax_position {} outside the customary 0.5-0.8", cfg.climax_position),
                ));
            }
        }
        FormConfig::Chaconne(cfg) => {
            check_bar_range("variation_bars", cfg.variation_bars, 2, 8, &mut result);
            if cfg.max_variation_retries == 0 {
                result.push_error(
                    ValidationError::new(
                        ErrorCode::InvalidVariationPlan,
                        "max_variation_retries must be at least 1",
                    )
                    .with_field("max_variation_retries"),
                );
            }
        }
        FormConfig::Prelude(cfg) => {
            check_bar_range("bars", cfg.bars, 4, 64, &mut result);
            if !(0.0..=1.0).contains(&cfg.nct_probability) {
                result.push_error(
                    ValidationError::new(
                        ErrorCode::InvalidRatio,
                        format!("nct_probability {} outside 0.0-1.0", cfg.nct_probability),
                    )
                    .with_field("nct_probability"),
                );
            }
        }
        FormConfig::Toccata(cfg) => {
            check_bar_range("bars", cfg.bars, 8, 64, &mut result);
            check_bar_range("gesture_sections", cfg.gesture_sections, 1, 6, &mut result);
        }
        FormConfig::Fantasia(cfg) => {
            check_bar_range("bars", cfg.bars, 8, 96, &mut result);
        }
        FormConfig::Passacaglia(cfg) => {
            check_bar_range("statements", cfg.statements, 3, 24, &mut result);
            check_bar_range("ground_bars", cfg.ground_bars, 2, 8, &mut result);
        }
        FormConfig::Goldberg(cfg) => {
            check_bar_range("variations", cfg.variations, 1, 30, &mut result);
        }
    }

    result
}

fn validate_name(name: &str, result: &mut ValidationResult) {
    let ok = !name.is_empty()
        && name.len() <= 64
        && name
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-' || b == b'_')
        && name.as_bytes()[0].is_ascii_lowercase();
    if !ok {
        result.push_error(
            ValidationError::new(
                ErrorCode::InvalidName,
                format!(
                    "name '{}' must be 1-64 chars of [a-z0-9_-] starting with a letter",
                    name
                ),
            )
            .with_field("name"),
        );
    }
}

fn check_bar_range(field: &str, value: u8, min: u8, max: u8, result: &mut ValidationResult) {
    if !(min..=max).contains(&value) {
        result.push_error(
            ValidationError::new(
                ErrorCode::InvalidBarCount,
                format!("{} {} outside {}-{}", field, value, min, max),
            )
            .with_field(field),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ChaconneConfig, FugueConfig};

    #[test]
    fn default_fugue_spec_is_valid() {
        let spec = ScoreSpec {
            name: "fugue-c-01".to_string(),
            seed: 42,
            config: FormConfig::Fugue(FugueConfig::default()),
        };
        let result = validate_spec(&spec);
        assert!(result.is_ok(), "errors: {:?}", result.errors);
    }

    #[test]
    fn voice_count_out_of_range_is_rejected() {
        let spec = ScoreSpec {
            name: "fugue-bad".to_string(),
            seed: 1,
            config: FormConfig::Fugue(FugueConfig {
                voices: 7,
                ..Default::default()
            }),
        };
        let result = validate_spec(&spec);
        assert!(!result.is_ok());
        assert_eq!(result.errors[0].code, "E003");
    }

    #[test]
    fn guitar_with_four_voices_is_rejected() {
        let spec = ScoreSpec {
            name: "bad-guitar".to_string(),
            seed: 1,
            config: FormConfig::Chaconne(ChaconneConfig {
                instrument: crate::config::InstrumentTag::Guitar,
                voices: 4,
                ..Default::default()
            }),
        };
        let result = validate_spec(&spec);
        assert!(result.errors.iter().any(|e| e.code == "E007"));
    }

    #[test]
    fn bad_name_is_rejected() {
        let spec = ScoreSpec {
            name: "Fugue In C".to_string(),
            seed: 1,
            config: FormConfig::Fugue(FugueConfig::default()),
        };
        assert!(!validate_spec(&spec).is_ok());
    }
}
