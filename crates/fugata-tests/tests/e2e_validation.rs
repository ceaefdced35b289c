//! Spec validation end to end: parse real JSON documents and check the
//! accumulated error and warning codes.

use fugata_spec::validation::validate_spec;
use fugata_spec::{
    FormConfig, FugueConfig, GoldbergConfig, InstrumentTag, PreludeConfig, ScoreSpec,
};

fn parse(json: &str) -> ScoreSpec {
    serde_json::from_str(json).unwrap()
}

#[test]
fn default_specs_for_every_form_validate_cleanly() {
    for form in [
        "fugue",
        "chaconne",
        "prelude",
        "toccata",
        "fantasia",
        "passacaglia",
        "goldberg",
    ] {
        let spec = parse(&format!(
            r#"{{"name": "ok-{}", "seed": 1, "form": "{}", "key": "C"}}"#,
            form, form
        ));
        let result = validate_spec(&spec);
        assert!(result.is_ok(), "{}: {:?}", form, result.errors);
    }
}

#[test]
fn a_bad_name_is_rejected_with_e001() {
    let spec = ScoreSpec {
        name: "Bad Name!".to_string(),
        seed: 1,
        config: FormConfig::Fugue(FugueConfig::default()),
    };
    let result = validate_spec(&spec);
    assert!(result.errors.iter().any(|e| e.code == "E001"));
}

#[test]
fn voice_counts_outside_two_to_five_are_rejected() {
    for voices in [0u8, 1, 6] {
        let spec = ScoreSpec {
            name: "bad-voices".to_string(),
            seed: 1,
            config: FormConfig::Fugue(FugueConfig {
                voices,
                ..Default::default()
            }),
        };
        let result = validate_spec(&spec);
        assert!(
            result.errors.iter().any(|e| e.code == "E003"),
            "voices {} slipped through",
            voices
        );
    }
}

#[test]
fn four_voice_guitar_is_an_instrument_mismatch() {
    let spec = ScoreSpec {
        name: "guitar-four".to_string(),
        seed: 1,
        config: FormConfig::Fugue(FugueConfig {
            voices: 4,
            instrument: InstrumentTag::Guitar,
            ..Default::default()
        }),
    };
    let result = validate_spec(&spec);
    assert!(result.errors.iter().any(|e| e.code == "E007"));
}

#[test]
fn five_voice_violin_warns_but_passes() {
    let spec = ScoreSpec {
        name: "violin-five".to_string(),
        seed: 1,
        config: FormConfig::Fugue(FugueConfig {
            voices: 5,
            instrument: InstrumentTag::Violin,
            ..Default::default()
        }),
    };
    let result = validate_spec(&spec);
    assert!(result.is_ok());
    assert!(result.warnings.iter().any(|w| w.code == "W002"));
}

#[test]
fn out_of_band_probability_is_rejected_with_e005() {
    let spec = ScoreSpec {
        name: "bad-nct".to_string(),
        seed: 1,
        config: FormConfig::Prelude(PreludeConfig {
            nct_probability: 1.5,
            ..Default::default()
        }),
    };
    let result = validate_spec(&spec);
    assert!(result.errors.iter().any(|e| e.code == "E005"));
}

#[test]
fn goldberg_variation_count_is_range_checked() {
    let spec = ScoreSpec {
        name: "too-many-variations".to_string(),
        seed: 1,
        config: FormConfig::Goldberg(GoldbergConfig {
            variations: 31,
            ..Default::default()
        }),
    };
    let result = validate_spec(&spec);
    assert!(result.errors.iter().any(|e| e.code == "E004"));
}

#[test]
fn near_overflow_seed_only_warns() {
    let spec = parse(r#"{"name": "edge-seed", "seed": 4294967295, "form": "fugue", "key": "C"}"#);
    let result = validate_spec(&spec);
    assert!(result.is_ok());
    assert!(result.warnings.iter().any(|w| w.code == "W001"));
}

#[test]
fn unknown_config_fields_fail_to_parse() {
    let parsed: Result<ScoreSpec, _> = serde_json::from_str(
        r#"{"name": "extra", "seed": 1, "form": "fugue", "key": "C", "tempo": 140}"#,
    );
    assert!(parsed.is_err());
}
