//! Per-form configuration types.
//!
//! Each Baroque form has a typed config with a stable field set. Unknown
//! fields are rejected at deserialization time (`deny_unknown_fields`),
//! so a spec that misspells a knob fails loudly instead of silently
//! falling back to a default.

use serde::{Deserialize, Serialize};

/// Minimum number of voices a form config may request.
pub const MIN_VOICES: u8 = 2;
/// Maximum number of voices a form config may request.
pub const MAX_VOICES: u8 = 5;

/// A complete generation request: contract fields plus one form config.
///
/// `deny_unknown_fields` cannot be combined with `flatten`, so unknown
/// fields are caught by the flattened form config instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreSpec {
    /// Human-readable identifier, used for output filenames and reports.
    pub name: String,
    /// Master seed. Every subsystem RNG stream is derived from this.
    pub seed: u32,
    /// Form-specific configuration.
    #[serde(flatten)]
    pub config: FormConfig,
}

/// Tagged union over the per-form configs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "form", rename_all = "snake_case")]
pub enum FormConfig {
    Fugue(FugueConfig),
    Chaconne(ChaconneConfig),
    Prelude(PreludeConfig),
    Toccata(ToccataConfig),
    Fantasia(FantasiaConfig),
    Passacaglia(PassacagliaConfig),
    Goldberg(GoldbergConfig),
}

impl FormConfig {
    /// Form name as used in the `form` JSON tag.
    pub fn form_name(&self) -> &'static str {
        match self {
            FormConfig::Fugue(_) => "fugue",
            FormConfig::Chaconne(_) => "chaconne",
            FormConfig::Prelude(_) => "prelude",
            FormConfig::Toccata(_) => "toccata",
            FormConfig::Fantasia(_) => "fantasia",
            FormConfig::Passacaglia(_) => "passacaglia",
            FormConfig::Goldberg(_) => "goldberg",
        }
    }

    /// Requested key, common to every form.
    pub fn key(&self) -> KeyName {
        match self {
            FormConfig::Fugue(c) => c.key,
            FormConfig::Chaconne(c) => c.key,
            FormConfig::Prelude(c) => c.key,
            FormConfig::Toccata(c) => c.key,
            FormConfig::Fantasia(c) => c.key,
            FormConfig::Passacaglia(c) => c.key,
            FormConfig::Goldberg(c) => c.key,
        }
    }

    /// Requested mode, common to every form.
    pub fn mode(&self) -> Mode {
        match self {
            FormConfig::Fugue(c) => c.mode,
            FormConfig::Chaconne(c) => c.mode,
            FormConfig::Prelude(c) => c.mode,
            FormConfig::Toccata(c) => c.mode,
            FormConfig::Fantasia(c) => c.mode,
            FormConfig::Passacaglia(c) => c.mode,
            FormConfig::Goldberg(c) => c.mode,
        }
    }

    /// Requested voice count.
    pub fn voices(&self) -> u8 {
        match self {
            FormConfig::Fugue(c) => c.voices,
            FormConfig::Chaconne(c) => c.voices,
            FormConfig::Prelude(c) => c.voices,
            FormConfig::Toccata(c) => c.voices,
            FormConfig::Fantasia(c) => c.voices,
            FormConfig::Passacaglia(c) => c.voices,
            FormConfig::Goldberg(c) => c.voices,
        }
    }

    /// Target instrument.
    pub fn instrument(&self) -> InstrumentTag {
        match self {
            FormConfig::Fugue(c) => c.instrument,
            FormConfig::Chaconne(c) => c.instrument,
            FormConfig::Prelude(c) => c.instrument,
            FormConfig::Toccata(c) => c.instrument,
            FormConfig::Fantasia(c) => c.instrument,
            FormConfig::Passacaglia(c) => c.instrument,
            FormConfig::Goldberg(c) => c.instrument,
        }
    }
}

/// Tonic pitch class of the home key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyName {
    C,
    Db,
    D,
    Eb,
    E,
    F,
    Gb,
    G,
    Ab,
    A,
    Bb,
    B,
}

impl KeyName {
    /// Pitch class 0-11 (C = 0).
    pub fn pitch_class(&self) -> u8 {
        match self {
            KeyName::C => 0,
            KeyName::Db => 1,
            KeyName::D => 2,
            KeyName::Eb => 3,
            KeyName::E => 4,
            KeyName::F => 5,
            KeyName::Gb => 6,
            KeyName::G => 7,
            KeyName::Ab => 8,
            KeyName::A => 9,
            KeyName::Bb => 10,
            KeyName::B => 11,
        }
    }

    /// Key name for a pitch class, using flat spellings.
    pub fn from_pitch_class(pc: u8) -> KeyName {
        match pc % 12 {
            0 => KeyName::C,
            1 => KeyName::Db,
            2 => KeyName::D,
            3 => KeyName::Eb,
            4 => KeyName::E,
            5 => KeyName::F,
            6 => KeyName::Gb,
            7 => KeyName::G,
            8 => KeyName::Ab,
            9 => KeyName::A,
            10 => KeyName::Bb,
            _ => KeyName::B,
        }
    }
}

/// Major or minor mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Major,
    Minor,
}

impl Mode {
    pub fn is_minor(&self) -> bool {
        matches!(self, Mode::Minor)
    }
}

impl Default for Mode {
    fn default() -> Self {
        Mode::Major
    }
}

/// Target instrument for the impossibility guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstrumentTag {
    Violin,
    Cello,
    Guitar,
    Organ,
    Harpsichord,
    Piano,
}

impl Default for InstrumentTag {
    fn default() -> Self {
        InstrumentTag::Harpsichord
    }
}

/// Expressive character. Biases subject contour, entry order, and tempo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Character {
    Noble,
    Playful,
    Severe,
}

impl Default for Character {
    fn default() -> Self {
        Character::Noble
    }
}

/// Overall proportions of the piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Archetype {
    Compact,
    Expansive,
}

impl Default for Archetype {
    fn default() -> Self {
        Archetype::Compact
    }
}

fn default_voices() -> u8 {
    3
}

fn default_subject_bars() -> u8 {
    2
}

fn default_episode_bars() -> u8 {
    4
}

fn default_develop_pairs() -> u8 {
    2
}

fn default_climax_position() -> f64 {
    0.7
}

fn default_true() -> bool {
    true
}

/// Fugue generation parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FugueConfig {
    pub key: KeyName,
    #[serde(default)]
    pub mode: Mode,
    /// Number of voices (2-5).
    #[serde(default = "default_voices")]
    pub voices: u8,
    #[serde(default)]
    pub instrument: InstrumentTag,
    #[serde(default)]
    pub character: Character,
    #[serde(default)]
    pub archetype: Archetype,
    /// Subject length in bars (1-4).
    #[serde(default = "default_subject_bars")]
    pub subject_bars: u8,
    /// Episode length in bars (2-8).
    #[serde(default = "default_episode_bars")]
    pub episode_bars: u8,
    /// Number of episode + middle-entry pairs in the Develop phase.
    #[serde(default = "default_develop_pairs")]
    pub develop_pairs: u8,
    /// Whether the Resolve phase includes a stretto before the coda.
    #[serde(default = "default_true")]
    pub stretto: bool,
    /// Relative position of the dynamic climax (0.0-1.0).
    #[serde(default = "default_climax_position")]
    pub climax_position: f64,
}

impl Default for FugueConfig {
    fn default() -> Self {
        FugueConfig {
            key: KeyName::C,
            mode: Mode::Major,
            voices: default_voices(),
            instrument: InstrumentTag::default(),
            character: Character::default(),
            archetype: Archetype::default(),
            subject_bars: default_subject_bars(),
            episode_bars: default_episode_bars(),
            develop_pairs: default_develop_pairs(),
            stretto: true,
            climax_position: default_climax_position(),
        }
    }
}

fn default_variation_bars() -> u8 {
    4
}

/// Texture classes a chaconne major section may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MajorSectionTexture {
    Cantabile,
    Chordal,
    Flowing,
}

/// Chaconne generation parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChaconneConfig {
    pub key: KeyName,
    #[serde(default)]
    pub mode: Mode,
    #[serde(default = "default_voices")]
    pub voices: u8,
    #[serde(default)]
    pub instrument: InstrumentTag,
    #[serde(default)]
    pub character: Character,
    /// Length of one variation in bars.
    #[serde(default = "default_variation_bars")]
    pub variation_bars: u8,
    /// Textures permitted in the parallel-major (Illuminate) section.
    #[serde(default)]
    pub major_section_textures: Vec<MajorSectionTexture>,
    /// Retry budget for a single failed variation.
    #[serde(default = "ChaconneConfig::default_retries")]
    pub max_variation_retries: u8,
}

impl ChaconneConfig {
    fn default_retries() -> u8 {
        3
    }
}

impl Default for ChaconneConfig {
    fn default() -> Self {
        ChaconneConfig {
            key: KeyName::D,
            mode: Mode::Minor,
            voices: default_voices(),
            instrument: InstrumentTag::Violin,
            character: Character::default(),
            variation_bars: default_variation_bars(),
            major_section_textures: Vec::new(),
            max_variation_retries: Self::default_retries(),
        }
    }
}

fn default_prelude_bars() -> u8 {
    16
}

/// Prelude generation parameters (harmony-first figuration).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PreludeConfig {
    pub key: KeyName,
    #[serde(default)]
    pub mode: Mode,
    #[serde(default = "default_voices")]
    pub voices: u8,
    #[serde(default)]
    pub instrument: InstrumentTag,
    #[serde(default)]
    pub character: Character,
    /// Total length in bars.
    #[serde(default = "default_prelude_bars")]
    pub bars: u8,
    /// Probability of non-chord-tone injection per eligible note (0.0-1.0).
    #[serde(default = "PreludeConfig::default_nct_probability")]
    pub nct_probability: f64,
}

impl PreludeConfig {
    fn default_nct_probability() -> f64 {
        0.3
    }
}

impl Default for PreludeConfig {
    fn default() -> Self {
        PreludeConfig {
            key: KeyName::C,
            mode: Mode::Major,
            voices: default_voices(),
            instrument: InstrumentTag::default(),
            character: Character::default(),
            bars: default_prelude_bars(),
            nct_probability: Self::default_nct_probability(),
        }
    }
}

/// Toccata generation parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToccataConfig {
    pub key: KeyName,
    #[serde(default)]
    pub mode: Mode,
    #[serde(default = "default_voices")]
    pub voices: u8,
    #[serde(default)]
    pub instrument: InstrumentTag,
    #[serde(default)]
    pub character: Character,
    /// Total length in bars.
    #[serde(default = "default_prelude_bars")]
    pub bars: u8,
    /// Number of free gesture sections alternating with fugato sections.
    #[serde(default = "ToccataConfig::default_gesture_sections")]
    pub gesture_sections: u8,
}

impl ToccataConfig {
    fn default_gesture_sections() -> u8 {
        3
    }
}

impl Default for ToccataConfig {
    fn default() -> Self {
        ToccataConfig {
            key: KeyName::D,
            mode: Mode::Minor,
            voices: default_voices(),
            instrument: InstrumentTag::Organ,
            character: Character::Severe,
            bars: default_prelude_bars(),
            gesture_sections: Self::default_gesture_sections(),
        }
    }
}

/// Fantasia generation parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FantasiaConfig {
    pub key: KeyName,
    #[serde(default)]
    pub mode: Mode,
    #[serde(default = "default_voices")]
    pub voices: u8,
    #[serde(default)]
    pub instrument: InstrumentTag,
    #[serde(default)]
    pub character: Character,
    #[serde(default = "default_prelude_bars")]
    pub bars: u8,
}

impl Default for FantasiaConfig {
    fn default() -> Self {
        FantasiaConfig {
            key: KeyName::C,
            mode: Mode::Minor,
            voices: default_voices(),
            instrument: InstrumentTag::Harpsichord,
            character: Character::default(),
            bars: default_prelude_bars(),
        }
    }
}

/// Passacaglia generation parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PassacagliaConfig {
    pub key: KeyName,
    #[serde(default)]
    pub mode: Mode,
    #[serde(default = "default_voices")]
    pub voices: u8,
    #[serde(default)]
    pub instrument: InstrumentTag,
    #[serde(default)]
    pub character: Character,
    /// Number of ground-bass statements.
    #[serde(default = "PassacagliaConfig::default_statements")]
    pub statements: u8,
    /// Length of the ground bass in bars.
    #[serde(default = "default_variation_bars")]
    pub ground_bars: u8,
}

impl PassacagliaConfig {
    fn default_statements() -> u8 {
        8
    }
}

impl Default for PassacagliaConfig {
    fn default() -> Self {
        PassacagliaConfig {
            key: KeyName::C,
            mode: Mode::Minor,
            voices: default_voices(),
            instrument: InstrumentTag::Organ,
            character: Character::Severe,
            statements: Self::default_statements(),
            ground_bars: default_variation_bars(),
        }
    }
}

/// Goldberg-style variation set parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GoldbergConfig {
    pub key: KeyName,
    #[serde(default)]
    pub mode: Mode,
    #[serde(default = "default_voices")]
    pub voices: u8,
    #[serde(default)]
    pub instrument: InstrumentTag,
    #[serde(default)]
    pub character: Character,
    /// Number of variations after the aria (1-30).
    #[serde(default = "GoldbergConfig::default_variations")]
    pub variations: u8,
    /// Whether to close with the aria da capo.
    #[serde(default = "default_true")]
    pub aria_da_capo: bool,
}

impl GoldbergConfig {
    fn default_variations() -> u8 {
        6
    }
}

impl Default for GoldbergConfig {
    fn default() -> Self {
        GoldbergConfig {
            key: KeyName::G,
            mode: Mode::Major,
            voices: default_voices(),
            instrument: InstrumentTag::Harpsichord,
            character: Character::default(),
            variations: Self::default_variations(),
            aria_da_capo: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn form_config_round_trips_through_json() {
        let spec = ScoreSpec {
            name: "fugue-c-01".to_string(),
            seed: 42,
            config: FormConfig::Fugue(FugueConfig::default()),
        };
        let json = serde_json::to_string(&spec).unwrap();
        let back: ScoreSpec = serde_json::from_str(&json).unwrap();
        assert_eq!(spec, back);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let json = r#"{
            "name": "bad-01",
            "seed": 1,
            "form": "fugue",
            "key": "C",
            "turbo_mode": true
        }"#;
        let result: Result<ScoreSpec, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    #[test]
    fn key_name_pitch_class_round_trip() {
        for pc in 0..12u8 {
            assert_eq!(KeyName::from_pitch_class(pc).pitch_class(), pc);
        }
    }

    #[test]
    fn minimal_fugue_json_uses_defaults() {
        let json = r#"{"name":"f","seed":7,"form":"fugue","key":"G","mode":"minor"}"#;
        let spec: ScoreSpec = serde_json::from_str(json).unwrap();
        match spec.config {
            FormConfig::Fugue(cfg) => {
                assert_eq!(cfg.key, KeyName::G);
                assert_eq!(cfg.mode, Mode::Minor);
                assert_eq!(cfg.voices, 3);
                assert_eq!(cfg.subject_bars, 2);
            }
            other => panic!("expected fugue config, got {:?}", other),
        }
    }
}
