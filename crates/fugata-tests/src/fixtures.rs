//! Spec builders and on-disk fixtures for integration tests.

use std::fs;
use std::path::{Path, PathBuf};

use fugata_spec::{
    ChaconneConfig, Character, FantasiaConfig, FormConfig, FugueConfig, GoldbergConfig,
    InstrumentTag, KeyName, Mode, PassacagliaConfig, PreludeConfig, ScoreSpec, ToccataConfig,
};
use tempfile::TempDir;

/// A three-voice C-major fugue with the given seed.
pub fn fugue_spec(name: &str, seed: u32) -> ScoreSpec {
    ScoreSpec {
        name: name.to_string(),
        seed,
        config: FormConfig::Fugue(FugueConfig {
            key: KeyName::C,
            mode: Mode::Major,
            voices: 3,
            character: Character::Severe,
            ..Default::default()
        }),
    }
}

/// A D-minor violin chaconne on the standard variation plan.
pub fn chaconne_spec(name: &str, seed: u32) -> ScoreSpec {
    ScoreSpec {
        name: name.to_string(),
        seed,
        config: FormConfig::Chaconne(ChaconneConfig {
            key: KeyName::D,
            mode: Mode::Minor,
            instrument: InstrumentTag::Violin,
            ..Default::default()
        }),
    }
}

pub fn prelude_spec(name: &str, seed: u32) -> ScoreSpec {
    ScoreSpec {
        name: name.to_string(),
        seed,
        config: FormConfig::Prelude(PreludeConfig {
            key: KeyName::C,
            mode: Mode::Major,
            ..Default::default()
        }),
    }
}

pub fn toccata_spec(name: &str, seed: u32) -> ScoreSpec {
    ScoreSpec {
        name: name.to_string(),
        seed,
        config: FormConfig::Toccata(ToccataConfig {
            key: KeyName::D,
            mode: Mode::Minor,
            instrument: InstrumentTag::Organ,
            ..Default::default()
        }),
    }
}

pub fn fantasia_spec(name: &str, seed: u32) -> ScoreSpec {
    ScoreSpec {
        name: name.to_string(),
        seed,
        config: FormConfig::Fantasia(FantasiaConfig {
            key: KeyName::G,
            mode: Mode::Minor,
            ..Default::default()
        }),
    }
}

pub fn passacaglia_spec(name: &str, seed: u32) -> ScoreSpec {
    ScoreSpec {
        name: name.to_string(),
        seed,
        config: FormConfig::Passacaglia(PassacagliaConfig {
            key: KeyName::C,
            mode: Mode::Minor,
            ..Default::default()
        }),
    }
}

pub fn goldberg_spec(name: &str, seed: u32) -> ScoreSpec {
    ScoreSpec {
        name: name.to_string(),
        seed,
        config: FormConfig::Goldberg(GoldbergConfig {
            key: KeyName::G,
            mode: Mode::Major,
            voices: 3,
            ..Default::default()
        }),
    }
}

/// A temp directory holding spec files for CLI tests.
pub struct SpecDir {
    pub root: TempDir,
}

impl SpecDir {
    pub fn new() -> SpecDir {
        SpecDir {
            root: TempDir::new().expect("failed to create temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.root.path()
    }

    /// Serialize a spec into the directory and return its path.
    pub fn add(&self, spec: &ScoreSpec) -> PathBuf {
        write_spec_file(self.path(), spec)
    }
}

impl Default for SpecDir {
    fn default() -> SpecDir {
        SpecDir::new()
    }
}

/// Write a spec as `<name>.json` under `dir`.
pub fn write_spec_file(dir: &Path, spec: &ScoreSpec) -> PathBuf {
    let path = dir.join(format!("{}.json", spec.name));
    let json = serde_json::to_string_pretty(spec).expect("spec serializes");
    fs::write(&path, json).expect("spec file writes");
    path
}
