//! Spec loading for CLI commands.
//!
//! Specs are JSON documents on disk. Loading parses the file into a
//! [`ScoreSpec`] and records the canonical spec hash so commands can
//! report it without re-reading the file.

use anyhow::{Context, Result};
use fugata_spec::{canonical_spec_hash, ScoreSpec};
use std::path::Path;

/// A loaded spec plus its canonical hash.
#[derive(Debug, Clone)]
pub struct LoadResult {
    pub spec: ScoreSpec,
    /// Hex-encoded BLAKE3 hash of the canonicalized spec document.
    pub spec_hash: String,
}

/// Load and parse a spec file.
pub fn load_spec(path: &Path) -> Result<LoadResult> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read spec file: {}", path.display()))?;

    let spec: ScoreSpec = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse spec file: {}", path.display()))?;

    let spec_hash = canonical_spec_hash(&spec)
        .with_context(|| format!("Failed to hash spec: {}", path.display()))?;

    Ok(LoadResult { spec, spec_hash })
}

#[cfg(test)]
mod tests {
    use super::*;
    use fugata_spec::FormConfig;
    use pretty_assertions::assert_eq;

    #[test]
    fn loads_a_minimal_fugue_spec() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("fugue-min.json");
        std::fs::write(
            &path,
            r#"{
                "name": "fugue-min",
                "seed": 7,
                "form": "fugue",
                "key": "C",
                "mode": "major",
                "voices": 3
            }"#,
        )
        .unwrap();

        let loaded = load_spec(&path).unwrap();
        assert_eq!(loaded.spec.name, "fugue-min");
        assert_eq!(loaded.spec.seed, 7);
        assert!(matches!(loaded.spec.config, FormConfig::Fugue(_)));
        assert_eq!(loaded.spec_hash.len(), 64);
    }

    #[test]
    fn rejects_a_missing_file() {
        let err = load_spec(Path::new("/definitely/not/here.json"));
        assert!(err.is_err());
    }
}
