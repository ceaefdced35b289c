//! Determinism verification helpers.
//!
//! Generation must be a pure function of `(spec, seed)`. These helpers
//! run a producer several times and compare the outputs byte for byte,
//! reporting the BLAKE3 hash of each run so a failure names the
//! diverging run.

/// Outcome of a multi-run determinism check.
#[derive(Debug, Clone)]
pub struct DeterminismResult {
    /// Hex BLAKE3 hash of each run's output, in run order.
    pub hashes: Vec<String>,
    pub is_deterministic: bool,
}

impl DeterminismResult {
    /// The agreed-on hash, when all runs matched.
    pub fn hash(&self) -> Option<&str> {
        if self.is_deterministic {
            self.hashes.first().map(String::as_str)
        } else {
            None
        }
    }
}

/// Run `produce` `runs` times and compare the produced bytes.
pub fn verify_bytes_determinism<F>(mut produce: F, runs: usize) -> DeterminismResult
where
    F: FnMut() -> Vec<u8>,
{
    let mut hashes = Vec::with_capacity(runs);
    let mut first: Option<Vec<u8>> = None;
    let mut is_deterministic = true;

    for _ in 0..runs {
        let bytes = produce();
        hashes.push(blake3::hash(&bytes).to_hex().to_string());
        match &first {
            None => first = Some(bytes),
            Some(reference) => {
                if reference != &bytes {
                    is_deterministic = false;
                }
            }
        }
    }

    DeterminismResult {
        hashes,
        is_deterministic,
    }
}

/// Run `produce` `runs` times and compare already-hashed outputs.
pub fn verify_hash_determinism<F>(mut produce: F, runs: usize) -> DeterminismResult
where
    F: FnMut() -> String,
{
    let hashes: Vec<String> = (0..runs).map(|_| produce()).collect();
    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);
    DeterminismResult {
        hashes,
        is_deterministic,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_producer_is_deterministic() {
        let result = verify_bytes_determinism(|| vec![1, 2, 3], 3);
        assert!(result.is_deterministic);
        assert!(result.hash().is_some());
    }

    #[test]
    fn varying_producer_is_flagged() {
        let mut counter = 0u8;
        let result = verify_bytes_determinism(
            || {
                counter += 1;
                vec![counter]
            },
            3,
        );
        assert!(!result.is_deterministic);
        assert!(result.hash().is_none());
    }
}
