//! Canonical hashing and seed derivation.
//!
//! This module implements the determinism policy for Fugata:
//! - Spec canonicalization (sorted keys, no whitespace)
//! - BLAKE3 hashing for spec and score hashes
//! - Per-subsystem seed derivation, so every subsystem draws from an
//!   independent but reproducible random stream

use crate::config::ScoreSpec;
use crate::error::SpecError;

/// Maximum spec seed (the full u32 range is valid).
pub const MAX_SEED: u32 = u32::MAX;

/// Computes the canonical BLAKE3 hash of a spec.
///
/// The hash is computed over the canonical JSON form of the spec:
/// object keys sorted lexicographically, no whitespace between tokens.
///
/// # Returns
/// * A 64-character lowercase hexadecimal string
///
/// # Example
/// ```
/// use fugata_spec::{ScoreSpec, FormConfig, FugueConfig};
/// use fugata_spec::hash::canonical_spec_hash;
///
/// let spec = ScoreSpec {
///     name: "fugue-c-01".to_string(),
///     seed: 42,
///     config: FormConfig::Fugue(FugueConfig::default()),
/// };
/// let hash = canonical_spec_hash(&spec).unwrap();
/// assert_eq!(hash.len(), 64);
/// ```
pub fn canonical_spec_hash(spec: &ScoreSpec) -> Result<String, SpecError> {
    let value = serde_json::to_value(spec)?;
    Ok(canonical_value_hash(&value))
}

/// Computes the canonical BLAKE3 hash of a JSON value.
pub fn canonical_value_hash(value: &serde_json::Value) -> String {
    let canonical = canonicalize_value(value);
    blake3::hash(canonical.as_bytes()).to_hex().to_string()
}

fn canonicalize_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => "null".to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Number(n) => format_number(n),
        serde_json::Value::String(s) => format_string(s),
        serde_json::Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(canonicalize_value).collect();
            format!("[{}]", items.join(","))
        }
        serde_json::Value::Object(obj) => {
            let mut sorted_keys: Vec<&String> = obj.keys().collect();
            sorted_keys.sort();
            let pairs: Vec<String> = sorted_keys
                .iter()
                .map(|k| {
                    let v = obj.get(*k).unwrap();
                    format!("{}:{}", format_string(k), canonicalize_value(v))
                })
                .collect();
            format!("{{{}}}", pairs.join(","))
        }
    }
}

fn format_number(n: &serde_json::Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    if let Some(f) = n.as_f64() {
        if f.is_nan() || f.is_infinite() {
            return "null".to_string();
        }
        if f == 0.0 {
            return "0".to_string();
        }
        if f.fract() == 0.0 && f.abs() < 1e15 {
            return format!("{}", f as i64);
        }
        let s = format!("{}", f);
        if s.contains('.') && !s.contains('e') && !s.contains('E') {
            return s.trim_end_matches('0').trim_end_matches('.').to_string();
        }
        s
    } else {
        "null".to_string()
    }
}

fn format_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 2);
    result.push('"');
    for c in s.chars() {
        match c {
            '"' => result.push_str("\\\""),
            '\\' => result.push_str("\\\\"),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            c if c < '\x20' => {
                result.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => result.push(c),
        }
    }
    result.push('"');
    result
}

/// Derives a seed for a named subsystem from the master seed.
///
/// ```text
/// subsystem_seed = truncate_u32(BLAKE3(seed_le || 0x00 || salt))
/// ```
///
/// Each subsystem (subject generation, figuration, tonal planning, ...)
/// uses a distinct salt string so the streams are independent.
///
/// # Example
/// ```
/// use fugata_spec::hash::derive_subsystem_seed;
///
/// let a = derive_subsystem_seed(42, "subject");
/// let b = derive_subsystem_seed(42, "figuration");
/// assert_ne!(a, b);
/// assert_eq!(a, derive_subsystem_seed(42, "subject"));
/// ```
pub fn derive_subsystem_seed(seed: u32, salt: &str) -> u32 {
    let mut input = Vec::with_capacity(5 + salt.len());
    input.extend_from_slice(&seed.to_le_bytes());
    input.push(0);
    input.extend_from_slice(salt.as_bytes());

    let hash = blake3::hash(&input);
    let bytes: [u8; 4] = hash.as_bytes()[0..4].try_into().unwrap();
    u32::from_le_bytes(bytes)
}
