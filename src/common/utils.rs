use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde_json::Value;
use sha2::{Digest, Sha256};

/// Length of the hashed part of a storage key. Backends with short key
/// columns only need to fit the prefix plus this many characters.
pub const KEY_HASH_LENGTH: usize = 32;

pub fn sha256_base64(input: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input);
    URL_SAFE_NO_PAD.encode(hasher.finalize())
}

pub fn truncated_hash(input: &str, length: usize) -> String {
    let mut hash = sha256_base64(input.as_bytes());
    hash.truncate(length);
    hash
}

/// Digest of an effective configuration document. Equal documents hash
/// equally regardless of the key order in the source file.
pub fn config_hash(config: &Value) -> String {
    let mut canonical = String::new();
    write_canonical(config, &mut canonical);
    sha256_base64(canonical.as_bytes())
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                write_canonical(&map[key], out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        other => out.push_str(&other.to_string()),
    }
}
