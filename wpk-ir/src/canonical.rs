//! Canonical JSON and content hashing.
//!
//! Canonical form sorts every object key recursively, keeps absent optional
//! values as explicit `null`s and pretty-prints with two-space indentation
//! and `\n` line endings. Two values that differ only in key order therefore
//! render to identical text and hash identically.

use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};

/// Render a JSON value in canonical form.
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_value(&mut out, value, 0);
    out
}

/// Lowercase hex SHA-256 of the canonical form of `value`.
pub fn hash_canonical(value: &Value) -> String {
    let mut hasher = Sha256::new();
    hasher.update(canonical_json(value).as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Serialise `value` and hash its canonical form.
pub fn hash_serialize<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
    Ok(hash_canonical(&serde_json::to_value(value)?))
}

/// Serialise `value` and render its canonical form.
pub fn to_canonical_json<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
    Ok(canonical_json(&serde_json::to_value(value)?))
}

fn write_value(out: &mut String, value: &Value, depth: usize) {
    match value {
        Value::Object(map) if map.is_empty() => out.push_str("{}"),
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();

            out.push_str("{\n");
            for (index, key) in keys.iter().enumerate() {
                indent(out, depth + 1);
                out.push_str(&Value::String((*key).clone()).to_string());
                out.push_str(": ");
                write_value(out, &map[key.as_str()], depth + 1);
                if index + 1 < keys.len() {
                    out.push(',');
                }
                out.push('\n');
            }
            indent(out, depth);
            out.push('}');
        }
        Value::Array(items) if items.is_empty() => out.push_str("[]"),
        Value::Array(items) => {
            out.push_str("[\n");
            for (index, item) in items.iter().enumerate() {
                indent(out, depth + 1);
                write_value(out, item, depth + 1);
                if index + 1 < items.len() {
                    out.push(',');
                }
                out.push('\n');
            }
            indent(out, depth);
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_canonical_json_sorts_keys_recursively() {
        let value = json!({ "b": 1, "a": [1, { "d": null, "c": "x" }] });

        assert_eq!(
            canonical_json(&value),
            "{\n  \"a\": [\n    1,\n    {\n      \"c\": \"x\",\n      \"d\": null\n    }\n  ],\n  \"b\": 1\n}"
        );
    }

    #[test]
    fn test_canonical_json_empty_containers() {
        assert_eq!(canonical_json(&json!({})), "{}");
        assert_eq!(canonical_json(&json!({ "a": [] })), "{\n  \"a\": []\n}");
    }

    #[test]
    fn test_canonical_json_escapes_strings() {
        let value = json!({ "quote\"d": "line\nbreak" });
        assert_eq!(
            canonical_json(&value),
            "{\n  \"quote\\\"d\": \"line\\nbreak\"\n}"
        );
    }

    #[test]
    fn test_hash_is_sha256_of_canonical_text() {
        assert_eq!(
            hash_canonical(&json!({})),
            "44136fa355b3678a1146ad16f7e8649e94fb4fc21fe77e8310c060f61caaff8a"
        );
        assert_eq!(
            hash_canonical(&json!([])),
            "4f53cda18c2baa0c0354bb5f9a3ecbe5ed12ab4d8e11ba873c2f11161202b945"
        );
    }

    #[test]
    fn test_hash_ignores_key_order() {
        let mut first = serde_json::Map::new();
        first.insert("name".into(), json!("book"));
        first.insert("routes".into(), json!([{ "method": "GET", "path": "/books" }]));

        let mut second = serde_json::Map::new();
        second.insert("routes".into(), json!([{ "path": "/books", "method": "GET" }]));
        second.insert("name".into(), json!("book"));

        assert_eq!(
            hash_canonical(&Value::Object(first)),
            hash_canonical(&Value::Object(second))
        );
    }

    #[test]
    fn test_canonicalisation_is_idempotent() {
        let value = json!({ "z": { "y": [3, 2, 1] }, "a": null });
        let once = canonical_json(&value);
        let reparsed: Value = serde_json::from_str(&once).unwrap();
        assert_eq!(canonical_json(&reparsed), once);
    }

    #[test]
    fn test_missing_options_serialise_as_null() {
        #[derive(Serialize)]
        struct Route {
            path: &'static str,
            capability: Option<&'static str>,
        }

        let text = to_canonical_json(&Route {
            path: "/books",
            capability: None,
        })
        .unwrap();
        assert_eq!(text, "{\n  \"capability\": null,\n  \"path\": \"/books\"\n}");
    }
}
