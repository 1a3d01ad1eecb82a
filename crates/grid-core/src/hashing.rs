//! Canonicalización JSON y hashing para el fingerprint del plan.
//!
//! El fingerprint de la metadata se calcula sobre el JSON canónico (claves
//! ordenadas, sin whitespace) de la parte determinista del plan, de modo que
//! re-planificar con las mismas entradas produzca el mismo hash. Los campos
//! de bookkeeping (timestamp) no entran al hash.

use serde_json::Value;
use std::collections::BTreeMap;

/// Serializa un `Value` a JSON canónico: objetos con claves ordenadas,
/// arrays en su orden original, sin espacios.
pub fn to_canonical_json(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => serde_json::to_string(s).unwrap(),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(to_canonical_json).collect();
            format!("[{}]", items.join(","))
        }
        Value::Object(map) => {
            let mut tree = BTreeMap::new();
            for (k, v) in map {
                tree.insert(k, to_canonical_json(v));
            }
            let items: Vec<String> = tree.into_iter()
                                         .map(|(k, v)| format!("{}:{}", serde_json::to_string(&k).unwrap(), v))
                                         .collect();
            format!("{{{}}}", items.join(","))
        }
    }
}

/// Hashea un string y devuelve hex (blake3).
pub fn hash_str(input: &str) -> String {
    let mut h = blake3::Hasher::new();
    h.update(input.as_bytes());
    h.finalize().to_hex().to_string()
}

/// Fingerprint de un `Value`: hash del JSON canónico.
pub fn hash_value(value: &Value) -> String {
    hash_str(&to_canonical_json(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn canonical_orders_keys() {
        let a = json!({"b": 1, "a": [1, 2]});
        assert_eq!(to_canonical_json(&a), r#"{"a":[1,2],"b":1}"#);
    }

    #[test]
    fn key_order_does_not_change_hash() {
        let a = json!({"x": 1, "y": {"k": true, "j": null}});
        let b = json!({"y": {"j": null, "k": true}, "x": 1});
        assert_eq!(hash_value(&a), hash_value(&b));
    }

    #[test]
    fn array_order_changes_hash() {
        assert_ne!(hash_value(&json!([1, 2])), hash_value(&json!([2, 1])));
    }
}
