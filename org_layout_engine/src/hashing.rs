/// OrgChart Layout v1 - Canonical Hashing
///
/// Deterministic canonical serialization + SHA-256 fingerprint of a layout.
///
/// Rules:
///   - engine_version first, then mode, then nodes
///   - nodes sorted by id (UTF-8 byte order)
///   - node fields in fixed order: id, x, y, width, height
///   - negative zero normalised to zero
///   - UTF-8 JSON, no whitespace

use serde_json::{Map, Number, Value};
use sha2::{Digest, Sha256};

use crate::domain::LayoutResult;
use crate::ENGINE_VERSION;

/// Canonical serialization of a layout to UTF-8 JSON bytes.
pub fn canonical_serialize(layout: &LayoutResult) -> Vec<u8> {
    build_canonical_value(layout).to_string().into_bytes()
}

/// SHA-256 of `canonical_serialize`. Lowercase hex.
pub fn canonical_hash(layout: &LayoutResult) -> String {
    sha256_hex(&canonical_serialize(layout))
}

/// Lowercase hex SHA-256 of arbitrary bytes.
pub fn sha256_hex(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

fn number(v: f64) -> Value {
    let v = if v == 0.0 { 0.0 } else { v };
    // Layout coordinates are always finite; a non-finite value becomes null.
    Number::from_f64(v).map(Value::Number).unwrap_or(Value::Null)
}

/// Build the canonical value in strict field order.
/// Relies on serde_json's `preserve_order` feature.
fn build_canonical_value(layout: &LayoutResult) -> Value {
    // BTreeMap is already sorted by id.
    let nodes: Vec<Value> = layout
        .boxes
        .iter()
        .map(|(id, b)| {
            let mut m = Map::new();
            m.insert("id".to_string(), Value::String(id.clone()));
            m.insert("x".to_string(), number(b.x));
            m.insert("y".to_string(), number(b.y));
            m.insert("width".to_string(), number(b.width));
            m.insert("height".to_string(), number(b.height));
            Value::Object(m)
        })
        .collect();

    let mut root = Map::new();
    root.insert(
        "engine_version".to_string(),
        Value::Number((ENGINE_VERSION as u64).into()),
    );
    root.insert(
        "mode".to_string(),
        Value::String(layout.mode.as_str().to_string()),
    );
    root.insert("nodes".to_string(), Value::Array(nodes));
    Value::Object(root)
}
