//! Feature extraction from byte-size events.
//!
//! Only numeric signals are kept: booleans become 1.0/0.0, integers and
//! floats pass through, and anything else is silently skipped. Extraction
//! never fails; malformed input simply yields fewer features.

use serde_json::Value;
use std::collections::BTreeMap;

/// Numeric features for one event, keyed by feature name.
///
/// A `BTreeMap` keeps keys sorted, which the trainer relies on for a stable
/// column order.
pub type FeatureVector = BTreeMap<String, f64>;

/// Extract the numeric feature map and optional training label from an event.
pub fn extract_features(event: &Value) -> (FeatureVector, Option<String>) {
    let payload = event.get("payload").filter(|p| p.is_object());

    let mut features = FeatureVector::new();
    if let Some(raw) = payload
        .and_then(|p| p.get("features"))
        .and_then(Value::as_object)
    {
        for (key, value) in raw {
            if let Some(number) = numeric_value(value) {
                features.insert(key.clone(), number);
            }
        }
    }

    let label = payload.and_then(|p| p.get("label")).and_then(extract_label);

    (features, label)
}

fn numeric_value(value: &Value) -> Option<f64> {
    match value {
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
}

fn extract_label(value: &Value) -> Option<String> {
    let label = value.as_str()?.trim();
    if label.is_empty() {
        None
    } else {
        Some(label.to_string())
    }
}
