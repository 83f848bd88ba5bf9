//! Fail-closed schema validation for byte-size events.
//!
//! Validation never short-circuits after the initial object check: every rule
//! is evaluated independently so a single event can report several
//! violations. Nested containers (`source`, `consent`, `payload`) that are
//! absent or null are treated as empty objects and their required sub-fields
//! are still checked, which means a missing `source` reports both the missing
//! field and an invalid `source.kind`.

use crate::schema::event::{ConsentScope, PayloadType, SourceKind};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Top-level fields every event must carry.
pub const REQUIRED_FIELDS: [&str; 5] = ["event_id", "timestamp", "source", "consent", "payload"];

/// A single schema violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    pub message: String,
    /// Dotted path of the offending field, if the error is field-specific
    pub field: Option<String>,
}

impl ValidationError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            field: None,
        }
    }

    fn at(message: impl Into<String>, field: &str) -> Self {
        Self {
            message: message.into(),
            field: Some(field.to_string()),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.field {
            Some(field) => write!(f, "{}: {}", field, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

/// How a nested container was found in the event.
enum Container<'a> {
    /// Absent or null; checked as an empty object
    Defaulted,
    Object(&'a Map<String, Value>),
    /// Present with a non-object value
    Invalid,
}

impl<'a> Container<'a> {
    fn of(event: &'a Map<String, Value>, key: &str) -> Self {
        match event.get(key) {
            None | Some(Value::Null) => Container::Defaulted,
            Some(Value::Object(map)) => Container::Object(map),
            Some(_) => Container::Invalid,
        }
    }

    /// Sub-field lookup; a defaulted container behaves as `{}`.
    fn get(&self, key: &str) -> Option<&'a Value> {
        match self {
            Container::Object(map) => map.get(key),
            Container::Defaulted | Container::Invalid => None,
        }
    }
}

fn is_non_blank_str(value: &Value) -> bool {
    value.as_str().is_some_and(|s| !s.trim().is_empty())
}

fn is_one_of<T>(value: Option<&Value>, parse: fn(&str) -> Option<T>) -> bool {
    value.and_then(Value::as_str).and_then(parse).is_some()
}

/// Validate one event document. An empty result means the event is valid.
pub fn validate(event: &Value) -> Vec<ValidationError> {
    let Some(event) = event.as_object() else {
        return vec![ValidationError::new("Event must be a JSON object")];
    };

    let mut errors = Vec::new();

    for required in REQUIRED_FIELDS {
        if !event.contains_key(required) {
            errors.push(ValidationError::at("Missing required field", required));
        }
    }

    for field in ["event_id", "timestamp"] {
        if let Some(value) = event.get(field) {
            if !is_non_blank_str(value) {
                errors.push(ValidationError::at(
                    format!("{field} must be a non-empty string"),
                    field,
                ));
            }
        }
    }

    check_source(Container::of(event, "source"), &mut errors);
    check_consent(Container::of(event, "consent"), &mut errors);
    check_payload(Container::of(event, "payload"), &mut errors);

    errors
}

fn check_source(source: Container<'_>, errors: &mut Vec<ValidationError>) {
    if let Container::Invalid = source {
        errors.push(ValidationError::at("source must be an object", "source"));
        return;
    }

    if !is_one_of(source.get("kind"), SourceKind::parse) {
        errors.push(ValidationError::at("source.kind invalid", "source.kind"));
    }
}

fn check_consent(consent: Container<'_>, errors: &mut Vec<ValidationError>) {
    if let Container::Invalid = consent {
        errors.push(ValidationError::at("consent must be an object", "consent"));
        return;
    }

    if !is_one_of(consent.get("scope"), ConsentScope::parse) {
        errors.push(ValidationError::at("consent.scope invalid", "consent.scope"));
    }

    // Strict: "true", 1 and null are all rejected
    if !matches!(consent.get("revocable"), Some(Value::Bool(_))) {
        errors.push(ValidationError::at(
            "consent.revocable must be boolean",
            "consent.revocable",
        ));
    }
}

fn check_payload(payload: Container<'_>, errors: &mut Vec<ValidationError>) {
    if let Container::Invalid = payload {
        errors.push(ValidationError::at("payload must be an object", "payload"));
        return;
    }

    if !is_one_of(payload.get("type"), PayloadType::parse) {
        errors.push(ValidationError::at("payload.type invalid", "payload.type"));
    }

    match payload.get("features") {
        None | Some(Value::Null) | Some(Value::Object(_)) => {}
        Some(_) => errors.push(ValidationError::at(
            "payload.features must be an object",
            "payload.features",
        )),
    }
}
