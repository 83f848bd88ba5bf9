//! Event schema for byte-size health signals.
//!
//! This module contains:
//! - The typed event model and its enumerated values
//! - Fail-closed validation of untyped event documents

pub mod event;
pub mod validation;

// Re-export commonly used types
pub use event::{ByteEvent, Consent, ConsentScope, EventSource, Payload, PayloadType, SourceKind};
pub use validation::{validate, ValidationError, REQUIRED_FIELDS};

use serde_json::{json, Value};

/// Machine-readable summary of the accepted event schema.
pub fn describe() -> Value {
    json!({
        "required_fields": REQUIRED_FIELDS,
        "source.kind": SourceKind::ALL.map(|k| k.as_str()),
        "consent.scope": ConsentScope::ALL.map(|c| c.as_str()),
        "consent.revocable": "boolean",
        "payload.type": PayloadType::ALL.map(|t| t.as_str()),
        "payload.features": "object of scalars (numbers and booleans are used for training)",
        "payload.label": "optional non-blank string",
    })
}
