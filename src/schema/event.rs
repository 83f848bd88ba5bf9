//! Typed byte-size event model.
//!
//! Incoming events are untyped JSON until they pass [`validate`]. Only then
//! are they converted into a [`ByteEvent`], whose enumerated fields are
//! closed Rust enums.
//!
//! [`validate`]: crate::schema::validation::validate

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Where a byte-size event was collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Self-reported by the participant
    #[serde(rename = "self")]
    SelfReport,
    /// Partner pharmacy node
    Pharmacy,
    /// Community event
    Event,
    /// Mobile collection unit
    MobileUnit,
    /// Mail-in kit
    MailKit,
}

impl SourceKind {
    pub const ALL: [SourceKind; 5] = [
        SourceKind::SelfReport,
        SourceKind::Pharmacy,
        SourceKind::Event,
        SourceKind::MobileUnit,
        SourceKind::MailKit,
    ];

    /// Wire name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::SelfReport => "self",
            SourceKind::Pharmacy => "pharmacy",
            SourceKind::Event => "event",
            SourceKind::MobileUnit => "mobile_unit",
            SourceKind::MailKit => "mail_kit",
        }
    }

    /// Parse a wire name. Matching is exact (case-sensitive, no trimming).
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == s)
    }
}

/// What the participant consented to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsentScope {
    Care,
    Research,
}

impl ConsentScope {
    pub const ALL: [ConsentScope; 2] = [ConsentScope::Care, ConsentScope::Research];

    pub fn as_str(&self) -> &'static str {
        match self {
            ConsentScope::Care => "care",
            ConsentScope::Research => "research",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == s)
    }
}

/// Kind of observation carried in the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadType {
    SymptomSnapshot,
    AdherencePing,
    ContextPing,
    LabMarker,
}

impl PayloadType {
    pub const ALL: [PayloadType; 4] = [
        PayloadType::SymptomSnapshot,
        PayloadType::AdherencePing,
        PayloadType::ContextPing,
        PayloadType::LabMarker,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PayloadType::SymptomSnapshot => "symptom_snapshot",
            PayloadType::AdherencePing => "adherence_ping",
            PayloadType::ContextPing => "context_ping",
            PayloadType::LabMarker => "lab_marker",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }
}

/// Collection source block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventSource {
    pub kind: SourceKind,
}

/// Consent block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Consent {
    pub scope: ConsentScope,
    /// Whether the participant may later withdraw this event
    pub revocable: bool,
}

/// Observation payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payload {
    #[serde(rename = "type")]
    pub payload_type: PayloadType,
    /// Raw scalar features; values are not type-checked by the schema
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<Map<String, Value>>,
    /// Training label; the schema does not constrain its type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<Value>,
}

/// A byte-size event that has passed schema validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ByteEvent {
    pub event_id: String,
    pub timestamp: String,
    pub source: EventSource,
    pub consent: Consent,
    pub payload: Payload,
}

impl ByteEvent {
    /// Convert an already-validated document into its typed form.
    ///
    /// Unknown extra fields are ignored. Callers are expected to run
    /// [`validate`](crate::schema::validation::validate) first; documents that
    /// do not satisfy the schema are rejected here as well.
    pub fn from_validated(value: &Value) -> Result<Self, serde_json::Error> {
        Self::deserialize(value)
    }
}
