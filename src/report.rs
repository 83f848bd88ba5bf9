//! JSON reports printed by the CLI.
//!
//! Every outcome shares one shape: a `status` marker (`OK` or
//! `FAIL_CLOSED`), a human-readable `why` on failure, and for schema
//! failures the per-event error list.

use crate::core::{TrainResult, TrainingMetrics};
use crate::schema::ValidationError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Outcome marker shared by all reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Ok,
    FailClosed,
}

/// Validation errors for one event, by position in the input file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventErrors {
    pub index: usize,
    pub errors: Vec<ValidationError>,
}

/// Report emitted when a command refuses to produce output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailClosedReport {
    pub status: Status,
    pub why: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<EventErrors>,
}

impl FailClosedReport {
    pub fn new(why: impl Into<String>) -> Self {
        Self {
            status: Status::FailClosed,
            why: why.into(),
            path: None,
            errors: Vec::new(),
        }
    }

    pub fn with_path(mut self, path: &Path) -> Self {
        self.path = Some(path.display().to_string());
        self
    }

    pub fn with_errors(mut self, errors: Vec<EventErrors>) -> Self {
        self.errors = errors;
        self
    }
}

/// Successful ingest summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestReport {
    pub status: Status,
    pub written: usize,
    pub path: String,
}

impl IngestReport {
    pub fn new(written: usize, path: &Path) -> Self {
        Self {
            status: Status::Ok,
            written,
            path: path.display().to_string(),
        }
    }
}

/// Input file identity recorded in a receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventsProvenance {
    pub path: String,
    pub sha256: String,
}

/// Provenance record binding a model to the exact events it was trained on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Receipt {
    pub status: Status,
    pub run_id: String,
    pub trained_at: String,
    pub events: EventsProvenance,
    /// `[negative, positive]`
    pub labels: Vec<String>,
    pub feature_keys: Vec<String>,
    pub model_path: String,
    pub metrics: TrainingMetrics,
}

impl From<&TrainResult> for Receipt {
    fn from(result: &TrainResult) -> Self {
        Self {
            status: Status::Ok,
            run_id: result.run_id.clone(),
            trained_at: result.trained_at.clone(),
            events: EventsProvenance {
                path: result.events_path.display().to_string(),
                sha256: result.events_sha256.clone(),
            },
            labels: result.label_set.clone(),
            feature_keys: result.feature_keys.clone(),
            model_path: result.model_path.display().to_string(),
            metrics: result.metrics.clone(),
        }
    }
}
