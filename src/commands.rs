//! Ingest and train workflows.
//!
//! Each command returns the JSON body to print and the process exit code, so
//! the binary stays a thin shell and the fail-closed policy can be tested
//! without spawning processes.

use crate::core::{train_from_events, TrainParams};
use crate::report::{EventErrors, FailClosedReport, IngestReport, Receipt};
use crate::schema::{validate, ByteEvent, ConsentScope, SourceKind};
use crate::storage::{read_ndjson, write_ndjson};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::path::Path;

/// Exit code for a successful command.
pub const EXIT_OK: i32 = 0;

/// Exit code for any fail-closed outcome.
pub const EXIT_FAIL_CLOSED: i32 = 2;

/// Result of running a command.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandOutput {
    pub exit_code: i32,
    pub body: Value,
}

impl CommandOutput {
    fn new<T: Serialize>(exit_code: i32, report: &T) -> Self {
        match serde_json::to_value(report) {
            Ok(body) => Self { exit_code, body },
            Err(e) => Self {
                exit_code: EXIT_FAIL_CLOSED,
                body: json!({
                    "status": "FAIL_CLOSED",
                    "why": format!("Could not serialize report: {e}"),
                }),
            },
        }
    }

    fn fail_closed(report: FailClosedReport) -> Self {
        Self::new(EXIT_FAIL_CLOSED, &report)
    }

    pub fn is_success(&self) -> bool {
        self.exit_code == EXIT_OK
    }
}

/// Validate every event in `in_path` and write them to `out_path`.
///
/// Nothing is written unless every event passes validation.
pub fn ingest(in_path: &Path, out_path: &Path) -> CommandOutput {
    if !in_path.exists() {
        return CommandOutput::fail_closed(
            FailClosedReport::new("Events file not found").with_path(in_path),
        );
    }

    let events = match read_ndjson(in_path) {
        Ok(events) => events,
        Err(e) => {
            return CommandOutput::fail_closed(
                FailClosedReport::new(format!("Could not read events: {e}")).with_path(in_path),
            )
        }
    };

    let mut valid = Vec::with_capacity(events.len());
    let mut rejected = Vec::new();
    for (index, event) in events.iter().enumerate() {
        let errors = validate(event);
        if errors.is_empty() {
            valid.push(event);
        } else {
            tracing::warn!(index, errors = errors.len(), "event failed schema validation");
            rejected.push(EventErrors { index, errors });
        }
    }

    if !rejected.is_empty() {
        return CommandOutput::fail_closed(
            FailClosedReport::new("One or more events failed schema validation")
                .with_errors(rejected),
        );
    }

    log_source_mix(&valid);

    match write_ndjson(out_path, &valid) {
        Ok(written) => {
            tracing::info!(written, path = %out_path.display(), "events ingested");
            CommandOutput::new(EXIT_OK, &IngestReport::new(written, out_path))
        }
        Err(e) => CommandOutput::fail_closed(
            FailClosedReport::new(format!("Could not write events: {e}")).with_path(out_path),
        ),
    }
}

fn log_source_mix(events: &[&Value]) {
    let mut by_kind: BTreeMap<SourceKind, usize> = BTreeMap::new();
    let mut research = 0usize;

    for event in events {
        match ByteEvent::from_validated(event) {
            Ok(event) => {
                *by_kind.entry(event.source.kind).or_default() += 1;
                if event.consent.scope == ConsentScope::Research {
                    research += 1;
                }
            }
            Err(e) => tracing::debug!("validated event did not decode: {e}"),
        }
    }

    for (kind, count) in &by_kind {
        tracing::debug!(source = kind.as_str(), count, "events by source");
    }
    tracing::debug!(research, total = events.len(), "research-scope consent");
}

/// Train a model from `events_path`, writing the model under `models_dir` and
/// the receipt to `receipt_path`.
pub fn train(
    events_path: &Path,
    models_dir: &Path,
    receipt_path: &Path,
    params: &TrainParams,
) -> CommandOutput {
    if !events_path.exists() {
        return CommandOutput::fail_closed(
            FailClosedReport::new("Events file not found").with_path(events_path),
        );
    }

    let events = match read_ndjson(events_path) {
        Ok(events) => events,
        Err(e) => {
            return CommandOutput::fail_closed(
                FailClosedReport::new(format!("Could not read events: {e}"))
                    .with_path(events_path),
            )
        }
    };

    let result = match train_from_events(&events, events_path, models_dir, params) {
        Ok(result) => result,
        Err(e) => {
            tracing::warn!("training failed: {e}");
            return CommandOutput::fail_closed(FailClosedReport::new(e.to_string()));
        }
    };

    let receipt = Receipt::from(&result);
    if let Err(e) = write_receipt(receipt_path, &receipt) {
        return CommandOutput::fail_closed(
            FailClosedReport::new(format!("Could not write receipt: {e}"))
                .with_path(receipt_path),
        );
    }

    CommandOutput::new(EXIT_OK, &receipt)
}

fn write_receipt(path: &Path, receipt: &Receipt) -> std::io::Result<()> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(receipt).map_err(std::io::Error::other)?;
    std::fs::write(path, json)
}
