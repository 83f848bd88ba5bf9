//! End-to-end tests for the ingest and train workflows.

use chrono::{Duration, TimeZone, Utc};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use synheart_byte_trainer::commands::{self, EXIT_FAIL_CLOSED, EXIT_OK};
use synheart_byte_trainer::core::{train_from_events_at, Model, TrainParams};
use synheart_byte_trainer::storage::{read_ndjson, write_ndjson};
use tempfile::TempDir;

fn event(id: &str, features: Value, label: Option<&str>) -> Value {
    let mut payload = json!({"type": "adherence_ping", "features": features});
    if let Some(label) = label {
        payload["label"] = json!(label);
    }
    json!({
        "event_id": id,
        "timestamp": "2026-02-14T08:00:00Z",
        "source": {"kind": "pharmacy"},
        "consent": {"scope": "research", "revocable": true},
        "payload": payload
    })
}

fn binary_events() -> Vec<Value> {
    vec![
        event("e1", json!({"x": 0}), Some("A")),
        event("e2", json!({"x": 1}), Some("A")),
        event("e3", json!({"x": 0}), Some("B")),
        event("e4", json!({"x": 1}), Some("B")),
    ]
}

fn write_input(dir: &TempDir, name: &str, events: &[Value]) -> PathBuf {
    let path = dir.path().join(name);
    write_ndjson(&path, events).expect("Failed to write input");
    path
}

struct TrainPaths {
    models: PathBuf,
    receipt: PathBuf,
}

fn train_paths(dir: &Path) -> TrainPaths {
    TrainPaths {
        models: dir.join("models"),
        receipt: dir.join("receipts").join("latest-train-receipt.json"),
    }
}

#[test]
fn test_ingest_string_revocable_fails_closed() {
    let dir = tempfile::tempdir().unwrap();
    let mut bad = event("e2", json!({"x": 1}), None);
    bad["consent"]["revocable"] = json!("yes");
    let input = write_input(&dir, "in.ndjson", &[event("e1", json!({}), None), bad]);
    let out = dir.path().join("data").join("events.ndjson");

    let output = commands::ingest(&input, &out);

    assert_eq!(output.exit_code, EXIT_FAIL_CLOSED);
    assert_eq!(output.body["status"], "FAIL_CLOSED");
    assert_eq!(output.body["why"], "One or more events failed schema validation");
    assert_eq!(
        output.body["errors"],
        json!([{
            "index": 1,
            "errors": [{"message": "consent.revocable must be boolean", "field": "consent.revocable"}]
        }])
    );
    assert!(!out.exists());
}

#[test]
fn test_ingest_reports_every_invalid_event() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.ndjson");
    std::fs::write(
        &input,
        format!(
            "{}\n[1, 2]\n\n{{\"event_id\": \"e3\"}}\n",
            event("e1", json!({}), None)
        ),
    )
    .unwrap();
    let out = dir.path().join("out.ndjson");

    let output = commands::ingest(&input, &out);

    assert_eq!(output.exit_code, EXIT_FAIL_CLOSED);
    let errors = output.body["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 2);
    assert_eq!(errors[0]["index"], 1);
    assert_eq!(
        errors[0]["errors"],
        json!([{"message": "Event must be a JSON object", "field": null}])
    );
    assert_eq!(errors[1]["index"], 2);
    assert!(errors[1]["errors"].as_array().unwrap().len() > 4);
    assert!(!out.exists());
}

#[test]
fn test_ingest_writes_valid_events() {
    let dir = tempfile::tempdir().unwrap();
    let events = binary_events();
    let input = write_input(&dir, "in.ndjson", &events);
    let out = dir.path().join("data").join("events.ndjson");

    let output = commands::ingest(&input, &out);

    assert_eq!(output.exit_code, EXIT_OK);
    assert_eq!(
        output.body,
        json!({"status": "OK", "written": 4, "path": out.display().to_string()})
    );
    assert_eq!(read_ndjson(&out).unwrap(), events);
}

#[test]
fn test_train_binary_scenario() {
    let dir = tempfile::tempdir().unwrap();
    let events_path = write_input(&dir, "events.ndjson", &binary_events());
    let paths = train_paths(dir.path());

    let output = commands::train(
        &events_path,
        &paths.models,
        &paths.receipt,
        &TrainParams::default(),
    );

    assert_eq!(output.exit_code, EXIT_OK, "{}", output.body);
    let receipt = &output.body;
    assert_eq!(receipt["status"], "OK");
    assert_eq!(receipt["labels"], json!(["A", "B"]));
    assert_eq!(receipt["feature_keys"], json!(["x"]));
    assert_eq!(receipt["events"]["path"], events_path.display().to_string());
    assert_eq!(receipt["events"]["sha256"].as_str().unwrap().len(), 64);

    let on_disk: Value =
        serde_json::from_str(&std::fs::read_to_string(&paths.receipt).unwrap()).unwrap();
    for key in ["status", "run_id", "trained_at", "events", "labels", "feature_keys", "model_path"] {
        assert_eq!(on_disk[key], receipt[key], "receipt field {key}");
    }

    let model_path = PathBuf::from(receipt["model_path"].as_str().unwrap());
    assert!(model_path.starts_with(&paths.models));
    let model: Model =
        serde_json::from_str(&std::fs::read_to_string(&model_path).unwrap()).unwrap();
    assert_eq!(model.run_id, receipt["run_id"].as_str().unwrap());
    assert_eq!(model.weights.len(), 1);
    assert_eq!(model.labels.negative, "A");
    assert_eq!(model.labels.positive, "B");
}

#[test]
fn test_train_without_labels_fails_closed() {
    let dir = tempfile::tempdir().unwrap();
    let events = vec![
        event("e1", json!({"x": 1}), None),
        event("e2", json!({"x": 0}), Some("   ")),
    ];
    let events_path = write_input(&dir, "events.ndjson", &events);
    let paths = train_paths(dir.path());

    let output = commands::train(
        &events_path,
        &paths.models,
        &paths.receipt,
        &TrainParams::default(),
    );

    assert_eq!(output.exit_code, 2);
    assert_eq!(output.body["status"], "FAIL_CLOSED");
    assert!(output.body["why"]
        .as_str()
        .unwrap()
        .starts_with("No labeled events found"));
    assert!(!paths.receipt.exists());
    assert!(!paths.models.exists());
}

#[test]
fn test_train_single_label_fails_closed() {
    let dir = tempfile::tempdir().unwrap();
    let events = vec![
        event("e1", json!({"x": 1}), Some("A")),
        event("e2", json!({"x": 0}), Some("A")),
    ];
    let events_path = write_input(&dir, "events.ndjson", &events);
    let paths = train_paths(dir.path());

    let output = commands::train(
        &events_path,
        &paths.models,
        &paths.receipt,
        &TrainParams::default(),
    );

    assert_eq!(output.exit_code, EXIT_FAIL_CLOSED);
    assert_eq!(
        output.body["why"],
        "Binary training requires exactly 2 labels; got [\"A\"]"
    );
    assert!(!paths.receipt.exists());
}

#[test]
fn test_train_overflowing_features_fail_closed() {
    let dir = tempfile::tempdir().unwrap();
    let events = vec![
        event("e1", json!({"x": 1e308}), Some("A")),
        event("e2", json!({"x": 1e308}), Some("A")),
        event("e3", json!({"x": 0}), Some("B")),
        event("e4", json!({"x": 1e308}), Some("B")),
    ];
    let events_path = write_input(&dir, "events.ndjson", &events);
    let paths = train_paths(dir.path());

    let output = commands::train(
        &events_path,
        &paths.models,
        &paths.receipt,
        &TrainParams::default(),
    );

    assert_eq!(output.exit_code, EXIT_FAIL_CLOSED);
    assert_eq!(output.body["status"], "FAIL_CLOSED");
    assert_eq!(output.body["why"], "Training diverged: non-finite weights");
    assert!(!paths.models.exists());
    assert!(!paths.receipt.exists());
}

#[test]
fn test_train_invalid_learning_rate_fails_closed() {
    let dir = tempfile::tempdir().unwrap();
    let events_path = write_input(&dir, "events.ndjson", &binary_events());
    let paths = train_paths(dir.path());

    for learning_rate in [f64::NAN, -0.1] {
        let params = TrainParams {
            steps: 10,
            learning_rate,
        };
        let output = commands::train(&events_path, &paths.models, &paths.receipt, &params);

        assert_eq!(output.exit_code, EXIT_FAIL_CLOSED);
        assert!(output.body["why"]
            .as_str()
            .unwrap()
            .starts_with("Invalid training parameters: learning_rate"));
    }
    assert!(!paths.models.exists());
    assert!(!paths.receipt.exists());
}

#[test]
fn test_repeat_runs_share_digest_but_not_run_id() {
    let dir = tempfile::tempdir().unwrap();
    let events = binary_events();
    let events_path = write_input(&dir, "events.ndjson", &events);
    let models = dir.path().join("models");
    let params = TrainParams::default();

    let first_at = Utc.with_ymd_and_hms(2026, 4, 2, 10, 15, 0).unwrap();
    let second_at = first_at + Duration::seconds(1);

    let first = train_from_events_at(&events, &events_path, &models, &params, first_at).unwrap();
    let second = train_from_events_at(&events, &events_path, &models, &params, second_at).unwrap();

    assert_ne!(first.run_id, second.run_id);
    assert_eq!(first.events_sha256, second.events_sha256);
    assert!(first.model_path.exists());
    assert!(second.model_path.exists());

    let load = |path: &Path| -> Model {
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
    };
    let (a, b) = (load(&first.model_path), load(&second.model_path));
    assert_eq!(a.weights, b.weights);
    assert_eq!(a.bias.to_bits(), b.bias.to_bits());
}

#[test]
fn test_ingest_then_train() {
    let dir = tempfile::tempdir().unwrap();
    let raw = write_input(&dir, "raw.ndjson", &binary_events());
    let events_path = dir.path().join("data").join("events.ndjson");
    let paths = train_paths(dir.path());

    assert!(commands::ingest(&raw, &events_path).is_success());

    let output = commands::train(
        &events_path,
        &paths.models,
        &paths.receipt,
        &TrainParams {
            steps: 50,
            learning_rate: 0.5,
        },
    );
    assert!(output.is_success(), "{}", output.body);
    assert_eq!(output.body["metrics"]["rows"], 4);
}
