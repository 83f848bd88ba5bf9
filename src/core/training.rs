//! Training orchestration: events in, model artifact and provenance out.
//!
//! The orchestrator extracts labeled rows from events, builds a dense matrix
//! over the sorted union of feature keys, fits the logistic regression and
//! writes the model to `<out_dir>/<run_id>.model.json`. The returned
//! [`TrainResult`] binds the run to the SHA-256 of the events file, which is
//! taken before anything is written.

use crate::core::digest::sha256_file;
use crate::core::features::{extract_features, FeatureVector};
use crate::core::trainer::{evaluate, fit, TrainError, TrainParams, TrainingMetrics};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Model kind written into every artifact.
pub const MODEL_KIND: &str = "logreg";

/// Which label maps to which class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelLabels {
    pub negative: String,
    pub positive: String,
}

/// Persisted model artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Model {
    pub kind: String,
    pub run_id: String,
    pub trained_at: String,
    pub labels: ModelLabels,
    /// Column order of `weights`
    pub feature_keys: Vec<String>,
    pub weights: Vec<f64>,
    pub bias: f64,
}

/// Outcome of a successful training run.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainResult {
    pub run_id: String,
    pub trained_at: String,
    pub events_path: PathBuf,
    pub events_sha256: String,
    /// `[negative, positive]`
    pub label_set: Vec<String>,
    pub feature_keys: Vec<String>,
    pub model_path: PathBuf,
    pub metrics: TrainingMetrics,
}

/// One labeled example.
struct TrainingRow {
    features: FeatureVector,
    label: String,
}

/// Dense matrix ready for the trainer.
struct TrainingSet {
    label_set: Vec<String>,
    feature_keys: Vec<String>,
    xs: Vec<Vec<f64>>,
    ys: Vec<u8>,
}

/// Run identifier for a run started at `now`. Second granularity: two runs in
/// the same second share an id.
pub fn run_id_for(now: DateTime<Utc>) -> String {
    format!("train-{}", now.timestamp())
}

fn labeled_rows(events: &[Value]) -> Vec<TrainingRow> {
    events
        .iter()
        .filter_map(|event| {
            let (features, label) = extract_features(event);
            label.map(|label| TrainingRow { features, label })
        })
        .collect()
}

fn build_training_set(rows: &[TrainingRow]) -> Result<TrainingSet, TrainError> {
    if rows.is_empty() {
        return Err(TrainError::NoLabeledEvents);
    }

    let label_set: Vec<String> = rows
        .iter()
        .map(|r| r.label.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    if label_set.len() != 2 {
        return Err(TrainError::LabelCount(label_set));
    }

    let feature_keys: Vec<String> = rows
        .iter()
        .flat_map(|r| r.features.keys().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    if feature_keys.is_empty() {
        return Err(TrainError::NoNumericFeatures);
    }

    let positive = &label_set[1];
    let xs: Vec<Vec<f64>> = rows
        .iter()
        .map(|r| {
            feature_keys
                .iter()
                .map(|k| r.features.get(k).copied().unwrap_or(0.0))
                .collect()
        })
        .collect();
    let ys: Vec<u8> = rows.iter().map(|r| u8::from(&r.label == positive)).collect();

    Ok(TrainingSet {
        label_set,
        feature_keys,
        xs,
        ys,
    })
}

/// Train on `events`, using the current time for the run id.
pub fn train_from_events(
    events: &[Value],
    events_path: &Path,
    out_dir: &Path,
    params: &TrainParams,
) -> Result<TrainResult, TrainError> {
    train_from_events_at(events, events_path, out_dir, params, Utc::now())
}

/// Train on `events` as if the run started at `now`.
pub fn train_from_events_at(
    events: &[Value],
    events_path: &Path,
    out_dir: &Path,
    params: &TrainParams,
    now: DateTime<Utc>,
) -> Result<TrainResult, TrainError> {
    let rows = labeled_rows(events);
    tracing::info!(
        events = events.len(),
        labeled = rows.len(),
        "collected training rows"
    );

    let set = build_training_set(&rows)?;
    let (weights, bias) = fit(&set.xs, &set.ys, params)?;
    let metrics = evaluate(&weights, bias, &set.xs, &set.ys)?;

    let run_id = run_id_for(now);
    let trained_at = now.format("%Y-%m-%dT%H:%M:%SZ").to_string();

    let model = Model {
        kind: MODEL_KIND.to_string(),
        run_id: run_id.clone(),
        trained_at: trained_at.clone(),
        labels: ModelLabels {
            negative: set.label_set[0].clone(),
            positive: set.label_set[1].clone(),
        },
        feature_keys: set.feature_keys.clone(),
        weights,
        bias,
    };

    let events_sha256 = sha256_file(events_path).map_err(|e| {
        TrainError::IoError(format!(
            "Failed to hash events file {}: {e}",
            events_path.display()
        ))
    })?;

    std::fs::create_dir_all(out_dir).map_err(|e| TrainError::IoError(e.to_string()))?;
    let model_path = out_dir.join(format!("{run_id}.model.json"));
    if model_path.exists() {
        tracing::warn!(path = %model_path.display(), "overwriting model with the same run id");
    }

    let content = serde_json::to_string_pretty(&model)
        .map_err(|e| TrainError::SerializeError(e.to_string()))?;
    std::fs::write(&model_path, content).map_err(|e| TrainError::IoError(e.to_string()))?;

    tracing::info!(
        run_id = %run_id,
        model = %model_path.display(),
        accuracy = metrics.accuracy,
        "training run complete"
    );

    Ok(TrainResult {
        run_id,
        trained_at,
        events_path: events_path.to_path_buf(),
        events_sha256,
        label_set: set.label_set,
        feature_keys: set.feature_keys,
        model_path,
        metrics,
    })
}
