//! Core training pipeline.
//!
//! This module contains:
//! - Feature extraction from validated events
//! - Binary logistic regression (gradient descent)
//! - Content digests for provenance
//! - Training orchestration that writes model artifacts

pub mod digest;
pub mod features;
pub mod trainer;
pub mod training;

// Re-export commonly used types
pub use digest::{sha256_file, sha256_reader, DIGEST_CHUNK_SIZE};
pub use features::{extract_features, FeatureVector};
pub use trainer::{
    evaluate, fit, predict_proba, sigmoid, TrainError, TrainParams, TrainingMetrics,
    DEFAULT_LEARNING_RATE, DEFAULT_STEPS,
};
pub use training::{
    run_id_for, train_from_events, train_from_events_at, Model, ModelLabels, TrainResult,
    MODEL_KIND,
};
