//! Synheart Byte Trainer - fail-closed training on byte-size health signals.
//!
//! This library validates discrete health-signal events, extracts numeric
//! features from them and trains a baseline binary classifier, recording a
//! receipt that ties every model to the exact bytes it was trained on.
//!
//! # Guarantees
//!
//! - **Fail-closed ingest**: if any event violates the schema, nothing is written
//! - **Consent on record**: every accepted event carries a consent scope
//! - **Reproducible training**: identical inputs give bit-identical weights
//! - **Provenance**: every receipt records the SHA-256 of its events file
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   Synheart Byte Trainer                      │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌─────────────┐   ┌─────────────┐   ┌─────────────┐       │
//! │  │   Schema    │──▶│  Features   │──▶│   Trainer   │       │
//! │  │ (validate)  │   │ (extract)   │   │  (logreg)   │       │
//! │  └─────────────┘   └─────────────┘   └─────────────┘       │
//! │         │                                    │              │
//! │         ▼                                    ▼              │
//! │  ┌─────────────┐                     ┌─────────────┐       │
//! │  │   NDJSON    │                     │   Model +   │       │
//! │  │   storage   │                     │   Receipt   │       │
//! │  └─────────────┘                     └─────────────┘       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use synheart_byte_trainer::{core, storage};
//!
//! let events_path = Path::new("ml/data/events.ndjson");
//! let events = storage::read_ndjson(events_path).expect("Failed to read events");
//!
//! let result = core::train_from_events(
//!     &events,
//!     events_path,
//!     Path::new("ml/models"),
//!     &core::TrainParams::default(),
//! )
//! .expect("Training failed");
//!
//! println!("model written to {}", result.model_path.display());
//! ```

pub mod commands;
pub mod config;
pub mod core;
pub mod report;
pub mod schema;
pub mod storage;

// Re-export key types at crate root for convenience
pub use config::{Config, ConfigError};
pub use core::{
    extract_features, fit, sha256_file, train_from_events, FeatureVector, Model, TrainError,
    TrainParams, TrainResult,
};
pub use report::{FailClosedReport, Receipt, Status};
pub use schema::{validate, ByteEvent, ValidationError};
pub use storage::{read_ndjson, write_ndjson, StorageError};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
