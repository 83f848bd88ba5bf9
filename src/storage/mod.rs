//! Flat-file persistence for event batches.

pub mod ndjson;

pub use ndjson::{read_ndjson, write_ndjson, StorageError};
