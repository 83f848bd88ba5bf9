//! Line-delimited JSON (NDJSON) reading and writing.
//!
//! One compact JSON object per line, UTF-8, newline-terminated. Blank lines
//! are skipped on read.

use serde::Serialize;
use serde_json::Value;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// NDJSON storage errors.
#[derive(Debug)]
pub enum StorageError {
    IoError(String),
    /// A line was not valid JSON (1-based line number)
    ParseError { line: usize, message: String },
    SerializeError(String),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::IoError(e) => write!(f, "IO error: {e}"),
            StorageError::ParseError { line, message } => {
                write!(f, "Parse error on line {line}: {message}")
            }
            StorageError::SerializeError(e) => write!(f, "Serialize error: {e}"),
        }
    }
}

impl std::error::Error for StorageError {}

/// Read every non-blank line of `path` as a JSON document.
pub fn read_ndjson(path: &Path) -> Result<Vec<Value>, StorageError> {
    let file = File::open(path).map_err(|e| StorageError::IoError(e.to_string()))?;
    let reader = BufReader::new(file);

    let mut out = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| StorageError::IoError(e.to_string()))?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let value = serde_json::from_str(line).map_err(|e| StorageError::ParseError {
            line: idx + 1,
            message: e.to_string(),
        })?;
        out.push(value);
    }

    Ok(out)
}

/// Write `items` to `path`, one per line, creating parent directories.
///
/// Returns the number of records written.
pub fn write_ndjson<I, T>(path: &Path, items: I) -> Result<usize, StorageError>
where
    I: IntoIterator<Item = T>,
    T: Serialize,
{
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| StorageError::IoError(e.to_string()))?;
    }

    let file = File::create(path).map_err(|e| StorageError::IoError(e.to_string()))?;
    let mut writer = BufWriter::new(file);

    let mut written = 0;
    for item in items {
        serde_json::to_writer(&mut writer, &item)
            .map_err(|e| StorageError::SerializeError(e.to_string()))?;
        writer
            .write_all(b"\n")
            .map_err(|e| StorageError::IoError(e.to_string()))?;
        written += 1;
    }

    writer
        .flush()
        .map_err(|e| StorageError::IoError(e.to_string()))?;
    Ok(written)
}
