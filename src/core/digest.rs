//! Content digests for training provenance.

use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Read size used when hashing files (1 MiB).
pub const DIGEST_CHUNK_SIZE: usize = 1024 * 1024;

/// Compute the lower-case hex SHA-256 digest of a file, streaming it in chunks.
pub fn sha256_file(path: &Path) -> io::Result<String> {
    let file = File::open(path)?;
    sha256_reader(file, DIGEST_CHUNK_SIZE)
}

/// Hash everything `reader` yields, reading at most `chunk_size` bytes at a time.
pub fn sha256_reader<R: Read>(mut reader: R, chunk_size: usize) -> io::Result<String> {
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; chunk_size.max(1)];

    loop {
        let bytes_read = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hex::encode(hasher.finalize()))
}
