//! Hashing utilities for content comparison.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};

/// Compute SHA256 hash of a file.
pub fn sha256_file(path: &Path) -> Result<String> {
    let file = File::open(path)
        .with_context(|| format!("failed to open file for hashing: {}", path.display()))?;

    let mut reader = BufReader::new(file);
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];

    loop {
        let bytes_read = reader.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hex::encode(hasher.finalize()))
}

/// Whether two files have identical contents.
///
/// Sizes are compared first so differing files are rarely read.
pub fn same_contents(a: &Path, b: &Path) -> Result<bool> {
    let len_a = std::fs::metadata(a)
        .with_context(|| format!("failed to stat {}", a.display()))?
        .len();
    let len_b = std::fs::metadata(b)
        .with_context(|| format!("failed to stat {}", b.display()))?
        .len();
    if len_a != len_b {
        return Ok(false);
    }
    Ok(sha256_file(a)? == sha256_file(b)?)
}
