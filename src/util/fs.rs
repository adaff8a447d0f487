//! Filesystem utilities.
//!
//! Everything that writes generated output goes through [`provision`] or
//! [`write_if_changed`], so a regeneration over an unchanged tree leaves
//! every timestamp alone and Visual Studio does not rebuild.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::util::hash::same_contents;

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("failed to create directory: {}", path.display()))?;
    }
    Ok(())
}

/// Remove a file if it exists. Returns whether anything was removed.
pub fn remove_file_if_exists(path: &Path) -> Result<bool> {
    if path.is_file() {
        fs::remove_file(path)
            .with_context(|| format!("failed to remove file: {}", path.display()))?;
        return Ok(true);
    }
    Ok(false)
}

/// Read a file to string, with nice error messages.
pub fn read_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read file: {}", path.display()))
}

/// Copy `src` to `dst` unless `dst` already holds the same bytes.
///
/// A missing `src` is not an error: there is simply nothing to provision.
/// Missing destination directories are created. Returns whether a write
/// happened.
pub fn provision(src: &Path, dst: &Path) -> Result<bool> {
    if !src.is_file() {
        tracing::debug!("nothing to provision from {}", src.display());
        return Ok(false);
    }
    if dst.is_file() && same_contents(src, dst)? {
        tracing::debug!("{} is up to date", dst.display());
        return Ok(false);
    }
    if let Some(parent) = dst.parent() {
        ensure_dir(parent)?;
    }
    fs::copy(src, dst)
        .with_context(|| format!("failed to copy {} to {}", src.display(), dst.display()))?;
    tracing::info!("provisioned {}", dst.display());
    Ok(true)
}

/// Write `contents` to `path` unless the file already holds exactly that.
///
/// Creates parent directories as needed. Returns whether a write happened.
pub fn write_if_changed(path: &Path, contents: &str) -> Result<bool> {
    write_bytes_if_changed(path, contents.as_bytes())
}

/// [`write_if_changed`] for content that need not be UTF-8.
pub fn write_bytes_if_changed(path: &Path, contents: &[u8]) -> Result<bool> {
    if path.is_file() {
        let existing =
            fs::read(path).with_context(|| format!("failed to read file: {}", path.display()))?;
        if existing == contents {
            tracing::debug!("{} is unchanged", path.display());
            return Ok(false);
        }
    }
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    fs::write(path, contents)
        .with_context(|| format!("failed to write file: {}", path.display()))?;
    Ok(true)
}

/// Get the relative path from `base` to `path`.
pub fn relative_path(base: &Path, path: &Path) -> PathBuf {
    pathdiff::diff_paths(path, base).unwrap_or_else(|| path.to_path_buf())
}

/// Render a relative path the way MSBuild expects it: backslash separated.
pub fn to_windows(path: &Path) -> String {
    let parts: Vec<_> = path
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    parts.join("\\")
}

/// Convert a `/`-separated inventory path to a backslash path.
pub fn slash_to_windows(path: &str) -> String {
    path.replace('/', "\\")
}
