//! Filesystem helpers shared by the generators and exporters.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use glob::glob;

/// Create a directory and any missing parents.
pub fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).with_context(|| format!("failed to create {}", path.display()))
}

/// Read a UTF-8 file, naming the file in the error.
pub fn read_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

/// Write a whole file, creating parent directories first.
pub fn write_string(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))
}

/// Write `contents` to `path` only if the file is missing or its bytes differ.
///
/// Returns `true` when a write actually happened. Unchanged files are left
/// completely untouched, so their modification times survive and downstream
/// build tools see no change. Writes go through a temporary file in the target
/// directory followed by a rename, so a file is never observable half-written.
pub fn write_if_different(path: &Path, contents: &[u8]) -> io::Result<bool> {
    match fs::read(path) {
        Ok(existing) if existing == contents => return Ok(false),
        Ok(_) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(contents)?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(true)
}

/// Remove a file if it exists. Returns `true` if something was deleted;
/// a missing file is not an error.
pub fn delete_if_exists(path: &Path) -> io::Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

/// Expand glob patterns anchored at `base` into a sorted, deduplicated list
/// of files. Directory matches are skipped; an unreadable match is logged
/// and skipped rather than failing the whole expansion.
pub fn glob_files(base: &Path, patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for pattern in patterns {
        let anchored = base.join(pattern);
        let matches = glob(&anchored.to_string_lossy())
            .with_context(|| format!("invalid glob pattern: {}", pattern))?;
        for entry in matches {
            match entry {
                Ok(path) if path.is_file() => files.push(path),
                Ok(_) => {}
                Err(e) => tracing::warn!("skipping unreadable match: {}", e),
            }
        }
    }
    files.sort();
    files.dedup();
    Ok(files)
}

/// Path from `base` to `path`, computed lexically. Falls back to `path`
/// itself when no relative form exists (different drives on Windows).
pub fn relative_path(base: &Path, path: &Path) -> PathBuf {
    pathdiff::diff_paths(path, base).unwrap_or_else(|| path.to_path_buf())
}

/// Render a path with forward slashes, the form generated C++ text embeds.
pub fn forward_slashes(path: &Path) -> String {
    let s = path.to_string_lossy();
    if s.contains('\\') {
        s.replace('\\', "/")
    } else {
        s.into_owned()
    }
}
