//! Filesystem discovery.
//!
//! Finds candidate documents under the store root and reads them safely:
//! - Symlinks are not followed by default (`follow_links: false`)
//! - Resolved paths are checked to remain within the root
//! - Only regular files are read (no devices, pipes or sockets)
//! - Maximum directory depth is enforced
//! - Bounded reads keep one oversized file from exhausting memory

use std::io::Read;
use std::path::{Path, PathBuf};

use glob::Pattern;
use walkdir::WalkDir;

use crate::config::StoreConfig;
use crate::error::{LoadError, LoadErrorKind};

/// Check if a path matches any of the exclude patterns.
fn matches_exclude(path: &Path, root: &Path, exclude_patterns: &[Pattern]) -> bool {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let rel_str = relative.to_string_lossy();
    exclude_patterns.iter().any(|pattern| {
        pattern.matches(&rel_str)
            || path
                .file_name()
                .is_some_and(|name| pattern.matches(&name.to_string_lossy()))
    })
}

/// Check if the file's extension is one of `extensions` (each carrying its leading `.`).
fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| extensions.iter().any(|want| want[1..] == *ext))
}

/// Find every eligible file under `config.root`.
///
/// Returns `(files, errors)`:
/// - `files`: sorted paths that passed all filters and are ready to read.
/// - `errors`: walk failures, boundary violations and bad exclude patterns.
///   These are load diagnostics, never silently discarded.
pub fn find_files(config: &StoreConfig, extensions: &[String]) -> (Vec<PathBuf>, Vec<LoadError>) {
    let mut files = Vec::new();
    let mut errors = Vec::new();

    let mut exclude_patterns = Vec::with_capacity(config.exclude.len());
    for pat_str in &config.exclude {
        match Pattern::new(pat_str) {
            Ok(pat) => exclude_patterns.push(pat),
            Err(e) => errors.push(LoadError::new(
                pat_str,
                LoadErrorKind::InvalidExcludePattern,
                format!("invalid exclude glob pattern '{pat_str}': {e}"),
            )),
        }
    }

    let root = &config.root;
    let canonical_root = match root.canonicalize() {
        Ok(r) => r,
        Err(e) => {
            errors.push(LoadError::new(
                root,
                LoadErrorKind::IoError,
                format!("failed to resolve root directory: {e}"),
            ));
            return (files, errors);
        }
    };

    for entry_result in WalkDir::new(root)
        .follow_links(config.follow_links)
        .max_depth(config.max_depth)
    {
        let entry = match entry_result {
            Ok(e) => e,
            Err(walk_err) => {
                let path = walk_err
                    .path()
                    .map_or_else(|| root.clone(), Path::to_path_buf);
                errors.push(LoadError::new(
                    path,
                    LoadErrorKind::WalkError,
                    format!("directory traversal error: {walk_err}"),
                ));
                continue;
            }
        };

        let file_path = entry.path();

        // `is_file` follows symlinks and is false for devices, pipes and sockets.
        if !file_path.is_file() || !has_extension(file_path, extensions) {
            continue;
        }

        if matches_exclude(file_path, root, &exclude_patterns) {
            tracing::debug!(file = %file_path.display(), "excluded");
            continue;
        }

        match file_path.canonicalize() {
            Ok(canonical_path) if !canonical_path.starts_with(&canonical_root) => {
                errors.push(LoadError::new(
                    file_path,
                    LoadErrorKind::OutsideRoot,
                    format!(
                        "path resolves outside root directory: {} -> {}",
                        file_path.display(),
                        canonical_path.display()
                    ),
                ));
                continue;
            }
            Ok(_) => {}
            Err(e) => {
                errors.push(LoadError::new(
                    file_path,
                    LoadErrorKind::IoError,
                    format!("failed to resolve path: {e}"),
                ));
                continue;
            }
        }

        files.push(file_path.to_path_buf());
    }

    files.sort();
    files.dedup();
    (files, errors)
}

/// Read a file with a bounded read, enforcing `max_file_size`.
///
/// # Errors
///
/// Returns a load diagnostic if the file cannot be read, exceeds
/// `max_file_size`, or is not valid UTF-8.
pub fn read_file_bounded(path: &Path, max_file_size: u64) -> Result<String, LoadError> {
    let file = std::fs::File::open(path).map_err(|e| {
        LoadError::new(path, LoadErrorKind::IoError, format!("failed to open file: {e}"))
    })?;

    // Read at most max_file_size + 1 bytes to detect oversized files
    let mut buffer = Vec::new();
    file.take(max_file_size.saturating_add(1))
        .read_to_end(&mut buffer)
        .map_err(|e| {
            LoadError::new(path, LoadErrorKind::IoError, format!("failed to read file: {e}"))
        })?;

    if buffer.len() as u64 > max_file_size {
        return Err(LoadError::new(
            path,
            LoadErrorKind::FileTooLarge,
            format!("file exceeds maximum size of {max_file_size} bytes"),
        ));
    }

    String::from_utf8(buffer).map_err(|_| {
        LoadError::new(path, LoadErrorKind::InvalidEncoding, "file is not valid UTF-8")
    })
}
