//! Utilities for collecting source document paths.
//!
//! Inputs given on the command line can be files, directories or glob
//! patterns; an input list file adds more paths, one per line.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::config::FileSet;
use crate::{Result, error::DocxCatError};

/// Extension of the documents picked up from directories.
pub const DOCX_EXTENSION: &str = "docx";

/// Prefix of the lock files Word keeps next to open documents.
const LOCK_FILE_PREFIX: &str = "~$";

/// Expand multiple glob patterns into filesystem paths.
///
/// Accepts anything iterable with items that convert to `&str`, e.g.:
/// `&[&str]`, `Vec<String>`, or `Vec<&str>`.
///
/// Returns a flattened list of resolved paths, each pattern's matches in
/// alphabetical order.
///
/// Errors:
/// - Propagates `glob` parse errors.
/// - Propagates filesystem errors from glob iterator.
pub fn collect_paths_for_patterns<T>(patterns: T) -> Result<Vec<PathBuf>>
where
    T: IntoIterator,
    T::Item: AsRef<str>,
{
    let mut resolved_paths = Vec::new();

    for pattern in patterns.into_iter() {
        let paths = collect_paths_for_pattern(pattern)?;
        resolved_paths.extend(paths);
    }

    Ok(resolved_paths)
}

/// Expand a single glob pattern into filesystem paths.
///
/// Pattern examples:
/// - `"chapters/*.docx"`
/// - `"./drafts/part-??.docx"`
fn collect_paths_for_pattern<P: AsRef<str>>(pattern: P) -> Result<Vec<PathBuf>> {
    let mut resolved_paths = Vec::new();

    let paths = glob::glob(pattern.as_ref()).map_err(|err| {
        DocxCatError::invalid_config(format!("Invalid pattern '{}': {err}", pattern.as_ref()))
    })?;

    for entry in paths {
        let path = entry.map_err(|err| DocxCatError::Other {
            message: err.to_string(),
        })?;
        if path.is_file() {
            resolved_paths.push(path);
        }
    }

    Ok(resolved_paths)
}

/// True when `input` contains glob metacharacters.
pub fn is_glob_pattern(input: &str) -> bool {
    input.contains(['*', '?', '['])
}

/// True for a `.docx` file name that is not a Word lock file.
pub fn is_docx(path: &Path) -> bool {
    let has_extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(DOCX_EXTENSION));
    let is_lock_file = path
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with(LOCK_FILE_PREFIX));
    has_extension && !is_lock_file
}

/// List the `.docx` documents directly inside `dir`.
///
/// Subdirectories are not descended into. Entries come back in file name
/// order; callers sort them by their own policy afterwards.
pub fn collect_directory(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();

    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|err| {
            let source = err
                .into_io_error()
                .unwrap_or_else(|| std::io::Error::other("directory walk failed"));
            DocxCatError::FileNotAccessible {
                path: dir.to_path_buf(),
                source,
            }
        })?;
        if entry.file_type().is_file() && is_docx(entry.path()) {
            paths.push(entry.into_path());
        }
    }

    tracing::debug!(dir = %dir.display(), documents = paths.len(), "scanned directory");
    Ok(paths)
}

/// Resolve one command-line input into document paths.
///
/// - an existing directory yields its `.docx` documents
/// - an input with glob metacharacters that is not an existing path is
///   expanded as a pattern
/// - anything else is taken as a file path and checked later
pub fn expand_input(input: &Path) -> Result<Vec<PathBuf>> {
    if input.is_dir() {
        return collect_directory(input);
    }

    if !input.exists()
        && let Some(pattern) = input.to_str()
        && is_glob_pattern(pattern)
    {
        return collect_paths_for_pattern(pattern);
    }

    Ok(vec![input.to_path_buf()])
}

/// Resolve every input, in order, into a [`FileSet`].
///
/// Duplicates are dropped; the first occurrence keeps its place.
pub fn collect_inputs<I, P>(inputs: I) -> Result<FileSet>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    let mut files = FileSet::new();
    for input in inputs {
        files.extend(expand_input(input.as_ref())?);
    }
    Ok(files)
}

/// Read input paths from a list file.
///
/// One path per line. Lines starting with `#` are comments; blank lines
/// are skipped. Relative paths are taken as they are, relative to the
/// working directory.
///
/// # Errors
///
/// - [`DocxCatError::FailedToReadInputList`] when the file cannot be read
/// - [`DocxCatError::InvalidInputList`] for a line that is not valid UTF-8
///   or holds a NUL byte
pub fn read_input_list(path: &Path) -> Result<Vec<PathBuf>> {
    let file = File::open(path).map_err(|e| DocxCatError::FailedToReadInputList {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut paths = Vec::new();
    for (index, line) in BufReader::new(file).lines().enumerate() {
        let line_number = index + 1;
        let line = line.map_err(|e| match e.kind() {
            std::io::ErrorKind::InvalidData => DocxCatError::InvalidInputList {
                path: path.to_path_buf(),
                line_number,
                details: "Line is not valid UTF-8".to_string(),
            },
            _ => DocxCatError::FailedToReadInputList {
                path: path.to_path_buf(),
                source: e,
            },
        })?;
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.contains('\0') {
            return Err(DocxCatError::InvalidInputList {
                path: path.to_path_buf(),
                line_number,
                details: "Path contains a NUL byte".to_string(),
            });
        }

        paths.push(PathBuf::from(line));
    }

    Ok(paths)
}
