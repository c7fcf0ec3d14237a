//! Fuzzlog parsing
//!
//! A fuzzlog is plain text, one observation per line:
//!
//! ```text
//! <value> <location>
//! ```
//!
//! The value parses as `f64`; the location is kept verbatim. Blank lines are
//! skipped. Any other shape aborts the run with [`ExetreeError::MalformedLog`].
//!
//! Outcomes are encoded in file names. Training fuzzlogs ending in `.0` are
//! successes and everything else is a failure (handy with
//! `./runtest; mv fuzzlog train/$((n++)).$?`). Validation fuzzlogs end in `.s`
//! (success) or `.f` (failure); other names are ignored.

use crate::tree::Observation;
use exetree_common::{ExetreeError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Suffix marking a successful training run.
pub const TRAINING_SUCCESS_SUFFIX: &str = ".0";

/// Parse fuzzlog text. `path` is only used in error messages.
pub fn parse_fuzzlog(content: &str, path: &Path) -> Result<Vec<Observation>> {
    let mut observations = Vec::new();
    for (lineno, line) in content.lines().enumerate() {
        let mut fields = line.split_whitespace();
        let Some(value) = fields.next() else {
            continue;
        };
        let malformed = |message: String| ExetreeError::MalformedLog {
            path: path.to_path_buf(),
            line: lineno + 1,
            message,
        };

        let location = fields
            .next()
            .ok_or_else(|| malformed(format!("missing location after value '{value}'")))?;
        if let Some(extra) = fields.next() {
            return Err(malformed(format!("unexpected trailing field '{extra}'")));
        }
        let value: f64 = value
            .parse()
            .map_err(|e| malformed(format!("invalid value '{value}': {e}")))?;

        observations.push(Observation::new(location, value));
    }
    Ok(observations)
}

/// Read and parse one fuzzlog file.
pub fn read_fuzzlog(path: impl AsRef<Path>) -> Result<Vec<Observation>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .map_err(|e| ExetreeError::io(format!("reading fuzzlog {}", path.display()), e))?;
    parse_fuzzlog(&content, path)
}

fn file_name(path: &Path) -> String {
    path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default()
}

/// Whether a training fuzzlog recorded a successful run.
pub fn training_label(path: &Path) -> bool {
    file_name(path).ends_with(TRAINING_SUCCESS_SUFFIX)
}

/// Outcome of a validation fuzzlog, `None` if the name carries none.
pub fn validation_label(path: &Path) -> Option<bool> {
    let name = file_name(path);
    if name.ends_with(".s") {
        Some(true)
    } else if name.ends_with(".f") {
        Some(false)
    } else {
        None
    }
}

/// Regular files directly inside `dir`, sorted by name.
///
/// Sorting fixes the ingestion order, and with it the location ids.
pub fn list_dir(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(ExetreeError::DataDirNotFound { path: dir.to_path_buf() });
    }

    let entries = fs::read_dir(dir)
        .map_err(|e| ExetreeError::io(format!("listing {}", dir.display()), e))?;
    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| ExetreeError::io(format!("listing {}", dir.display()), e))?;
        let path = entry.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Parsed training runs with their outcome, in [`list_dir`] order.
pub fn read_training_dir(dir: impl AsRef<Path>) -> Result<Vec<(PathBuf, Vec<Observation>, bool)>> {
    list_dir(dir)?
        .into_iter()
        .map(|path| {
            let observations = read_fuzzlog(&path)?;
            let succeeded = training_label(&path);
            Ok((path, observations, succeeded))
        })
        .collect()
}

/// Parsed validation runs; files without a `.s` / `.f` suffix are skipped.
pub fn read_validation_dir(
    dir: impl AsRef<Path>,
) -> Result<Vec<(PathBuf, Vec<Observation>, bool)>> {
    let mut runs = Vec::new();
    for path in list_dir(dir)? {
        if let Some(succeeded) = validation_label(&path) {
            let observations = read_fuzzlog(&path)?;
            runs.push((path, observations, succeeded));
        }
    }
    Ok(runs)
}
