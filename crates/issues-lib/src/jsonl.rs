//! JSONL file I/O.
//!
//! Each line in a JSONL file is one complete record: an `Issue` in the data
//! file, an ID string in the retired-ID file.

use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{IssueError, Result};

/// Load records from a JSONL file.
///
/// Blank lines are skipped.
///
/// # Errors
///
/// Returns `FileNotFound` if the file does not exist, `Io` if it cannot be
/// read, or `JsonlParse` if any line is invalid.
pub fn load<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let file = fs::File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            IssueError::FileNotFound(path.to_path_buf())
        } else {
            IssueError::Io(e)
        }
    })?;
    let reader = BufReader::new(file);

    let mut records = Vec::new();
    for (line_num, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let record = serde_json::from_str(trimmed).map_err(|e| IssueError::JsonlParse {
            line: line_num + 1,
            reason: e.to_string(),
        })?;
        records.push(record);
    }

    Ok(records)
}

/// Save records to a JSONL file with atomic write.
///
/// Uses write-to-temp + rename so readers never see a partial file.
///
/// # Errors
///
/// Returns `Io` if the file cannot be written.
pub fn save<T: Serialize>(path: &Path, records: &[T]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let tmp_path = path.with_extension("jsonl.tmp");
    let mut file = fs::File::create(&tmp_path)?;

    for record in records {
        let json = serde_json::to_string(record)?;
        writeln!(file, "{json}")?;
    }

    file.flush()?;
    drop(file);

    fs::rename(&tmp_path, path)?;

    Ok(())
}
