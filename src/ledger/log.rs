//! Append-only, line-oriented log files.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::path::{Path, PathBuf};

use super::LedgerError;

/// An open append-only log. Closed when dropped.
pub struct LedgerLog {
    path: PathBuf,
    file: File,
}

impl LedgerLog {
    /// Open (creating if needed) a log for appending
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, LedgerError> {
        let path = path.into();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| LedgerError::Open(path.clone(), e))?;
        Ok(Self { path, file })
    }

    /// Append one entry and flush it.
    ///
    /// The line and its terminator go out in a single write so an
    /// interrupted run never leaves a partial line behind.
    pub fn append(&mut self, entry: &str) -> Result<(), LedgerError> {
        let mut line = String::with_capacity(entry.len() + 1);
        line.push_str(entry.trim_end_matches(['\r', '\n']));
        line.push('\n');

        self.file
            .write_all(line.as_bytes())
            .and_then(|_| self.file.flush())
            .map_err(|e| LedgerError::Append(self.path.clone(), e))
    }
}

/// Read the non-empty, trimmed lines of a log. A missing file has no entries.
pub fn read_entries(path: &Path) -> Result<Vec<String>, LedgerError> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(LedgerError::Read(path.to_path_buf(), e)),
    };

    let mut entries = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line.map_err(|e| LedgerError::Read(path.to_path_buf(), e))?;
        let line = line.trim();
        if !line.is_empty() {
            entries.push(line.to_string());
        }
    }
    Ok(entries)
}
