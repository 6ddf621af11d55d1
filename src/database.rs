//! Flat-file record database.
//!
//! The "database" is a plain UTF-8 text file with one denormalized record
//! line per row, produced by the `flatten` command. Lines are immutable at
//! query time; the store reloads from disk only when the file's modification
//! time changes.

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::SystemTime;

use anyhow::{Context, Result};

/// Availability of the record database, for status displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbStatus {
    /// The data file does not exist or holds no records.
    Missing,
    /// The data file exists with this many record lines.
    Loaded { records: usize },
}

/// Source of record lines for the database.
#[derive(Debug)]
enum Source {
    /// Backed by a file on disk, reloaded when its mtime changes.
    File { path: PathBuf },
    /// Fixed lines supplied directly. Used by tests.
    Fixed(Vec<String>),
}

/// Flat-file store of denormalized record lines.
///
/// A missing data file is not an error: queries against it simply see zero
/// records, and [`Database::status`] reports [`DbStatus::Missing`] so the UI
/// can surface it as a status indicator.
///
/// # Examples
///
/// ```
/// use factline::Database;
///
/// let db = Database::from_lines(vec![
///     "USER (Bob Smith) | Currency: EUR".to_string(),
/// ]);
/// assert_eq!(db.load().unwrap().len(), 1);
/// ```
#[derive(Debug)]
pub struct Database {
    source: Source,
    // Cached (mtime, lines) for the file-backed case.
    cache: Mutex<Option<(SystemTime, Vec<String>)>>,
}

impl Database {
    /// Creates a database backed by the given data file path.
    ///
    /// The file does not need to exist yet.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            source: Source::File { path: path.into() },
            cache: Mutex::new(None),
        }
    }

    /// Creates a database over fixed in-memory lines, for tests.
    pub fn from_lines(lines: Vec<String>) -> Self {
        let lines = lines
            .into_iter()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect();
        Self {
            source: Source::Fixed(lines),
            cache: Mutex::new(None),
        }
    }

    /// Returns the backing file path, when file-backed.
    pub fn path(&self) -> Option<&Path> {
        match &self.source {
            Source::File { path } => Some(path),
            Source::Fixed(_) => None,
        }
    }

    /// Loads all record lines, trimmed, with empty lines dropped.
    ///
    /// A missing file yields an empty Vec. File reads are cached keyed by
    /// the file's modification time, so repeated queries between edits do
    /// not touch the disk.
    pub fn load(&self) -> Result<Vec<String>> {
        let path = match &self.source {
            Source::Fixed(lines) => return Ok(lines.clone()),
            Source::File { path } => path,
        };

        let mtime = match std::fs::metadata(path) {
            Ok(meta) => meta.modified().unwrap_or(SystemTime::UNIX_EPOCH),
            // Missing database is a status, not an error at query time.
            Err(_) => return Ok(Vec::new()),
        };

        let mut cache = self
            .cache
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        if let Some((cached_mtime, lines)) = cache.as_ref()
            && *cached_mtime == mtime
        {
            return Ok(lines.clone());
        }

        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read data file: {}", path.display()))?;
        let lines: Vec<String> = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(String::from)
            .collect();

        *cache = Some((mtime, lines.clone()));
        Ok(lines)
    }

    /// Reports whether the database is present and how many records it holds.
    pub fn status(&self) -> DbStatus {
        match self.load() {
            Ok(lines) if !lines.is_empty() => DbStatus::Loaded {
                records: lines.len(),
            },
            _ => DbStatus::Missing,
        }
    }
}
