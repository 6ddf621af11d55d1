//! Shared utility functions for locating data files.
//!
//! These functions are reused across the CLI and TUI interfaces.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Gets the cross-platform path of the flattened data file.
///
/// Honors `FACTLINE_DATA` when set; otherwise returns
/// `{data_dir}/factline/flattened_notes.txt` where `data_dir` is:
/// - Linux: `~/.local/share`
/// - macOS: `~/Library/Application Support`
/// - Windows: `C:\Users\<user>\AppData\Roaming`
///
/// # Errors
///
/// Returns an error if the data directory cannot be determined.
pub fn get_data_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var("FACTLINE_DATA")
        && !path.is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    let data_dir =
        dirs::data_dir().ok_or_else(|| anyhow::anyhow!("Failed to determine data directory"))?;

    Ok(data_dir.join("factline").join("flattened_notes.txt"))
}

/// Gets the default path of the raw notes file next to the data file.
///
/// This is the flattener's default input when `--input` is not given.
///
/// # Errors
///
/// Returns an error if the data directory cannot be determined.
pub fn get_notes_path() -> Result<PathBuf> {
    let data_dir =
        dirs::data_dir().ok_or_else(|| anyhow::anyhow!("Failed to determine data directory"))?;

    Ok(data_dir.join("factline").join("my_notes.txt"))
}

/// Ensures the parent directory of the given file exists.
///
/// Creates the directory structure if it doesn't exist using `create_dir_all`.
///
/// # Errors
///
/// Returns an error if directory creation fails.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create data directory: {}", parent.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn get_data_path_returns_valid_default() {
        unsafe {
            std::env::remove_var("FACTLINE_DATA");
        }

        let path = get_data_path().unwrap();
        assert!(path.to_string_lossy().contains("factline"));
        assert!(path.to_string_lossy().contains("flattened_notes.txt"));
    }

    #[test]
    #[serial]
    fn get_data_path_honors_env_override() {
        unsafe {
            std::env::set_var("FACTLINE_DATA", "/tmp/custom_data.txt");
        }

        let path = get_data_path().unwrap();
        assert_eq!(path, PathBuf::from("/tmp/custom_data.txt"));

        unsafe {
            std::env::remove_var("FACTLINE_DATA");
        }
    }

    #[test]
    fn get_notes_path_returns_valid_path() {
        let path = get_notes_path().unwrap();
        assert!(path.to_string_lossy().contains("my_notes.txt"));
    }

    #[test]
    fn ensure_parent_dir_creates_nested_directories() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("a").join("b").join("data.txt");

        ensure_parent_dir(&target).unwrap();
        assert!(target.parent().unwrap().is_dir());

        // Idempotent
        ensure_parent_dir(&target).unwrap();
    }
}
