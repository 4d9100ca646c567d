//! Record file discovery

use flightstat_common::{FlightError, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// List the record files directly inside `dir` whose extension matches.
///
/// Subdirectories are not descended into. The result is sorted by path so that
/// the per-file series of a report line up the same way on every run.
pub fn discover_files(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|e| FlightError::io(dir, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| FlightError::io(dir, e))?;
        let path = entry.path();

        if path.extension().and_then(|ext| ext.to_str()) != Some(extension) {
            debug!(path = %path.display(), "Skipping non-record file");
            continue;
        }

        // Follows symlinks, so a linked record file counts as a file
        let metadata = std::fs::metadata(&path).map_err(|e| FlightError::io(&path, e))?;
        if metadata.is_file() {
            files.push(path);
        } else {
            debug!(path = %path.display(), "Skipping non-file entry");
        }
    }

    files.sort();

    info!(dir = %dir.display(), count = files.len(), "Discovered record files");
    Ok(files)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_discovers_matching_files_sorted() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        std::fs::write(root.join("10-24-Tampa-flights.json"), "[]").unwrap();
        std::fs::write(root.join("10-24-Austin-flights.json"), "[]").unwrap();
        std::fs::write(root.join("notes.txt"), "ignore me").unwrap();
        std::fs::create_dir(root.join("archive.json")).unwrap();
        std::fs::write(root.join("archive.json").join("old.json"), "[]").unwrap();

        let files = discover_files(root, "json").unwrap();

        assert_eq!(
            files,
            vec![
                root.join("10-24-Austin-flights.json"),
                root.join("10-24-Tampa-flights.json"),
            ]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_record_file_is_discovered() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("flights");
        let shared = temp_dir.path().join("shared");
        std::fs::create_dir(&root).unwrap();
        std::fs::create_dir(&shared).unwrap();

        std::fs::write(shared.join("10-24-Reno-flights.json"), "[]").unwrap();
        std::os::unix::fs::symlink(
            shared.join("10-24-Reno-flights.json"),
            root.join("10-24-Reno-flights.json"),
        )
        .unwrap();
        std::os::unix::fs::symlink(&shared, root.join("linked-dir.json")).unwrap();
        std::fs::write(root.join("10-24-Boise-flights.json"), "[]").unwrap();

        let files = discover_files(&root, "json").unwrap();

        assert_eq!(
            files,
            vec![
                root.join("10-24-Boise-flights.json"),
                root.join("10-24-Reno-flights.json"),
            ]
        );
    }

    #[test]
    fn test_empty_directory() {
        let temp_dir = TempDir::new().unwrap();
        assert!(discover_files(temp_dir.path(), "json").unwrap().is_empty());
    }

    #[test]
    fn test_missing_directory_is_io_error() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("does-not-exist");

        match discover_files(&missing, "json") {
            Err(FlightError::Io { path, .. }) => assert_eq!(path, missing),
            other => panic!("expected Io error, got {:?}", other),
        }
    }
}
