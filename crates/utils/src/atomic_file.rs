//! Crash-safe replacement of cache value files
//!
//! Readers of a value file see either the previous document or the new one,
//! never a prefix of it. New bytes go to a hidden sibling first and are
//! renamed over the target once flushed to disk.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use uuid::Uuid;
use workbench_core::{Error, Result};

/// Hidden sibling of the destination; deleted on drop unless persisted
struct StagedFile {
    path: PathBuf,
    persisted: bool,
}

impl StagedFile {
    fn create_beside(destination: &Path) -> Result<(Self, File)> {
        let dir = destination.parent().ok_or_else(|| {
            Error::configuration(format!(
                "cannot write '{}': path has no parent directory",
                destination.display()
            ))
        })?;
        fs::create_dir_all(dir)
            .map_err(|e| Error::file_system(dir, "create parent directory", e))?;

        let path = dir.join(format!(".{}.tmp", Uuid::new_v4()));
        let file = File::options()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|e| Error::file_system(&path, "create staging file", e))?;
        Ok((
            Self {
                path,
                persisted: false,
            },
            file,
        ))
    }

    fn persist(mut self, destination: &Path) -> Result<()> {
        fs::rename(&self.path, destination)
            .map_err(|e| Error::file_system(destination, "replace with staged file", e))?;
        self.persisted = true;
        Ok(())
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        if !self.persisted {
            let _ = fs::remove_file(&self.path);
        }
    }
}

/// Replace `path` with `content` in one rename
pub fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    let (staged, mut file) = StagedFile::create_beside(path)?;
    file.write_all(content)
        .and_then(|()| file.sync_all())
        .map_err(|e| Error::file_system(&staged.path, "write staging file", e))?;
    drop(file);
    staged.persist(path)
}

pub fn write_atomic_string(path: &Path, content: &str) -> Result<()> {
    write_atomic(path, content.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn staging_leftovers(dir: &Path) -> usize {
        fs::read_dir(dir)
            .unwrap()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_name().to_string_lossy().ends_with(".tmp"))
            .count()
    }

    #[test]
    fn test_replaces_existing_value() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("entry.json");
        fs::write(&file_path, "old").unwrap();

        write_atomic_string(&file_path, "{\"path\":\"a.py\"}").unwrap();

        assert_eq!(fs::read_to_string(&file_path).unwrap(), "{\"path\":\"a.py\"}");
        assert_eq!(staging_leftovers(temp_dir.path()), 0);
    }

    #[test]
    fn test_creates_missing_directories() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("nested").join("entry.json");

        write_atomic_string(&file_path, "{}").unwrap();

        assert_eq!(fs::read_to_string(&file_path).unwrap(), "{}");
    }

    #[test]
    fn test_failed_replace_cleans_up_staging_file() {
        let temp_dir = TempDir::new().unwrap();
        let occupied = temp_dir.path().join("entry.json");
        fs::create_dir(&occupied).unwrap();
        fs::write(occupied.join("inner"), "x").unwrap();

        let result = write_atomic_string(&occupied, "{}");

        assert!(matches!(result, Err(Error::FileSystem { .. })));
        assert_eq!(staging_leftovers(temp_dir.path()), 0);
    }
}
