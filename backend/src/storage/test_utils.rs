//! Test utilities for file-backed storage
//!
//! RAII environment that removes its data directory on drop, even when a test
//! panics.

use anyhow::Result;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use super::file::FileStorage;

pub struct TestEnvironment {
    /// Kept alive so the directory is not removed until drop
    _temp_dir: TempDir,
    pub storage: FileStorage,
    pub base_path: PathBuf,
}

impl TestEnvironment {
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let base_path = temp_dir.path().to_path_buf();
        let storage = FileStorage::open(&base_path)?;

        Ok(TestEnvironment {
            _temp_dir: temp_dir,
            storage,
            base_path,
        })
    }

    pub fn base_directory(&self) -> &Path {
        &self.base_path
    }
}

impl Drop for TestEnvironment {
    fn drop(&mut self) {
        if std::env::var("STUDIO_DEBUG_TESTS").is_ok() {
            println!("Cleaning up test environment: {:?}", self.base_path);
        }
    }
}
