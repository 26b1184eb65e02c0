//! Storage configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding one subdirectory per student
    pub base_dir: PathBuf,
    /// Largest file a student may write
    pub max_file_bytes: usize,
}

impl StorageConfig {
    /// Create a new storage configuration.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            ..Self::default()
        }
    }

    /// Set the maximum file size.
    pub fn with_max_file_bytes(mut self, max: usize) -> Self {
        self.max_file_bytes = max;
        self
    }

    /// Create configuration from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(dir) = std::env::var("BOTNOLOGY_STORAGE_DIR") {
            config.base_dir = PathBuf::from(dir);
        }

        if let Ok(max) = std::env::var("BOTNOLOGY_MAX_FILE_BYTES") {
            if let Ok(n) = max.parse() {
                config.max_file_bytes = n;
            }
        }

        config
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("./data/student_files"),
            max_file_bytes: 1024 * 1024,
        }
    }
}
