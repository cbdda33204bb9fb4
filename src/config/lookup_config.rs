use std::path::Path;

use log::error;
use serde::{Deserialize, Serialize};

use crate::common::file_operations::{atomic_save_json, read_json, FileOperationError};
use crate::PostingError;

pub const LOOKUP_CONFIG_FILE: &str = "lookup_config.json";

/// Which chain serves a high-frequency term.
#[derive(Serialize, Deserialize, Debug, Eq, PartialEq, Default, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum HighFrequencyPolicy {
    /// Bitmap chain only when the lookup asks for bitmap postings.
    #[default]
    #[serde(rename = "both")]
    Both,

    /// Always the bitmap chain.
    #[serde(rename = "bitmap_only")]
    BitmapOnly,
}

#[derive(Serialize, Deserialize, Debug, Eq, PartialEq, Clone, Copy)]
pub struct LookupConfig {
    #[serde(default)]
    pub high_frequency_policy: HighFrequencyPolicy,

    /// Consult a term's truncate chain when it names one.
    #[serde(default = "default_enable_truncate")]
    pub enable_truncate: bool,

    /// Below this many segments the fetches run on the caller's thread.
    #[serde(default = "default_min_parallel_segments")]
    pub min_parallel_segments: usize,

    /// Size of the shared fetch pool, `0` or `1` fetches on the caller's thread.
    #[serde(default)]
    pub fetch_threads: usize,
}

fn default_enable_truncate() -> bool {
    true
}

fn default_min_parallel_segments() -> usize {
    2
}

impl Default for LookupConfig {
    fn default() -> Self {
        LookupConfig {
            high_frequency_policy: HighFrequencyPolicy::default(),
            enable_truncate: default_enable_truncate(),
            min_parallel_segments: default_min_parallel_segments(),
            fetch_threads: 0,
        }
    }
}

impl LookupConfig {
    pub fn is_parallel(&self) -> bool {
        self.fetch_threads > 1
    }

    pub fn validate(&self) -> crate::Result<()> {
        if self.min_parallel_segments == 0 {
            let error_msg = "[LookupConfig] `min_parallel_segments` should be at least 1";
            error!("{}", error_msg);
            return Err(PostingError::InvalidConfig(error_msg.to_string()));
        }
        if self.fetch_threads > 1024 {
            let error_msg = format!("[LookupConfig] `fetch_threads` {} is out of range", self.fetch_threads);
            error!("{}", error_msg);
            return Err(PostingError::InvalidConfig(error_msg));
        }
        Ok(())
    }

    pub fn load(directory: &Path) -> crate::Result<Self> {
        let config: LookupConfig = read_json(&directory.join(LOOKUP_CONFIG_FILE))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, directory: &Path) -> crate::Result<()> {
        self.validate()?;
        if !directory.exists() {
            std::fs::create_dir_all(directory).map_err(FileOperationError::IoError)?;
        }
        Ok(atomic_save_json(&directory.join(LOOKUP_CONFIG_FILE), self)?)
    }
}
