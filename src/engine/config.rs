//! Configuration file reader.
//!
//! The configuration is a key/value text file: one `key=value` pair per
//! line, `#` starts a comment line, unknown keys are ignored. Recognized
//! keys are `DATA_FILE` (path to the heap file, required), `PAGE_SIZE`
//! (bytes per page), and `BUFPOOL_SIZE` (buffer pool frame count).
//!
//! [`Config`] is a read-only snapshot. It is built once at startup and
//! passed by reference to every component constructor; nothing in the
//! engine consults process-wide state.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::engine::constants::{DEFAULT_BUFPOOL_SIZE, DEFAULT_PAGE_SIZE, PAGE_HEADER_SIZE};
use crate::RowdbError;

/// Immutable engine configuration.
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// Path to the heap data file.
    pub data_file: PathBuf,
    /// Size of every page in the data file, in bytes.
    pub page_size: usize,
    /// Number of page frames in the buffer pool.
    pub bufpool_size: usize,
}

impl Config {
    /// Build a configuration directly, bypassing the file reader.
    pub fn new<P: Into<PathBuf>>(data_file: P, page_size: usize, bufpool_size: usize) -> Self {
        Config {
            data_file: data_file.into(),
            page_size,
            bufpool_size,
        }
    }

    /// Read a configuration file.
    ///
    /// Missing `PAGE_SIZE` or `BUFPOOL_SIZE` keys fall back to defaults;
    /// a missing file or a missing `DATA_FILE` key is an error, as is an
    /// unparseable integer value.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, RowdbError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| RowdbError::Config(format!("cannot read {}: {}", path.display(), e)))?;

        let mut data_file: Option<PathBuf> = None;
        let mut page_size = DEFAULT_PAGE_SIZE;
        let mut bufpool_size = DEFAULT_BUFPOOL_SIZE;

        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let (key, value) = (key.trim(), value.trim());

            match key {
                "DATA_FILE" => data_file = Some(PathBuf::from(value)),
                "PAGE_SIZE" => page_size = parse_int(key, value)?,
                "BUFPOOL_SIZE" => bufpool_size = parse_int(key, value)?,
                _ => debug!(key, "ignoring unrecognized config key"),
            }
        }

        let data_file = data_file
            .ok_or_else(|| RowdbError::Config("DATA_FILE is not set".to_string()))?;

        let config = Config {
            data_file,
            page_size,
            bufpool_size,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), RowdbError> {
        if self.page_size <= PAGE_HEADER_SIZE || self.page_size > u16::MAX as usize {
            return Err(RowdbError::Config(format!(
                "PAGE_SIZE {} out of range ({}..={})",
                self.page_size,
                PAGE_HEADER_SIZE + 1,
                u16::MAX
            )));
        }
        if self.bufpool_size == 0 {
            return Err(RowdbError::Config("BUFPOOL_SIZE must be at least 1".to_string()));
        }
        Ok(())
    }
}

fn parse_int(key: &str, value: &str) -> Result<usize, RowdbError> {
    value
        .parse::<usize>()
        .map_err(|_| RowdbError::Config(format!("{} is not an integer: {:?}", key, value)))
}
