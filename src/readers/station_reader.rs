use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{ProcessingError, Result};
use crate::models::StationDataset;
use crate::readers::DatasetReader;
use crate::utils::constants::STATION_FILE_EXTENSION;

/// Enumerates the per-station input files of a directory and loads them.
///
/// Enumeration order is lexicographic by filename and defines the station
/// order of the combined output.
pub struct StationReader {
    reader: DatasetReader,
}

impl StationReader {
    pub fn new() -> Self {
        Self {
            reader: DatasetReader::new(),
        }
    }

    pub fn with_mmap(use_mmap: bool) -> Self {
        Self {
            reader: DatasetReader::with_mmap(use_mmap),
        }
    }

    /// List station CSV files in deterministic order
    pub fn discover(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.is_file()
                && path
                    .extension()
                    .and_then(|e| e.to_str())
                    .map(|e| e.eq_ignore_ascii_case(STATION_FILE_EXTENSION))
                    .unwrap_or(false)
            {
                files.push(path);
            }
        }

        files.sort();
        debug!(count = files.len(), "discovered station files");

        Ok(files)
    }

    /// Load every station file of a directory, in enumeration order
    pub fn read_all(&self, dir: &Path) -> Result<Vec<StationDataset>> {
        let files = self.discover(dir)?;

        if files.is_empty() {
            return Err(ProcessingError::MissingData(format!(
                "No station CSV files found in {}",
                dir.display()
            )));
        }

        let mut datasets = Vec::with_capacity(files.len());
        for path in &files {
            let dataset = self.reader.read_dataset(path)?;
            debug!(
                station = %dataset.metadata.station_id,
                rows = dataset.row_count(),
                "loaded station file"
            );
            datasets.push(dataset);
        }

        Ok(datasets)
    }
}

impl Default for StationReader {
    fn default() -> Self {
        Self::new()
    }
}
