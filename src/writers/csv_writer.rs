use csv::{ReaderBuilder, WriterBuilder};
use std::path::Path;

use crate::error::Result;
use crate::models::CombinedRecord;
use crate::utils::constants::COMBINED_COLUMNS;

/// Writes and reads combined datasets as CSV in the shared schema.
pub struct CsvWriter {
    delimiter: u8,
}

impl CsvWriter {
    pub fn new() -> Self {
        Self { delimiter: b',' }
    }

    /// Write combined records with the fixed header row. An empty record
    /// set still produces the header, so the output always has exactly
    /// one header row plus one line per data row.
    pub fn write_records(&self, records: &[CombinedRecord], path: &Path) -> Result<()> {
        let mut writer = WriterBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(false)
            .from_path(path)?;

        writer.write_record(COMBINED_COLUMNS)?;
        for record in records {
            writer.serialize(record)?;
        }
        writer.flush()?;

        Ok(())
    }

    /// Read a combined CSV back into records
    pub fn read_records(&self, path: &Path) -> Result<Vec<CombinedRecord>> {
        let mut reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(true)
            .from_path(path)?;

        let mut records = Vec::new();
        for result in reader.deserialize() {
            let record: CombinedRecord = result?;
            records.push(record);
        }

        Ok(records)
    }

    /// Read at most `limit` records from the start of a combined CSV
    pub fn read_sample_records(&self, path: &Path, limit: usize) -> Result<Vec<CombinedRecord>> {
        let mut reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(true)
            .from_path(path)?;

        let mut records = Vec::with_capacity(limit);
        for result in reader.deserialize().take(limit) {
            let record: CombinedRecord = result?;
            records.push(record);
        }

        Ok(records)
    }

    /// File-level information about a combined CSV
    pub fn get_file_info(&self, path: &Path) -> Result<CsvFileInfo> {
        let metadata = std::fs::metadata(path)?;

        let mut reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(true)
            .from_path(path)?;

        let columns: Vec<String> = reader.headers()?.iter().map(String::from).collect();
        let total_rows = reader.records().filter(|r| r.is_ok()).count() as u64;

        Ok(CsvFileInfo {
            path: path.display().to_string(),
            total_rows,
            columns,
            file_size_bytes: metadata.len(),
        })
    }
}

impl Default for CsvWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone)]
pub struct CsvFileInfo {
    pub path: String,
    pub total_rows: u64,
    pub columns: Vec<String>,
    pub file_size_bytes: u64,
}

impl CsvFileInfo {
    pub fn summary(&self) -> String {
        format!(
            "File: {}\nRows: {}\nColumns: {} ({})\nSize: {:.1} KB",
            self.path,
            self.total_rows,
            self.columns.len(),
            self.columns.join(", "),
            self.file_size_bytes as f64 / 1024.0
        )
    }
}
