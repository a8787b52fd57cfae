use csv::StringRecord;

use crate::models::StationMetadata;
use crate::utils::constants::COMBINED_COLUMNS;

/// One station's file after loading: header metadata plus the raw tabular
/// body. Transient; discarded once reformatted.
#[derive(Debug, Clone)]
pub struct StationDataset {
    pub metadata: StationMetadata,
    pub headers: StringRecord,
    pub rows: Vec<StringRecord>,
}

impl StationDataset {
    pub fn new(metadata: StationMetadata, headers: StringRecord, rows: Vec<StringRecord>) -> Self {
        Self {
            metadata,
            headers,
            rows,
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.headers.iter().collect()
    }

    /// Body columns already match the shared schema exactly (names and order)
    pub fn is_combined_schema(&self) -> bool {
        self.headers.len() == COMBINED_COLUMNS.len()
            && self.headers.iter().zip(COMBINED_COLUMNS).all(|(a, b)| a == *b)
    }

    /// Index of a named column, if present
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }
}
