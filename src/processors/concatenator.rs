use serde::Serialize;

use crate::models::CombinedRecord;

/// Row counts of one concatenated station table
#[derive(Debug, Clone, Serialize)]
pub struct StationRowCount {
    pub station_id: String,
    pub rows: usize,
}

/// Bookkeeping for the concatenation step; the combined row count must
/// equal the sum of the per-station counts.
#[derive(Debug, Clone, Serialize)]
pub struct ConcatenationSummary {
    pub stations: Vec<StationRowCount>,
    pub total_rows: usize,
}

impl ConcatenationSummary {
    pub fn station_count(&self) -> usize {
        self.stations.len()
    }
}

/// Appends reformatted station tables in sequence. Pure row
/// concatenation: no merge keys, no deduplication, no reordering.
pub struct Concatenator;

impl Concatenator {
    pub fn new() -> Self {
        Self
    }

    pub fn concatenate(
        &self,
        tables: Vec<(String, Vec<CombinedRecord>)>,
    ) -> (Vec<CombinedRecord>, ConcatenationSummary) {
        let total_rows = tables.iter().map(|(_, rows)| rows.len()).sum();

        let mut combined = Vec::with_capacity(total_rows);
        let mut stations = Vec::with_capacity(tables.len());

        for (station_id, rows) in tables {
            stations.push(StationRowCount {
                station_id,
                rows: rows.len(),
            });
            combined.extend(rows);
        }

        (
            combined,
            ConcatenationSummary {
                stations,
                total_rows,
            },
        )
    }
}

impl Default for Concatenator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(station: &str, minute: u32) -> CombinedRecord {
        CombinedRecord {
            station_id: station.to_string(),
            timestamp: NaiveDate::from_ymd_opt(2022, 7, 1)
                .unwrap()
                .and_hms_opt(17, minute, 0)
                .unwrap(),
            latitude: 40.05,
            longitude: -88.37,
            elevation_m: 230.0,
            ghi: Some(800.0),
            ghi_clearsky: None,
            dni: None,
            dni_clearsky: None,
            dhi: None,
            dlw: Some(390.0),
            air_temp_k: Some(298.0),
            vapor_pressure_hpa: None,
            relative_humidity: None,
            solar_zenith_deg: None,
            cloud_fraction: None,
            emissivity: None,
        }
    }

    #[test]
    fn test_row_count_is_sum_of_inputs() {
        let tables = vec![
            ("BON".to_string(), vec![record("BON", 0), record("BON", 1)]),
            ("DRA".to_string(), vec![record("DRA", 0)]),
            ("FPK".to_string(), vec![]),
        ];

        let (combined, summary) = Concatenator::new().concatenate(tables);

        assert_eq!(combined.len(), 3);
        assert_eq!(summary.total_rows, 3);
        assert_eq!(summary.station_count(), 3);
        assert_eq!(summary.stations[0].rows, 2);
        assert_eq!(summary.stations[2].rows, 0);
    }

    #[test]
    fn test_station_and_row_order_preserved() {
        let tables = vec![
            ("DRA".to_string(), vec![record("DRA", 5), record("DRA", 2)]),
            ("BON".to_string(), vec![record("BON", 0)]),
        ];

        let (combined, summary) = Concatenator::new().concatenate(tables);

        // Station enumeration order, not alphabetical; within-station
        // order untouched even when timestamps are not sorted
        assert_eq!(summary.stations[0].station_id, "DRA");
        assert_eq!(summary.stations[1].station_id, "BON");
        assert_eq!(combined[0].timestamp.format("%M").to_string(), "05");
        assert_eq!(combined[1].timestamp.format("%M").to_string(), "02");
        assert_eq!(combined[2].station_id, "BON");
    }
}
