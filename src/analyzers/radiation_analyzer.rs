use chrono::NaiveDateTime;
use std::collections::HashSet;
use std::path::Path;

use crate::error::{ProcessingError, Result};
use crate::models::CombinedRecord;

#[derive(Debug)]
pub struct RadiationStatistics {
    pub total_records: usize,
    pub unique_stations: usize,
    pub time_range: (NaiveDateTime, NaiveDateTime),
    pub flux_stats: FluxStats,
    pub data_quality: DataQuality,
    pub geographic_bounds: GeographicBounds,
}

#[derive(Debug)]
pub struct FluxStats {
    pub min_dlw: f64,
    pub max_dlw: f64,
    pub avg_dlw: f64,
    pub max_ghi: f64,
    pub avg_emissivity: f64,
}

#[derive(Debug)]
pub struct DataQuality {
    pub total_records: usize,
    pub with_longwave: usize,
    pub with_temperature: usize,
    pub with_cloud_fraction: usize,
    pub complete_records: usize,
}

impl DataQuality {
    pub fn longwave_percentage(&self) -> f64 {
        (self.with_longwave as f64 / self.total_records as f64) * 100.0
    }

    pub fn complete_percentage(&self) -> f64 {
        (self.complete_records as f64 / self.total_records as f64) * 100.0
    }
}

#[derive(Debug)]
pub struct GeographicBounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

pub struct RadiationAnalyzer;

impl RadiationAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Analyze a combined CSV file, reading at most `limit` records
    /// (0 = all records)
    pub fn analyze_csv_with_limit(&self, path: &Path, limit: usize) -> Result<RadiationStatistics> {
        let writer = crate::writers::CsvWriter::new();

        let records = if limit == 0 {
            writer.read_records(path)?
        } else {
            writer.read_sample_records(path, limit)?
        };

        self.calculate_statistics(&records)
    }

    pub fn calculate_statistics(&self, records: &[CombinedRecord]) -> Result<RadiationStatistics> {
        if records.is_empty() {
            return Err(ProcessingError::Config(
                "No records to analyze".to_string(),
            ));
        }

        let mut unique_stations = HashSet::new();
        let mut min_time = records[0].timestamp;
        let mut max_time = records[0].timestamp;

        let mut min_dlw = f64::INFINITY;
        let mut max_dlw = f64::NEG_INFINITY;
        let mut dlw_sum = 0.0;
        let mut dlw_count = 0usize;
        let mut max_ghi = f64::NEG_INFINITY;
        let mut emissivity_sum = 0.0;
        let mut emissivity_count = 0usize;

        let mut with_longwave = 0;
        let mut with_temperature = 0;
        let mut with_cloud_fraction = 0;
        let mut complete_records = 0;

        let mut min_lat = records[0].latitude;
        let mut max_lat = records[0].latitude;
        let mut min_lon = records[0].longitude;
        let mut max_lon = records[0].longitude;

        for record in records {
            unique_stations.insert(record.station_id.clone());

            min_time = min_time.min(record.timestamp);
            max_time = max_time.max(record.timestamp);

            if let Some(dlw) = record.dlw {
                with_longwave += 1;
                min_dlw = min_dlw.min(dlw);
                max_dlw = max_dlw.max(dlw);
                dlw_sum += dlw;
                dlw_count += 1;
            }
            if let Some(ghi) = record.ghi {
                max_ghi = max_ghi.max(ghi);
            }
            if let Some(eps) = record.emissivity {
                emissivity_sum += eps;
                emissivity_count += 1;
            }

            if record.air_temp_k.is_some() {
                with_temperature += 1;
            }
            if record.cloud_fraction.is_some() {
                with_cloud_fraction += 1;
            }
            if !record.has_missing_data() {
                complete_records += 1;
            }

            min_lat = min_lat.min(record.latitude);
            max_lat = max_lat.max(record.latitude);
            min_lon = min_lon.min(record.longitude);
            max_lon = max_lon.max(record.longitude);
        }

        Ok(RadiationStatistics {
            total_records: records.len(),
            unique_stations: unique_stations.len(),
            time_range: (min_time, max_time),
            flux_stats: FluxStats {
                min_dlw: if dlw_count > 0 { min_dlw } else { f64::NAN },
                max_dlw: if dlw_count > 0 { max_dlw } else { f64::NAN },
                avg_dlw: if dlw_count > 0 {
                    dlw_sum / dlw_count as f64
                } else {
                    f64::NAN
                },
                max_ghi: if max_ghi.is_finite() { max_ghi } else { f64::NAN },
                avg_emissivity: if emissivity_count > 0 {
                    emissivity_sum / emissivity_count as f64
                } else {
                    f64::NAN
                },
            },
            data_quality: DataQuality {
                total_records: records.len(),
                with_longwave,
                with_temperature,
                with_cloud_fraction,
                complete_records,
            },
            geographic_bounds: GeographicBounds {
                min_lat,
                max_lat,
                min_lon,
                max_lon,
            },
        })
    }
}

impl Default for RadiationAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl RadiationStatistics {
    pub fn detailed_summary(&self) -> String {
        format!(
            "Combined Dataset Statistics\n\
             ===========================\n\
             Records:          {}\n\
             Stations:         {}\n\
             Time range:       {} to {}\n\
             \n\
             Downwelling longwave: {:.1} - {:.1} W/m2 (mean {:.1})\n\
             Peak GHI:             {:.1} W/m2\n\
             Mean emissivity:      {:.3}\n\
             \n\
             Data quality:\n\
               with longwave:      {} ({:.1}%)\n\
               with temperature:   {}\n\
               with cloud fraction: {}\n\
               complete rows:      {} ({:.1}%)\n\
             \n\
             Geographic bounds: lat [{:.2}, {:.2}], lon [{:.2}, {:.2}]",
            self.total_records,
            self.unique_stations,
            self.time_range.0,
            self.time_range.1,
            self.flux_stats.min_dlw,
            self.flux_stats.max_dlw,
            self.flux_stats.avg_dlw,
            self.flux_stats.max_ghi,
            self.flux_stats.avg_emissivity,
            self.data_quality.with_longwave,
            self.data_quality.longwave_percentage(),
            self.data_quality.with_temperature,
            self.data_quality.with_cloud_fraction,
            self.data_quality.complete_records,
            self.data_quality.complete_percentage(),
            self.geographic_bounds.min_lat,
            self.geographic_bounds.max_lat,
            self.geographic_bounds.min_lon,
            self.geographic_bounds.max_lon,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(station: &str, hour: u32, dlw: Option<f64>) -> CombinedRecord {
        CombinedRecord {
            station_id: station.to_string(),
            timestamp: NaiveDate::from_ymd_opt(2022, 7, 1)
                .unwrap()
                .and_hms_opt(hour, 0, 0)
                .unwrap(),
            latitude: 40.05,
            longitude: -88.37,
            elevation_m: 230.0,
            ghi: Some(800.0),
            ghi_clearsky: Some(900.0),
            dni: None,
            dni_clearsky: None,
            dhi: None,
            dlw,
            air_temp_k: Some(298.0),
            vapor_pressure_hpa: Some(20.0),
            relative_humidity: None,
            solar_zenith_deg: None,
            cloud_fraction: Some(0.2),
            emissivity: Some(0.85),
        }
    }

    #[test]
    fn test_calculate_statistics() {
        let analyzer = RadiationAnalyzer::new();
        let records = vec![
            record("BON", 10, Some(380.0)),
            record("BON", 11, Some(400.0)),
            record("DRA", 12, None),
        ];

        let stats = analyzer.calculate_statistics(&records).unwrap();
        assert_eq!(stats.total_records, 3);
        assert_eq!(stats.unique_stations, 2);
        assert_eq!(stats.data_quality.with_longwave, 2);
        assert_eq!(stats.data_quality.complete_records, 2);
        assert!((stats.flux_stats.avg_dlw - 390.0).abs() < 1e-9);
        assert_eq!(stats.time_range.0.format("%H").to_string(), "10");
        assert_eq!(stats.time_range.1.format("%H").to_string(), "12");
    }

    #[test]
    fn test_empty_records_fail() {
        let analyzer = RadiationAnalyzer::new();
        assert!(analyzer.calculate_statistics(&[]).is_err());
    }
}
