use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::utils::constants::{MAX_VALID_TEMP_K, MIN_VALID_TEMP_K};

/// One row of the combined dataset in the shared schema.
///
/// Field order matches `utils::constants::COMBINED_COLUMNS` and is the
/// column order of the output CSV. Missing measurements serialize as
/// empty fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct CombinedRecord {
    pub station_id: String,

    #[serde(with = "timestamp_format")]
    pub timestamp: NaiveDateTime,

    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,

    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,

    pub elevation_m: f64,

    pub ghi: Option<f64>,
    pub ghi_clearsky: Option<f64>,
    pub dni: Option<f64>,
    pub dni_clearsky: Option<f64>,
    pub dhi: Option<f64>,
    pub dlw: Option<f64>,
    pub air_temp_k: Option<f64>,
    pub vapor_pressure_hpa: Option<f64>,

    #[validate(range(min = 0.0, max = 105.0))]
    pub relative_humidity: Option<f64>,

    #[validate(range(min = 0.0, max = 180.0))]
    pub solar_zenith_deg: Option<f64>,

    #[validate(range(min = 0.0, max = 1.0))]
    pub cloud_fraction: Option<f64>,

    pub emissivity: Option<f64>,
}

impl CombinedRecord {
    /// Ratio of measured to clear-sky direct irradiance
    pub fn clearness_ratio(&self) -> Option<f64> {
        match (self.dni, self.dni_clearsky) {
            (Some(dni), Some(dni_c)) if dni_c != 0.0 => Some(dni / dni_c),
            _ => None,
        }
    }

    /// Air temperature within the physically plausible range
    pub fn has_valid_temperature(&self) -> bool {
        self.air_temp_k
            .map(|t| (MIN_VALID_TEMP_K..=MAX_VALID_TEMP_K).contains(&t))
            .unwrap_or(false)
    }

    /// Whether the row carries everything the emissivity model validation
    /// needs: temperature, vapor pressure, cloud fraction and a measured
    /// emissivity to compare against.
    pub fn has_emissivity_inputs(&self) -> bool {
        self.air_temp_k.is_some()
            && self.vapor_pressure_hpa.is_some()
            && self.cloud_fraction.is_some()
            && self.emissivity.is_some()
    }

    /// Any measurement missing on this row
    pub fn has_missing_data(&self) -> bool {
        self.dlw.is_none() || self.air_temp_k.is_none() || self.ghi.is_none()
    }
}

/// Serde adapter for the `YYYY-MM-DD HH:MM:SS` timestamp column
pub mod timestamp_format {
    use chrono::NaiveDateTime;
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn serialize<S>(timestamp: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&timestamp.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&value, FORMAT).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::constants::COMBINED_COLUMNS;
    use chrono::NaiveDate;

    fn sample_record() -> CombinedRecord {
        CombinedRecord {
            station_id: "BON".to_string(),
            timestamp: NaiveDate::from_ymd_opt(2022, 7, 1)
                .unwrap()
                .and_hms_opt(17, 0, 0)
                .unwrap(),
            latitude: 40.05,
            longitude: -88.37,
            elevation_m: 230.0,
            ghi: Some(845.2),
            ghi_clearsky: Some(910.6),
            dni: None,
            dni_clearsky: None,
            dhi: None,
            dlw: Some(391.2),
            air_temp_k: Some(298.4),
            vapor_pressure_hpa: Some(21.3),
            relative_humidity: None,
            solar_zenith_deg: Some(31.2),
            cloud_fraction: Some(0.18),
            emissivity: Some(0.87),
        }
    }

    #[test]
    fn test_record_validation() {
        let record = sample_record();
        assert!(record.validate().is_ok());
        assert!(record.has_valid_temperature());
        assert!(record.has_emissivity_inputs());
        assert!(!record.has_missing_data());
    }

    #[test]
    fn test_invalid_cloud_fraction() {
        let mut record = sample_record();
        record.cloud_fraction = Some(1.3);
        assert!(record.validate().is_err());
    }

    #[test]
    fn test_clearness_ratio() {
        let mut record = sample_record();
        assert_eq!(record.clearness_ratio(), None);

        record.dni = Some(600.0);
        record.dni_clearsky = Some(800.0);
        assert!((record.clearness_ratio().unwrap() - 0.75).abs() < 1e-9);

        record.dni_clearsky = Some(0.0);
        assert_eq!(record.clearness_ratio(), None);
    }

    #[test]
    fn test_csv_round_trip_preserves_schema() {
        let record = sample_record();

        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.serialize(&record).unwrap();
        let bytes = writer.into_inner().unwrap();

        let mut reader = csv::Reader::from_reader(bytes.as_slice());
        let headers: Vec<String> = reader
            .headers()
            .unwrap()
            .iter()
            .map(String::from)
            .collect();
        assert_eq!(headers, COMBINED_COLUMNS);

        let parsed: CombinedRecord = reader.deserialize().next().unwrap().unwrap();
        assert_eq!(parsed, record);
    }
}
