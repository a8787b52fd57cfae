use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use crate::error::Result;
use crate::models::CombinedRecord;
use crate::utils::constants::{
    MAX_CLEARNESS, MAX_VALID_TEMP_K, MAX_ZENITH_DEG, MIN_VALID_TEMP_K,
};

#[derive(Debug, Clone, Serialize)]
pub struct IntegrityReport {
    pub total_records: usize,
    pub clean_records: usize,
    pub flagged_records: usize,
    pub violations: Vec<RadiationViolation>,
    pub station_statistics: BTreeMap<String, StationStatistics>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RadiationViolation {
    pub station_id: String,
    pub timestamp: NaiveDateTime,
    pub violation_type: ViolationType,
    pub details: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ViolationType {
    TemperatureOutOfRange,
    NonPositiveLongwave,
    ClearnessOutOfRange,
    CloudFractionOutOfRange,
    NonMonotonicTimestamp,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct StationStatistics {
    pub total_records: usize,
    pub flagged_records: usize,
    pub missing_value_records: usize,
    pub first_timestamp: Option<NaiveDateTime>,
    pub last_timestamp: Option<NaiveDateTime>,
}

/// Physical plausibility checks over combined records, derived from the
/// screening rules the measurement campaigns apply before analysis.
pub struct IntegrityChecker;

impl IntegrityChecker {
    pub fn new() -> Self {
        Self
    }

    pub fn check_integrity(&self, records: &[CombinedRecord]) -> Result<IntegrityReport> {
        let mut report = IntegrityReport {
            total_records: records.len(),
            clean_records: 0,
            flagged_records: 0,
            violations: Vec::new(),
            station_statistics: BTreeMap::new(),
        };

        // Records arrive in concatenation order, so consecutive rows of a
        // station reflect the source file order
        let mut previous_timestamp: HashMap<&str, NaiveDateTime> = HashMap::new();

        for record in records {
            let mut flagged = false;

            if let Some(temp) = record.air_temp_k {
                if !(MIN_VALID_TEMP_K..=MAX_VALID_TEMP_K).contains(&temp) {
                    flagged = true;
                    report.violations.push(RadiationViolation {
                        station_id: record.station_id.clone(),
                        timestamp: record.timestamp,
                        violation_type: ViolationType::TemperatureOutOfRange,
                        details: format!(
                            "air temperature {:.2} K outside [{}, {}]",
                            temp, MIN_VALID_TEMP_K, MAX_VALID_TEMP_K
                        ),
                    });
                }
            }

            if let Some(dlw) = record.dlw {
                if dlw <= 0.0 {
                    flagged = true;
                    report.violations.push(RadiationViolation {
                        station_id: record.station_id.clone(),
                        timestamp: record.timestamp,
                        violation_type: ViolationType::NonPositiveLongwave,
                        details: format!("downwelling longwave {:.2} W/m2 is not positive", dlw),
                    });
                }
            }

            if let Some(clearness) = record.clearness_ratio() {
                if clearness <= 0.0 || clearness > MAX_CLEARNESS {
                    flagged = true;
                    report.violations.push(RadiationViolation {
                        station_id: record.station_id.clone(),
                        timestamp: record.timestamp,
                        violation_type: ViolationType::ClearnessOutOfRange,
                        details: format!(
                            "clearness ratio {:.3} outside (0, {}]",
                            clearness, MAX_CLEARNESS
                        ),
                    });
                }
            }

            if let Some(cf) = record.cloud_fraction {
                if !(0.0..=1.0).contains(&cf) {
                    flagged = true;
                    report.violations.push(RadiationViolation {
                        station_id: record.station_id.clone(),
                        timestamp: record.timestamp,
                        violation_type: ViolationType::CloudFractionOutOfRange,
                        details: format!("cloud fraction {:.3} outside [0, 1]", cf),
                    });
                }
            }

            if let Some(&previous) = previous_timestamp.get(record.station_id.as_str()) {
                if record.timestamp < previous {
                    flagged = true;
                    report.violations.push(RadiationViolation {
                        station_id: record.station_id.clone(),
                        timestamp: record.timestamp,
                        violation_type: ViolationType::NonMonotonicTimestamp,
                        details: format!("timestamp goes backwards from {}", previous),
                    });
                }
            }

            let stats = report
                .station_statistics
                .entry(record.station_id.clone())
                .or_default();
            stats.total_records += 1;
            if flagged {
                stats.flagged_records += 1;
                report.flagged_records += 1;
            } else {
                report.clean_records += 1;
            }
            if record.has_missing_data() {
                stats.missing_value_records += 1;
            }
            if stats.first_timestamp.is_none() {
                stats.first_timestamp = Some(record.timestamp);
            }
            stats.last_timestamp = Some(record.timestamp);

            previous_timestamp.insert(record.station_id.as_str(), record.timestamp);
        }

        Ok(report)
    }

    /// The screening filter applied before emissivity model validation:
    /// a row is dropped when any present measurement violates its rule.
    pub fn apply_quality_filter(&self, records: &[CombinedRecord]) -> Vec<CombinedRecord> {
        records
            .iter()
            .filter(|r| {
                if let Some(zenith) = r.solar_zenith_deg {
                    if zenith >= MAX_ZENITH_DEG {
                        return false;
                    }
                }
                if let Some(ghi) = r.ghi {
                    if ghi <= 0.0 {
                        return false;
                    }
                }
                if let Some(dhi) = r.dhi {
                    if dhi <= 0.0 {
                        return false;
                    }
                }
                if let Some(clearness) = r.clearness_ratio() {
                    if clearness <= 0.0 || clearness > MAX_CLEARNESS {
                        return false;
                    }
                }
                if let Some(temp) = r.air_temp_k {
                    if !(MIN_VALID_TEMP_K..=MAX_VALID_TEMP_K).contains(&temp) {
                        return false;
                    }
                }
                if let Some(dlw) = r.dlw {
                    if dlw <= 0.0 {
                        return false;
                    }
                }
                true
            })
            .cloned()
            .collect()
    }

    pub fn generate_summary(&self, report: &IntegrityReport) -> String {
        let mut summary = format!(
            "Integrity Report\n\
             ================\n\
             Total records:   {}\n\
             Clean records:   {}\n\
             Flagged records: {}\n",
            report.total_records, report.clean_records, report.flagged_records
        );

        summary.push_str("\nPer-station:\n");
        for (station_id, stats) in &report.station_statistics {
            summary.push_str(&format!(
                "  {}: {} records, {} flagged, {} with missing values\n",
                station_id, stats.total_records, stats.flagged_records, stats.missing_value_records
            ));
        }

        if !report.violations.is_empty() {
            summary.push_str(&format!("\nViolations ({} total, first 10):\n", report.violations.len()));
            for violation in report.violations.iter().take(10) {
                summary.push_str(&format!(
                    "  {} {} {:?}: {}\n",
                    violation.station_id,
                    violation.timestamp,
                    violation.violation_type,
                    violation.details
                ));
            }
        }

        summary
    }
}

impl Default for IntegrityChecker {
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
            ghi_clearsky: Some(900.0),
            dni: None,
            dni_clearsky: None,
            dhi: None,
            dlw: Some(390.0),
            air_temp_k: Some(298.0),
            vapor_pressure_hpa: Some(20.0),
            relative_humidity: None,
            solar_zenith_deg: Some(30.0),
            cloud_fraction: Some(0.2),
            emissivity: Some(0.85),
        }
    }

    #[test]
    fn test_clean_records() {
        let checker = IntegrityChecker::new();
        let records = vec![record("BON", 0), record("BON", 1)];

        let report = checker.check_integrity(&records).unwrap();
        assert_eq!(report.total_records, 2);
        assert_eq!(report.clean_records, 2);
        assert_eq!(report.flagged_records, 0);
        assert!(report.violations.is_empty());

        let stats = &report.station_statistics["BON"];
        assert_eq!(stats.total_records, 2);
        assert_eq!(
            stats.first_timestamp.unwrap().format("%M").to_string(),
            "00"
        );
        assert_eq!(stats.last_timestamp.unwrap().format("%M").to_string(), "01");
    }

    #[test]
    fn test_violations_detected() {
        let checker = IntegrityChecker::new();

        let mut bad_temp = record("BON", 0);
        bad_temp.air_temp_k = Some(400.0);

        let mut bad_dlw = record("BON", 1);
        bad_dlw.dlw = Some(-5.0);

        let mut bad_clearness = record("BON", 2);
        bad_clearness.dni = Some(1600.0);
        bad_clearness.dni_clearsky = Some(800.0);

        let report = checker
            .check_integrity(&[bad_temp, bad_dlw, bad_clearness])
            .unwrap();

        assert_eq!(report.flagged_records, 3);
        assert_eq!(report.violations.len(), 3);
        assert_eq!(
            report.violations[0].violation_type,
            ViolationType::TemperatureOutOfRange
        );
        assert_eq!(
            report.violations[1].violation_type,
            ViolationType::NonPositiveLongwave
        );
        assert_eq!(
            report.violations[2].violation_type,
            ViolationType::ClearnessOutOfRange
        );
    }

    #[test]
    fn test_non_monotonic_timestamp_flagged() {
        let checker = IntegrityChecker::new();
        let records = vec![record("BON", 5), record("BON", 2), record("DRA", 0)];

        let report = checker.check_integrity(&records).unwrap();
        assert_eq!(report.flagged_records, 1);
        assert_eq!(
            report.violations[0].violation_type,
            ViolationType::NonMonotonicTimestamp
        );
        // Other stations are unaffected
        assert_eq!(report.station_statistics["DRA"].flagged_records, 0);
    }

    #[test]
    fn test_quality_filter() {
        let checker = IntegrityChecker::new();

        let good = record("BON", 0);

        let mut night = record("BON", 1);
        night.solar_zenith_deg = Some(85.0);

        let mut negative_ghi = record("BON", 2);
        negative_ghi.ghi = Some(-2.0);

        // Missing fields do not disqualify a row by themselves
        let mut sparse = record("BON", 3);
        sparse.ghi = None;
        sparse.solar_zenith_deg = None;

        let filtered =
            checker.apply_quality_filter(&[good.clone(), night, negative_ghi, sparse.clone()]);
        assert_eq!(filtered, vec![good, sparse]);
    }

    #[test]
    fn test_summary_contains_counts() {
        let checker = IntegrityChecker::new();
        let report = checker.check_integrity(&[record("BON", 0)]).unwrap();
        let summary = checker.generate_summary(&report);

        assert!(summary.contains("Total records:   1"));
        assert!(summary.contains("BON: 1 records"));
    }

    #[test]
    fn test_report_serializes_to_json() {
        let checker = IntegrityChecker::new();
        let report = checker.check_integrity(&[record("BON", 0)]).unwrap();
        let json = serde_json::to_string_pretty(&report).unwrap();
        assert!(json.contains("\"total_records\": 1"));
    }
}
