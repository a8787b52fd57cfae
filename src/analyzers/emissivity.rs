use serde::{Deserialize, Serialize};

use crate::error::{ProcessingError, Result};
use crate::models::CombinedRecord;
use crate::utils::constants::{SCALE_HEIGHT_M, STEFAN_BOLTZMANN};

/// Brutsaert (1975) clear-sky downwelling longwave (W/m^2).
///
/// `ta_k` air temperature in Kelvin, `ea_hpa` vapor pressure in hPa.
pub fn brutsaert_clear_sky(ta_k: f64, ea_hpa: f64) -> f64 {
    let epsilon_0 = 1.24 * (ea_hpa / ta_k).powf(1.0 / 7.0);
    epsilon_0 * STEFAN_BOLTZMANN * ta_k.powi(4)
}

/// Emissivity implied by a measured downwelling longwave flux
pub fn emissivity_from_longwave(dlw: f64, ta_k: f64) -> f64 {
    dlw / (STEFAN_BOLTZMANN * ta_k.powi(4))
}

/// Saturation vapor pressure over water (hPa), Magnus-type fit over
/// air temperature in Celsius
pub fn saturation_vapor_pressure_hpa(temp_c: f64) -> f64 {
    6.112 * (17.625 * temp_c / (temp_c - 30.11 + 273.15)).exp()
}

/// Empirical clear-sky emissivity with an altitude correction term
pub fn clear_sky_emissivity(temp_c: f64, rh_pct: f64, altitude_m: f64) -> f64 {
    let pw_hpa = saturation_vapor_pressure_hpa(temp_c) * rh_pct / 100.0;
    let sqrt_pw = (pw_hpa / 1013.25).sqrt();
    0.6 + 1.652 * sqrt_pw + 0.15 * ((-altitude_m / SCALE_HEIGHT_M).exp() - 1.0)
}

/// Sky emissivity under partial cloud cover: the empirical clear-sky
/// emissivity weighted against a fully emissive overcast sky
pub fn empirical_sky_emissivity(temp_c: f64, rh_pct: f64, altitude_m: f64, c: f64) -> f64 {
    (1.0 - c) * clear_sky_emissivity(temp_c, rh_pct, altitude_m) + c
}

/// Published cloudy-sky corrections to the clear-sky longwave flux
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CloudCorrection {
    MaykutChurch,
    Jacobs,
    SugitaBrutsaert,
    Konzelmann,
    CrawfordDuchon,
    Lhomme,
}

impl CloudCorrection {
    pub const ALL: &'static [CloudCorrection] = &[
        CloudCorrection::MaykutChurch,
        CloudCorrection::Jacobs,
        CloudCorrection::SugitaBrutsaert,
        CloudCorrection::Konzelmann,
        CloudCorrection::CrawfordDuchon,
        CloudCorrection::Lhomme,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            CloudCorrection::MaykutChurch => "maykut_church",
            CloudCorrection::Jacobs => "jacobs",
            CloudCorrection::SugitaBrutsaert => "sugita_brutsaert",
            CloudCorrection::Konzelmann => "konzelmann",
            CloudCorrection::CrawfordDuchon => "crawford_duchon",
            CloudCorrection::Lhomme => "lhomme",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "maykut_church" => Some(CloudCorrection::MaykutChurch),
            "jacobs" => Some(CloudCorrection::Jacobs),
            "sugita_brutsaert" => Some(CloudCorrection::SugitaBrutsaert),
            "konzelmann" => Some(CloudCorrection::Konzelmann),
            "crawford_duchon" => Some(CloudCorrection::CrawfordDuchon),
            "lhomme" => Some(CloudCorrection::Lhomme),
            _ => None,
        }
    }
}

impl std::fmt::Display for CloudCorrection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Downwelling longwave under cloud fraction `c`, from the Brutsaert
/// clear-sky flux corrected with the selected model
pub fn cloudy_longwave(correction: CloudCorrection, ta_k: f64, ea_hpa: f64, c: f64) -> f64 {
    let lw_clear = brutsaert_clear_sky(ta_k, ea_hpa);
    let blackbody = STEFAN_BOLTZMANN * ta_k.powi(4);

    match correction {
        CloudCorrection::MaykutChurch => lw_clear * (1.0 + 0.22 * c.powf(2.75)),
        CloudCorrection::Jacobs => lw_clear * (1.0 + 0.26 * c),
        CloudCorrection::SugitaBrutsaert => lw_clear * (1.0 + 0.0496 * c.powf(2.45)),
        CloudCorrection::Konzelmann => lw_clear * (1.0 - c.powi(4)) + 0.952 * c.powi(4) * blackbody,
        CloudCorrection::CrawfordDuchon => lw_clear * (1.0 - c) + c * blackbody,
        CloudCorrection::Lhomme => lw_clear * (1.03 + 0.34 * c),
    }
}

/// Candidate models for the measured sky emissivity: the Brutsaert
/// clear-sky flux under each cloudy correction, plus the empirical
/// humidity-based fit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EmissivityModel {
    Correction(CloudCorrection),
    EmpiricalSky,
}

impl EmissivityModel {
    pub const ALL: &'static [EmissivityModel] = &[
        EmissivityModel::Correction(CloudCorrection::MaykutChurch),
        EmissivityModel::Correction(CloudCorrection::Jacobs),
        EmissivityModel::Correction(CloudCorrection::SugitaBrutsaert),
        EmissivityModel::Correction(CloudCorrection::Konzelmann),
        EmissivityModel::Correction(CloudCorrection::CrawfordDuchon),
        EmissivityModel::Correction(CloudCorrection::Lhomme),
        EmissivityModel::EmpiricalSky,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            EmissivityModel::Correction(correction) => correction.name(),
            EmissivityModel::EmpiricalSky => "empirical_sky",
        }
    }
}

impl std::fmt::Display for EmissivityModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Error metrics of one emissivity model against measured emissivity
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ModelErrorStats {
    pub mbe: f64,
    pub rmse: f64,
    pub rmbe_pct: f64,
    pub rrmse_pct: f64,
    pub samples: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModelValidation {
    pub model: EmissivityModel,
    pub stats: ModelErrorStats,
}

/// Validates the cloudy-sky correction models against a combined dataset
pub struct EmissivityAnalyzer;

impl EmissivityAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Compute MBE / RMSE (absolute and relative) of every model over
    /// the records that carry all emissivity inputs. The empirical sky
    /// model additionally needs humidity, so its sample count can be
    /// smaller; a model with no usable samples is omitted.
    pub fn validate_models(&self, records: &[CombinedRecord]) -> Result<Vec<ModelValidation>> {
        let usable: Vec<&CombinedRecord> = records
            .iter()
            .filter(|r| r.has_emissivity_inputs())
            .collect();

        if usable.is_empty() {
            return Err(ProcessingError::MissingData(
                "No records with temperature, vapor pressure, cloud fraction and emissivity"
                    .to_string(),
            ));
        }

        let mut validations = Vec::with_capacity(EmissivityModel::ALL.len());
        for &model in EmissivityModel::ALL {
            let mut error_sum = 0.0;
            let mut error_sq_sum = 0.0;
            let mut measured_sum = 0.0;
            let mut samples = 0usize;

            for record in &usable {
                // Guarded by has_emissivity_inputs above
                let ta = record.air_temp_k.unwrap_or_default();
                let cf = record.cloud_fraction.unwrap_or_default();
                let measured = record.emissivity.unwrap_or_default();

                let predicted = match model {
                    EmissivityModel::Correction(correction) => {
                        let ea = record.vapor_pressure_hpa.unwrap_or_default();
                        let predicted_lw = cloudy_longwave(correction, ta, ea, cf);
                        emissivity_from_longwave(predicted_lw, ta)
                    }
                    EmissivityModel::EmpiricalSky => {
                        let Some(rh) = record.relative_humidity else {
                            continue;
                        };
                        empirical_sky_emissivity(ta - 273.15, rh, record.elevation_m, cf)
                    }
                };

                let error = predicted - measured;
                error_sum += error;
                error_sq_sum += error * error;
                measured_sum += measured;
                samples += 1;
            }

            if samples == 0 {
                continue;
            }

            let n = samples as f64;
            let mbe = error_sum / n;
            let rmse = (error_sq_sum / n).sqrt();
            let measured_mean = measured_sum / n;

            validations.push(ModelValidation {
                model,
                stats: ModelErrorStats {
                    mbe,
                    rmse,
                    rmbe_pct: mbe / measured_mean * 100.0,
                    rrmse_pct: rmse / measured_mean * 100.0,
                    samples,
                },
            });
        }

        Ok(validations)
    }

    /// Model with the lowest RMSE
    pub fn best_model<'a>(&self, validations: &'a [ModelValidation]) -> Option<&'a ModelValidation> {
        validations
            .iter()
            .min_by(|a, b| a.stats.rmse.total_cmp(&b.stats.rmse))
    }
}

impl Default for EmissivityAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record_with_emissivity(cf: f64, emissivity: f64) -> CombinedRecord {
        CombinedRecord {
            station_id: "BON".to_string(),
            timestamp: NaiveDate::from_ymd_opt(2022, 7, 1)
                .unwrap()
                .and_hms_opt(17, 0, 0)
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
            cloud_fraction: Some(cf),
            emissivity: Some(emissivity),
        }
    }

    #[test]
    fn test_brutsaert_clear_sky() {
        // epsilon_0 = 1.24 * (20/300)^(1/7) ~ 0.8406
        let lw = brutsaert_clear_sky(300.0, 20.0);
        let expected = 1.24 * (20.0f64 / 300.0).powf(1.0 / 7.0) * STEFAN_BOLTZMANN * 300.0f64.powi(4);
        assert!((lw - expected).abs() < 1e-9);
        assert!(lw > 300.0 && lw < 450.0);
    }

    #[test]
    fn test_crawford_duchon_limits() {
        let ta = 295.0;
        let ea = 18.0;

        // No clouds: identical to the clear-sky flux
        let clear = cloudy_longwave(CloudCorrection::CrawfordDuchon, ta, ea, 0.0);
        assert!((clear - brutsaert_clear_sky(ta, ea)).abs() < 1e-9);

        // Full overcast: blackbody emission
        let overcast = cloudy_longwave(CloudCorrection::CrawfordDuchon, ta, ea, 1.0);
        assert!((overcast - STEFAN_BOLTZMANN * ta.powi(4)).abs() < 1e-9);
    }

    #[test]
    fn test_cloudy_corrections_increase_with_clouds() {
        let ta = 290.0;
        let ea = 15.0;
        for &correction in CloudCorrection::ALL {
            let low = cloudy_longwave(correction, ta, ea, 0.1);
            let high = cloudy_longwave(correction, ta, ea, 0.9);
            assert!(high > low, "{} not increasing with cloud fraction", correction);
        }
    }

    #[test]
    fn test_emissivity_from_longwave() {
        let ta: f64 = 300.0;
        let blackbody = STEFAN_BOLTZMANN * ta.powi(4);
        assert!((emissivity_from_longwave(blackbody, ta) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_clear_sky_emissivity_altitude_term() {
        let at_sea_level = clear_sky_emissivity(25.0, 60.0, 0.0);
        let at_altitude = clear_sky_emissivity(25.0, 60.0, 3000.0);
        assert!(at_sea_level > at_altitude);
        assert!(at_sea_level > 0.6 && at_sea_level < 1.1);
    }

    #[test]
    fn test_correction_names_round_trip() {
        for &correction in CloudCorrection::ALL {
            assert_eq!(CloudCorrection::from_name(correction.name()), Some(correction));
        }
        assert_eq!(CloudCorrection::from_name("unknown"), None);
    }

    #[test]
    fn test_validate_models_picks_generating_model() {
        // Synthesize measurements from the Crawford-Duchon prediction; it
        // must come back as the best model with ~zero RMSE.
        let analyzer = EmissivityAnalyzer::new();
        let records: Vec<CombinedRecord> = [0.1, 0.3, 0.5, 0.7, 0.9]
            .iter()
            .map(|&cf| {
                let lw = cloudy_longwave(CloudCorrection::CrawfordDuchon, 298.0, 20.0, cf);
                record_with_emissivity(cf, emissivity_from_longwave(lw, 298.0))
            })
            .collect();

        // No humidity on these rows, so the empirical sky model is absent
        let validations = analyzer.validate_models(&records).unwrap();
        assert_eq!(validations.len(), CloudCorrection::ALL.len());

        let best = analyzer.best_model(&validations).unwrap();
        assert_eq!(
            best.model,
            EmissivityModel::Correction(CloudCorrection::CrawfordDuchon)
        );
        assert!(best.stats.rmse < 1e-9);
        assert_eq!(best.stats.samples, 5);
    }

    #[test]
    fn test_empirical_sky_model_validated_with_humidity() {
        // Synthesize measurements from the empirical prediction; it must
        // come back as the best model over the humidity-carrying rows.
        let analyzer = EmissivityAnalyzer::new();
        let records: Vec<CombinedRecord> = [0.1, 0.4, 0.8]
            .iter()
            .map(|&cf| {
                let measured = empirical_sky_emissivity(298.0 - 273.15, 65.0, 230.0, cf);
                let mut record = record_with_emissivity(cf, measured);
                record.relative_humidity = Some(65.0);
                record
            })
            .collect();

        let validations = analyzer.validate_models(&records).unwrap();
        assert_eq!(validations.len(), EmissivityModel::ALL.len());

        let best = analyzer.best_model(&validations).unwrap();
        assert_eq!(best.model, EmissivityModel::EmpiricalSky);
        assert!(best.stats.rmse < 1e-9);
        assert_eq!(best.stats.samples, 3);
    }

    #[test]
    fn test_empirical_sky_emissivity_limits() {
        // Full overcast is a blackbody sky regardless of humidity
        assert!((empirical_sky_emissivity(25.0, 60.0, 0.0, 1.0) - 1.0).abs() < 1e-9);

        // No clouds reduces to the clear-sky emissivity
        let clear = empirical_sky_emissivity(25.0, 60.0, 0.0, 0.0);
        assert!((clear - clear_sky_emissivity(25.0, 60.0, 0.0)).abs() < 1e-9);
    }

    #[test]
    fn test_validate_models_requires_inputs() {
        let analyzer = EmissivityAnalyzer::new();
        let mut record = record_with_emissivity(0.5, 0.9);
        record.vapor_pressure_hpa = None;

        let result = analyzer.validate_models(&[record]);
        assert!(result.is_err());
    }
}
