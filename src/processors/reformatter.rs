use chrono::NaiveDateTime;
use csv::StringRecord;
use validator::Validate;

use crate::analyzers::emissivity::{emissivity_from_longwave, saturation_vapor_pressure_hpa};
use crate::error::{ProcessingError, Result};
use crate::models::{ColumnMap, CombinedRecord, StationDataset, StationLayout};
use crate::utils::constants::{CF_A1, CF_A2, CF_M1, CF_M2, CF_N1, MISSING_SENTINEL};

/// Maps a station dataset onto the shared schema using the static
/// per-layout column correspondence.
///
/// Files already in the shared schema pass through unchanged; their
/// derived columns are parsed, never recomputed.
pub struct Reformatter {
    derive_fields: bool,
}

impl Reformatter {
    pub fn new() -> Self {
        Self {
            derive_fields: true,
        }
    }

    pub fn with_derived_fields(mut self, derive_fields: bool) -> Self {
        self.derive_fields = derive_fields;
        self
    }

    /// Reshape one station dataset into combined records
    pub fn reformat(&self, dataset: &StationDataset) -> Result<Vec<CombinedRecord>> {
        let layout = self.resolve_layout(dataset)?;

        match layout {
            StationLayout::Combined => self.parse_combined(dataset),
            layout => {
                let map = layout.column_map().ok_or_else(|| {
                    ProcessingError::Config(format!("Layout {} has no column map", layout))
                })?;
                self.apply_column_map(dataset, layout, map)
            }
        }
    }

    /// Layout selection: explicit `network` header key first, then the
    /// shared-schema check, then the hand-specified station table.
    fn resolve_layout(&self, dataset: &StationDataset) -> Result<StationLayout> {
        if let Some(network) = &dataset.metadata.network {
            return StationLayout::from_network(network).ok_or_else(|| {
                ProcessingError::Config(format!(
                    "Unknown network '{}' for station {}",
                    network, dataset.metadata.station_id
                ))
            });
        }

        if dataset.is_combined_schema() {
            return Ok(StationLayout::Combined);
        }

        StationLayout::from_station_id(&dataset.metadata.station_id).ok_or_else(|| {
            ProcessingError::UnknownLayout {
                station_id: dataset.metadata.station_id.clone(),
            }
        })
    }

    /// Strict no-op for files already in the shared schema
    fn parse_combined(&self, dataset: &StationDataset) -> Result<Vec<CombinedRecord>> {
        if !dataset.is_combined_schema() {
            return Err(ProcessingError::SchemaMismatch(format!(
                "Station {} declares the combined layout but its columns are [{}]",
                dataset.metadata.station_id,
                dataset.column_names().join(", ")
            )));
        }

        let mut records = Vec::with_capacity(dataset.row_count());
        for row in &dataset.rows {
            let record: CombinedRecord = row.deserialize(Some(&dataset.headers))?;
            record.validate()?;
            records.push(record);
        }

        Ok(records)
    }

    fn apply_column_map(
        &self,
        dataset: &StationDataset,
        layout: StationLayout,
        map: &ColumnMap,
    ) -> Result<Vec<CombinedRecord>> {
        let station_id = &dataset.metadata.station_id;

        let (latitude, longitude, elevation_m) =
            dataset.metadata.location().ok_or_else(|| {
                ProcessingError::MissingData(format!(
                    "Station {}: header must provide latitude, longitude and elevation_m",
                    station_id
                ))
            })?;

        let cols = ResolvedColumns::resolve(dataset, map)?;

        let mut records = Vec::with_capacity(dataset.row_count());
        for row in &dataset.rows {
            let timestamp = parse_timestamp(
                row.get(cols.timestamp).unwrap_or_default(),
                map.timestamp_formats,
            )?;

            let ghi = parse_optional(row, cols.ghi)?;
            let ghi_clearsky = parse_optional(row, cols.ghi_clearsky)?;
            let dni = parse_optional(row, cols.dni)?;
            let dni_clearsky = parse_optional(row, cols.dni_clearsky)?;
            let dhi = parse_optional(row, cols.dhi)?;
            let dlw = parse_optional(row, cols.dlw)?;
            let relative_humidity = parse_optional(row, cols.relative_humidity)?;
            let solar_zenith_deg = parse_optional(row, cols.solar_zenith)?;
            let clear_sky_fraction = parse_optional(row, cols.clear_sky_fraction)?;

            let air_temp_k =
                parse_optional(row, Some(cols.air_temp))?.map(|t| map.air_temp_unit.to_kelvin(t));

            // Layouts without a vapor pressure column derive it from
            // temperature and humidity, which the emissivity models need
            let vapor_pressure_hpa = match parse_optional(row, cols.vapor_pressure)? {
                Some(value) => Some(value),
                None => match (air_temp_k, relative_humidity) {
                    (Some(temp_k), Some(rh)) => {
                        Some(saturation_vapor_pressure_hpa(temp_k - 273.15) * rh / 100.0)
                    }
                    _ => None,
                },
            };

            let mut record = CombinedRecord {
                station_id: station_id.clone(),
                timestamp,
                latitude,
                longitude,
                elevation_m,
                ghi,
                ghi_clearsky,
                dni,
                dni_clearsky,
                dhi,
                dlw,
                air_temp_k,
                vapor_pressure_hpa,
                relative_humidity,
                solar_zenith_deg,
                cloud_fraction: None,
                emissivity: None,
            };

            if self.derive_fields {
                record.cloud_fraction = derive_cloud_fraction(&record, layout, clear_sky_fraction);
                record.emissivity = match (record.dlw, record.air_temp_k) {
                    (Some(dlw), Some(ta)) => Some(emissivity_from_longwave(dlw, ta)),
                    _ => None,
                };
            }

            record.validate()?;
            records.push(record);
        }

        Ok(records)
    }
}

impl Default for Reformatter {
    fn default() -> Self {
        Self::new()
    }
}

/// Column indices of one file, resolved once per dataset
struct ResolvedColumns {
    timestamp: usize,
    ghi: Option<usize>,
    ghi_clearsky: Option<usize>,
    dni: Option<usize>,
    dni_clearsky: Option<usize>,
    dhi: Option<usize>,
    dlw: Option<usize>,
    air_temp: usize,
    vapor_pressure: Option<usize>,
    relative_humidity: Option<usize>,
    solar_zenith: Option<usize>,
    clear_sky_fraction: Option<usize>,
}

impl ResolvedColumns {
    fn resolve(dataset: &StationDataset, map: &ColumnMap) -> Result<Self> {
        let required = |name: &str| -> Result<usize> {
            dataset.column_index(name).ok_or_else(|| {
                ProcessingError::SchemaMismatch(format!(
                    "Station {}: expected column '{}' not found (columns: [{}])",
                    dataset.metadata.station_id,
                    name,
                    dataset.column_names().join(", ")
                ))
            })
        };
        // Measurement columns a file may legitimately omit resolve to
        // missing values; only timestamp and temperature are structural
        let optional = |name: Option<&str>| name.and_then(|n| dataset.column_index(n));

        Ok(Self {
            timestamp: required(map.timestamp)?,
            ghi: optional(map.ghi),
            ghi_clearsky: optional(map.ghi_clearsky),
            dni: optional(map.dni),
            dni_clearsky: optional(map.dni_clearsky),
            dhi: optional(map.dhi),
            dlw: optional(map.dlw),
            air_temp: required(map.air_temp)?,
            vapor_pressure: optional(map.vapor_pressure),
            relative_humidity: optional(map.relative_humidity),
            solar_zenith: optional(map.solar_zenith),
            clear_sky_fraction: optional(map.clear_sky_fraction),
        })
    }
}

fn parse_timestamp(value: &str, formats: &[&str]) -> Result<NaiveDateTime> {
    let mut last_err = None;
    for format in formats {
        match NaiveDateTime::parse_from_str(value, format) {
            Ok(timestamp) => return Ok(timestamp),
            Err(e) => last_err = Some(e),
        }
    }

    match last_err {
        Some(e) => Err(e.into()),
        None => Err(ProcessingError::InvalidFormat(format!(
            "Invalid timestamp: '{}'",
            value
        ))),
    }
}

/// Parse one cell as an optional measurement. Empty fields and the
/// logger sentinel map to missing.
fn parse_optional(row: &StringRecord, index: Option<usize>) -> Result<Option<f64>> {
    let Some(index) = index else {
        return Ok(None);
    };

    let raw = row.get(index).unwrap_or_default().trim();
    if raw.is_empty() || raw == MISSING_SENTINEL || raw.eq_ignore_ascii_case("nan") {
        return Ok(None);
    }

    raw.parse::<f64>().map(Some).map_err(|_| {
        ProcessingError::InvalidFormat(format!("Invalid numeric value: '{}'", raw))
    })
}

/// Cloud fraction per layout.
///
/// SURFRAD: the reported clear-sky fraction when available, else the
/// GHI deficit against the clear-sky curve. Ground stations: the fitted
/// formula over the diffuse ratio k_d and clearness k_t.
fn derive_cloud_fraction(
    record: &CombinedRecord,
    layout: StationLayout,
    clear_sky_fraction: Option<f64>,
) -> Option<f64> {
    match layout {
        StationLayout::Surfrad => {
            if let Some(clr) = clear_sky_fraction {
                return Some((1.0 - clr).clamp(0.0, 1.0));
            }
            match (record.ghi, record.ghi_clearsky) {
                (Some(ghi), Some(ghi_c)) if ghi_c > 0.0 => {
                    Some((1.0 - ghi / ghi_c).clamp(0.0, 1.0))
                }
                _ => None,
            }
        }
        StationLayout::HawaiiGround => match (record.ghi, record.dhi, record.dni, record.dni_clearsky)
        {
            (Some(ghi), Some(dhi), Some(dni), Some(dni_c)) if ghi > 0.0 && dni > 0.0 && dni_c > 0.0 =>
            {
                let k_d = dhi / ghi;
                let k_t = dni / dni_c;
                let cf = CF_A1 * k_d.powf(CF_A2) + CF_M1 * k_t.powf(CF_M2) + CF_N1;
                Some(cf.clamp(0.0, 1.0))
            }
            _ => None,
        },
        StationLayout::Combined => record.cloud_fraction,
    }
}
