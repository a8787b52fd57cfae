use serde::{Deserialize, Serialize};

/// Unit of the source air temperature column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemperatureUnit {
    Kelvin,
    Celsius,
}

impl TemperatureUnit {
    pub fn to_kelvin(&self, value: f64) -> f64 {
        match self {
            TemperatureUnit::Kelvin => value,
            TemperatureUnit::Celsius => value + 273.15,
        }
    }
}

/// Known station file layouts.
///
/// The correspondence between source columns and the shared schema is
/// hand-specified per layout; there is no schema inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StationLayout {
    /// SURFRAD network export (temperature in Kelvin, vapor pressure given)
    Surfrad,
    /// Hawaii ground-station export (temperature in Celsius, humidity given)
    HawaiiGround,
    /// Already in the shared schema; reformatting is a no-op
    Combined,
}

impl StationLayout {
    /// Resolve a layout from the `network` header key
    pub fn from_network(network: &str) -> Option<Self> {
        match network.trim().to_uppercase().as_str() {
            "SURFRAD" => Some(StationLayout::Surfrad),
            "HI-GROUND" | "HAWAII" => Some(StationLayout::HawaiiGround),
            "COMBINED" => Some(StationLayout::Combined),
            _ => None,
        }
    }

    /// Hand-specified station table for files whose header omits `network`
    pub fn from_station_id(station_id: &str) -> Option<Self> {
        let id = station_id.trim().to_uppercase();
        match id.as_str() {
            "BON" | "DRA" | "FPK" | "GWC" | "PSU" | "SXF" | "TBL" => Some(StationLayout::Surfrad),
            _ if id.ends_with("HI") => Some(StationLayout::HawaiiGround),
            _ => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            StationLayout::Surfrad => "SURFRAD",
            StationLayout::HawaiiGround => "Hawaii ground station",
            StationLayout::Combined => "Combined (shared schema)",
        }
    }

    /// The static column correspondence for this layout.
    ///
    /// `Combined` has no map: its rows are parsed directly.
    pub fn column_map(&self) -> Option<&'static ColumnMap> {
        match self {
            StationLayout::Surfrad => Some(&SURFRAD_COLUMNS),
            StationLayout::HawaiiGround => Some(&HAWAII_COLUMNS),
            StationLayout::Combined => None,
        }
    }
}

impl std::fmt::Display for StationLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Source column names for one layout. `None` means the layout does not
/// carry that measurement. A mapped measurement column absent from a
/// file reads as missing; only `timestamp` and `air_temp` must exist.
pub struct ColumnMap {
    pub timestamp: &'static str,
    pub timestamp_formats: &'static [&'static str],
    pub ghi: Option<&'static str>,
    pub ghi_clearsky: Option<&'static str>,
    pub dni: Option<&'static str>,
    pub dni_clearsky: Option<&'static str>,
    pub dhi: Option<&'static str>,
    pub dlw: Option<&'static str>,
    pub air_temp: &'static str,
    pub air_temp_unit: TemperatureUnit,
    pub vapor_pressure: Option<&'static str>,
    pub relative_humidity: Option<&'static str>,
    pub solar_zenith: Option<&'static str>,
    pub clear_sky_fraction: Option<&'static str>,
}

const TIMESTAMP_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"];

pub static SURFRAD_COLUMNS: ColumnMap = ColumnMap {
    timestamp: "timestamp",
    timestamp_formats: TIMESTAMP_FORMATS,
    ghi: Some("ghi_m"),
    ghi_clearsky: Some("ghi_c"),
    dni: None,
    dni_clearsky: None,
    dhi: None,
    dlw: Some("dlw_m"),
    air_temp: "t_m",
    air_temp_unit: TemperatureUnit::Kelvin,
    vapor_pressure: Some("pw_hpa"),
    relative_humidity: None,
    solar_zenith: Some("zen"),
    clear_sky_fraction: Some("clr_pct"),
};

pub static HAWAII_COLUMNS: ColumnMap = ColumnMap {
    timestamp: "timestamp",
    timestamp_formats: TIMESTAMP_FORMATS,
    ghi: Some("GHI"),
    ghi_clearsky: None,
    dni: Some("DNI"),
    dni_clearsky: Some("Clearsky DNI"),
    dhi: Some("DHI"),
    dlw: Some("dlw"),
    air_temp: "temp",
    air_temp_unit: TemperatureUnit::Celsius,
    vapor_pressure: None,
    relative_humidity: Some("rh"),
    solar_zenith: Some("Solar Zenith Angle"),
    clear_sky_fraction: None,
};
