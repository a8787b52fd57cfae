/// Stefan-Boltzmann constant (W/m^2/K^4)
pub const STEFAN_BOLTZMANN: f64 = 5.67e-8;

/// Atmospheric scale height used by the altitude term of the
/// empirical clear-sky emissivity model (meters)
pub const SCALE_HEIGHT_M: f64 = 8500.0;

/// Fitted coefficients for the ground-station cloud fraction formula:
/// cf = A1 * k_d^A2 + M1 * k_t^M2 + N1
/// where k_d = dhi/ghi (diffuse ratio) and k_t = dni/dni_clearsky (clearness)
pub const CF_A1: f64 = 0.42036059446739293;
pub const CF_A2: f64 = 0.8335622813711547;
pub const CF_M1: f64 = 0.24940266639537556;
pub const CF_M2: f64 = -0.13137915252218796;
pub const CF_N1: f64 = -0.31787964985255074;

/// Air temperature bounds for usable records (Kelvin, i.e. [-80, 90] C)
pub const MIN_VALID_TEMP_K: f64 = 193.15;
pub const MAX_VALID_TEMP_K: f64 = 363.15;

/// Clearness ratio dni/dni_clearsky must fall in (0, MAX_CLEARNESS]
pub const MAX_CLEARNESS: f64 = 1.5;

/// Solar zenith angle cutoff for quality-filtered analysis (degrees)
pub const MAX_ZENITH_DEG: f64 = 72.5;

/// Sentinel written by some station loggers for a missing measurement
pub const MISSING_SENTINEL: &str = "-9999";

/// Column names of the shared (combined) schema, in output order.
/// Must stay in sync with the field order of `models::CombinedRecord`.
pub const COMBINED_COLUMNS: &[&str] = &[
    "station_id",
    "timestamp",
    "latitude",
    "longitude",
    "elevation_m",
    "ghi",
    "ghi_clearsky",
    "dni",
    "dni_clearsky",
    "dhi",
    "dlw",
    "air_temp_k",
    "vapor_pressure_hpa",
    "relative_humidity",
    "solar_zenith_deg",
    "cloud_fraction",
    "emissivity",
];

/// Extension of station input files
pub const STATION_FILE_EXTENSION: &str = "csv";

/// Buffered reader capacity
pub const DEFAULT_BUFFER_SIZE: usize = 8192 * 16; // 128KB
