use serde::{Deserialize, Serialize};
use validator::Validate;

/// Metadata parsed from the `#`-prefixed header block of a station file.
///
/// Coordinates and elevation are optional at parse time: files already in
/// the shared schema carry them per-row instead.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct StationMetadata {
    #[validate(length(min = 1))]
    pub station_id: String,

    pub name: String,

    pub network: Option<String>,

    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,

    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,

    pub elevation_m: Option<f64>,
}

impl StationMetadata {
    pub fn new(
        station_id: String,
        name: String,
        network: Option<String>,
        latitude: Option<f64>,
        longitude: Option<f64>,
        elevation_m: Option<f64>,
    ) -> Self {
        Self {
            station_id,
            name,
            network,
            latitude,
            longitude,
            elevation_m,
        }
    }

    /// Coordinates and elevation, required by the per-layout reformatting
    /// step that stamps them onto every output row.
    pub fn location(&self) -> Option<(f64, f64, f64)> {
        match (self.latitude, self.longitude, self.elevation_m) {
            (Some(lat), Some(lon), Some(elev)) => Some((lat, lon, elev)),
            _ => None,
        }
    }
}
