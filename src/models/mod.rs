pub mod combined;
pub mod dataset;
pub mod layout;
pub mod station;

pub use combined::CombinedRecord;
pub use dataset::StationDataset;
pub use layout::{ColumnMap, StationLayout, TemperatureUnit};
pub use station::StationMetadata;
