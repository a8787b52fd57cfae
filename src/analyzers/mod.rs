pub mod emissivity;
pub mod radiation_analyzer;

pub use emissivity::{
    CloudCorrection, EmissivityAnalyzer, EmissivityModel, ModelErrorStats, ModelValidation,
};
pub use radiation_analyzer::{RadiationAnalyzer, RadiationStatistics};
