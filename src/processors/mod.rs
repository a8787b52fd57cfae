pub mod concatenator;
pub mod integrity_checker;
pub mod reformatter;

pub use concatenator::{ConcatenationSummary, Concatenator, StationRowCount};
pub use integrity_checker::{
    IntegrityChecker, IntegrityReport, RadiationViolation, StationStatistics, ViolationType,
};
pub use reformatter::Reformatter;
