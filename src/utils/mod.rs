pub mod constants;
pub mod coordinates;
pub mod filename;
pub mod progress;

pub use constants::*;
pub use coordinates::dms_to_decimal;
pub use filename::generate_default_combined_filename;
pub use progress::ProgressReporter;
