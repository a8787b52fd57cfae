use chrono::{Datelike, Local};
use std::path::PathBuf;

/// Generate default combined CSV filename with format: radiation-combined-{YYMMDD}.csv
pub fn generate_default_combined_filename() -> PathBuf {
    let now = Local::now();
    let year = now.year() % 100; // Get last 2 digits of year
    let month = now.month();
    let day = now.day();

    let filename = format!("radiation-combined-{:02}{:02}{:02}.csv", year, month, day);
    PathBuf::from("output").join(filename)
}
