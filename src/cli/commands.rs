use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::analyzers::{EmissivityAnalyzer, RadiationAnalyzer};
use crate::cli::args::{Cli, Commands};
use crate::error::Result;
use crate::processors::{Concatenator, IntegrityChecker, Reformatter};
use crate::readers::StationReader;
use crate::utils::filename::generate_default_combined_filename;
use crate::utils::progress::ProgressReporter;
use crate::writers::CsvWriter;

pub fn run(cli: Cli) -> Result<()> {
    init_logging(cli.verbose);

    match cli.command {
        Commands::Combine {
            input_dir,
            output_file,
            station_id,
            validate_only,
            no_derived,
            qc_filter,
            mmap,
        } => {
            println!("Combining station radiation data...");
            println!("Input directory: {}", input_dir.display());

            let reader = StationReader::with_mmap(mmap);
            let datasets = reader.read_all(&input_dir)?;

            let progress =
                ProgressReporter::new(datasets.len() as u64, "Reformatting station files...", false);

            let reformatter = Reformatter::new().with_derived_fields(!no_derived);
            let mut tables = Vec::with_capacity(datasets.len());
            for dataset in &datasets {
                let records = reformatter.reformat(dataset)?;
                info!(
                    station = %dataset.metadata.station_id,
                    rows = records.len(),
                    "reformatted station"
                );
                tables.push((dataset.metadata.station_id.clone(), records));
                progress.increment(1);
            }
            progress.finish_with_message("Reformatting complete");

            let (mut records, summary) = Concatenator::new().concatenate(tables);

            println!("\nStation tables (enumeration order):");
            for station in &summary.stations {
                println!("  {}: {} rows", station.station_id, station.rows);
            }
            println!("Combined rows: {}", summary.total_rows);

            let checker = IntegrityChecker::new();
            let integrity_report = checker.check_integrity(&records)?;
            println!("\n{}", checker.generate_summary(&integrity_report));

            if qc_filter {
                let before = records.len();
                records = checker.apply_quality_filter(&records);
                println!(
                    "Quality filter retained {} of {} rows",
                    records.len(),
                    before
                );
            }

            if validate_only {
                println!("Validation complete - no output file written");
                return Ok(());
            }

            if let Some(id) = station_id {
                records.retain(|r| r.station_id == id);
                println!("Filtered to station {}: {} rows", id, records.len());
            }

            if records.is_empty() {
                println!("No records to write");
                return Ok(());
            }

            let output_file = output_file.unwrap_or_else(generate_default_combined_filename);
            if let Some(parent) = output_file.parent() {
                std::fs::create_dir_all(parent)?;
            }

            println!("\nWriting {} records to {}...", records.len(), output_file.display());
            let writer = CsvWriter::new();
            writer.write_records(&records, &output_file)?;

            let file_info = writer.get_file_info(&output_file)?;
            println!("\n{}", file_info.summary());

            println!("Processing complete!");
        }

        Commands::Validate {
            input_dir,
            report_json,
        } => {
            println!("Validating station radiation data...");
            println!("Input directory: {}", input_dir.display());

            let progress = ProgressReporter::new_spinner("Validating data...", false);

            let reader = StationReader::new();
            let datasets = reader.read_all(&input_dir)?;

            let reformatter = Reformatter::new();
            let mut tables = Vec::with_capacity(datasets.len());
            for dataset in &datasets {
                let records = reformatter.reformat(dataset)?;
                tables.push((dataset.metadata.station_id.clone(), records));
            }

            let (records, _summary) = Concatenator::new().concatenate(tables);

            let checker = IntegrityChecker::new();
            let integrity_report = checker.check_integrity(&records)?;

            progress.finish_with_message("Validation complete");

            println!("\n{}", checker.generate_summary(&integrity_report));

            if let Some(path) = report_json {
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                let file = std::fs::File::create(&path)?;
                serde_json::to_writer_pretty(file, &integrity_report)?;
                println!("Integrity report written to {}", path.display());
            }

            if integrity_report.violations.is_empty() {
                println!("All data passed validation checks");
            } else {
                println!(
                    "Found {} validation issues",
                    integrity_report.violations.len()
                );
            }
        }

        Commands::Info {
            file,
            sample,
            analysis_limit,
        } => {
            println!("Analyzing combined CSV file: {}", file.display());

            let writer = CsvWriter::new();
            let file_info = writer.get_file_info(&file)?;

            let analyzer = RadiationAnalyzer::new();
            let statistics = analyzer.analyze_csv_with_limit(&file, analysis_limit)?;
            println!("\n{}", statistics.detailed_summary());

            println!("\nFile Details:");
            println!("{}", file_info.summary());

            // Model validation runs over quality-screened rows only
            let records = if analysis_limit == 0 {
                writer.read_records(&file)?
            } else {
                writer.read_sample_records(&file, analysis_limit)?
            };
            let screened = IntegrityChecker::new().apply_quality_filter(&records);

            let emissivity = EmissivityAnalyzer::new();
            match emissivity.validate_models(&screened) {
                Ok(validations) => {
                    println!("\nEmissivity model validation ({} usable rows):", screened.len());
                    for validation in &validations {
                        println!(
                            "  {:<17} MBE = {:+.4}, RMSE = {:.4}, rMBE = {:+.2}%, rRMSE = {:.2}%",
                            validation.model.name(),
                            validation.stats.mbe,
                            validation.stats.rmse,
                            validation.stats.rmbe_pct,
                            validation.stats.rrmse_pct
                        );
                    }
                    if let Some(best) = emissivity.best_model(&validations) {
                        println!("Best model based on RMSE: {}", best.model.name());
                    }
                }
                Err(e) => println!("\nSkipping emissivity model validation: {}", e),
            }

            if sample > 0 {
                println!("\nSample Records (showing up to {} records):", sample);
                let sample_records = writer.read_sample_records(&file, sample)?;
                for (i, record) in sample_records.iter().enumerate() {
                    println!(
                        "{}. {} at {}: dlw={}, temp={}, cloud_fraction={}",
                        i + 1,
                        record.station_id,
                        record.timestamp,
                        display_optional(record.dlw, "W/m2"),
                        display_optional(record.air_temp_k, "K"),
                        record
                            .cloud_fraction
                            .map(|v| format!("{:.3}", v))
                            .unwrap_or_else(|| "-".to_string()),
                    );
                }
            }
        }
    }

    Ok(())
}

fn display_optional(value: Option<f64>, unit: &str) -> String {
    match value {
        Some(v) => format!("{:.1} {}", v, unit),
        None => "-".to_string(),
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_optional() {
        assert_eq!(display_optional(Some(391.24), "W/m2"), "391.2 W/m2");
        assert_eq!(display_optional(None, "K"), "-");
    }
}
