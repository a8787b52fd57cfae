use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "radiation-processor")]
#[command(about = "Multi-station solar and longwave radiation CSV processor")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load, reformat and concatenate station files into one combined CSV
    Combine {
        #[arg(short, long, help = "Input directory containing station CSV files")]
        input_dir: PathBuf,

        #[arg(
            short,
            long,
            help = "Output CSV file path [default: output/radiation-combined-{YYMMDD}.csv]"
        )]
        output_file: Option<PathBuf>,

        #[arg(short, long, help = "Only keep records of this station")]
        station_id: Option<String>,

        #[arg(long, default_value = "false")]
        validate_only: bool,

        #[arg(long, default_value = "false", help = "Skip derived cloud fraction and emissivity columns")]
        no_derived: bool,

        #[arg(long, default_value = "false", help = "Drop rows failing the quality screening rules")]
        qc_filter: bool,

        #[arg(long, default_value = "false", help = "Memory-map input files instead of buffered reads")]
        mmap: bool,
    },

    /// Check station data integrity without writing an output file
    Validate {
        #[arg(short, long, help = "Input directory containing station CSV files")]
        input_dir: PathBuf,

        #[arg(long, help = "Write the integrity report as JSON to this path")]
        report_json: Option<PathBuf>,
    },

    /// Display information about a combined CSV file
    Info {
        #[arg(short, long)]
        file: PathBuf,

        #[arg(short, long, default_value = "10")]
        sample: usize,

        #[arg(
            long,
            default_value = "0",
            help = "Maximum records to analyze (0 = all records)"
        )]
        analysis_limit: usize,
    },
}
