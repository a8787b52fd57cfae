use clap::Parser;
use radiation_processor::cli::{run, Cli};
use radiation_processor::error::Result;

fn main() -> Result<()> {
    let cli = Cli::parse();
    run(cli)
}
