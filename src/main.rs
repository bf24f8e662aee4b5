use clap::Parser;

mod cli;

use std::{
    fs::File,
    io::{self, BufReader, BufWriter, Write},
};

use anyhow::{Context, Result};
use cli::Cli;
use log::{info, LevelFilter};
use promoter_extract::{batch, registry::Registry};

fn main() -> Result<()> {
    pretty_env_logger::formatted_builder()
        .filter_level(LevelFilter::Info)
        .parse_env("RUST_LOG")
        .init();

    // Parse CLI arguments
    let args = Cli::parse();
    let (genome_file, coords_file) = args.get_input();
    let output_location = args.get_output();

    // Load every genome up front; any failure here ends the run.
    let registry = Registry::load(&genome_file, args.name_rule())?;

    let coords = BufReader::new(
        File::open(&coords_file)
            .with_context(|| format!("could not open coordinate file {}", coords_file.display()))?,
    );

    // Write to a file or stdout, flushing explicitly so that write errors surface.
    let mut output: BufWriter<Box<dyn Write>> = match &output_location {
        Some(path) => BufWriter::new(Box::new(
            File::create(path)
                .with_context(|| format!("could not create output file {}", path.display()))?,
        )),
        None => BufWriter::new(Box::new(io::stdout().lock())),
    };

    let summary = batch::run(coords, &registry, &mut output, &args.settings())?;
    output.flush()?;

    // The summary goes to stderr whatever the log level.
    eprintln!(
        "extracted {}/{} promoter windows ({} wrapped, {} degraded, {} skipped)",
        summary.success,
        summary.total,
        summary.wrapped,
        summary.degraded,
        summary.skipped.len()
    );
    if let Some(path) = output_location {
        info!("promoter windows written to {}", path.display());
    }
    Ok(())
}
