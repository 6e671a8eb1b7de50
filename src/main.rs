//! Pixclass CLI: classify image paths from arguments, a directory walk, or stdin.

use anyhow::Result;
use clap::Parser;
use pixclass::engine::arg_parser::Cli;
use pixclass::engine::handle_run;
use std::time::Instant;

fn main() -> Result<()> {
    let start_time = Instant::now();
    let cli = Cli::parse();
    handle_run(&cli)?;
    log::debug!("Total time: {:?}", start_time.elapsed());
    Ok(())
}
