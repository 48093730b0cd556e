//! indexgrid CLI — consolidate yearly index tables into one normalized table.
//!
//! Reads the index tables of a set of yearly reports (one layout per year),
//! reconciles them and writes a single CSV/JSON table.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli)
}
