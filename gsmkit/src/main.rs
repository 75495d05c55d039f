//! Provides the main entry point to the program.
use anyhow::Result;

fn main() -> Result<()> {
    gsmkit::cli::run_cli()
}
