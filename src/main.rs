use anyhow::Result;
use clap::Parser;
use tesoro::cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.run()
}
