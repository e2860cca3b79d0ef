use clap::Parser;
use retireplan::{Cli, init_logging, run};

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_logging(cli.log_file.as_deref(), &cli.log_level)?;

    let output = run(cli)?;
    println!("{output}");

    Ok(())
}
