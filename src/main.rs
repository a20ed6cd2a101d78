//! Run the acquisition loop against a simulated converter.
//! Records go to stdout, `c` on stdin starts a calibration.

use acquire::{SimulatedAdc, StdioTransport};
use clap::Parser;

mod cli;

#[derive(Parser, Debug)]
#[command(name = "ad7124-logger", version, about = "Multi-sensor AD7124 logger (simulated converter)")]
struct Cli {
    #[command(flatten)]
    options: cli::Options,
}

fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();
    cli.options.init_logging();

    let mut adc = SimulatedAdc::new();

    cli::run(&mut adc, StdioTransport::new(), &cli.options)
}
