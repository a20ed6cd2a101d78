//! Run the acquisition loop against an AD7124 on the Raspberry Pi SPI bus.

mod cli;

mod raspberry_pi;

use std::cell::RefCell;
use std::path::PathBuf;

use acquire::StdioTransport;
use ad7124::Ad7124;
use clap::Parser;
use embedded_hal_bus::spi::RefCellDevice;
use rppal::gpio::Gpio;
use rppal::hal::Delay;
use rppal::spi::{Mode, SlaveSelect, Spi};

use raspberry_pi::UartTransport;

#[derive(Parser, Debug)]
#[command(name = "ad7124-logger-pi", version, about = "Multi-sensor AD7124 logger on a Raspberry Pi")]
struct Cli {
    #[command(flatten)]
    options: cli::Options,

    /// SPI bus number
    #[arg(long, default_value_t = 0)]
    spi_bus: u8,

    /// SPI clock in Hz
    #[arg(long, default_value_t = 4_000_000)]
    spi_clock: u32,

    /// BCM GPIO driving the converter's chip select
    #[arg(long, default_value_t = 24)]
    cs_pin: u8,

    /// Serial device for records and commands instead of stdio
    #[arg(long)]
    uart: Option<PathBuf>,

    /// Serial line speed
    #[arg(long, default_value_t = 500_000)]
    baud: u32,
}

fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();
    cli.options.init_logging();

    let gpio = Gpio::new()?;

    let bus = raspberry_pi::spi_bus(cli.spi_bus)?;
    let spi = Spi::new(bus, SlaveSelect::Ss0, cli.spi_clock, Mode::Mode3)?;

    let spi = RefCell::new(spi);

    let device = RefCellDevice::new_no_delay(&spi, gpio.get(cli.cs_pin)?.into_output_high());

    let mut adc = Ad7124::new(device, Delay::new())
        .with_timeout(cli.options.read_timeout_ms.saturating_mul(1_000));

    match &cli.uart {
        Some(path) => {
            let transport = UartTransport::open(path, cli.baud)?;
            cli::run(&mut adc, transport, &cli.options)
        }
        None => cli::run(&mut adc, StdioTransport::new(), &cli.options),
    }
}
