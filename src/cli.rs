//! Options and run sequence shared by both binaries.

use acquire::{
    start, Acquisition, ChannelTable, Converter, Polarity, StdDelay, Timing, Transform, Transport,
    MIDPOINT,
};
use anyhow::anyhow;
use clap::Args;
use log::info;

const BANNER: &str = "AD7124 multi-sensor logger";

#[derive(Args, Debug)]
pub struct Options {
    /// Engineering units per code, applied to every channel
    #[arg(long, default_value_t = acquire::LOAD_CELL_SCALE)]
    pub scale: f64,

    /// Append the die temperature sensor as an extra column, in degrees Celsius
    #[arg(long)]
    pub sensor_units: bool,

    /// Calibration settle time per channel, in milliseconds
    #[arg(long, default_value_t = 100)]
    pub settle_ms: u32,

    /// Interval between calibration completion polls, in milliseconds
    #[arg(long, default_value_t = 1)]
    pub poll_ms: u32,

    /// Always wait the full settle time instead of polling for completion
    #[arg(long)]
    pub fixed_settle: bool,

    /// Pause between loop iterations, in milliseconds
    #[arg(long, default_value_t = 15)]
    pub loop_delay_ms: u32,

    /// Give up on a conversion after this many milliseconds
    #[arg(long, default_value_t = 500)]
    pub read_timeout_ms: u32,

    /// Stop after this many records
    #[arg(long)]
    pub iterations: Option<u64>,

    /// Log filter, overridden by RUST_LOG
    #[arg(short, long, default_value = "info")]
    pub log_level: String,
}

impl Options {
    pub fn init_logging(&self) {
        env_logger::Builder::from_env(
            env_logger::Env::default().default_filter_or(self.log_level.as_str()),
        )
        .init();
    }

    pub fn timing(&self) -> Timing {
        Timing {
            settle_ms: self.settle_ms,
            poll_ms: self.poll_ms,
            loop_delay_ms: self.loop_delay_ms,
            fixed_settle: self.fixed_settle,
        }
    }

    pub fn table(&self) -> ChannelTable {
        let linear = Transform::Linear {
            offset: MIDPOINT,
            scale: self.scale,
        };

        let table = ChannelTable::deployment().with_transform_for(Polarity::Differential, linear);

        if self.sensor_units {
            table.with_die_temperature()
        } else {
            table
        }
    }
}

/// Configure the converter, announce ourselves and acquire until done.
pub fn run<C: Converter, T: Transport>(
    adc: &mut C,
    mut transport: T,
    options: &Options,
) -> Result<(), anyhow::Error> {
    let table = options.table();

    start(adc, &table).map_err(|err| anyhow!("startup failed: {err}"))?;

    transport.emit_line(BANNER)?;
    info!("send 'c' to calibrate");

    let mut acquisition = Acquisition::new(table, options.timing(), transport, StdDelay);
    acquisition.run(adc, options.iterations)?;

    Ok(())
}
