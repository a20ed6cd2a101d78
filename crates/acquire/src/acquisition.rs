use std::io;

use embedded_hal::delay::DelayNs;
use log::{error, warn};

use crate::calibration::Calibrator;
use crate::channel::ChannelTable;
use crate::converter::Converter;
use crate::error::ReadError;
use crate::timing::Timing;
use crate::transform::format_record;
use crate::transport::Transport;

/// Command byte that starts a calibration run.
pub const CALIBRATE: u8 = b'c';

/// The steady-state read, convert, emit and poll cycle.
pub struct Acquisition<T, D> {
    table: ChannelTable,
    calibrator: Calibrator,
    transport: T,
    delay: D,
    loop_delay_ms: u32,
    readings: Vec<Option<f64>>,
}

impl<T: Transport, D: DelayNs> Acquisition<T, D> {
    pub fn new(table: ChannelTable, timing: Timing, transport: T, delay: D) -> Self {
        let readings = Vec::with_capacity(table.len());

        Self {
            table,
            calibrator: Calibrator::new(timing),
            transport,
            delay,
            loop_delay_ms: timing.loop_delay_ms,
            readings,
        }
    }

    /// Run `iterations` cycles, or forever when `None`.
    /// Only a transport failure ends the loop early.
    pub fn run<C: Converter>(&mut self, adc: &mut C, iterations: Option<u64>) -> io::Result<()> {
        let mut count = 0;

        while iterations.map_or(true, |limit| count < limit) {
            self.step(adc)?;
            count += 1;
        }

        Ok(())
    }

    /// One cycle: read every channel in index order, emit one record, handle
    /// a pending command, then pause.
    pub fn step<C: Converter>(&mut self, adc: &mut C) -> io::Result<()> {
        self.readings.clear();

        for (index, channel) in self.table.iter() {
            let reading = match adc.read_raw(index) {
                Ok(raw) => Some(channel.transform.apply(raw)),
                Err(cause) => {
                    warn!("{}", ReadError { channel: index, cause });
                    None
                }
            };
            self.readings.push(reading);
        }

        self.transport.emit_line(&format_record(&self.readings))?;

        if let Some(CALIBRATE) = self.transport.try_receive()? {
            if let Err(err) = self
                .calibrator
                .calibrate(adc, &mut self.delay, &self.table)
            {
                error!("calibration failed: {err}");
            }
        }

        self.delay.delay_ms(self.loop_delay_ms);

        Ok(())
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn delay(&self) -> &D {
        &self.delay
    }
}
