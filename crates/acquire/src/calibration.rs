use core::fmt;

use ad7124::OperatingMode;
use embedded_hal::delay::DelayNs;
use log::{debug, error, info};

use crate::channel::ChannelTable;
use crate::converter::Converter;
use crate::error::CalibrationError;
use crate::timing::Timing;

/// The per-channel action that failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CalibrationStep {
    Querying,
    Disabling,
    Enabling,
    Calibrating,
    Settling,
}

impl fmt::Display for CalibrationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CalibrationStep::Querying => "reading the channel state",
            CalibrationStep::Disabling => "disabling the channel",
            CalibrationStep::Enabling => "enabling the channel",
            CalibrationStep::Calibrating => "starting offset calibration",
            CalibrationStep::Settling => "waiting for calibration",
        })
    }
}

/// System-offset calibration of every channel, one at a time.
///
/// The converter goes idle, every channel is disabled, then each channel in
/// ascending order is enabled on its own, calibrated and disabled again.
/// Afterwards the channels enabled on entry are enabled again and continuous
/// conversion resumes. The same restore runs when a step fails, so a failed
/// run never leaves the converter idle.
#[derive(Clone, Copy, Debug)]
pub struct Calibrator {
    timing: Timing,
}

impl Calibrator {
    pub fn new(timing: Timing) -> Self {
        Self { timing }
    }

    pub fn calibrate<C, D>(
        &self,
        adc: &mut C,
        delay: &mut D,
        table: &ChannelTable,
    ) -> Result<(), CalibrationError<C::Error>>
    where
        C: Converter,
        D: DelayNs,
    {
        let entry = enabled_channels(adc, table)?;

        info!("calibrating {} channels", table.len());

        let outcome = self.calibrate_each(adc, delay, table);
        let restored = restore(adc, table, &entry);

        match (outcome, restored) {
            (Err(err), restored) => {
                if let Err(restore_err) = restored {
                    error!("calibration aborted and restore failed: {restore_err}");
                }
                Err(err)
            }
            (Ok(()), Err(restore_err)) => Err(restore_err),
            (Ok(()), Ok(())) => {
                info!("calibration complete");
                Ok(())
            }
        }
    }

    fn calibrate_each<C, D>(
        &self,
        adc: &mut C,
        delay: &mut D,
        table: &ChannelTable,
    ) -> Result<(), CalibrationError<C::Error>>
    where
        C: Converter,
        D: DelayNs,
    {
        let power = table.power();
        let reference = table.internal_reference();

        adc.set_operating_mode(OperatingMode::Idle, power, reference)
            .map_err(CalibrationError::Idle)?;

        for (index, _) in table.iter() {
            adc.set_channel_enabled(index, false)
                .map_err(|cause| step_error(index, CalibrationStep::Disabling, cause))?;
        }

        for (index, channel) in table.iter() {
            debug!("calibrating channel {index} ({})", channel.label);

            adc.set_channel_enabled(index, true)
                .map_err(|cause| step_error(index, CalibrationStep::Enabling, cause))?;

            adc.set_operating_mode(OperatingMode::SystemOffsetCalibration, power, reference)
                .map_err(|cause| step_error(index, CalibrationStep::Calibrating, cause))?;

            self.settle(adc, delay, index)?;

            adc.set_channel_enabled(index, false)
                .map_err(|cause| step_error(index, CalibrationStep::Disabling, cause))?;
        }

        Ok(())
    }

    /// Wait for the calibration of `index` to complete: poll the converter if
    /// it reports completion, otherwise sleep the full settle time.
    fn settle<C, D>(
        &self,
        adc: &mut C,
        delay: &mut D,
        index: u8,
    ) -> Result<(), CalibrationError<C::Error>>
    where
        C: Converter,
        D: DelayNs,
    {
        let Timing {
            settle_ms,
            poll_ms,
            fixed_settle,
            ..
        } = self.timing;

        if fixed_settle {
            delay.delay_ms(settle_ms);
            return Ok(());
        }

        let mut waited = 0;

        loop {
            let done = adc
                .calibration_done()
                .map_err(|cause| step_error(index, CalibrationStep::Settling, cause))?;

            match done {
                None => {
                    delay.delay_ms(settle_ms);
                    return Ok(());
                }
                Some(true) => return Ok(()),
                Some(false) if waited >= settle_ms => {
                    return Err(CalibrationError::Timeout {
                        channel: index,
                        timeout_ms: settle_ms,
                    });
                }
                Some(false) => {
                    delay.delay_ms(poll_ms);
                    waited += poll_ms.max(1);
                }
            }
        }
    }
}

impl Default for Calibrator {
    fn default() -> Self {
        Self::new(Timing::default())
    }
}

/// Table channels enabled right now, in ascending order.
fn enabled_channels<C: Converter>(
    adc: &mut C,
    table: &ChannelTable,
) -> Result<Vec<u8>, CalibrationError<C::Error>> {
    let mut enabled = Vec::with_capacity(table.len());

    for (index, _) in table.iter() {
        let on = adc
            .channel_enabled(index)
            .map_err(|cause| step_error(index, CalibrationStep::Querying, cause))?;
        if on {
            enabled.push(index);
        }
    }

    Ok(enabled)
}

/// Put every table channel back in its state on entry and resume continuous
/// conversion. Every step is attempted; the first failure is reported.
fn restore<C: Converter>(
    adc: &mut C,
    table: &ChannelTable,
    entry: &[u8],
) -> Result<(), CalibrationError<C::Error>> {
    let mut first = None;

    for (index, _) in table.iter() {
        let enabled = entry.contains(&index);
        if let Err(err) = adc.set_channel_enabled(index, enabled) {
            error!("could not restore channel {index}: {err}");
            first.get_or_insert(err);
        }
    }

    if let Err(err) = adc.set_operating_mode(
        OperatingMode::Continuous,
        table.power(),
        table.internal_reference(),
    ) {
        error!("could not resume continuous conversion: {err}");
        first.get_or_insert(err);
    }

    match first {
        Some(err) => Err(CalibrationError::Restore(err)),
        None => Ok(()),
    }
}

fn step_error<E>(channel: u8, step: CalibrationStep, cause: E) -> CalibrationError<E> {
    CalibrationError::Step {
        channel,
        step,
        cause,
    }
}
