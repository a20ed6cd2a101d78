use ad7124::{Filter, Gain, Input, OperatingMode, PowerMode, RefSource};
use thiserror::Error;

use crate::converter::Converter;
use crate::transform::MIDPOINT;

const CHANNELS: usize = 16;
const SETUPS: usize = 8;

#[derive(Clone, Debug, PartialEq, Error)]
pub enum SimError {
    #[error("channel {0} does not exist")]
    InvalidChannel(u8),
    #[error("setup {0} does not exist")]
    InvalidSetup(u8),
    #[error("filter select {0} outside 1..=2047")]
    InvalidFilterRate(u16),
    #[error("setup {0} used before it was configured")]
    UnconfiguredSetup(u8),
    #[error("channel {0} is not bound")]
    Unbound(u8),
    #[error("channel {0} is not in the conversion sequence")]
    NotSequenced(u8),
}

#[derive(Clone, Copy, Debug, Default)]
struct SimChannel {
    setup: Option<u8>,
    enabled: bool,
    /// Zero error of the front-end, in codes.
    offset_error: i32,
    /// Correction stored by the last system-offset calibration.
    correction: i32,
}

/// A converter without hardware behind it.
///
/// Each channel sees a slow deterministic signal plus a fixed zero error.
/// System-offset calibration stores the zero error of every enabled channel
/// and subtracts it from later conversions, then drops back to idle like the
/// real part does.
#[derive(Clone, Debug)]
pub struct SimulatedAdc {
    channels: [SimChannel; CHANNELS],
    configured: [bool; SETUPS],
    mode: OperatingMode,
    tick: u64,
}

impl SimulatedAdc {
    pub fn new() -> Self {
        let mut channels = [SimChannel::default(); CHANNELS];
        for (index, channel) in channels.iter_mut().enumerate() {
            channel.offset_error = (index as i32 + 1) * 1_500;
        }

        Self {
            channels,
            configured: [false; SETUPS],
            mode: OperatingMode::Continuous,
            tick: 0,
        }
    }

    pub fn mode(&self) -> OperatingMode {
        self.mode
    }

    pub fn enabled(&self, index: u8) -> bool {
        self.channels
            .get(index as usize)
            .is_some_and(|channel| channel.enabled)
    }

    fn channel(&mut self, index: u8) -> Result<&mut SimChannel, SimError> {
        self.channels
            .get_mut(index as usize)
            .ok_or(SimError::InvalidChannel(index))
    }

    fn signal(&self, index: u8) -> i32 {
        let phase = self.tick as f64 * 0.02 + index as f64;
        (phase.sin() * 20_000.0) as i32
    }
}

impl Default for SimulatedAdc {
    fn default() -> Self {
        Self::new()
    }
}

fn check_setup(id: u8) -> Result<(), SimError> {
    if (id as usize) < SETUPS {
        Ok(())
    } else {
        Err(SimError::InvalidSetup(id))
    }
}

impl Converter for SimulatedAdc {
    type Error = SimError;

    fn begin(&mut self) -> Result<(), Self::Error> {
        *self = Self::new();
        log::info!("simulated converter ready");
        Ok(())
    }

    fn set_operating_mode(
        &mut self,
        mode: OperatingMode,
        _power: PowerMode,
        _internal_reference: bool,
    ) -> Result<(), Self::Error> {
        self.mode = match mode {
            OperatingMode::SystemOffsetCalibration => {
                for channel in self.channels.iter_mut().filter(|channel| channel.enabled) {
                    channel.correction = channel.offset_error;
                }
                OperatingMode::Idle
            }
            mode => mode,
        };
        Ok(())
    }

    fn configure_setup_profile(
        &mut self,
        id: u8,
        _reference: RefSource,
        _gain: Gain,
        _bipolar: bool,
    ) -> Result<(), Self::Error> {
        check_setup(id)?;
        self.configured[id as usize] = true;
        Ok(())
    }

    fn configure_filter(
        &mut self,
        id: u8,
        _filter: Filter,
        output_rate: u16,
    ) -> Result<(), Self::Error> {
        check_setup(id)?;
        if output_rate == 0 || output_rate > 2047 {
            return Err(SimError::InvalidFilterRate(output_rate));
        }
        Ok(())
    }

    fn bind_channel(
        &mut self,
        index: u8,
        setup: u8,
        _positive: Input,
        _negative: Input,
        enabled: bool,
    ) -> Result<(), Self::Error> {
        check_setup(setup)?;
        if !self.configured[setup as usize] {
            return Err(SimError::UnconfiguredSetup(setup));
        }

        let channel = self.channel(index)?;
        channel.setup = Some(setup);
        channel.enabled = enabled;
        Ok(())
    }

    fn set_channel_enabled(&mut self, index: u8, enabled: bool) -> Result<(), Self::Error> {
        let channel = self.channel(index)?;
        if channel.setup.is_none() {
            return Err(SimError::Unbound(index));
        }
        channel.enabled = enabled;
        Ok(())
    }

    fn channel_enabled(&mut self, index: u8) -> Result<bool, Self::Error> {
        Ok(self.channel(index)?.enabled)
    }

    fn read_raw(&mut self, index: u8) -> Result<i32, Self::Error> {
        let channel = *self.channel(index)?;

        if !channel.enabled || self.mode != OperatingMode::Continuous {
            return Err(SimError::NotSequenced(index));
        }

        self.tick += 1;

        Ok(MIDPOINT + self.signal(index) + channel.offset_error - channel.correction)
    }

    fn calibration_done(&mut self) -> Result<Option<bool>, Self::Error> {
        Ok(Some(self.mode == OperatingMode::Idle))
    }
}
