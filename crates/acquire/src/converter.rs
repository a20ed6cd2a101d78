use core::fmt;

use ad7124::{Ad7124, Filter, Gain, Input, OperatingMode, PowerMode, RefSource};
use embedded_hal::delay::DelayNs;
use embedded_hal::spi::SpiDevice;

/// The operations the controller needs from an ADC.
pub trait Converter {
    type Error: fmt::Debug + fmt::Display;

    /// Establish communication. Fails if the device is unreachable.
    fn begin(&mut self) -> Result<(), Self::Error>;

    /// `internal_reference` switches on the on-chip 2.5V reference for
    /// setups that select it.
    fn set_operating_mode(
        &mut self,
        mode: OperatingMode,
        power: PowerMode,
        internal_reference: bool,
    ) -> Result<(), Self::Error>;

    fn configure_setup_profile(
        &mut self,
        id: u8,
        reference: RefSource,
        gain: Gain,
        bipolar: bool,
    ) -> Result<(), Self::Error>;

    fn configure_filter(&mut self, id: u8, filter: Filter, output_rate: u16)
        -> Result<(), Self::Error>;

    fn bind_channel(
        &mut self,
        index: u8,
        setup: u8,
        positive: Input,
        negative: Input,
        enabled: bool,
    ) -> Result<(), Self::Error>;

    fn set_channel_enabled(&mut self, index: u8, enabled: bool) -> Result<(), Self::Error>;

    fn channel_enabled(&mut self, index: u8) -> Result<bool, Self::Error>;

    /// Blocking read of the next conversion of a channel.
    fn read_raw(&mut self, index: u8) -> Result<i32, Self::Error>;

    /// Whether a calibration started by [`Self::set_operating_mode`] has finished.
    /// `None` if the device has no way to tell.
    fn calibration_done(&mut self) -> Result<Option<bool>, Self::Error> {
        Ok(None)
    }
}

impl<SPI: SpiDevice, D: DelayNs> Converter for Ad7124<SPI, D> {
    type Error = ad7124::Error<SPI::Error>;

    fn begin(&mut self) -> Result<(), Self::Error> {
        let id = Ad7124::begin(self)?;
        log::info!("AD7124 found, id {id:#04x}");
        Ok(())
    }

    fn set_operating_mode(
        &mut self,
        mode: OperatingMode,
        power: PowerMode,
        internal_reference: bool,
    ) -> Result<(), Self::Error> {
        self.set_adc_control(mode, power, internal_reference)
    }

    fn configure_setup_profile(
        &mut self,
        id: u8,
        reference: RefSource,
        gain: Gain,
        bipolar: bool,
    ) -> Result<(), Self::Error> {
        self.set_config(id, reference, gain, bipolar)
    }

    fn configure_filter(
        &mut self,
        id: u8,
        filter: Filter,
        output_rate: u16,
    ) -> Result<(), Self::Error> {
        self.set_filter(id, filter, output_rate)
    }

    fn bind_channel(
        &mut self,
        index: u8,
        setup: u8,
        positive: Input,
        negative: Input,
        enabled: bool,
    ) -> Result<(), Self::Error> {
        self.set_channel(index, setup, positive, negative, enabled)
    }

    fn set_channel_enabled(&mut self, index: u8, enabled: bool) -> Result<(), Self::Error> {
        self.enable_channel(index, enabled)
    }

    fn channel_enabled(&mut self, index: u8) -> Result<bool, Self::Error> {
        Ad7124::channel_enabled(self, index)
    }

    fn read_raw(&mut self, index: u8) -> Result<i32, Self::Error> {
        // 24 bit code, always fits.
        Ok(Ad7124::read_raw(self, index)? as i32)
    }

    /// System calibrations drop back to idle once complete.
    fn calibration_done(&mut self) -> Result<Option<bool>, Self::Error> {
        Ok(Some(self.operating_mode()? == OperatingMode::Idle))
    }
}
