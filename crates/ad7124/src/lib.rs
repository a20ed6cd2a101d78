//! Provides a driver for an Analog Devices AD7124-4/AD7124-8 sigma-delta ADC via the `embedded-hal` ecosystem.

#![no_std]
#![forbid(unsafe_code)]

use core::fmt;

use embedded_hal::spi::SpiDevice;

mod device;
pub mod regs;

pub use device::Ad7124;
pub use regs::{Filter, Gain, Input, OperatingMode, PowerMode, RefSource, Status};

/// Errors reported by the driver.
#[derive(Clone, Debug, PartialEq)]
pub enum Error<SPI> {
    /// The underlying SPI transaction failed.
    Spi(SPI),
    /// The ID register did not identify an AD7124-4 or AD7124-8.
    UnexpectedId(u8),
    /// Channel index outside of 0..16.
    InvalidChannel(u8),
    /// Setup index outside of 0..8.
    InvalidSetup(u8),
    /// Filter output data rate select outside of 1..=2047.
    InvalidFilterRate(u16),
    /// ADC_CONTROL holds a reserved operating mode.
    UnknownMode(u8),
    /// The converter did not signal data ready in time.
    Timeout,
    /// The status byte of a conversion on this channel carried the error flag.
    Conversion(u8),
}

impl<SPI> From<SPI> for Error<SPI> {
    fn from(e: SPI) -> Self {
        Error::Spi(e)
    }
}

impl<SPI: fmt::Debug> fmt::Display for Error<SPI> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Spi(e) => write!(f, "SPI transfer failed: {e:?}"),
            Error::UnexpectedId(id) => write!(f, "unexpected device id {id:#04x}"),
            Error::InvalidChannel(channel) => write!(f, "channel {channel} does not exist"),
            Error::InvalidSetup(setup) => write!(f, "setup {setup} does not exist"),
            Error::InvalidFilterRate(fs) => write!(f, "filter select {fs} outside 1..=2047"),
            Error::UnknownMode(mode) => write!(f, "reserved operating mode {mode:#x}"),
            Error::Timeout => f.write_str("timed out waiting for data ready"),
            Error::Conversion(channel) => write!(f, "conversion error on channel {channel}"),
        }
    }
}

/// Internal method for reading a register of `len` bytes (at most 4), MSB first.
pub(crate) fn read_register<SPI: SpiDevice>(
    spi: &mut SPI,
    address: u8,
    len: usize,
) -> Result<u32, SPI::Error> {
    let mut buffer = [0; 5];

    buffer[0] = regs::COMMS_READ | (address & regs::COMMS_ADDRESS_MASK);

    spi.transfer_in_place(&mut buffer[..=len])?;

    let value = buffer[1..=len]
        .iter()
        .fold(0u32, |value, &byte| (value << 8) | byte as u32);

    Ok(value)
}

/// Internal method for writing the low `len` bytes of `value` to a register, MSB first.
pub(crate) fn write_register<SPI: SpiDevice>(
    spi: &mut SPI,
    address: u8,
    len: usize,
    value: u32,
) -> Result<(), SPI::Error> {
    let mut buffer = [0; 5];

    buffer[0] = address & regs::COMMS_ADDRESS_MASK;

    for (index, byte) in buffer[1..=len].iter_mut().enumerate() {
        *byte = (value >> (8 * (len - 1 - index))) as u8;
    }

    spi.write(&buffer[..=len])
}
