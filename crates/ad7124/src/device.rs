use embedded_hal::delay::DelayNs;
use embedded_hal::spi::SpiDevice;

use crate::regs::{self, channel, config, control, filter};
use crate::regs::{Filter, Gain, Input, OperatingMode, PowerMode, RefSource, Status};
use crate::{read_register, write_register, Error};

const RESET_DELAY_US: u32 = 1_000;
const POLL_INTERVAL_US: u32 = 100;
const DEFAULT_TIMEOUT_US: u32 = 500_000;

/// AD7124 driver
pub struct Ad7124<SPI, D> {
    spi: SPI,
    delay: D,
    timeout_us: u32,
}

impl<SPI: SpiDevice, D: DelayNs> Ad7124<SPI, D> {
    /// Creates a new driver from an SPI peripheral and a delay source.
    /// Please ensure the SPI bus is in SPI mode 3, aka (1, 1).
    pub fn new(spi: SPI, delay: D) -> Self {
        Self {
            spi,
            delay,
            timeout_us: DEFAULT_TIMEOUT_US,
        }
    }

    /// Bound how long [`Self::wait_ready`] polls before giving up.
    pub fn with_timeout(mut self, timeout_us: u32) -> Self {
        self.timeout_us = timeout_us;
        self
    }

    /// Reset the device, check its ID and enable status-tagged data reads.
    /// Returns the ID register.
    pub fn begin(&mut self) -> Result<u8, Error<SPI::Error>> {
        self.reset()?;

        let id = read_register(&mut self.spi, regs::ID, 1)? as u8;

        if !regs::KNOWN_IDS.contains(&id) {
            return Err(Error::UnexpectedId(id));
        }

        let value = self.adc_control()? | control::DATA_STATUS;
        write_register(&mut self.spi, regs::ADC_CONTROL, 2, value)?;

        Ok(id)
    }

    /// Software reset: 64 clocks with DIN held high.
    pub fn reset(&mut self) -> Result<(), Error<SPI::Error>> {
        self.spi.write(&[0xFF; 8])?;
        self.delay.delay_us(RESET_DELAY_US);
        Ok(())
    }

    /// Set the operating mode and power mode, keeping the other ADC_CONTROL bits.
    pub fn set_adc_control(
        &mut self,
        mode: OperatingMode,
        power: PowerMode,
        ref_en: bool,
    ) -> Result<(), Error<SPI::Error>> {
        let mut value = self.adc_control()?;

        value &= !(control::MODE_MASK | control::POWER_MASK | control::REF_EN);
        value |= (mode as u32) << control::MODE_SHIFT;
        value |= (power as u32) << control::POWER_SHIFT;
        if ref_en {
            value |= control::REF_EN;
        }

        write_register(&mut self.spi, regs::ADC_CONTROL, 2, value)?;
        Ok(())
    }

    /// Read back the current operating mode.
    pub fn operating_mode(&mut self) -> Result<OperatingMode, Error<SPI::Error>> {
        let bits = ((self.adc_control()? & control::MODE_MASK) >> control::MODE_SHIFT) as u8;
        OperatingMode::from_bits(bits).ok_or(Error::UnknownMode(bits))
    }

    /// Configure reference, gain and polarity of a setup.
    /// Input and reference buffers are always enabled.
    pub fn set_config(
        &mut self,
        setup: u8,
        reference: RefSource,
        gain: Gain,
        bipolar: bool,
    ) -> Result<(), Error<SPI::Error>> {
        Self::check_setup(setup)?;

        let mut value = config::REF_BUFP | config::REF_BUFM | config::AIN_BUFP | config::AIN_BUFM;
        value |= (reference as u32) << config::REF_SEL_SHIFT;
        value |= gain as u32;
        if bipolar {
            value |= config::BIPOLAR;
        }

        write_register(&mut self.spi, regs::CONFIG_0 + setup, 2, value)?;
        Ok(())
    }

    /// Configure the digital filter of a setup. `fs` selects the output data rate:
    /// 1 is the fastest, 2047 the slowest.
    pub fn set_filter(
        &mut self,
        setup: u8,
        filter: Filter,
        fs: u16,
    ) -> Result<(), Error<SPI::Error>> {
        Self::check_setup(setup)?;

        if fs == 0 || fs > filter::FS_MAX {
            return Err(Error::InvalidFilterRate(fs));
        }

        let value = ((filter as u32) << filter::FILTER_SHIFT) | fs as u32;

        write_register(&mut self.spi, regs::FILTER_0 + setup, 3, value)?;
        Ok(())
    }

    /// Bind a channel to a setup and an input pair.
    pub fn set_channel(
        &mut self,
        ch: u8,
        setup: u8,
        positive: Input,
        negative: Input,
        enabled: bool,
    ) -> Result<(), Error<SPI::Error>> {
        Self::check_channel(ch)?;
        Self::check_setup(setup)?;

        let mut value = ((setup as u32) << channel::SETUP_SHIFT)
            | ((positive as u32) << channel::AINP_SHIFT)
            | negative as u32;
        if enabled {
            value |= channel::ENABLE;
        }

        write_register(&mut self.spi, regs::CHANNEL_0 + ch, 2, value)?;
        Ok(())
    }

    /// Enable or disable a channel, keeping its setup and inputs.
    pub fn enable_channel(&mut self, ch: u8, enabled: bool) -> Result<(), Error<SPI::Error>> {
        Self::check_channel(ch)?;

        let mut value = read_register(&mut self.spi, regs::CHANNEL_0 + ch, 2)?;
        if enabled {
            value |= channel::ENABLE;
        } else {
            value &= !channel::ENABLE;
        }

        write_register(&mut self.spi, regs::CHANNEL_0 + ch, 2, value)?;
        Ok(())
    }

    /// Whether a channel takes part in the conversion sequence.
    pub fn channel_enabled(&mut self, ch: u8) -> Result<bool, Error<SPI::Error>> {
        Self::check_channel(ch)?;

        let value = read_register(&mut self.spi, regs::CHANNEL_0 + ch, 2)?;
        Ok(value & channel::ENABLE != 0)
    }

    pub fn status(&mut self) -> Result<Status, Error<SPI::Error>> {
        Ok(Status(read_register(&mut self.spi, regs::STATUS, 1)? as u8))
    }

    /// Poll STATUS until a conversion is ready or the timeout elapses.
    pub fn wait_ready(&mut self) -> Result<Status, Error<SPI::Error>> {
        let mut waited = 0;

        loop {
            let status = self.status()?;
            if status.ready() {
                return Ok(status);
            }

            if waited >= self.timeout_us {
                return Err(Error::Timeout);
            }

            self.delay.delay_us(POLL_INTERVAL_US);
            waited += POLL_INTERVAL_US;
        }
    }

    /// Read the next conversion of `ch` as a 24 bit code.
    /// Conversions of other enabled channels are discarded until `ch` comes around.
    pub fn read_raw(&mut self, ch: u8) -> Result<u32, Error<SPI::Error>> {
        Self::check_channel(ch)?;

        // One full pass over the sequence, plus the conversion in flight.
        for _ in 0..=regs::CHANNEL_COUNT {
            self.wait_ready()?;

            let word = read_register(&mut self.spi, regs::DATA, 4)?;
            let status = Status(word as u8);

            if status.active_channel() != ch {
                continue;
            }

            if status.error() {
                return Err(Error::Conversion(ch));
            }

            return Ok(word >> 8);
        }

        Err(Error::Timeout)
    }

    fn adc_control(&mut self) -> Result<u32, Error<SPI::Error>> {
        Ok(read_register(&mut self.spi, regs::ADC_CONTROL, 2)?)
    }

    fn check_channel(ch: u8) -> Result<(), Error<SPI::Error>> {
        if ch < regs::CHANNEL_COUNT {
            Ok(())
        } else {
            Err(Error::InvalidChannel(ch))
        }
    }

    fn check_setup(setup: u8) -> Result<(), Error<SPI::Error>> {
        if setup < regs::SETUP_COUNT {
            Ok(())
        } else {
            Err(Error::InvalidSetup(setup))
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use embedded_hal::spi::{Error as SpiError, ErrorKind, ErrorType, Operation};
    use std::collections::VecDeque;

    #[derive(Debug, PartialEq)]
    struct MockError;

    impl SpiError for MockError {
        fn kind(&self) -> ErrorKind {
            ErrorKind::Other
        }
    }

    /// Register file behaving like the converter on the other end of the bus.
    struct MockAd7124 {
        registers: [u32; 0x39],
        conversions: VecDeque<(u8, u32, bool)>,
        resets: usize,
        busy_polls: usize,
    }

    impl MockAd7124 {
        fn new(id: u8) -> Self {
            let mut registers = [0; 0x39];
            registers[regs::ID as usize] = id as u32;
            Self {
                registers,
                conversions: VecDeque::new(),
                resets: 0,
                busy_polls: 0,
            }
        }

        fn read(&mut self, address: u8) -> u32 {
            match address {
                regs::STATUS => {
                    if self.busy_polls > 0 {
                        self.busy_polls -= 1;
                        return 0x80;
                    }
                    match self.conversions.front() {
                        Some((channel, _, _)) => *channel as u32,
                        None => 0x80,
                    }
                }
                regs::DATA => match self.conversions.pop_front() {
                    Some((channel, code, error)) => {
                        (code << 8) | channel as u32 | if error { 0x40 } else { 0 }
                    }
                    None => 0,
                },
                address => self.registers[address as usize],
            }
        }
    }

    impl ErrorType for MockAd7124 {
        type Error = MockError;
    }

    impl SpiDevice for MockAd7124 {
        fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), Self::Error> {
            assert_eq!(operations.len(), 1);

            match &mut operations[0] {
                Operation::Write(words) => {
                    if words.iter().all(|&word| word == 0xFF) {
                        self.resets += 1;
                        return Ok(());
                    }
                    assert_eq!(words[0] & regs::COMMS_READ, 0, "Write with read flag");
                    let value = words[1..]
                        .iter()
                        .fold(0u32, |value, &byte| (value << 8) | byte as u32);
                    self.registers[words[0] as usize] = value;
                }
                Operation::TransferInPlace(words) => {
                    assert_ne!(words[0] & regs::COMMS_READ, 0, "Missing read flag");
                    let len = words.len() - 1;
                    let value = self.read(words[0] & regs::COMMS_ADDRESS_MASK);
                    for (index, byte) in words[1..].iter_mut().enumerate() {
                        *byte = (value >> (8 * (len - 1 - index))) as u8;
                    }
                }
                _ => panic!("Not an expected operation"),
            }

            Ok(())
        }
    }

    #[derive(Default)]
    struct CountingDelay {
        waited_ns: u64,
    }

    impl DelayNs for CountingDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.waited_ns += ns as u64;
        }
    }

    fn adc(id: u8) -> Ad7124<MockAd7124, CountingDelay> {
        Ad7124::new(MockAd7124::new(id), CountingDelay::default())
    }

    #[test]
    fn begin_checks_id_and_enables_status() {
        let mut adc = adc(0x14);

        assert_eq!(adc.begin(), Ok(0x14));
        assert_eq!(adc.spi.resets, 1);
        assert_ne!(adc.spi.registers[regs::ADC_CONTROL as usize] & control::DATA_STATUS, 0);
    }

    #[test]
    fn begin_rejects_unknown_device() {
        let mut adc = adc(0xFF);

        assert_eq!(adc.begin(), Err(Error::UnexpectedId(0xFF)));
    }

    #[test]
    fn adc_control_keeps_other_bits() {
        let mut adc = adc(0x04);
        adc.begin().unwrap();

        adc.set_adc_control(OperatingMode::SystemOffsetCalibration, PowerMode::Full, false)
            .unwrap();

        let value = adc.spi.registers[regs::ADC_CONTROL as usize];
        assert_eq!(value, control::DATA_STATUS | (0b10 << 6) | (7 << 2));
        assert_eq!(
            adc.operating_mode(),
            Ok(OperatingMode::SystemOffsetCalibration)
        );

        adc.set_adc_control(OperatingMode::Continuous, PowerMode::Low, true)
            .unwrap();

        let value = adc.spi.registers[regs::ADC_CONTROL as usize];
        assert_eq!(value, control::DATA_STATUS | control::REF_EN);
    }

    #[test]
    fn reserved_mode_is_reported() {
        let mut adc = adc(0x04);
        adc.spi.registers[regs::ADC_CONTROL as usize] = 0b1111 << 2;

        assert_eq!(adc.operating_mode(), Err(Error::UnknownMode(0b1111)));
    }

    #[test]
    fn setup_registers() {
        let mut adc = adc(0x14);

        adc.set_config(2, RefSource::Avdd, Gain::G128, true).unwrap();
        adc.set_filter(2, Filter::Sinc4, 14).unwrap();

        assert_eq!(adc.spi.registers[0x1B], 0x0800 | 0x01E0 | (0b11 << 3) | 7);
        assert_eq!(adc.spi.registers[0x23], 14);

        adc.set_filter(3, Filter::Sinc3, 2047).unwrap();
        assert_eq!(adc.spi.registers[0x24], (0b010 << 21) | 2047);
    }

    #[test]
    fn setup_arguments_are_checked() {
        let mut adc = adc(0x14);

        assert_eq!(
            adc.set_config(8, RefSource::Internal, Gain::G1, false),
            Err(Error::InvalidSetup(8))
        );
        assert_eq!(adc.set_filter(0, Filter::Sinc4, 0), Err(Error::InvalidFilterRate(0)));
        assert_eq!(
            adc.set_filter(0, Filter::Sinc4, 2048),
            Err(Error::InvalidFilterRate(2048))
        );
        assert_eq!(
            adc.set_channel(16, 0, Input::Ain0, Input::Ain1, true),
            Err(Error::InvalidChannel(16))
        );
    }

    #[test]
    fn channel_binding_and_enable() {
        let mut adc = adc(0x14);

        adc.set_channel(6, 1, Input::Ain12, Input::Ain13, true).unwrap();
        assert_eq!(adc.spi.registers[0x0F], 0x8000 | (1 << 12) | (12 << 5) | 13);
        assert_eq!(adc.channel_enabled(6), Ok(true));

        adc.enable_channel(6, false).unwrap();
        assert_eq!(adc.spi.registers[0x0F], (1 << 12) | (12 << 5) | 13);
        assert_eq!(adc.channel_enabled(6), Ok(false));

        adc.set_channel(5, 0, Input::Temperature, Input::Avss, false).unwrap();
        assert_eq!(adc.spi.registers[0x0E], (16 << 5) | 17);
    }

    #[test]
    fn read_raw_skips_other_channels() {
        let mut adc = adc(0x14);
        adc.spi.conversions.extend([
            (0, 0x800000, false),
            (1, 0x123456, false),
            (2, 0x7FFFFF, false),
        ]);

        assert_eq!(adc.read_raw(1), Ok(0x123456));
        assert_eq!(adc.read_raw(2), Ok(0x7FFFFF));
    }

    #[test]
    fn read_raw_reports_conversion_error() {
        let mut adc = adc(0x14);
        adc.spi.conversions.push_back((3, 0xFFFFFF, true));

        assert_eq!(adc.read_raw(3), Err(Error::Conversion(3)));
    }

    #[test]
    fn wait_ready_polls_then_times_out() {
        let mut adc = adc(0x14).with_timeout(1_000);
        adc.spi.busy_polls = 3;
        adc.spi.conversions.push_back((0, 42, false));

        assert!(adc.wait_ready().unwrap().ready());
        assert_eq!(adc.delay.waited_ns, 3 * POLL_INTERVAL_US as u64 * 1_000);

        adc.spi.conversions.clear();
        assert_eq!(adc.read_raw(0), Err(Error::Timeout));
    }

    #[test]
    fn read_raw_gives_up_on_unsequenced_channel() {
        let mut adc = adc(0x14);
        adc.spi
            .conversions
            .extend((0..40).map(|index| ((index % 2) as u8, 1, false)));

        assert_eq!(adc.read_raw(5), Err(Error::Timeout));
    }
}
