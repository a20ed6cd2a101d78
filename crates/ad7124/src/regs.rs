//! Register map and field encodings.

pub(crate) const COMMS_READ: u8 = 0b0100_0000;
pub(crate) const COMMS_ADDRESS_MASK: u8 = 0b0011_1111;

pub(crate) const STATUS: u8 = 0x00;
pub(crate) const ADC_CONTROL: u8 = 0x01;
pub(crate) const DATA: u8 = 0x02;
pub(crate) const ID: u8 = 0x05;
pub(crate) const CHANNEL_0: u8 = 0x09;
pub(crate) const CONFIG_0: u8 = 0x19;
pub(crate) const FILTER_0: u8 = 0x21;

pub(crate) const CHANNEL_COUNT: u8 = 16;
pub(crate) const SETUP_COUNT: u8 = 8;

/// ADC_CONTROL bits.
pub(crate) mod control {
    pub const DATA_STATUS: u32 = 1 << 10;
    pub const REF_EN: u32 = 1 << 8;
    pub const POWER_SHIFT: u32 = 6;
    pub const POWER_MASK: u32 = 0b11 << POWER_SHIFT;
    pub const MODE_SHIFT: u32 = 2;
    pub const MODE_MASK: u32 = 0b1111 << MODE_SHIFT;
}

/// CHANNEL_n bits.
pub(crate) mod channel {
    pub const ENABLE: u32 = 1 << 15;
    pub const SETUP_SHIFT: u32 = 12;
    pub const AINP_SHIFT: u32 = 5;
}

/// CONFIG_n bits.
pub(crate) mod config {
    pub const BIPOLAR: u32 = 1 << 11;
    pub const REF_BUFP: u32 = 1 << 8;
    pub const REF_BUFM: u32 = 1 << 7;
    pub const AIN_BUFP: u32 = 1 << 6;
    pub const AIN_BUFM: u32 = 1 << 5;
    pub const REF_SEL_SHIFT: u32 = 3;
}

/// FILTER_n bits.
pub(crate) mod filter {
    pub const FILTER_SHIFT: u32 = 21;
    pub const FS_MAX: u16 = 2047;
}

/// ID register values of the AD7124-4 and AD7124-8 revisions.
pub(crate) const KNOWN_IDS: [u8; 6] = [0x04, 0x06, 0x07, 0x14, 0x16, 0x17];

/// Analog input selector for the positive or negative side of a channel.
#[allow(missing_docs)]
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Input {
    Ain0 = 0,
    Ain1 = 1,
    Ain2 = 2,
    Ain3 = 3,
    Ain4 = 4,
    Ain5 = 5,
    Ain6 = 6,
    Ain7 = 7,
    Ain8 = 8,
    Ain9 = 9,
    Ain10 = 10,
    Ain11 = 11,
    Ain12 = 12,
    Ain13 = 13,
    Ain14 = 14,
    Ain15 = 15,
    /// On-chip temperature sensor.
    Temperature = 16,
    Avss = 17,
    /// Internal 2.5V reference.
    InternalRef = 18,
    Dgnd = 19,
    AvddAvssPlus = 20,
    AvddAvssMinus = 21,
    IovddDgndPlus = 22,
    IovddDgndMinus = 23,
    AldoAvssPlus = 24,
    AldoAvssMinus = 25,
    DldoDgndPlus = 26,
    DldoDgndMinus = 27,
    V20mVPlus = 28,
    V20mVMinus = 29,
}

impl Input {
    const ANALOG: [Self; 16] = [
        Self::Ain0,
        Self::Ain1,
        Self::Ain2,
        Self::Ain3,
        Self::Ain4,
        Self::Ain5,
        Self::Ain6,
        Self::Ain7,
        Self::Ain8,
        Self::Ain9,
        Self::Ain10,
        Self::Ain11,
        Self::Ain12,
        Self::Ain13,
        Self::Ain14,
        Self::Ain15,
    ];

    /// The analog pin `AIN{index}`, if it exists.
    pub fn ain(index: u8) -> Option<Self> {
        Self::ANALOG.get(index as usize).copied()
    }
}

/// Reference source for a setup.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefSource {
    /// REFIN1(+) / REFIN1(−)
    RefIn1 = 0b00,
    /// REFIN2(+) / REFIN2(−)
    RefIn2 = 0b01,
    /// Internal 2.5V reference
    Internal = 0b10,
    /// AVDD − AVSS
    Avdd = 0b11,
}

/// Programmable gain amplifier setting.
#[allow(missing_docs)]
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Gain {
    G1 = 0,
    G2 = 1,
    G4 = 2,
    G8 = 3,
    G16 = 4,
    G32 = 5,
    G64 = 6,
    G128 = 7,
}

/// Digital filter type for a setup.
#[allow(missing_docs)]
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Filter {
    Sinc4 = 0b000,
    Sinc3 = 0b010,
    FastSinc4 = 0b100,
    FastSinc3 = 0b101,
    Post = 0b111,
}

/// ADC_CONTROL operating mode.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OperatingMode {
    /// Sequence through the enabled channels indefinitely.
    Continuous = 0,
    /// One conversion, then idle.
    SingleConversion = 1,
    Standby = 2,
    PowerDown = 3,
    Idle = 4,
    InternalOffsetCalibration = 5,
    InternalGainCalibration = 6,
    /// Zero-scale system calibration on the enabled channel. Returns to idle when done.
    SystemOffsetCalibration = 7,
    SystemGainCalibration = 8,
}

impl OperatingMode {
    /// Decode the MODE field of ADC_CONTROL.
    pub fn from_bits(bits: u8) -> Option<Self> {
        Some(match bits {
            0 => Self::Continuous,
            1 => Self::SingleConversion,
            2 => Self::Standby,
            3 => Self::PowerDown,
            4 => Self::Idle,
            5 => Self::InternalOffsetCalibration,
            6 => Self::InternalGainCalibration,
            7 => Self::SystemOffsetCalibration,
            8 => Self::SystemGainCalibration,
            _ => return None,
        })
    }
}

/// ADC_CONTROL power mode.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PowerMode {
    Low = 0b00,
    Mid = 0b01,
    Full = 0b10,
}

/// Contents of the STATUS register.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Status(pub u8);

impl Status {
    /// A new conversion result is available. RDY is active low.
    pub fn ready(self) -> bool {
        self.0 & 0b1000_0000 == 0
    }

    /// The ERROR register has a flag set.
    pub fn error(self) -> bool {
        self.0 & 0b0100_0000 != 0
    }

    /// Power-on reset occurred since the last read.
    pub fn power_on_reset(self) -> bool {
        self.0 & 0b0001_0000 != 0
    }

    /// Channel the latest conversion belongs to.
    pub fn active_channel(self) -> u8 {
        self.0 & 0b0000_1111
    }
}
