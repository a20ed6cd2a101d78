//! Acquisition and calibration control for a multi-channel AD7124 front-end.
//!
//! The converter is one owned object passed by `&mut` to every stage:
//! [`start`] configures setups and binds channels, [`Calibrator`] runs the
//! system-offset sequence and [`Acquisition`] drives the read/emit/poll loop.

mod acquisition;
mod calibration;
mod channel;
mod converter;
mod error;
mod sim;
mod startup;
mod timing;
mod transform;
mod transport;

#[cfg(test)]
mod testing;

pub use acquisition::{Acquisition, CALIBRATE};
pub use calibration::{CalibrationStep, Calibrator};
pub use channel::{ChannelConfig, ChannelTable, Polarity, SetupProfile};
pub use converter::Converter;
pub use error::{CalibrationError, ConfigError, ReadError, StartupError};
pub use sim::{SimError, SimulatedAdc};
pub use startup::{apply_profiles, bind_channels, start};
pub use timing::{StdDelay, Timing};
pub use transform::{format_record, Transform, LOAD_CELL_SCALE, MIDPOINT};
pub use transport::{StdioTransport, Transport};

pub use ad7124::{Filter, Gain, Input, OperatingMode, PowerMode, RefSource};
