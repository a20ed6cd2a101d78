use ad7124::Input;
use thiserror::Error;

use crate::calibration::CalibrationStep;

/// A channel table that cannot be bound to the converter.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    #[error("no channels configured")]
    EmptyTable,
    #[error("{0} channels configured, the converter has 16")]
    TooManyChannels(usize),
    #[error("{0} setup profiles configured, the converter has 8")]
    TooManyProfiles(usize),
    #[error("channel {channel} references missing setup profile {profile}")]
    UnknownProfile { channel: u8, profile: u8 },
    #[error("single-ended channel {channel} must use AVSS as negative input, not {negative:?}")]
    SingleEndedNegative { channel: u8, negative: Input },
    #[error("internal channel {channel} must measure the temperature sensor, not {positive:?}")]
    InternalPositive { channel: u8, positive: Input },
}

/// Fatal errors before acquisition starts.
#[derive(Debug, Error)]
pub enum StartupError<E> {
    #[error("invalid channel table: {0}")]
    Config(#[from] ConfigError),
    #[error("converter unreachable: {0}")]
    Begin(E),
    #[error("setup profile {profile} rejected: {cause}")]
    Profile { profile: u8, cause: E },
    #[error("channel {channel} binding rejected: {cause}")]
    Channel { channel: u8, cause: E },
    #[error("could not enter continuous mode: {0}")]
    Mode(E),
}

/// A calibration run that was aborted.
#[derive(Debug, Error)]
pub enum CalibrationError<E> {
    #[error("could not idle the converter: {0}")]
    Idle(E),
    #[error("channel {channel} failed while {step}: {cause}")]
    Step {
        channel: u8,
        step: CalibrationStep,
        cause: E,
    },
    #[error("channel {channel} did not finish calibrating within {timeout_ms} ms")]
    Timeout { channel: u8, timeout_ms: u32 },
    #[error("could not restore continuous acquisition: {0}")]
    Restore(E),
}

/// A failed conversion read. The loop keeps going without this channel's value.
#[derive(Debug, Error)]
#[error("channel {channel} read failed: {cause}")]
pub struct ReadError<E> {
    pub channel: u8,
    pub cause: E,
}
