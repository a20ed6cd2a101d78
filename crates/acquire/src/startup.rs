use ad7124::OperatingMode;
use log::{debug, info};

use crate::channel::ChannelTable;
use crate::converter::Converter;
use crate::error::StartupError;

/// Bring the converter from power-up to continuous acquisition.
///
/// Any error is fatal: the converter may be partially configured and must
/// not be read from.
pub fn start<C: Converter>(adc: &mut C, table: &ChannelTable) -> Result<(), StartupError<C::Error>> {
    table.validate()?;

    adc.begin().map_err(StartupError::Begin)?;

    apply_profiles(adc, table)?;
    bind_channels(adc, table)?;

    adc.set_operating_mode(
        OperatingMode::Continuous,
        table.power(),
        table.internal_reference(),
    )
    .map_err(StartupError::Mode)?;

    info!("acquiring {} channels", table.len());

    Ok(())
}

/// Configure every setup profile a channel refers to.
/// Must run before [`bind_channels`].
pub fn apply_profiles<C: Converter>(
    adc: &mut C,
    table: &ChannelTable,
) -> Result<(), StartupError<C::Error>> {
    for (id, profile) in table.profiles_in_use() {
        debug!("setup {id}: {profile:?}");

        adc.configure_setup_profile(id, profile.reference, profile.gain, profile.bipolar)
            .and_then(|()| adc.configure_filter(id, profile.filter, profile.output_rate))
            .map_err(|cause| StartupError::Profile { profile: id, cause })?;
    }

    Ok(())
}

/// Bind and enable every channel, in ascending index order.
pub fn bind_channels<C: Converter>(
    adc: &mut C,
    table: &ChannelTable,
) -> Result<(), StartupError<C::Error>> {
    for (index, channel) in table.iter() {
        debug!(
            "channel {index} ({}): setup {}, {:?} {:?}/{:?}",
            channel.label, channel.profile, channel.polarity, channel.positive, channel.negative
        );

        adc.bind_channel(index, channel.profile, channel.positive, channel.negative, true)
            .map_err(|cause| StartupError::Channel {
                channel: index,
                cause,
            })?;
    }

    Ok(())
}
