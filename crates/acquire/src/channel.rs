use ad7124::{Filter, Gain, Input, PowerMode, RefSource};

use crate::error::ConfigError;
use crate::transform::{Transform, LOAD_CELL_SCALE, MIDPOINT};

const MAX_CHANNELS: usize = 16;
const MAX_PROFILES: usize = 8;

/// How a channel's input pair is wired.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Polarity {
    /// Difference between two analog inputs.
    Differential,
    /// One analog input against AVSS.
    SingleEnded,
    /// An on-chip source, e.g. the temperature sensor.
    Internal,
}

/// Reference, gain and filter shared by the channels that use it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SetupProfile {
    pub reference: RefSource,
    pub gain: Gain,
    pub bipolar: bool,
    pub filter: Filter,
    /// Filter select word, 1 (fastest) to 2047 (slowest).
    pub output_rate: u16,
}

impl Default for SetupProfile {
    fn default() -> Self {
        Self {
            reference: RefSource::Avdd,
            gain: Gain::G128,
            bipolar: true,
            filter: Filter::Sinc4,
            output_rate: 14,
        }
    }
}

impl SetupProfile {
    /// Gain 1 against the internal 2.5V reference, as the die temperature
    /// transfer function assumes.
    pub fn die_temperature() -> Self {
        Self {
            reference: RefSource::Internal,
            gain: Gain::G1,
            ..Self::default()
        }
    }
}

/// One logical measurement path.
#[derive(Clone, Debug, PartialEq)]
pub struct ChannelConfig {
    pub label: &'static str,
    pub profile: u8,
    pub polarity: Polarity,
    pub positive: Input,
    pub negative: Input,
    pub transform: Transform,
}

impl ChannelConfig {
    pub fn differential(label: &'static str, positive: Input, negative: Input) -> Self {
        Self::new(label, Polarity::Differential, positive, negative)
    }

    /// Single-ended channels measure against AVSS.
    pub fn single_ended(label: &'static str, positive: Input) -> Self {
        Self::new(label, Polarity::SingleEnded, positive, Input::Avss)
    }

    pub fn internal_temperature(label: &'static str) -> Self {
        Self::new(label, Polarity::Internal, Input::Temperature, Input::Avss)
    }

    fn new(label: &'static str, polarity: Polarity, positive: Input, negative: Input) -> Self {
        Self {
            label,
            profile: 0,
            polarity,
            positive,
            negative,
            transform: Transform::Linear {
                offset: MIDPOINT,
                scale: LOAD_CELL_SCALE,
            },
        }
    }

    pub fn with_profile(mut self, profile: u8) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }
}

/// Static description of every channel and the setups they reference.
/// A channel's index is its position in the table.
#[derive(Clone, Debug, PartialEq)]
pub struct ChannelTable {
    profiles: Vec<SetupProfile>,
    channels: Vec<ChannelConfig>,
    power: PowerMode,
}

impl ChannelTable {
    pub fn new(
        profiles: Vec<SetupProfile>,
        channels: Vec<ChannelConfig>,
    ) -> Result<Self, ConfigError> {
        let table = Self {
            profiles,
            channels,
            power: PowerMode::Full,
        };
        table.validate()?;
        Ok(table)
    }

    /// The board as deployed: channel `i` measures AIN(2i) against AIN(2i+1)
    /// on one shared setup. Every channel reports in load-cell units.
    pub fn deployment() -> Self {
        const LABELS: [&str; 7] = [
            "load cell",
            "thermocouple 1",
            "thermocouple 2",
            "potentiometer 1",
            "potentiometer 2",
            "spare 1",
            "spare 2",
        ];

        let channels = LABELS
            .into_iter()
            .zip((0..).step_by(2))
            .filter_map(|(label, pin)| {
                Some(ChannelConfig::differential(
                    label,
                    Input::ain(pin)?,
                    Input::ain(pin + 1)?,
                ))
            })
            .collect();

        Self {
            profiles: vec![SetupProfile::default()],
            channels,
            power: PowerMode::Full,
        }
    }

    /// Append the on-chip temperature sensor as the last channel, on a setup
    /// of its own that matches the sensor's transfer function.
    pub fn with_die_temperature(mut self) -> Self {
        let profile = self.profiles.len() as u8;

        self.profiles.push(SetupProfile::die_temperature());
        self.channels.push(
            ChannelConfig::internal_temperature("die temperature")
                .with_profile(profile)
                .with_transform(Transform::DieTemperature),
        );
        self
    }

    /// Replace the transform of every channel with the given polarity.
    pub fn with_transform_for(mut self, polarity: Polarity, transform: Transform) -> Self {
        self.channels
            .iter_mut()
            .filter(|channel| channel.polarity == polarity)
            .for_each(|channel| channel.transform = transform);
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.channels.is_empty() {
            return Err(ConfigError::EmptyTable);
        }

        if self.channels.len() > MAX_CHANNELS {
            return Err(ConfigError::TooManyChannels(self.channels.len()));
        }

        if self.profiles.len() > MAX_PROFILES {
            return Err(ConfigError::TooManyProfiles(self.profiles.len()));
        }

        for (index, channel) in self.iter() {
            if channel.profile as usize >= self.profiles.len() {
                return Err(ConfigError::UnknownProfile {
                    channel: index,
                    profile: channel.profile,
                });
            }

            match channel.polarity {
                Polarity::SingleEnded if channel.negative != Input::Avss => {
                    return Err(ConfigError::SingleEndedNegative {
                        channel: index,
                        negative: channel.negative,
                    });
                }
                Polarity::Internal if channel.positive != Input::Temperature => {
                    return Err(ConfigError::InternalPositive {
                        channel: index,
                        positive: channel.positive,
                    });
                }
                _ => (),
            }
        }

        Ok(())
    }

    /// Channels with their indices, in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, &ChannelConfig)> {
        self.channels
            .iter()
            .enumerate()
            .map(|(index, channel)| (index as u8, channel))
    }

    /// Profiles referenced by at least one channel, in ascending id order.
    pub fn profiles_in_use(&self) -> impl Iterator<Item = (u8, &SetupProfile)> {
        self.profiles
            .iter()
            .enumerate()
            .map(|(id, profile)| (id as u8, profile))
            .filter(|(id, _)| self.channels.iter().any(|channel| channel.profile == *id))
    }

    pub fn channel(&self, index: u8) -> Option<&ChannelConfig> {
        self.channels.get(index as usize)
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    pub fn power(&self) -> PowerMode {
        self.power
    }

    /// Whether a setup in use needs the internal reference switched on.
    pub fn internal_reference(&self) -> bool {
        self.profiles_in_use()
            .any(|(_, profile)| profile.reference == RefSource::Internal)
    }
}

impl Default for ChannelTable {
    fn default() -> Self {
        Self::deployment()
    }
}
