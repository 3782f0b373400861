//! Channels and channel selection
//!
//! A channel is one scalar axis of sensor data. Classification works on a
//! subset of channels chosen by the user; the subset is a
//! [`ChannelSelection`], an immutable set whose iteration order is fixed
//! (accelerometer triplet, magnetometer triplet, light) no matter how the
//! set was built. Feature vectors depend on that order, so it must never
//! follow insertion order.

use core::fmt;

/// One scalar axis of sensor data
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum Channel {
    /// Accelerometer X axis
    AccelX = 0,
    /// Accelerometer Y axis
    AccelY = 1,
    /// Accelerometer Z axis
    AccelZ = 2,
    /// Magnetometer X axis
    MagnetX = 3,
    /// Magnetometer Y axis
    MagnetY = 4,
    /// Magnetometer Z axis
    MagnetZ = 5,
    /// Ambient light level
    Light = 6,
}

impl Channel {
    /// Every channel in canonical order
    pub const ALL: [Channel; 7] = [
        Channel::AccelX,
        Channel::AccelY,
        Channel::AccelZ,
        Channel::MagnetX,
        Channel::MagnetY,
        Channel::MagnetZ,
        Channel::Light,
    ];

    /// Accelerometer triplet
    pub const ACCELEROMETER: [Channel; 3] = [Channel::AccelX, Channel::AccelY, Channel::AccelZ];
    /// Magnetometer triplet
    pub const MAGNETOMETER: [Channel; 3] = [Channel::MagnetX, Channel::MagnetY, Channel::MagnetZ];

    /// Short key used in feature names (`accx`, `magz`, ...)
    pub const fn key(&self) -> &'static str {
        match self {
            Channel::AccelX => "accx",
            Channel::AccelY => "accy",
            Channel::AccelZ => "accz",
            Channel::MagnetX => "magx",
            Channel::MagnetY => "magy",
            Channel::MagnetZ => "magz",
            Channel::Light => "light",
        }
    }

    /// Display label
    pub const fn label(&self) -> &'static str {
        match self {
            Channel::AccelX => "Acc-X",
            Channel::AccelY => "Acc-Y",
            Channel::AccelZ => "Acc-Z",
            Channel::MagnetX => "Mag-X",
            Channel::MagnetY => "Mag-Y",
            Channel::MagnetZ => "Mag-Z",
            Channel::Light => "L",
        }
    }

    const fn bit(&self) -> u8 {
        1 << (*self as u8)
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Immutable set of selected channels
///
/// ```rust
/// use gestura_core::channel::{Channel, ChannelSelection};
///
/// let selection = ChannelSelection::from_channels([Channel::Light, Channel::AccelY]);
/// let order: Vec<Channel> = selection.channels().collect();
/// assert_eq!(order, vec![Channel::AccelY, Channel::Light]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChannelSelection {
    bits: u8,
}

impl ChannelSelection {
    /// Selection with no channels
    pub const fn empty() -> Self {
        Self { bits: 0 }
    }

    /// Selection with every channel
    pub const fn all() -> Self {
        Self { bits: 0b0111_1111 }
    }

    /// Select whole sensors
    pub fn from_sensors(accel: bool, magnet: bool, light: bool) -> Self {
        let mut channels = Vec::with_capacity(7);
        if accel {
            channels.extend(Channel::ACCELEROMETER);
        }
        if magnet {
            channels.extend(Channel::MAGNETOMETER);
        }
        if light {
            channels.push(Channel::Light);
        }
        Self::from_channels(channels)
    }

    /// Select individual channels; duplicates and order are ignored
    pub fn from_channels<I>(channels: I) -> Self
    where
        I: IntoIterator<Item = Channel>,
    {
        let bits = channels
            .into_iter()
            .fold(0u8, |bits, channel| bits | channel.bit());
        Self { bits }
    }

    /// Copy of this selection with `channel` added
    pub const fn with(self, channel: Channel) -> Self {
        Self { bits: self.bits | channel.bit() }
    }

    /// Copy of this selection with `channel` removed
    pub const fn without(self, channel: Channel) -> Self {
        Self { bits: self.bits & !channel.bit() }
    }

    /// Whether `channel` is selected
    pub const fn contains(&self, channel: Channel) -> bool {
        self.bits & channel.bit() != 0
    }

    /// A selection is usable for training only when it is non-empty
    pub const fn is_valid(&self) -> bool {
        self.bits != 0
    }

    /// Number of selected channels
    pub const fn len(&self) -> usize {
        self.bits.count_ones() as usize
    }

    /// Whether nothing is selected
    pub const fn is_empty(&self) -> bool {
        self.bits == 0
    }

    /// Selected channels in canonical order
    pub fn channels(&self) -> impl Iterator<Item = Channel> + '_ {
        Channel::ALL.into_iter().filter(move |channel| self.contains(*channel))
    }

    /// Whether any accelerometer axis is selected
    pub fn accelerometer_selected(&self) -> bool {
        Channel::ACCELEROMETER.iter().any(|c| self.contains(*c))
    }

    /// Whether any magnetometer axis is selected
    pub fn magnetometer_selected(&self) -> bool {
        Channel::MAGNETOMETER.iter().any(|c| self.contains(*c))
    }

    /// Whether the light channel is selected
    pub fn light_selected(&self) -> bool {
        self.contains(Channel::Light)
    }
}

impl fmt::Display for ChannelSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keys: Vec<&str> = self.channels().map(|c| c.key()).collect();
        write!(f, "[{}]", keys.join(", "))
    }
}
