//! Sensor sample records
//!
//! These are the flat per-sensor records the transport layer hands to
//! `SensorStream::put`, plus the synchronized `CombinedSample` produced by
//! the combined stream. `Default` is the all-zero reading a stream reports
//! before its first real sample.

use crate::channel::Channel;

/// Common shape information for plotting and series extraction
pub trait SensorSample: Clone + Default + Send + 'static {
    /// Human-readable label for each axis, in `values()` order
    const LABELS: &'static [&'static str];

    /// Axis values in `LABELS` order
    fn values(&self) -> Vec<f32>;
}

/// Three-axis accelerometer reading in g
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AccelerometerSample {
    /// X axis
    pub x: f32,
    /// Y axis
    pub y: f32,
    /// Z axis
    pub z: f32,
}

impl AccelerometerSample {
    /// Reading from its three axes
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

impl SensorSample for AccelerometerSample {
    const LABELS: &'static [&'static str] = &["Acc-X", "Acc-Y", "Acc-Z"];

    fn values(&self) -> Vec<f32> {
        vec![self.x, self.y, self.z]
    }
}

/// Three-axis magnetometer reading
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MagnetometerSample {
    /// X axis
    pub x: f32,
    /// Y axis
    pub y: f32,
    /// Z axis
    pub z: f32,
}

impl MagnetometerSample {
    /// Reading from its three axes
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

impl SensorSample for MagnetometerSample {
    const LABELS: &'static [&'static str] = &["Mag-X", "Mag-Y", "Mag-Z"];

    fn values(&self) -> Vec<f32> {
        vec![self.x, self.y, self.z]
    }
}

/// Ambient light level
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LightSample {
    /// Light level
    pub l: f32,
}

impl LightSample {
    /// Reading from a light level
    pub const fn new(l: f32) -> Self {
        Self { l }
    }
}

impl SensorSample for LightSample {
    const LABELS: &'static [&'static str] = &["L"];

    fn values(&self) -> Vec<f32> {
        vec![self.l]
    }
}

/// One synchronized reading across every sensor
///
/// Values are mutually consistent only up to "most recent known": each field
/// is the latest value its sensor had delivered when the record was built.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombinedSample {
    /// Accelerometer X
    pub accx: f32,
    /// Accelerometer Y
    pub accy: f32,
    /// Accelerometer Z
    pub accz: f32,
    /// Magnetometer X
    pub magx: f32,
    /// Magnetometer Y
    pub magy: f32,
    /// Magnetometer Z
    pub magz: f32,
    /// Light level
    pub light: f32,
}

impl CombinedSample {
    /// Combine the latest reading of each sensor
    pub fn from_parts(
        accel: &AccelerometerSample,
        magnet: &MagnetometerSample,
        light: &LightSample,
    ) -> Self {
        Self {
            accx: accel.x,
            accy: accel.y,
            accz: accel.z,
            magx: magnet.x,
            magy: magnet.y,
            magz: magnet.z,
            light: light.l,
        }
    }

    /// Project a single channel
    pub fn value(&self, channel: Channel) -> f32 {
        match channel {
            Channel::AccelX => self.accx,
            Channel::AccelY => self.accy,
            Channel::AccelZ => self.accz,
            Channel::MagnetX => self.magx,
            Channel::MagnetY => self.magy,
            Channel::MagnetZ => self.magz,
            Channel::Light => self.light,
        }
    }
}

impl SensorSample for CombinedSample {
    const LABELS: &'static [&'static str] =
        &["Acc-X", "Acc-Y", "Acc-Z", "Mag-X", "Mag-Y", "Mag-Z", "L"];

    fn values(&self) -> Vec<f32> {
        Channel::ALL.iter().map(|channel| self.value(*channel)).collect()
    }
}
