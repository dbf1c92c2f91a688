//! Sensor lib defining the channel capability interface consumed
//! by the gw-iot report loop, along with the fixed point reading types,
//! fault indicators and the [`SensorBank`] that owns every channel.
//!
//! The reference board carries three independently failing channels:
//!
//! 1. a 3-axis accelerometer, read in milli-g
//! 2. an ambient light sensor, read in lux
//! 3. a temperature / relative humidity sensor, read in hundredths
//!    of a degree C and hundredths of a percent
//!
//! Bus drivers are not part of this crate. Anything implementing
//! [`SensorChannel`] can be handed to a bank, which activates each
//! channel once at startup and latches the result as [`Presence`].
#![cfg_attr(not(feature = "std"), no_std)]

mod bank;
mod fixed;
mod indicator;

pub use bank::{Climate, SensorBank, Snapshot};
pub use fixed::{FixedPoint, Scale};
pub use indicator::{FaultIndicator, LedIndicators};

use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    #[error("Sensor not present")]
    NotPresent,
    #[error("Read Error")]
    ReadError,
    #[error("Setup Error")]
    SetupError,
    #[error("Unsupported metric {0:?}")]
    UnsupportedMetric(Metric),
}

/// Independently present sensor channels of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelId {
    Acceleration,
    Light,
    Climate,
}

impl ChannelId {
    pub const ALL: [ChannelId; 3] = [ChannelId::Acceleration, ChannelId::Light, ChannelId::Climate];

    pub const fn index(self) -> usize {
        match self {
            ChannelId::Acceleration => 0,
            ChannelId::Light => 1,
            ChannelId::Climate => 2,
        }
    }

    /// Name used when reporting faults on this channel
    pub const fn label(self) -> &'static str {
        match self {
            ChannelId::Acceleration => "XYZ Acceleration",
            ChannelId::Light => "Light",
            ChannelId::Climate => "Temperature/Humidity",
        }
    }

    pub const fn presence(self) -> Presence {
        match self {
            ChannelId::Acceleration => Presence::ACCELERATION,
            ChannelId::Light => Presence::LIGHT,
            ChannelId::Climate => Presence::CLIMATE,
        }
    }
}

/// Individual quantities a channel can be asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    AccelX,
    AccelY,
    AccelZ,
    Light,
    Temperature,
    Humidity,
}

impl Metric {
    /// Fixed point convention of the raw value returned by [`SensorChannel::read`]
    pub const fn scale(self) -> Scale {
        match self {
            Metric::AccelX | Metric::AccelY | Metric::AccelZ => Scale::Milli,
            Metric::Light => Scale::Unit,
            Metric::Temperature | Metric::Humidity => Scale::Centi,
        }
    }

    pub const fn channel(self) -> ChannelId {
        match self {
            Metric::AccelX | Metric::AccelY | Metric::AccelZ => ChannelId::Acceleration,
            Metric::Light => ChannelId::Light,
            Metric::Temperature | Metric::Humidity => ChannelId::Climate,
        }
    }
}

bitflags::bitflags! {
    /// Set of channels, used both for presence latched at startup
    /// and for indicator state
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Presence: u8 {
        const ACCELERATION = 0b001;
        const LIGHT = 0b010;
        const CLIMATE = 0b100;
    }
}

/// Per channel sample: either a value or the marker recorded
/// when the channel is absent or failed to read this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reading<T> {
    Value(T),
    ErrorMarker,
}

impl<T> Reading<T> {
    pub fn value(&self) -> Option<&T> {
        match self {
            Reading::Value(v) => Some(v),
            Reading::ErrorMarker => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Reading::ErrorMarker)
    }
}

/// Capability interface of one sensor channel
pub trait SensorChannel {
    /// Bring the sensor up. Called exactly once, at startup
    fn activate(&mut self) -> Result<(), SensorError>;

    /// Read one metric as a raw value in that metric's [`Scale`]
    fn read(&mut self, metric: Metric) -> Result<i32, SensorError>;
}

impl<T: SensorChannel + ?Sized> SensorChannel for &mut T {
    fn activate(&mut self) -> Result<(), SensorError> {
        (**self).activate()
    }

    fn read(&mut self, metric: Metric) -> Result<i32, SensorError> {
        (**self).read(metric)
    }
}

/// Anything that can produce a fresh [`Snapshot`] once per sampling tick
pub trait Sampler {
    fn sample(&mut self) -> Snapshot;
}
