use crate::{
    ChannelId, FaultIndicator, FixedPoint, Metric, Presence, Reading, Sampler, SensorChannel,
    SensorError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Climate {
    pub temperature: FixedPoint,
    pub humidity: FixedPoint,
}

/// Readings of every channel taken during one sampling tick. A fresh
/// snapshot is produced per tick; nothing carries over between ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    pub acceleration: Reading<[FixedPoint; 3]>,
    pub light: Reading<FixedPoint>,
    pub climate: Reading<Climate>,
}

impl Snapshot {
    /// Snapshot in which every channel faulted
    pub const fn faulted() -> Self {
        Self {
            acceleration: Reading::ErrorMarker,
            light: Reading::ErrorMarker,
            climate: Reading::ErrorMarker,
        }
    }

    /// Values of the healthy channels in wire order (x, y, z, light,
    /// temperature, humidity). Faulted channels contribute nothing.
    pub fn values(&self) -> impl Iterator<Item = FixedPoint> + '_ {
        let axes = self.acceleration.value().into_iter().flatten().copied();
        let light = self.light.value().into_iter().copied();
        let climate = self
            .climate
            .value()
            .into_iter()
            .flat_map(|c| [c.temperature, c.humidity]);
        axes.chain(light).chain(climate)
    }

    pub fn faults(&self) -> Presence {
        let mut faults = Presence::empty();
        faults.set(Presence::ACCELERATION, self.acceleration.is_error());
        faults.set(Presence::LIGHT, self.light.is_error());
        faults.set(Presence::CLIMATE, self.climate.is_error());
        faults
    }
}

/// Owns the node's sensor channels and their fault indicator.
///
/// Each channel is activated once, when the bank is built, and the
/// outcome is latched: a channel missing at startup is never retried.
/// A present channel that fails a later read goes down the same
/// error marker + indicator path for that tick.
pub struct SensorBank<A, L, C, F> {
    accelerometer: A,
    light: L,
    climate: C,
    indicator: F,
    present: Presence,
}

impl<A, L, C, F> SensorBank<A, L, C, F>
where
    A: SensorChannel,
    L: SensorChannel,
    C: SensorChannel,
    F: FaultIndicator,
{
    pub fn activate(mut accelerometer: A, mut light: L, mut climate: C, mut indicator: F) -> Self {
        let results = [
            (ChannelId::Acceleration, accelerometer.activate()),
            (ChannelId::Light, light.activate()),
            (ChannelId::Climate, climate.activate()),
        ];

        let mut present = Presence::empty();
        for (channel, result) in results {
            match result {
                Ok(()) => present.insert(channel.presence()),
                Err(e) => {
                    log::error!("{} sensor is NOT present! ({e})", channel.label());
                    indicator.raise(channel);
                }
            }
        }

        log::info!("Sensor channels present at startup: {present:?}");

        Self {
            accelerometer,
            light,
            climate,
            indicator,
            present,
        }
    }

    pub fn present(&self) -> Presence {
        self.present
    }

    pub fn indicator(&self) -> &F {
        &self.indicator
    }

    fn settle<T>(&mut self, channel: ChannelId, result: Result<T, SensorError>) -> Reading<T> {
        match result {
            Ok(value) => Reading::Value(value),
            Err(e) => {
                log::error!("{}: ERROR ({e})", channel.label());
                self.indicator.toggle(channel);
                Reading::ErrorMarker
            }
        }
    }
}

impl<A, L, C, F> Sampler for SensorBank<A, L, C, F>
where
    A: SensorChannel,
    L: SensorChannel,
    C: SensorChannel,
    F: FaultIndicator,
{
    fn sample(&mut self) -> Snapshot {
        let acceleration = gated(
            self.present,
            ChannelId::Acceleration,
            &mut self.accelerometer,
            |s| {
                Ok([
                    fixed(s, Metric::AccelX)?,
                    fixed(s, Metric::AccelY)?,
                    fixed(s, Metric::AccelZ)?,
                ])
            },
        );
        let acceleration = self.settle(ChannelId::Acceleration, acceleration);

        let light = gated(self.present, ChannelId::Light, &mut self.light, |s| {
            fixed(s, Metric::Light)
        });
        let light = self.settle(ChannelId::Light, light);

        let climate = gated(self.present, ChannelId::Climate, &mut self.climate, |s| {
            Ok(Climate {
                temperature: fixed(s, Metric::Temperature)?,
                humidity: fixed(s, Metric::Humidity)?,
            })
        });
        let climate = self.settle(ChannelId::Climate, climate);

        Snapshot {
            acceleration,
            light,
            climate,
        }
    }
}

fn gated<S, T>(
    present: Presence,
    channel: ChannelId,
    sensor: &mut S,
    read: impl FnOnce(&mut S) -> Result<T, SensorError>,
) -> Result<T, SensorError> {
    if present.contains(channel.presence()) {
        read(sensor)
    } else {
        Err(SensorError::NotPresent)
    }
}

fn fixed<S: SensorChannel>(sensor: &mut S, metric: Metric) -> Result<FixedPoint, SensorError> {
    Ok(FixedPoint::new(sensor.read(metric)?, metric.scale()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Scale;

    struct MockChannel {
        present: bool,
        failing_reads: u32,
        activations: u32,
    }

    impl MockChannel {
        fn present() -> Self {
            Self {
                present: true,
                failing_reads: 0,
                activations: 0,
            }
        }

        fn absent() -> Self {
            Self {
                present: false,
                ..Self::present()
            }
        }
    }

    impl SensorChannel for MockChannel {
        fn activate(&mut self) -> Result<(), SensorError> {
            self.activations += 1;
            if self.present {
                Ok(())
            } else {
                Err(SensorError::SetupError)
            }
        }

        fn read(&mut self, metric: Metric) -> Result<i32, SensorError> {
            if self.failing_reads > 0 {
                self.failing_reads -= 1;
                return Err(SensorError::ReadError);
            }
            Ok(match metric {
                Metric::AccelX => 12,
                Metric::AccelY => -4,
                Metric::AccelZ => 1020,
                Metric::Light => 312,
                Metric::Temperature => 2345,
                Metric::Humidity => 4120,
            })
        }
    }

    #[derive(Default)]
    struct Recorder {
        toggles: [u32; 3],
        raised: Presence,
    }

    impl FaultIndicator for Recorder {
        fn toggle(&mut self, channel: ChannelId) {
            self.toggles[channel.index()] += 1;
        }

        fn raise(&mut self, channel: ChannelId) {
            self.raised.insert(channel.presence());
        }
    }

    #[test]
    fn check_all_present_sample() {
        let mut bank = SensorBank::activate(
            MockChannel::present(),
            MockChannel::present(),
            MockChannel::present(),
            Recorder::default(),
        );
        assert_eq!(bank.present(), Presence::all());

        let snapshot = bank.sample();
        assert_eq!(
            snapshot.acceleration,
            Reading::Value([
                FixedPoint::new(12, Scale::Milli),
                FixedPoint::new(-4, Scale::Milli),
                FixedPoint::new(1020, Scale::Milli),
            ])
        );
        assert_eq!(snapshot.light, Reading::Value(FixedPoint::new(312, Scale::Unit)));
        assert_eq!(snapshot.faults(), Presence::empty());
        assert_eq!(snapshot.values().count(), 6);
        assert_eq!(bank.indicator().toggles, [0, 0, 0]);
    }

    #[test]
    fn check_absent_channel_latched_and_toggled_every_tick() {
        let mut bank = SensorBank::activate(
            MockChannel::present(),
            MockChannel::absent(),
            MockChannel::present(),
            Recorder::default(),
        );
        assert_eq!(bank.present(), Presence::ACCELERATION | Presence::CLIMATE);
        assert_eq!(bank.indicator().raised, Presence::LIGHT);

        for tick in 1..=3 {
            let snapshot = bank.sample();
            assert!(snapshot.light.is_error());
            assert_eq!(snapshot.faults(), Presence::LIGHT);
            assert_eq!(bank.indicator().toggles, [0, tick, 0]);
        }
        // never re-activated after the startup attempt
        assert_eq!(bank.light.activations, 1);
    }

    #[test]
    fn check_read_failure_treated_like_absence() {
        let mut climate = MockChannel::present();
        climate.failing_reads = 1;
        let mut bank = SensorBank::activate(
            MockChannel::present(),
            MockChannel::present(),
            climate,
            Recorder::default(),
        );

        let first = bank.sample();
        assert!(first.climate.is_error());
        assert_eq!(first.values().count(), 4);
        assert_eq!(bank.indicator().toggles, [0, 0, 1]);

        // the read is attempted again on the next tick
        let second = bank.sample();
        assert!(!second.climate.is_error());
        assert_eq!(bank.indicator().toggles, [0, 0, 1]);
    }

    #[test]
    fn check_values_skip_faulted_channels() {
        let snapshot = Snapshot {
            acceleration: Reading::ErrorMarker,
            light: Reading::Value(FixedPoint::new(5, Scale::Unit)),
            climate: Reading::Value(Climate {
                temperature: FixedPoint::new(1, Scale::Centi),
                humidity: FixedPoint::new(2, Scale::Centi),
            }),
        };
        let mut values = snapshot.values();
        assert_eq!(values.next(), Some(FixedPoint::new(5, Scale::Unit)));
        assert_eq!(values.next(), Some(FixedPoint::new(1, Scale::Centi)));
        assert_eq!(values.next(), Some(FixedPoint::new(2, Scale::Centi)));
        assert_eq!(values.next(), None);
        assert_eq!(Snapshot::faulted().values().count(), 0);
    }
}
