//! Stand-ins for the sensor bus and status LEDs when running on a host
use gwiot_sensor::{ChannelId, FaultIndicator, Metric, Presence, SensorChannel, SensorError};

/// Sensor channel producing a slow triangle wave around a plausible
/// resting value for each metric
pub struct SimulatedChannel {
    channel: ChannelId,
    present: bool,
    tick: u32,
}

impl SimulatedChannel {
    pub fn new(channel: ChannelId, present: bool) -> Self {
        Self {
            channel,
            present,
            tick: 0,
        }
    }

    fn wave(&self, amplitude: i32) -> i32 {
        // period of 16 reads
        let phase = (self.tick % 16) as i32;
        let tri = if phase < 8 { phase } else { 16 - phase };
        (tri - 4) * amplitude / 4
    }
}

impl SensorChannel for SimulatedChannel {
    fn activate(&mut self) -> Result<(), SensorError> {
        if self.present {
            Ok(())
        } else {
            Err(SensorError::NotPresent)
        }
    }

    fn read(&mut self, metric: Metric) -> Result<i32, SensorError> {
        if metric.channel() != self.channel {
            return Err(SensorError::UnsupportedMetric(metric));
        }
        self.tick = self.tick.wrapping_add(1);
        Ok(match metric {
            Metric::AccelX => 12 + self.wave(20),
            Metric::AccelY => -4 + self.wave(20),
            Metric::AccelZ => 1000 + self.wave(40),
            Metric::Light => 300 + self.wave(120),
            Metric::Temperature => 2250 + self.wave(150),
            Metric::Humidity => 4100 + self.wave(300),
        })
    }
}

/// Fault "LEDs" reported through the log
#[derive(Debug, Default)]
pub struct LogIndicator {
    lit: Presence,
}

impl LogIndicator {
    pub fn lit(&self) -> Presence {
        self.lit
    }
}

impl FaultIndicator for LogIndicator {
    fn toggle(&mut self, channel: ChannelId) {
        self.lit.toggle(channel.presence());
        let state = if self.lit.contains(channel.presence()) {
            "on"
        } else {
            "off"
        };
        log::warn!("{} fault indicator {state}", channel.label());
    }

    fn raise(&mut self, channel: ChannelId) {
        self.lit.insert(channel.presence());
        log::warn!("{} fault indicator on", channel.label());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_channel_only_serves_its_metrics() {
        let mut light = SimulatedChannel::new(ChannelId::Light, true);
        assert!(light.activate().is_ok());
        assert!(light.read(Metric::Light).is_ok());
        assert_eq!(
            light.read(Metric::Humidity),
            Err(SensorError::UnsupportedMetric(Metric::Humidity))
        );
    }

    #[test]
    fn check_absent_channel_fails_activation() {
        let mut climate = SimulatedChannel::new(ChannelId::Climate, false);
        assert_eq!(climate.activate(), Err(SensorError::NotPresent));
    }

    #[test]
    fn check_values_stay_near_rest() {
        let mut climate = SimulatedChannel::new(ChannelId::Climate, true);
        for _ in 0..64 {
            let t = climate.read(Metric::Temperature).unwrap();
            assert!((2100..=2400).contains(&t), "{t}");
        }
    }

    #[test]
    fn check_indicator_toggles() {
        let mut leds = LogIndicator::default();
        leds.raise(ChannelId::Light);
        leds.toggle(ChannelId::Light);
        leds.toggle(ChannelId::Climate);
        assert_eq!(leds.lit(), Presence::CLIMATE);
    }
}
