//! Fault indicators. Faults are toggled rather than latched so an
//! intermittent fault stays visible across ticks.
use embedded_hal::digital::StatefulOutputPin;

use crate::ChannelId;

/// Best effort, non-blocking per channel fault signal. Failing to drive
/// the indicator is never an error for the caller.
pub trait FaultIndicator {
    /// Flip the channel's indicator, called each time a fault is observed
    fn toggle(&mut self, channel: ChannelId);

    /// Switch the channel's indicator on, used when activation fails at startup
    fn raise(&mut self, channel: ChannelId);
}

impl<T: FaultIndicator + ?Sized> FaultIndicator for &mut T {
    fn toggle(&mut self, channel: ChannelId) {
        (**self).toggle(channel)
    }

    fn raise(&mut self, channel: ChannelId) {
        (**self).raise(channel)
    }
}

/// One status LED per channel, driven through any `embedded-hal` output pin
pub struct LedIndicators<P: StatefulOutputPin> {
    leds: [P; 3],
}

impl<P: StatefulOutputPin> LedIndicators<P> {
    pub fn new(acceleration: P, light: P, climate: P) -> Self {
        Self {
            leds: [acceleration, light, climate],
        }
    }

    pub fn release(self) -> [P; 3] {
        self.leds
    }
}

impl<P: StatefulOutputPin> FaultIndicator for LedIndicators<P> {
    fn toggle(&mut self, channel: ChannelId) {
        if let Err(e) = self.leds[channel.index()].toggle() {
            log::warn!("Unable to toggle {} fault led {e:?}", channel.label());
        }
    }

    fn raise(&mut self, channel: ChannelId) {
        if let Err(e) = self.leds[channel.index()].set_high() {
            log::warn!("Unable to light {} fault led {e:?}", channel.label());
        }
    }
}
