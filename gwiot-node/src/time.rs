use core::{
    ops::{Add, Sub},
    time::Duration,
};

/// Monotonic milliseconds since the node started
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Instant(u64);

impl Instant {
    pub const fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    pub const fn as_millis(self) -> u64 {
        self.0
    }
}

impl Add<Duration> for Instant {
    type Output = Instant;

    fn add(self, rhs: Duration) -> Instant {
        let millis = u64::try_from(rhs.as_millis()).unwrap_or(u64::MAX);
        Instant(self.0.saturating_add(millis))
    }
}

impl Sub for Instant {
    type Output = Duration;

    fn sub(self, rhs: Instant) -> Duration {
        Duration::from_millis(self.0.saturating_sub(rhs.0))
    }
}

/// Periodic timer rearmed relative to its previous deadline, so time
/// spent handling an expiry never pushes later deadlines back
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodicTimer {
    deadline: Instant,
    interval: Duration,
}

impl PeriodicTimer {
    pub fn start(now: Instant, interval: Duration) -> Self {
        Self {
            deadline: now + interval,
            interval,
        }
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn expired(&self, now: Instant) -> bool {
        now >= self.deadline
    }

    pub fn rearm(&mut self) {
        self.deadline = self.deadline + self.interval;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_rearm_is_drift_free() {
        let mut timer = PeriodicTimer::start(Instant::from_millis(100), Duration::from_secs(15));
        assert_eq!(timer.deadline(), Instant::from_millis(15_100));
        assert!(!timer.expired(Instant::from_millis(15_099)));

        // handled 700ms late, next deadline still counts from the old one
        assert!(timer.expired(Instant::from_millis(15_800)));
        timer.rearm();
        assert_eq!(timer.deadline(), Instant::from_millis(30_100));

        for _ in 0..100 {
            timer.rearm();
        }
        assert_eq!(timer.deadline(), Instant::from_millis(30_100 + 100 * 15_000));
    }

    #[test]
    fn check_instant_arithmetic_saturates() {
        let late = Instant::from_millis(u64::MAX - 1) + Duration::from_secs(1);
        assert_eq!(late, Instant::from_millis(u64::MAX));
        assert_eq!(
            Instant::from_millis(5) - Instant::from_millis(10),
            Duration::ZERO
        );
        assert_eq!(
            Instant::from_millis(2500) - Instant::from_millis(500),
            Duration::from_secs(2)
        );
    }
}
