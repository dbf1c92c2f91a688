use gwiot_sensor::Presence;
use std::time::Duration;

// Values come from the `[gwiot-host]` section of cfg.toml at build time
#[toml_cfg::toml_config]
pub struct Config {
    #[default(300)]
    cache_ttl_secs: u64,
    #[default(5)]
    negative_ttl_secs: u64,
    #[default(true)]
    accelerometer: bool,
    #[default(true)]
    light: bool,
    #[default(true)]
    climate: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct HostConfig {
    /// How long a resolved address stays cached
    pub cache_ttl: Duration,
    /// How long a failed lookup is remembered before it is queried again
    pub negative_ttl: Duration,
    /// Simulated channels that answer activation
    pub present: Presence,
}

impl HostConfig {
    pub fn from_build() -> Self {
        let mut present = Presence::empty();
        present.set(Presence::ACCELERATION, CONFIG.accelerometer);
        present.set(Presence::LIGHT, CONFIG.light);
        present.set(Presence::CLIMATE, CONFIG.climate);

        Self {
            cache_ttl: Duration::from_secs(CONFIG.cache_ttl_secs),
            negative_ttl: Duration::from_secs(CONFIG.negative_ttl_secs),
            present,
        }
    }
}
