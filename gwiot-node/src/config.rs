use core::time::Duration;

// Values come from the `[gwiot-node]` section of cfg.toml at build time
#[toml_cfg::toml_config]
pub struct Config {
    #[default("contiki-udp-server.local")]
    collector: &'static str,
    #[default(3000)]
    remote_port: u16,
    #[default(3001)]
    local_port: u16,
    #[default(15)]
    send_interval_secs: u64,
    #[default(1000)]
    resolve_retry_millis: u64,
}

/// Runtime configuration of the report loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeConfig<'a> {
    /// Collector name or IPv6 literal
    pub collector: &'a str,
    pub remote_port: u16,
    pub local_port: u16,
    pub send_interval: Duration,
    /// How long a platform without a resolver signal waits before re-polling
    pub resolve_retry: Duration,
}

impl NodeConfig<'static> {
    pub fn from_build() -> Self {
        Self {
            collector: CONFIG.collector,
            remote_port: CONFIG.remote_port,
            local_port: CONFIG.local_port,
            send_interval: Duration::from_secs(CONFIG.send_interval_secs),
            resolve_retry: Duration::from_millis(CONFIG.resolve_retry_millis),
        }
    }
}

impl Default for NodeConfig<'static> {
    fn default() -> Self {
        Self::from_build()
    }
}
