use gwiot_host::{
    drive, HostConfig, LogIndicator, SimulatedChannel, SystemNameService, UdpTransport,
};
use gwiot_node::{NodeConfig, ResolveAndReport};
use gwiot_sensor::{ChannelId, Presence, SensorBank};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // optional override of the built-in collector name
    let collector = std::env::args().nth(1);
    let build = NodeConfig::from_build();
    let config = NodeConfig {
        collector: collector.as_deref().unwrap_or(build.collector),
        ..build
    };
    let host = HostConfig::from_build();

    let dns = SystemNameService::new(host.cache_ttl, host.negative_ttl).map_err(|e| {
        log::error!("Error creating name service {e:}");
        e
    })?;
    let resolved = dns.completion();

    let sensors = SensorBank::activate(
        SimulatedChannel::new(
            ChannelId::Acceleration,
            host.present.contains(Presence::ACCELERATION),
        ),
        SimulatedChannel::new(ChannelId::Light, host.present.contains(Presence::LIGHT)),
        SimulatedChannel::new(ChannelId::Climate, host.present.contains(Presence::CLIMATE)),
        LogIndicator::default(),
    );

    log::info!("UDP client process started");

    let mut node = ResolveAndReport::new(config, dns, UdpTransport, sensors);
    drive(&mut node, &resolved).await;

    Ok(())
}
