use std::time::Duration;

use gwiot_node::{Instant, NameService, ResolveAndReport, Suspend, Wake};
use gwiot_sensor::{Sampler, SensorBank};
use tokio::{sync::Notify, time};

use crate::{LogIndicator, SimulatedChannel, SystemNameService, UdpTransport};

pub type HostNode<'a> = ResolveAndReport<
    'a,
    SystemNameService,
    UdpTransport,
    SensorBank<SimulatedChannel, SimulatedChannel, SimulatedChannel, LogIndicator>,
>;

/// Runs the node for the rest of the process: each time the loop
/// suspends, wait for the matching tokio event and resume it. There is
/// no shutdown path; dropping the future is the only way out.
///
/// `resolved` is the name service's completion signal.
pub async fn drive<N, B>(node: &mut ResolveAndReport<'_, N, UdpTransport, B>, resolved: &Notify)
where
    N: NameService,
    B: Sampler,
{
    let start = time::Instant::now();
    let now = || {
        let elapsed = start.elapsed().as_millis();
        Instant::from_millis(u64::try_from(elapsed).unwrap_or(u64::MAX))
    };

    let mut wake = Wake::at(now());
    loop {
        wake = match node.resume(wake) {
            Suspend::Resolution => {
                // the retry bound only matters if a completion is lost
                tokio::select! {
                    _ = resolved.notified() => Wake::resolver_done(now()),
                    _ = time::sleep(node.config().resolve_retry) => Wake::at(now()),
                }
            }
            Suspend::Yield => {
                time::sleep(node.config().resolve_retry).await;
                Wake::at(now())
            }
            Suspend::Deadline(deadline) => {
                let at = start + Duration::from_millis(deadline.as_millis());
                match node.session().map(|s| s.handle().socket()) {
                    Some(socket) => {
                        let wake = tokio::select! {
                            _ = time::sleep_until(at) => Wake::at(now()),
                            ready = socket.readable() => {
                                if let Err(e) = ready {
                                    log::error!("Socket error {e:?}");
                                    time::sleep_until(at).await;
                                    Wake::at(now())
                                } else {
                                    Wake::data_available(now())
                                }
                            }
                        };
                        // try_send reports WouldBlock until the reactor has
                        // seen the socket writable
                        if wake.now >= deadline {
                            if let Err(e) = socket.writable().await {
                                log::error!("Socket error {e:?}");
                            }
                        }
                        wake
                    }
                    None => {
                        time::sleep_until(at).await;
                        Wake::at(now())
                    }
                }
            }
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gwiot_node::{NodeConfig, HEADER};
    use gwiot_sensor::ChannelId;
    use std::net::SocketAddr;
    use tokio::net::UdpSocket;

    fn sensors(
        light: bool,
    ) -> SensorBank<SimulatedChannel, SimulatedChannel, SimulatedChannel, LogIndicator> {
        SensorBank::activate(
            SimulatedChannel::new(ChannelId::Acceleration, true),
            SimulatedChannel::new(ChannelId::Light, light),
            SimulatedChannel::new(ChannelId::Climate, true),
            LogIndicator::default(),
        )
    }

    async fn next_frame(collector: &UdpSocket) -> (String, SocketAddr) {
        let mut buffer = [0u8; 128];
        let (len, from) = time::timeout(Duration::from_secs(5), collector.recv_from(&mut buffer))
            .await
            .expect("frame within timeout")
            .expect("recv");
        (String::from_utf8_lossy(&buffer[..len]).into_owned(), from)
    }

    #[tokio::test]
    async fn check_node_reports_to_collector() {
        let collector = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let port = collector.local_addr().unwrap().port();

        let dns = SystemNameService::new(Duration::from_secs(60), Duration::from_secs(1)).unwrap();
        let resolved = dns.completion();
        let config = NodeConfig {
            collector: "::ffff:127.0.0.1",
            remote_port: port,
            local_port: 0,
            send_interval: Duration::from_millis(100),
            resolve_retry: Duration::from_millis(50),
        };
        let mut node: HostNode<'static> =
            ResolveAndReport::new(config, dns, UdpTransport, sensors(false));

        let task = tokio::spawn(async move { drive(&mut node, &resolved).await });

        let (header, from) = next_frame(&collector).await;
        assert_eq!(header, HEADER);

        collector.send_to(b"ok", from).await.unwrap();

        let (first, _) = next_frame(&collector).await;
        assert!(first.starts_with("1, "), "{first}");
        // accel x/y/z, temperature and humidity; the light slot is skipped
        assert_eq!(first.split(", ").count(), 6, "{first}");

        // the response triggers no resend, the next frame is the next tick
        let (second, _) = next_frame(&collector).await;
        assert!(second.starts_with("2, "), "{second}");

        task.abort();
    }

    #[tokio::test]
    async fn check_node_resolves_localhost() {
        // dual stack, so it hears the node whether localhost maps to ::1 or 127.0.0.1
        let collector = UdpSocket::bind("[::]:0").await.unwrap();
        let port = collector.local_addr().unwrap().port();

        let dns = SystemNameService::new(Duration::from_secs(60), Duration::from_secs(1)).unwrap();
        let resolved = dns.completion();
        let config = NodeConfig {
            collector: "localhost",
            remote_port: port,
            local_port: 0,
            send_interval: Duration::from_millis(100),
            resolve_retry: Duration::from_millis(50),
        };
        let mut node: HostNode<'static> =
            ResolveAndReport::new(config, dns, UdpTransport, sensors(true));

        let task = tokio::spawn(async move { drive(&mut node, &resolved).await });

        let (header, _) = next_frame(&collector).await;
        assert_eq!(header, HEADER);
        let (first, _) = next_frame(&collector).await;
        assert_eq!(first.split(", ").count(), 7, "{first}");

        task.abort();
    }
}
