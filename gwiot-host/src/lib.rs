//! Host build of a gw-iot telemetry node. Runs the `gwiot-node` report
//! loop on a tokio runtime with:
//!
//! 1. [`SystemNameService`], an asynchronous name service backed by the
//!    system resolver, with a TTL cache and negative caching. Query
//!    completion wakes the loop through a [`tokio::sync::Notify`].
//! 2. [`UdpTransport`], an IPv6 UDP transport. The socket's readiness is
//!    the loop's data-available signal.
//! 3. [`SimulatedChannel`]s standing in for the sensor bus, and a
//!    [`LogIndicator`] standing in for the status LEDs.
//!
//! [`drive`] is the scheduler: it turns whatever the loop suspended on
//! into a tokio wait and feeds the resulting [`gwiot_node::Wake`] back.

mod config;
mod dns;
mod driver;
mod sim;
mod udp;

pub use config::HostConfig;
pub use dns::SystemNameService;
pub use driver::{drive, HostNode};
pub use sim::{LogIndicator, SimulatedChannel};
pub use udp::{UdpSession, UdpTransport};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HostError {
    #[error("I/O Error")]
    Io(#[from] std::io::Error),
    #[error("No tokio runtime")]
    Runtime(#[from] tokio::runtime::TryCurrentError),
}

pub(crate) fn to_std(addr: gwiot_node::Ipv6Addr) -> std::net::Ipv6Addr {
    std::net::Ipv6Addr::from(addr.octets())
}

pub(crate) fn from_std(addr: std::net::Ipv6Addr) -> gwiot_node::Ipv6Addr {
    gwiot_node::Ipv6Addr::from(addr.octets())
}
