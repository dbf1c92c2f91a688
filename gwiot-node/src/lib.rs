//! Resolve-and-report core of a gw-iot telemetry node.
//!
//! The node resolves the collector's name, opens a single UDP session to
//! it and then, once per send interval, samples its sensors and pushes a
//! small ASCII frame to the collector. Anything the collector sends back
//! is logged as a response.
//!
//! The crate is `no_std` and allocation free. The name service, the
//! datagram transport and the sensors are collaborators plugged in
//! through [`NameService`], [`Transport`] and [`gwiot_sensor::Sampler`].
//! Execution is cooperative: the platform calls
//! [`ResolveAndReport::resume`] with a [`Wake`] describing what fired and
//! suspends the task until whatever the returned [`Suspend`] names.
//!
//! ```ignore
//! let mut node = ResolveAndReport::new(NodeConfig::from_build(), dns, udp, sensors);
//! let mut wake = Wake::at(clock.now());
//! loop {
//!     wake = match node.resume(wake) {
//!         Suspend::Resolution => platform.wait_resolver(),
//!         Suspend::Yield => platform.yield_now(),
//!         Suspend::Deadline(at) => platform.wait_until_or_data(at),
//!     };
//! }
//! ```
#![cfg_attr(not(feature = "std"), no_std)]

mod config;
mod encoder;
mod report;
mod resolver;
mod session;
mod time;

pub use config::NodeConfig;
pub use encoder::{EncodeError, PayloadEncoder, HEADER, MAX_PAYLOAD_LEN};
pub use report::{ResolveAndReport, Suspend, Wake, RX_BUFFER_LEN};
pub use resolver::{Lookup, NameService, ResolutionState, ResolverAdapter};
pub use session::{Datagram, Endpoint, TelemetrySession, Transport};
pub use time::{Instant, PeriodicTimer};

pub use no_std_net::Ipv6Addr;
