//! The node's root task: resolve the collector, open the session once,
//! then alternate between timer driven sends and response logging for
//! the rest of the process lifetime. Nothing here is fatal and there is
//! no shutdown path.
use gwiot_sensor::Sampler;

use crate::{
    session::Datagram, Endpoint, Instant, NameService, NodeConfig, PayloadEncoder, PeriodicTimer,
    ResolutionState, ResolverAdapter, TelemetrySession, Transport,
};

/// Size of the buffer inbound responses are read into
pub const RX_BUFFER_LEN: usize = 128;

/// What woke the task. The timer is not a flag: expiry is judged from
/// `now` against the armed deadline on every wake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Wake {
    pub now: Instant,
    pub resolver_done: bool,
    pub data_available: bool,
}

impl Wake {
    pub fn at(now: Instant) -> Self {
        Self {
            now,
            ..Self::default()
        }
    }

    pub fn resolver_done(now: Instant) -> Self {
        Self {
            now,
            resolver_done: true,
            data_available: false,
        }
    }

    pub fn data_available(now: Instant) -> Self {
        Self {
            now,
            resolver_done: false,
            data_available: true,
        }
    }
}

/// Where the task waits until its next [`ResolveAndReport::resume`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Suspend {
    /// A query is in flight: resume on the name service's completion
    /// signal. Platforms without one treat this as [`Suspend::Yield`].
    Resolution,
    /// Yield to the scheduler and resume on any event
    Yield,
    /// Session active: resume at the deadline or when data arrives
    Deadline(Instant),
}

enum Phase<S> {
    AwaitingAddress,
    /// Address resolved and frozen, session not open yet
    Opening(Endpoint),
    Active {
        session: TelemetrySession<S>,
        timer: PeriodicTimer,
    },
}

/// State record of the resolve-and-report task. Everything that lives
/// across suspension points is here and only touched from `resume`.
pub struct ResolveAndReport<'a, N, T: Transport, B> {
    config: NodeConfig<'a>,
    resolver: ResolverAdapter<N>,
    transport: T,
    sensors: B,
    encoder: PayloadEncoder,
    sequence: u32,
    responses: u32,
    phase: Phase<T::Session>,
    rx: [u8; RX_BUFFER_LEN],
    rx_len: usize,
}

impl<'a, N, T, B> ResolveAndReport<'a, N, T, B>
where
    N: NameService,
    T: Transport,
    B: Sampler,
{
    pub fn new(config: NodeConfig<'a>, names: N, transport: T, sensors: B) -> Self {
        log::info!(
            "Reporting to {} every {:?}",
            config.collector,
            config.send_interval
        );
        Self {
            config,
            resolver: ResolverAdapter::new(names),
            transport,
            sensors,
            encoder: PayloadEncoder::new(),
            sequence: 0,
            responses: 0,
            phase: Phase::AwaitingAddress,
            rx: [0u8; RX_BUFFER_LEN],
            rx_len: 0,
        }
    }

    pub fn config(&self) -> &NodeConfig<'a> {
        &self.config
    }

    pub fn resolution(&self) -> ResolutionState {
        self.resolver.state()
    }

    pub fn names(&self) -> &N {
        self.resolver.service()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn sensors(&self) -> &B {
        &self.sensors
    }

    pub fn session(&self) -> Option<&TelemetrySession<T::Session>> {
        match &self.phase {
            Phase::Active { session, .. } => Some(session),
            _ => None,
        }
    }

    /// Sequence id the next frame will carry
    pub fn sequence(&self) -> u32 {
        self.sequence
    }

    /// Number of responses logged so far
    pub fn responses(&self) -> u32 {
        self.responses
    }

    /// Bytes of the most recent response, as logged
    pub fn last_response(&self) -> &[u8] {
        &self.rx[..self.rx_len]
    }

    pub fn resume(&mut self, wake: Wake) -> Suspend {
        if matches!(self.phase, Phase::AwaitingAddress) {
            match self.resolver.poll(self.config.collector) {
                ResolutionState::Resolved(remote) => {
                    self.phase = Phase::Opening(Endpoint {
                        remote,
                        remote_port: self.config.remote_port,
                        local_port: self.config.local_port,
                    });
                }
                ResolutionState::Resolving => return Suspend::Resolution,
                ResolutionState::Failed | ResolutionState::Unresolved => {
                    log::warn!("Can't get connection address");
                    return Suspend::Yield;
                }
            }
        }

        if let Phase::Opening(endpoint) = self.phase {
            return match TelemetrySession::open(&mut self.transport, endpoint) {
                Ok(session) => {
                    let timer = PeriodicTimer::start(wake.now, self.config.send_interval);
                    self.phase = Phase::Active { session, timer };
                    Suspend::Deadline(timer.deadline())
                }
                Err(e) => {
                    log::error!("Unable to open session to {endpoint}: {e:?}");
                    Suspend::Yield
                }
            };
        }

        match &mut self.phase {
            Phase::Active { session, timer } => {
                if timer.expired(wake.now) {
                    send_frame(
                        &mut self.sensors,
                        &mut self.encoder,
                        &mut self.sequence,
                        session,
                    );
                    timer.rearm();
                }
                if wake.data_available {
                    if let Some(len) = log_response(session, &mut self.rx) {
                        self.rx_len = len;
                        self.responses = self.responses.wrapping_add(1);
                    }
                }
                Suspend::Deadline(timer.deadline())
            }
            _ => Suspend::Yield,
        }
    }
}

fn send_frame<B: Sampler, S: Datagram>(
    sensors: &mut B,
    encoder: &mut PayloadEncoder,
    sequence: &mut u32,
    session: &mut TelemetrySession<S>,
) {
    let snapshot = sensors.sample();
    match encoder.encode(*sequence, &snapshot) {
        Ok(frame) => {
            log::info!(
                "Client sending to {} (msg: {frame})",
                session.endpoint().remote
            );
            // delivery is never acknowledged at this layer
            *sequence = sequence.wrapping_add(1);
            session.send(frame.as_bytes());
        }
        Err(e) => log::error!("Unable to encode frame {}: {e}", *sequence),
    }
}

/// Returns the length of the response read into `rx`
fn log_response<S: Datagram>(session: &mut TelemetrySession<S>, rx: &mut [u8]) -> Option<usize> {
    let data = session.receive(rx)?;
    match core::str::from_utf8(data) {
        Ok(text) => log::info!("Response from the server: '{text}'"),
        Err(_) => log::info!("Response from the server: {data:?}"),
    }
    Some(data.len())
}
