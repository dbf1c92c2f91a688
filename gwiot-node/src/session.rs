use core::fmt;

use no_std_net::Ipv6Addr;

/// A bound datagram endpoint as handed out by [`Transport::open`]
pub trait Datagram {
    type Error: fmt::Debug;

    fn send(&mut self, payload: &[u8]) -> Result<(), Self::Error>;

    /// Copy the next pending datagram into `buffer` and return its
    /// length, or 0 when nothing is pending
    fn receive(&mut self, buffer: &mut [u8]) -> Result<usize, Self::Error>;
}

/// The platform's IPv6/UDP stack. Fragmentation and reassembly are its
/// business; the node hands it one logical frame per send.
pub trait Transport {
    type Session: Datagram;
    type Error: fmt::Debug;

    fn open(
        &mut self,
        remote: Ipv6Addr,
        remote_port: u16,
        local_port: u16,
    ) -> Result<Self::Session, Self::Error>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    pub remote: Ipv6Addr,
    pub remote_port: u16,
    pub local_port: u16,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}]:{} local/remote port {}/{}",
            self.remote, self.remote_port, self.local_port, self.remote_port
        )
    }
}

/// The node's single session with its collector. Opened once after the
/// collector resolves and never rebound; any datagram read from it is
/// taken as the response to the most recent send.
pub struct TelemetrySession<S> {
    handle: S,
    endpoint: Endpoint,
}

impl<S: Datagram> TelemetrySession<S> {
    pub fn open<T>(transport: &mut T, endpoint: Endpoint) -> Result<Self, T::Error>
    where
        T: Transport<Session = S>,
    {
        let handle = transport.open(endpoint.remote, endpoint.remote_port, endpoint.local_port)?;
        log::info!("Created a connection with the server {endpoint}");
        Ok(Self { handle, endpoint })
    }

    pub fn endpoint(&self) -> Endpoint {
        self.endpoint
    }

    pub fn handle(&self) -> &S {
        &self.handle
    }

    /// Returns false when the transport refused the datagram
    pub fn send(&mut self, payload: &[u8]) -> bool {
        match self.handle.send(payload) {
            Ok(()) => true,
            Err(e) => {
                log::error!("Error sending to {}: {e:?}", self.endpoint.remote);
                false
            }
        }
    }

    /// Reads one pending datagram, bounded to its advertised length
    pub fn receive<'b>(&mut self, buffer: &'b mut [u8]) -> Option<&'b [u8]> {
        match self.handle.receive(buffer) {
            Ok(0) => None,
            Ok(len) => Some(&buffer[..len.min(buffer.len())]),
            Err(e) => {
                log::error!("Error receiving from {}: {e:?}", self.endpoint.remote);
                None
            }
        }
    }
}
