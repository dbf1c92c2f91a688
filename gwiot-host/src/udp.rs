use std::{
    io::ErrorKind,
    net::{Ipv6Addr, SocketAddr, SocketAddrV6},
    sync::Arc,
};

use gwiot_node::{Datagram, Transport};
use tokio::net::UdpSocket;

use crate::HostError;

/// Opens connected IPv6 UDP sockets. Sockets are dual stack, so an
/// IPv4-mapped collector address reaches an IPv4 collector.
#[derive(Debug, Default)]
pub struct UdpTransport;

impl Transport for UdpTransport {
    type Session = UdpSession;
    type Error = HostError;

    fn open(
        &mut self,
        remote: gwiot_node::Ipv6Addr,
        remote_port: u16,
        local_port: u16,
    ) -> Result<UdpSession, HostError> {
        let local = SocketAddrV6::new(Ipv6Addr::UNSPECIFIED, local_port, 0, 0);
        let remote = SocketAddrV6::new(crate::to_std(remote), remote_port, 0, 0);

        let socket = std::net::UdpSocket::bind(local)?;
        socket.connect(remote)?;
        socket.set_nonblocking(true)?;
        let socket = UdpSocket::from_std(socket)?;

        if let Ok(SocketAddr::V6(bound)) = socket.local_addr() {
            log::info!("Client bound to {bound}");
        }

        Ok(UdpSession {
            socket: Arc::new(socket),
        })
    }
}

pub struct UdpSession {
    socket: Arc<UdpSocket>,
}

impl UdpSession {
    /// Shared handle used by the driver to wait for readiness.
    /// [`Datagram::send`] does not wait, so await
    /// [`UdpSocket::writable`] before sending on a fresh session.
    pub fn socket(&self) -> Arc<UdpSocket> {
        self.socket.clone()
    }

    pub fn local_addr(&self) -> Result<SocketAddr, HostError> {
        Ok(self.socket.local_addr()?)
    }
}

impl Datagram for UdpSession {
    type Error = HostError;

    fn send(&mut self, payload: &[u8]) -> Result<(), HostError> {
        self.socket.try_send(payload)?;
        Ok(())
    }

    fn receive(&mut self, buffer: &mut [u8]) -> Result<usize, HostError> {
        match self.socket.try_recv(buffer) {
            Ok(len) => Ok(len),
            Err(e) if e.kind() == ErrorKind::WouldBlock => Ok(0),
            Err(e) => Err(e.into()),
        }
    }
}
