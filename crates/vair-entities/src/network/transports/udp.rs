use std::io::ErrorKind;
use std::net::{SocketAddr, SocketAddrV4, UdpSocket};
use std::time::Duration;

use super::{DatagramTransport, NetworkError};

/// UDP socket bound to one local IPv4 address
pub struct UdpTransport {
    socket: UdpSocket,
    local_addr: SocketAddrV4,
}

impl UdpTransport {
    /// Binds the socket and sets its read timeout
    pub fn bind(bind_addr: SocketAddrV4, recv_timeout: Duration) -> Result<Self, NetworkError> {
        let socket = UdpSocket::bind(bind_addr)
            .map_err(|e| NetworkError::BindFailed(format!("UDP bind to {} failed: {}", bind_addr, e)))?;
        socket
            .set_read_timeout(Some(recv_timeout))
            .map_err(|e| NetworkError::BindFailed(format!("Failed to set timeout: {}", e)))?;

        let local_addr = match socket.local_addr() {
            Ok(SocketAddr::V4(addr)) => addr,
            Ok(other) => return Err(NetworkError::BindFailed(format!("bound to non-IPv4 address {}", other))),
            Err(e) => return Err(NetworkError::BindFailed(format!("no local address: {}", e))),
        };

        tracing::debug!("UdpTransport: bound to {}", local_addr);
        Ok(Self { socket, local_addr })
    }
}

impl DatagramTransport for UdpTransport {
    fn local_addr(&self) -> Result<SocketAddrV4, NetworkError> {
        Ok(self.local_addr)
    }

    fn send_to(&self, payload: &[u8], dest: SocketAddrV4) -> Result<usize, NetworkError> {
        self.socket
            .send_to(payload, dest)
            .map_err(|e| NetworkError::SendFailed(format!("UDP send to {} failed: {}", dest, e)))
    }

    fn recv_from(&self, buf: &mut [u8]) -> Result<Option<(usize, SocketAddrV4)>, NetworkError> {
        match self.socket.recv_from(buf) {
            Ok((len, SocketAddr::V4(from))) => Ok(Some((len, from))),
            Ok((_, SocketAddr::V6(from))) => {
                tracing::debug!("UdpTransport: ignoring datagram from {}", from);
                Ok(None)
            }
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut | ErrorKind::Interrupted) => Ok(None),
            Err(e) if matches!(e.kind(), ErrorKind::ConnectionRefused | ErrorKind::ConnectionReset) => {
                Err(NetworkError::PeerUnreachable(e.to_string()))
            }
            Err(e) => Err(NetworkError::ReceiveFailed(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loopback_send_recv() {
        let any = "127.0.0.1:0".parse().unwrap();
        let a = UdpTransport::bind(any, Duration::from_millis(500)).unwrap();
        let b = UdpTransport::bind(any, Duration::from_millis(500)).unwrap();

        let sent = a.send_to(b"hello", b.local_addr().unwrap()).unwrap();
        assert_eq!(sent, 5);

        let mut buf = [0u8; 16];
        let (len, from) = b.recv_from(&mut buf).unwrap().unwrap();
        assert_eq!(&buf[..len], b"hello");
        assert_eq!(from, a.local_addr().unwrap());
    }

    #[test]
    fn test_recv_timeout_is_not_an_error() {
        let t = UdpTransport::bind("127.0.0.1:0".parse().unwrap(), Duration::from_millis(10)).unwrap();
        let mut buf = [0u8; 16];
        assert!(t.recv_from(&mut buf).unwrap().is_none());
    }

    #[test]
    fn test_bind_conflict_fails() {
        let t = UdpTransport::bind("127.0.0.1:0".parse().unwrap(), Duration::from_millis(10)).unwrap();
        let taken = t.local_addr().unwrap();
        assert!(matches!(UdpTransport::bind(taken, Duration::from_millis(10)), Err(NetworkError::BindFailed(_))));
    }
}
