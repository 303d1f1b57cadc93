use std::net::SocketAddrV4;

pub mod udp;

/// Datagram transport underneath a virtual link.
///
/// One thread receives while another sends, so both directions take `&self`.
/// `recv_from` blocks for at most the transport's read timeout.
pub trait DatagramTransport: Send + Sync {
    /// Address the transport is bound to
    fn local_addr(&self) -> Result<SocketAddrV4, NetworkError>;

    /// Sends one datagram, returns the number of bytes written
    fn send_to(&self, payload: &[u8], dest: SocketAddrV4) -> Result<usize, NetworkError>;

    /// Receives one datagram into `buf`. Ok(None) when the read timed out.
    fn recv_from(&self, buf: &mut [u8]) -> Result<Option<(usize, SocketAddrV4)>, NetworkError>;
}

/// Network-related errors
#[derive(Debug, Clone)]
pub enum NetworkError {
    BindFailed(String),
    SendFailed(String),
    ReceiveFailed(String),
    /// ICMP feedback from an earlier send surfaced on the socket; the socket is still usable
    PeerUnreachable(String),
}

impl NetworkError {
    /// True for errors after which the receive loop can carry on
    pub fn is_transient(&self) -> bool {
        matches!(self, NetworkError::PeerUnreachable(_))
    }
}

impl std::fmt::Display for NetworkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NetworkError::BindFailed(msg) => write!(f, "Bind failed: {}", msg),
            NetworkError::SendFailed(msg) => write!(f, "Send failed: {}", msg),
            NetworkError::ReceiveFailed(msg) => write!(f, "Receive failed: {}", msg),
            NetworkError::PeerUnreachable(msg) => write!(f, "Peer unreachable: {}", msg),
        }
    }
}

impl std::error::Error for NetworkError {}
