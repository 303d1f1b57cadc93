use thiserror::Error;
use vair_core::{DeviceId, Rnti};
use vair_pdus::FrameErr;
use vair_pdus::rrc::RrcMsgType;

use crate::network::transports::NetworkError;
use crate::registry::RegistryErr;

/// Failure of a single uplink or downlink operation on a virtual link.
/// None of these stop the link; the frame at hand is dropped.
#[derive(Debug, Error)]
pub enum LinkErr {
    #[error("malformed frame: {0}")]
    MalformedFrame(#[from] FrameErr),

    #[error("no session for rnti {0}")]
    UnknownSession(Rnti),

    #[error("no session for device {0}")]
    UnknownDevice(DeviceId),

    #[error("rnti {0} belongs to an attached device")]
    BoundSession(Rnti),

    #[error("unexpected uplink {0:?} frame")]
    UnexpectedFrame(RrcMsgType),

    #[error("no rnti available")]
    RegistryFull,

    #[error("short write: sent {sent} of {expected} bytes")]
    ShortWrite { expected: usize, sent: usize },

    #[error("frame of {len} bytes exceeds datagram limit {max}")]
    Oversized { len: usize, max: usize },

    #[error("socket init failed: {0}")]
    SocketInit(String),

    #[error("failed to spawn link thread: {0}")]
    ThreadSpawn(String),

    #[error(transparent)]
    Network(NetworkError),
}

impl From<RegistryErr> for LinkErr {
    fn from(e: RegistryErr) -> Self {
        match e {
            RegistryErr::Full => LinkErr::RegistryFull,
            RegistryErr::UnknownRnti(rnti) => LinkErr::UnknownSession(rnti),
            RegistryErr::Bound(rnti) => LinkErr::BoundSession(rnti),
        }
    }
}

impl From<NetworkError> for LinkErr {
    fn from(e: NetworkError) -> Self {
        match e {
            NetworkError::BindFailed(msg) => LinkErr::SocketInit(msg),
            other => LinkErr::Network(other),
        }
    }
}
