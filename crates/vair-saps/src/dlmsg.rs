use core::fmt::Display;

use bytes::Bytes;
use vair_core::{Lcid, Rnti};

/// What the downlink sender does with an envelope.
/// Control kinds never reach the wire; they are handed to the bearer collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DlKind {
    /// Ordinary PDU on a logical channel
    Channel(Lcid),
    /// Paging frame for the session
    Paging,
    /// Tear down all user state of the session
    ReleaseUser,
    /// Tear down the bearer on the given logical channel
    ReleaseErab(Lcid),
}

impl Display for DlKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            DlKind::Channel(lcid) => write!(f, "Channel({})", lcid),
            DlKind::Paging => write!(f, "Paging"),
            DlKind::ReleaseUser => write!(f, "ReleaseUser"),
            DlKind::ReleaseErab(lcid) => write!(f, "ReleaseErab({})", lcid),
        }
    }
}

/// Downlink PDU awaiting delivery. Owns its payload until the sender is done with it.
#[derive(Debug)]
pub struct DlEnvelope {
    pub rnti: Rnti,
    pub kind: DlKind,
    pub payload: Bytes,
}

impl DlEnvelope {
    pub fn channel(rnti: Rnti, lcid: Lcid, payload: Bytes) -> Self {
        Self { rnti, kind: DlKind::Channel(lcid), payload }
    }

    pub fn paging(rnti: Rnti, payload: Bytes) -> Self {
        Self { rnti, kind: DlKind::Paging, payload }
    }

    pub fn release_user(rnti: Rnti) -> Self {
        Self { rnti, kind: DlKind::ReleaseUser, payload: Bytes::new() }
    }

    pub fn release_erab(rnti: Rnti, lcid: Lcid) -> Self {
        Self { rnti, kind: DlKind::ReleaseErab(lcid), payload: Bytes::new() }
    }
}

impl Display for DlEnvelope {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "DlEnvelope {{ rnti: {}, kind: {}, {} bytes }}", self.rnti, self.kind, self.payload.len())
    }
}

/// Downlink PDU of the dynamic-handle link
#[derive(Debug)]
pub enum RlcDlMsg {
    /// Data for an rnti on a logical channel
    Data { rnti: Rnti, lcid: Lcid, payload: Bytes },
    /// Answer to a handle request; `None` when no handle was available
    Grant { to: std::net::SocketAddrV4, rnti: Option<Rnti> },
    /// Tell the device its handle is gone
    Release { to: std::net::SocketAddrV4, rnti: Rnti },
    /// System information or paging broadcast to one registered address
    Broadcast { to: std::net::SocketAddrV4, sentinel: Rnti, payload: Bytes },
}
