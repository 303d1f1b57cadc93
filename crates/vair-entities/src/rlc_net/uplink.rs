use std::net::SocketAddrV4;

use vair_core::Rnti;
use vair_pdus::FrameBuf;
use vair_pdus::rlc::RlcUlPdu;
use vair_saps::RlcDlMsg;

use crate::errors::LinkErr;
use crate::network::link::LinkCore;
use crate::registry::RegistryErr;

use super::RlcNetProtocol;

impl RlcNetProtocol {
    pub(super) fn rx_frame(&self, core: &LinkCore<RlcDlMsg>, frame: FrameBuf, from: SocketAddrV4) -> Result<(), LinkErr> {
        match RlcUlPdu::decode(frame.into_bytes())? {
            RlcUlPdu::Normal { rnti, lcid, payload } => {
                if !core.registry().contains(rnti) {
                    return Err(LinkErr::UnknownSession(rnti));
                }
                tracing::trace!(rnti = %rnti, "RlcNet: UL PDU on lcid {}, {} bytes", lcid, payload.len());
                self.upper.write_pdu(rnti, lcid, payload);
                Ok(())
            }
            RlcUlPdu::RequestRnti { addr } => {
                let addr = if addr.ip().is_unspecified() || addr.port() == 0 { from } else { addr };
                self.rx_request_rnti(core, addr);
                Ok(())
            }
            RlcUlPdu::ReleaseRnti { rnti } => self.rx_release_rnti(core, rnti),
        }
    }

    fn rx_request_rnti(&self, core: &LinkCore<RlcDlMsg>, addr: SocketAddrV4) {
        // Grant lost on the way, answer with the same handle
        if let Some(rnti) = core.registry().lookup_anonymous(addr) {
            tracing::debug!(rnti = %rnti, "RlcNet: repeated request from {}", addr);
            core.enqueue(RlcDlMsg::Grant { to: addr, rnti: Some(rnti) });
            return;
        }

        match core.registry().allocate_anonymous(addr) {
            Ok(rnti) => {
                tracing::info!(rnti = %rnti, "RlcNet: granted to {}", addr);
                self.upper.rnti_granted(rnti);
                core.enqueue(RlcDlMsg::Grant { to: addr, rnti: Some(rnti) });
            }
            Err(e) => {
                tracing::warn!("RlcNet: rejecting request from {}: {}", addr, e);
                core.enqueue(RlcDlMsg::Grant { to: addr, rnti: None });
            }
        }
    }

    fn rx_release_rnti(&self, core: &LinkCore<RlcDlMsg>, rnti: Rnti) -> Result<(), LinkErr> {
        match core.registry().release_anonymous(rnti) {
            Ok(_) => {}
            Err(RegistryErr::Bound(_)) => {
                // Bound sessions are released through the session link
                tracing::warn!(rnti = %rnti, "RlcNet: release of rnti bound to a device, ignored");
                return Ok(());
            }
            Err(RegistryErr::UnknownRnti(_)) => {
                tracing::debug!(rnti = %rnti, "RlcNet: release of unknown rnti");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        }
        tracing::info!(rnti = %rnti, "RlcNet: released by device");
        super::entity::drop_queued(core, rnti);
        self.upper.rnti_released(rnti);
        Ok(())
    }
}
