use std::net::SocketAddrV4;

use bytes::Bytes;
use vair_core::{DeviceId, Lcid};
use vair_pdus::FrameBuf;
use vair_pdus::rrc::{RRC_DL_HEADER_LEN, RrcDlHeader, RrcMsgType};
use vair_saps::{DlEnvelope, DlKind};

use crate::errors::LinkErr;
use crate::network::link::LinkCore;

use super::RrcNetProtocol;

impl RrcNetProtocol {
    pub(super) fn tx_envelope(&self, core: &LinkCore<DlEnvelope>, env: DlEnvelope) -> Result<(), LinkErr> {
        let DlEnvelope { rnti, kind, payload } = env;
        match kind {
            DlKind::ReleaseUser => {
                self.collab.bearers.rem_user(rnti);
                match core.registry().release(rnti) {
                    Ok(()) => tracing::info!(rnti = %rnti, "RrcNet: user released"),
                    Err(e) => tracing::debug!(rnti = %rnti, "RrcNet: release of user: {}", e),
                }
                Ok(())
            }
            DlKind::ReleaseErab(lcid) => {
                self.collab.bearers.rem_bearer(rnti, lcid);
                match core.registry().remove_bearer(rnti, lcid) {
                    Ok(true) => tracing::debug!(rnti = %rnti, "RrcNet: bearer on lcid {} released", lcid),
                    Ok(false) => tracing::debug!(rnti = %rnti, "RrcNet: no bearer on lcid {}", lcid),
                    Err(e) => tracing::debug!(rnti = %rnti, "RrcNet: release of bearer: {}", e),
                }
                Ok(())
            }
            DlKind::Paging => {
                let session = core.registry().session(rnti).ok_or(LinkErr::UnknownSession(rnti))?;
                let device_id = session.device_id.unwrap_or_default();
                send_frame(core, RrcMsgType::Paging, device_id, 0, &payload, session.addr)
            }
            DlKind::Channel(lcid) => {
                let session = core.registry().session(rnti).ok_or(LinkErr::UnknownSession(rnti))?;
                // Anonymous sessions have no session-layer peer
                let device_id = session.device_id.ok_or(LinkErr::UnknownSession(rnti))?;
                send_frame(core, RrcMsgType::for_lcid(lcid), device_id, lcid, &payload, session.addr)
            }
        }
    }
}

fn send_frame(
    core: &LinkCore<DlEnvelope>,
    msg_type: RrcMsgType,
    device_id: DeviceId,
    lcid: Lcid,
    payload: &Bytes,
    dest: SocketAddrV4,
) -> Result<(), LinkErr> {
    let mut frame = FrameBuf::with_headroom(RRC_DL_HEADER_LEN, payload);
    RrcDlHeader { msg_type, device_id, lcid }.push(&mut frame)?;
    core.send_frame(frame.as_slice(), dest)
}
