use std::net::SocketAddrV4;

use bytes::Bytes;
use vair_core::{DeviceId, Rnti, lcid};
use vair_pdus::FrameBuf;
use vair_pdus::rrc::{RrcMsgType, RrcUlHeader};
use vair_saps::DlEnvelope;

use crate::errors::LinkErr;
use crate::network::link::LinkCore;
use crate::registry::AttachOutcome;

use super::RrcNetProtocol;

impl RrcNetProtocol {
    pub(super) fn rx_frame(
        &self,
        core: &LinkCore<DlEnvelope>,
        mut frame: FrameBuf,
        from: SocketAddrV4,
    ) -> Result<(), LinkErr> {
        let hdr = RrcUlHeader::pull(&mut frame)?;
        let payload = frame.into_bytes();

        match hdr.msg_type {
            RrcMsgType::Attach => self.rx_attach(core, &hdr, payload, from),
            RrcMsgType::Normal => {
                let rnti = resolve(core, &hdr.device_id)?;
                if !lcid::is_signalling(hdr.lcid) {
                    tracing::debug!(rnti = %rnti, "RrcNet: NORMAL frame on data lcid {}, routing as signalling", hdr.lcid);
                }
                tracing::trace!(rnti = %rnti, "RrcNet: UL signalling, {} bytes", payload.len());
                self.collab.signalling.write_pdu(rnti, payload);
                Ok(())
            }
            RrcMsgType::Data => {
                let rnti = resolve(core, &hdr.device_id)?;
                if lcid::is_signalling(hdr.lcid) {
                    tracing::debug!(rnti = %rnti, "RrcNet: DATA frame on signalling lcid {}, routing as data", hdr.lcid);
                }
                tracing::trace!(rnti = %rnti, "RrcNet: UL data on lcid {}, {} bytes", hdr.lcid, payload.len());
                self.collab.user_plane.write_pdu(rnti, hdr.lcid, payload);
                Ok(())
            }
            RrcMsgType::Paging => Err(LinkErr::UnexpectedFrame(RrcMsgType::Paging)),
            RrcMsgType::Release => self.rx_release(core, &hdr.device_id),
        }
    }

    fn rx_attach(
        &self,
        core: &LinkCore<DlEnvelope>,
        hdr: &RrcUlHeader,
        payload: Bytes,
        from: SocketAddrV4,
    ) -> Result<(), LinkErr> {
        // Devices that do not know their own address leave it zeroed
        let addr = if hdr.source.ip().is_unspecified() || hdr.source.port() == 0 { from } else { hdr.source };

        let outcome = core.registry().attach(hdr.device_id, addr, hdr.cause)?;
        let rnti = outcome.rnti();
        match outcome {
            AttachOutcome::New(_) => {
                tracing::info!(rnti = %rnti, "RrcNet: device {} attached from {}, cause {}", hdr.device_id, addr, hdr.cause)
            }
            AttachOutcome::Refreshed(_) => {
                tracing::info!(rnti = %rnti, "RrcNet: device {} re-attached from {}, cause {}", hdr.device_id, addr, hdr.cause)
            }
        }

        self.collab.signalling.initial_ue(rnti, hdr.cause, payload);
        Ok(())
    }

    /// Device-initiated release: the session goes away at once
    fn rx_release(&self, core: &LinkCore<DlEnvelope>, device_id: &DeviceId) -> Result<(), LinkErr> {
        let rnti = resolve(core, device_id)?;
        tracing::info!(rnti = %rnti, "RrcNet: device {} released its session", device_id);

        core.registry().release(rnti)?;
        let dropped = core.queue().retain(|env| env.rnti != rnti);
        if dropped > 0 {
            tracing::debug!(rnti = %rnti, "RrcNet: dropped {} queued downlink PDUs", dropped);
        }
        self.collab.bearers.rem_user(rnti);
        if !self.collab.signalling.user_release(rnti) {
            tracing::debug!(rnti = %rnti, "RrcNet: S1AP had no context for released user");
        }
        Ok(())
    }
}

fn resolve(core: &LinkCore<DlEnvelope>, device_id: &DeviceId) -> Result<Rnti, LinkErr> {
    core.registry().lookup_by_device(device_id).ok_or(LinkErr::UnknownDevice(*device_id))
}
