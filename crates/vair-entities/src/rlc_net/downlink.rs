use vair_core::Rnti;
use vair_pdus::FrameErr;
use vair_pdus::rlc::RlcDlPdu;
use vair_saps::RlcDlMsg;

use crate::errors::LinkErr;
use crate::network::link::LinkCore;

use super::RlcNetProtocol;

impl RlcNetProtocol {
    pub(super) fn tx_msg(&self, core: &LinkCore<RlcDlMsg>, msg: RlcDlMsg) -> Result<(), LinkErr> {
        let (pdu, dest) = match msg {
            RlcDlMsg::Data { rnti, lcid, payload } => {
                let dest = core.registry().lookup_anonymous_address(rnti).ok_or(LinkErr::UnknownSession(rnti))?;
                (RlcDlPdu::Normal { rnti, lcid, payload }, dest)
            }
            RlcDlMsg::Grant { to, rnti: Some(rnti) } => (RlcDlPdu::Grant { rnti }, to),
            RlcDlMsg::Grant { to, rnti: None } => (RlcDlPdu::Reject, to),
            RlcDlMsg::Release { to, rnti } => (RlcDlPdu::Release { rnti }, to),
            RlcDlMsg::Broadcast { to, sentinel, payload } => {
                let pdu = match sentinel {
                    Rnti::SI_RNTI => RlcDlPdu::SystemInfo { payload },
                    Rnti::P_RNTI => RlcDlPdu::Paging { payload },
                    other => {
                        return Err(FrameErr::InvalidValue { field: "broadcast_rnti", value: other.0 as u64 }.into());
                    }
                };
                (pdu, to)
            }
        };
        core.send_frame(&pdu.encode(), dest)
    }
}
