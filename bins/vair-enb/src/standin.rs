use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::sync::Mutex;

use bytes::Bytes;
use vair_core::{EstablishmentCause, Lcid, Rnti};
use vair_saps::s1ap::{ContextSetupResponse, ErabSetupResponse};
use vair_saps::{BearerControl, LinkUpperLayer, SignallingSink, UserPlaneSink};

/// Logs every call it receives in place of the S1AP, GTPU and PDCP layers.
/// TEIDs are handed out sequentially per bearer.
#[derive(Default)]
pub struct LoggingStandIn {
    tunnels: Mutex<HashMap<(Rnti, Lcid), u32>>,
    next_teid: Mutex<u32>,
}

impl SignallingSink for LoggingStandIn {
    fn initial_ue(&self, rnti: Rnti, cause: EstablishmentCause, pdu: Bytes) {
        tracing::info!(rnti = %rnti, "s1ap: initial UE, cause {}, {} bytes NAS", cause, pdu.len());
    }

    fn write_pdu(&self, rnti: Rnti, pdu: Bytes) {
        tracing::debug!(rnti = %rnti, "s1ap: <- NAS {} bytes", pdu.len());
    }

    fn user_release(&self, rnti: Rnti) -> bool {
        tracing::info!(rnti = %rnti, "s1ap: user release");
        true
    }

    fn ue_ctxt_setup_complete(&self, rnti: Rnti, res: &ContextSetupResponse) {
        tracing::info!(rnti = %rnti, "s1ap: context setup, {} ok {} failed", res.setup.len(), res.failed.len());
    }

    fn ue_erab_setup_complete(&self, rnti: Rnti, res: &ErabSetupResponse) {
        tracing::info!(rnti = %rnti, "s1ap: ERAB setup, {} ok {} failed", res.setup.len(), res.failed.len());
    }
}

impl BearerControl for LoggingStandIn {
    fn add_bearer(&self, rnti: Rnti, lcid: Lcid, addr: Ipv4Addr, teid_out: u32) -> u32 {
        let teid_in = {
            let mut next = self.next_teid.lock().unwrap_or_else(|e| e.into_inner());
            *next = next.wrapping_add(1);
            *next
        };
        self.tunnels.lock().unwrap_or_else(|e| e.into_inner()).insert((rnti, lcid), teid_in);
        tracing::info!(rnti = %rnti, "gtpu: bearer lcid {} to {} teid_out 0x{:08x}, teid_in 0x{:08x}", lcid, addr, teid_out, teid_in);
        teid_in
    }

    fn rem_bearer(&self, rnti: Rnti, lcid: Lcid) {
        self.tunnels.lock().unwrap_or_else(|e| e.into_inner()).remove(&(rnti, lcid));
        tracing::info!(rnti = %rnti, "gtpu: bearer lcid {} removed", lcid);
    }

    fn rem_user(&self, rnti: Rnti) {
        let mut tunnels = self.tunnels.lock().unwrap_or_else(|e| e.into_inner());
        let before = tunnels.len();
        tunnels.retain(|(r, _), _| *r != rnti);
        tracing::info!(rnti = %rnti, "gtpu: user removed, {} tunnels closed", before - tunnels.len());
    }
}

impl UserPlaneSink for LoggingStandIn {
    fn write_pdu(&self, rnti: Rnti, lcid: Lcid, pdu: Bytes) {
        tracing::debug!(rnti = %rnti, "gtpu: <- lcid {} {} bytes", lcid, pdu.len());
    }
}

impl LinkUpperLayer for LoggingStandIn {
    fn write_pdu(&self, rnti: Rnti, lcid: Lcid, pdu: Bytes) {
        tracing::debug!(rnti = %rnti, "pdcp: <- lcid {} {} bytes", lcid, pdu.len());
    }

    fn read_system_information(&self) -> Option<Bytes> {
        None
    }

    fn read_paging(&self) -> Option<Bytes> {
        None
    }

    fn rnti_granted(&self, rnti: Rnti) {
        tracing::info!(rnti = %rnti, "pdcp: rnti granted");
    }

    fn rnti_released(&self, rnti: Rnti) {
        tracing::info!(rnti = %rnti, "pdcp: rnti released");
    }
}
