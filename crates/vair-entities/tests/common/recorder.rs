use std::net::Ipv4Addr;
use std::sync::Mutex;

use bytes::Bytes;
use crossbeam_channel::{Receiver, Sender, unbounded};
use vair_core::{EstablishmentCause, Lcid, Rnti};
use vair_saps::s1ap::{ContextSetupResponse, ErabSetupResponse, ErabSetupResult};
use vair_saps::{BearerControl, LinkUpperLayer, SignallingSink, UserPlaneSink};

/// One call into an upper-layer collaborator
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    InitialUe { rnti: Rnti, cause: EstablishmentCause, pdu: Bytes },
    S1apPdu { rnti: Rnti, pdu: Bytes },
    UserRelease(Rnti),
    CtxtSetupComplete { rnti: Rnti, res: ErabSetupResult },
    ErabSetupComplete { rnti: Rnti, res: ErabSetupResult },
    AddBearer { rnti: Rnti, lcid: Lcid, addr: Ipv4Addr, teid_out: u32 },
    RemBearer { rnti: Rnti, lcid: Lcid },
    RemUser(Rnti),
    GtpuPdu { rnti: Rnti, lcid: Lcid, pdu: Bytes },
    PdcpPdu { rnti: Rnti, lcid: Lcid, pdu: Bytes },
    Granted(Rnti),
    Released(Rnti),
}

/// Stand-in for every upper layer. Forwards each call into a channel for the test to
/// inspect, and serves configurable broadcast content.
pub struct Recorder {
    tx: Sender<Call>,
    pub si: Mutex<Option<Bytes>>,
    pub paging: Mutex<Option<Bytes>>,
}

impl Recorder {
    pub fn new() -> (Self, Receiver<Call>) {
        let (tx, rx) = unbounded();
        (Self { tx, si: Mutex::new(None), paging: Mutex::new(None) }, rx)
    }

    fn record(&self, call: Call) {
        tracing::debug!("recorded {:?}", call);
        let _ = self.tx.send(call);
    }

    /// TEID handed out for a bearer
    pub fn teid_in(rnti: Rnti, lcid: Lcid) -> u32 {
        ((rnti.0 as u32) << 16) | lcid as u32
    }
}

impl SignallingSink for Recorder {
    fn initial_ue(&self, rnti: Rnti, cause: EstablishmentCause, pdu: Bytes) {
        self.record(Call::InitialUe { rnti, cause, pdu });
    }

    fn write_pdu(&self, rnti: Rnti, pdu: Bytes) {
        self.record(Call::S1apPdu { rnti, pdu });
    }

    fn user_release(&self, rnti: Rnti) -> bool {
        self.record(Call::UserRelease(rnti));
        true
    }

    fn ue_ctxt_setup_complete(&self, rnti: Rnti, res: &ContextSetupResponse) {
        self.record(Call::CtxtSetupComplete { rnti, res: res.clone() });
    }

    fn ue_erab_setup_complete(&self, rnti: Rnti, res: &ErabSetupResponse) {
        self.record(Call::ErabSetupComplete { rnti, res: res.clone() });
    }
}

impl BearerControl for Recorder {
    fn add_bearer(&self, rnti: Rnti, lcid: Lcid, addr: Ipv4Addr, teid_out: u32) -> u32 {
        self.record(Call::AddBearer { rnti, lcid, addr, teid_out });
        Self::teid_in(rnti, lcid)
    }

    fn rem_bearer(&self, rnti: Rnti, lcid: Lcid) {
        self.record(Call::RemBearer { rnti, lcid });
    }

    fn rem_user(&self, rnti: Rnti) {
        self.record(Call::RemUser(rnti));
    }
}

impl UserPlaneSink for Recorder {
    fn write_pdu(&self, rnti: Rnti, lcid: Lcid, pdu: Bytes) {
        self.record(Call::GtpuPdu { rnti, lcid, pdu });
    }
}

impl LinkUpperLayer for Recorder {
    fn write_pdu(&self, rnti: Rnti, lcid: Lcid, pdu: Bytes) {
        self.record(Call::PdcpPdu { rnti, lcid, pdu });
    }

    fn read_system_information(&self) -> Option<Bytes> {
        self.si.lock().unwrap().clone()
    }

    fn read_paging(&self) -> Option<Bytes> {
        self.paging.lock().unwrap().clone()
    }

    fn rnti_granted(&self, rnti: Rnti) {
        self.record(Call::Granted(rnti));
    }

    fn rnti_released(&self, rnti: Rnti) {
        self.record(Call::Released(rnti));
    }
}
