use std::net::Ipv4Addr;

use bytes::Bytes;
use vair_core::{EstablishmentCause, Rnti};

/// S1AP-side consumer of uplink signalling.
/// Implementations must not block for long; they are called from the uplink
/// dispatcher and downlink sender threads.
pub trait SignallingSink: Send + Sync {
    /// A device attached and was assigned `rnti`. `pdu` is the initial NAS message.
    fn initial_ue(&self, rnti: Rnti, cause: EstablishmentCause, pdu: Bytes);

    /// Uplink NAS signalling of an attached device
    fn write_pdu(&self, rnti: Rnti, pdu: Bytes);

    /// The device released its session; the core network context should go too.
    /// Returns false if S1AP had no context for the rnti.
    fn user_release(&self, rnti: Rnti) -> bool;

    fn ue_ctxt_setup_complete(&self, rnti: Rnti, res: &ContextSetupResponse);

    fn ue_erab_setup_complete(&self, rnti: Rnti, res: &ErabSetupResponse);
}

/// One ERAB in a setup request
#[derive(Debug, Clone)]
pub struct ErabToSetup {
    pub erab_id: u8,
    /// Transport layer address of the core network tunnel endpoint
    pub transport_addr: Ipv4Addr,
    /// GTP tunnel endpoint id on the core network side
    pub teid_out: u32,
    /// NAS PDU to deliver to the device once the bearer exists
    pub nas_pdu: Option<Bytes>,
}

/// Reduced InitialContextSetupRequest: the ERABs to bring up with the context
#[derive(Debug, Clone, Default)]
pub struct ContextSetupRequest {
    pub erabs: Vec<ErabToSetup>,
}

/// Reduced E-RABSetupRequest
#[derive(Debug, Clone, Default)]
pub struct ErabSetupRequest {
    pub erabs: Vec<ErabToSetup>,
}

/// Successfully established ERAB
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErabSetupItem {
    pub erab_id: u8,
    /// Local transport address handed back to the core network
    pub transport_addr: Ipv4Addr,
    /// GTP tunnel endpoint id allocated on our side
    pub teid_in: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErabSetupResult {
    pub setup: Vec<ErabSetupItem>,
    /// ERAB ids that could not be mapped to a data bearer
    pub failed: Vec<u8>,
}

pub type ContextSetupResponse = ErabSetupResult;
pub type ErabSetupResponse = ErabSetupResult;
