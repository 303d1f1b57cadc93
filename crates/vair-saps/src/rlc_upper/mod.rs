use bytes::Bytes;
use vair_core::{Lcid, Rnti};

/// PDCP/RRC-side peer of the dynamic-handle link.
///
/// Receives uplink PDUs of devices holding a handle and is polled for pending
/// broadcast content on every broadcast tick.
pub trait LinkUpperLayer: Send + Sync {
    fn write_pdu(&self, rnti: Rnti, lcid: Lcid, pdu: Bytes);

    /// Pending system information to broadcast, if any
    fn read_system_information(&self) -> Option<Bytes>;

    /// Pending paging record to broadcast, if any
    fn read_paging(&self) -> Option<Bytes>;

    /// A device obtained a handle
    fn rnti_granted(&self, _rnti: Rnti) {}

    /// A handle was released, by the device or by the stack
    fn rnti_released(&self, _rnti: Rnti) {}
}
