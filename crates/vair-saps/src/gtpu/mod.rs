use std::net::Ipv4Addr;

use bytes::Bytes;
use vair_core::{Lcid, Rnti};

/// GTPU tunnel table, as driven by the session link
pub trait BearerControl: Send + Sync {
    /// Creates the tunnel for a bearer and returns the locally allocated TEID
    fn add_bearer(&self, rnti: Rnti, lcid: Lcid, addr: Ipv4Addr, teid_out: u32) -> u32;

    fn rem_bearer(&self, rnti: Rnti, lcid: Lcid);

    fn rem_user(&self, rnti: Rnti);
}

/// GTPU-side consumer of uplink user-plane data
pub trait UserPlaneSink: Send + Sync {
    fn write_pdu(&self, rnti: Rnti, lcid: Lcid, pdu: Bytes);
}
