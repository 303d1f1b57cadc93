use std::net::SocketAddrV4;
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;
use vair_config::SharedConfig;
use vair_core::{Lcid, RLC_NET_LABEL, Rnti};
use vair_pdus::FrameBuf;
use vair_saps::{LinkUpperLayer, RlcDlMsg};

use crate::errors::LinkErr;
use crate::metrics::LinkMetrics;
use crate::network::link::{LinkCore, LinkProtocol, VirtualLink};
use crate::network::transports::DatagramTransport;
use crate::network::transports::udp::UdpTransport;
use crate::registry::{RegistryErr, SessionRegistry};

use super::broadcast::{self, BroadcastTimer};

pub struct RlcNetProtocol {
    pub(super) upper: Arc<dyn LinkUpperLayer>,
    timer: BroadcastTimer,
}

impl LinkProtocol for RlcNetProtocol {
    type Item = RlcDlMsg;

    fn handle_uplink(&self, core: &LinkCore<RlcDlMsg>, frame: FrameBuf, from: SocketAddrV4) -> Result<(), LinkErr> {
        self.rx_frame(core, frame, from)
    }

    fn handle_downlink(&self, core: &LinkCore<RlcDlMsg>, item: RlcDlMsg) -> Result<(), LinkErr> {
        self.tx_msg(core, item)
    }

    fn tick(&self, core: &LinkCore<RlcDlMsg>, now: Instant) {
        if self.timer.due(now) {
            broadcast::fan_out(core, &*self.upper);
        }
    }
}

/// Drops queued data PDUs of one rnti; control PDUs stay
pub(super) fn drop_queued(core: &LinkCore<RlcDlMsg>, rnti: Rnti) -> usize {
    core.queue().retain(|msg| !matches!(msg, RlcDlMsg::Data { rnti: r, .. } if *r == rnti))
}

/// Dynamic-handle multiplexer: rnti request/grant/release and SI/paging broadcast,
/// plus the RLC interface the upper layers use to reach devices holding a handle.
pub struct RlcNet {
    link: VirtualLink<RlcNetProtocol>,
}

impl RlcNet {
    /// Binds the configured dynamic-handle address and starts the link threads
    pub fn start(
        config: &SharedConfig,
        registry: Arc<SessionRegistry>,
        upper: Arc<dyn LinkUpperLayer>,
    ) -> Result<Self, LinkErr> {
        let cfg = config.config();
        let ep = &cfg.rlc.endpoint;
        let bind = ep
            .socket_addr()
            .ok_or_else(|| LinkErr::SocketInit(format!("invalid bind address {}", ep.bind_addr)))?;
        let transport = UdpTransport::bind(bind, cfg.link.recv_timeout())?;
        Self::with_transport(
            Arc::new(transport),
            registry,
            upper,
            cfg.rlc.broadcast_interval(),
            cfg.link.max_datagram_size,
        )
    }

    pub fn with_transport(
        transport: Arc<dyn DatagramTransport>,
        registry: Arc<SessionRegistry>,
        upper: Arc<dyn LinkUpperLayer>,
        broadcast_interval: Duration,
        max_datagram_size: usize,
    ) -> Result<Self, LinkErr> {
        let protocol = RlcNetProtocol { upper, timer: BroadcastTimer::new(broadcast_interval, Instant::now()) };
        let link = VirtualLink::start(RLC_NET_LABEL, transport, registry, protocol, max_datagram_size)?;
        Ok(Self { link })
    }

    fn core(&self) -> &LinkCore<RlcDlMsg> {
        self.link.core()
    }

    /// Downlink PDU for a device holding a handle
    pub fn write_sdu(&self, rnti: Rnti, lcid: Lcid, sdu: Bytes) -> bool {
        if self.core().registry().lookup_anonymous_address(rnti).is_none() {
            tracing::debug!(rnti = %rnti, "RlcNet: SDU for rnti without a handle on this link, dropped");
            return false;
        }
        self.core().enqueue(RlcDlMsg::Data { rnti, lcid, payload: sdu })
    }

    /// Sessions exist from the grant on, nothing to do
    pub fn add_user(&self, _rnti: Rnti) {}

    /// Bearers carry no state on this link
    pub fn add_bearer(&self, _rnti: Rnti, _lcid: Lcid) {}

    /// Tells the device its handle is gone, then releases the session.
    /// Sessions bound to a device belong to the session link and are refused.
    pub fn rem_user(&self, rnti: Rnti) -> bool {
        let core = self.core();
        let to = match core.registry().release_anonymous(rnti) {
            Ok(to) => to,
            Err(RegistryErr::Bound(_)) => {
                tracing::warn!(rnti = %rnti, "RlcNet: rem_user of rnti bound to a device, refused");
                return false;
            }
            Err(e) => {
                tracing::debug!(rnti = %rnti, "RlcNet: rem_user: {}", e);
                return false;
            }
        };
        drop_queued(core, rnti);
        core.enqueue(RlcDlMsg::Release { to, rnti });
        self.link.protocol().upper.rnti_released(rnti);
        tracing::info!(rnti = %rnti, "RlcNet: user removed");
        true
    }

    /// Drops downlink PDUs still queued for the rnti, returns how many
    pub fn clear_buffer(&self, rnti: Rnti) -> usize {
        drop_queued(self.core(), rnti)
    }

    pub fn rb_name(&self, lcid: Lcid) -> String {
        vair_core::lcid::rb_name(lcid)
    }

    /// Devices currently holding a handle
    pub fn user_count(&self) -> usize {
        self.core().registry().anonymous_count()
    }

    pub fn metrics(&self) -> LinkMetrics {
        self.link.metrics()
    }

    pub fn local_addr(&self) -> Option<SocketAddrV4> {
        self.link.local_addr()
    }

    pub fn stop(&self) {
        self.link.stop();
    }
}
