use std::net::{Ipv4Addr, SocketAddrV4};
use std::sync::Arc;

use bytes::Bytes;
use vair_config::SharedConfig;
use vair_core::lcid::{LCID_SRB1, lcid_from_erab_id};
use vair_core::{Lcid, RRC_NET_LABEL, Rnti};
use vair_pdus::FrameBuf;
use vair_saps::s1ap::{ContextSetupRequest, ErabSetupItem, ErabSetupRequest, ErabSetupResult, ErabToSetup};
use vair_saps::{BearerControl, DlEnvelope, SignallingSink, UserPlaneSink};

use crate::errors::LinkErr;
use crate::metrics::LinkMetrics;
use crate::network::link::{LinkCore, LinkProtocol, VirtualLink};
use crate::network::transports::DatagramTransport;
use crate::network::transports::udp::UdpTransport;
use crate::registry::SessionRegistry;

/// Upper-layer peers of the session link
#[derive(Clone)]
pub struct RrcCollaborators {
    /// S1AP: attach, uplink NAS, release and setup completion
    pub signalling: Arc<dyn SignallingSink>,
    /// GTPU tunnel table
    pub bearers: Arc<dyn BearerControl>,
    /// GTPU uplink user data
    pub user_plane: Arc<dyn UserPlaneSink>,
}

pub struct RrcNetProtocol {
    pub(super) collab: RrcCollaborators,
}

impl LinkProtocol for RrcNetProtocol {
    type Item = DlEnvelope;

    fn handle_uplink(&self, core: &LinkCore<DlEnvelope>, frame: FrameBuf, from: SocketAddrV4) -> Result<(), LinkErr> {
        self.rx_frame(core, frame, from)
    }

    fn handle_downlink(&self, core: &LinkCore<DlEnvelope>, item: DlEnvelope) -> Result<(), LinkErr> {
        self.tx_envelope(core, item)
    }
}

/// Session/bearer multiplexer toward RRC, S1AP and GTPU.
///
/// All producer calls return immediately: they enqueue for the downlink thread or do a
/// short registry read.
pub struct RrcNet {
    link: VirtualLink<RrcNetProtocol>,
}

impl RrcNet {
    /// Binds the configured session-layer address and starts the link threads
    pub fn start(
        config: &SharedConfig,
        registry: Arc<SessionRegistry>,
        collab: RrcCollaborators,
    ) -> Result<Self, LinkErr> {
        let cfg = config.config();
        let ep = &cfg.rrc.endpoint;
        let bind = ep
            .socket_addr()
            .ok_or_else(|| LinkErr::SocketInit(format!("invalid bind address {}", ep.bind_addr)))?;
        let transport = UdpTransport::bind(bind, cfg.link.recv_timeout())?;
        Self::with_transport(Arc::new(transport), registry, collab, cfg.link.max_datagram_size)
    }

    pub fn with_transport(
        transport: Arc<dyn DatagramTransport>,
        registry: Arc<SessionRegistry>,
        collab: RrcCollaborators,
        max_datagram_size: usize,
    ) -> Result<Self, LinkErr> {
        let protocol = RrcNetProtocol { collab };
        let link = VirtualLink::start(RRC_NET_LABEL, transport, registry, protocol, max_datagram_size)?;
        Ok(Self { link })
    }

    fn core(&self) -> &LinkCore<DlEnvelope> {
        self.link.core()
    }

    /// Downlink NAS from S1AP, delivered on SRB1
    pub fn write_dl_info(&self, rnti: Rnti, pdu: Bytes) -> bool {
        self.core().enqueue(DlEnvelope::channel(rnti, LCID_SRB1, pdu))
    }

    /// Downlink PDU on any logical channel
    pub fn write_sdu(&self, rnti: Rnti, lcid: Lcid, pdu: Bytes) -> bool {
        self.core().enqueue(DlEnvelope::channel(rnti, lcid, pdu))
    }

    pub fn add_paging_id(&self, rnti: Rnti, paging: Bytes) -> bool {
        self.core().enqueue(DlEnvelope::paging(rnti, paging))
    }

    /// S1AP finished the UE context release. The user is torn down after every PDU
    /// queued before this call.
    pub fn release_complete(&self, rnti: Rnti) -> bool {
        self.core().enqueue(DlEnvelope::release_user(rnti))
    }

    pub fn release_erab(&self, rnti: Rnti, erab_id: u8) -> bool {
        let Some(lcid) = lcid_from_erab_id(erab_id) else {
            tracing::warn!(rnti = %rnti, "RrcNet: release of invalid ERAB id {}", erab_id);
            return false;
        };
        if !self.core().registry().contains(rnti) {
            tracing::warn!(rnti = %rnti, "RrcNet: release of ERAB {} for unknown user", erab_id);
            return false;
        }
        self.core().enqueue(DlEnvelope::release_erab(rnti, lcid))
    }

    /// Releases every established bearer of the user
    pub fn release_erabs(&self, rnti: Rnti) -> bool {
        let Ok(bearers) = self.core().registry().bearers(rnti) else {
            tracing::warn!(rnti = %rnti, "RrcNet: release of ERABs for unknown user");
            return false;
        };
        bearers
            .into_iter()
            .all(|lcid| self.core().enqueue(DlEnvelope::release_erab(rnti, lcid)))
    }

    /// InitialContextSetupRequest: brings up the listed ERABs and delivers their NAS PDUs
    pub fn setup_ue_ctxt(&self, rnti: Rnti, req: &ContextSetupRequest) -> bool {
        let Some(res) = self.setup_erabs(rnti, &req.erabs) else {
            return false;
        };
        self.link.protocol().collab.signalling.ue_ctxt_setup_complete(rnti, &res);
        true
    }

    /// E-RABSetupRequest: same as context setup for the listed ERABs
    pub fn setup_ue_erabs(&self, rnti: Rnti, req: &ErabSetupRequest) -> bool {
        let Some(res) = self.setup_erabs(rnti, &req.erabs) else {
            return false;
        };
        self.link.protocol().collab.signalling.ue_erab_setup_complete(rnti, &res);
        true
    }

    fn setup_erabs(&self, rnti: Rnti, erabs: &[ErabToSetup]) -> Option<ErabSetupResult> {
        let registry = self.core().registry();
        if !registry.contains(rnti) {
            tracing::warn!(rnti = %rnti, "RrcNet: ERAB setup for unknown user");
            return None;
        }

        let local_ip = self.local_addr().map(|a| *a.ip()).unwrap_or(Ipv4Addr::UNSPECIFIED);
        let bearers = &self.link.protocol().collab.bearers;
        let mut res = ErabSetupResult::default();

        for erab in erabs {
            let Some(lcid) = lcid_from_erab_id(erab.erab_id) else {
                tracing::warn!(rnti = %rnti, "RrcNet: ERAB id {} does not map to a data bearer", erab.erab_id);
                res.failed.push(erab.erab_id);
                continue;
            };

            let teid_in = bearers.add_bearer(rnti, lcid, erab.transport_addr, erab.teid_out);
            if registry.add_bearer(rnti, lcid).is_err() {
                // Released while we were setting up
                bearers.rem_bearer(rnti, lcid);
                res.failed.push(erab.erab_id);
                continue;
            }
            tracing::debug!(rnti = %rnti, "RrcNet: ERAB {} on lcid {}, teid_in 0x{:08x}", erab.erab_id, lcid, teid_in);

            if let Some(nas) = &erab.nas_pdu {
                self.write_dl_info(rnti, nas.clone());
            }
            res.setup.push(ErabSetupItem { erab_id: erab.erab_id, transport_addr: local_ip, teid_in });
        }
        Some(res)
    }

    /// Users attached through this link
    pub fn user_count(&self) -> usize {
        self.core().registry().device_count()
    }

    pub fn metrics(&self) -> LinkMetrics {
        self.link.metrics()
    }

    pub fn local_addr(&self) -> Option<SocketAddrV4> {
        self.link.local_addr()
    }

    pub fn queued(&self) -> usize {
        self.core().queue().len()
    }

    pub fn stop(&self) {
        self.link.stop();
    }
}
