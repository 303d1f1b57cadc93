use std::net::{Ipv4Addr, SocketAddrV4};
use std::sync::Arc;
use std::time::Duration;

use vair_core::Rnti;

/// Network endpoint of one link
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CfgLinkEndpoint {
    pub bind_addr: String,
    /// 0 lets the OS pick a port
    pub bind_port: u16,
}

impl CfgLinkEndpoint {
    pub fn new(bind_addr: &str, bind_port: u16) -> Self {
        Self { bind_addr: bind_addr.to_string(), bind_port }
    }

    /// Parsed bind address. Only valid after `StackConfig::validate` succeeded.
    pub fn socket_addr(&self) -> Option<SocketAddrV4> {
        let ip: Ipv4Addr = self.bind_addr.parse().ok()?;
        Some(SocketAddrV4::new(ip, self.bind_port))
    }
}

/// Session-layer (RRC-facing) link
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CfgRrcNet {
    pub endpoint: CfgLinkEndpoint,
}

/// Dynamic-handle (RLC-facing) link
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CfgRlcNet {
    pub endpoint: CfgLinkEndpoint,
    /// Period of the system information / paging broadcast check
    pub broadcast_interval_ms: u64,
}

impl CfgRlcNet {
    pub fn broadcast_interval(&self) -> Duration {
        Duration::from_millis(self.broadcast_interval_ms)
    }
}

#[inline]
pub fn default_broadcast_interval_ms() -> u64 {
    1000
}

/// Transport and session table settings shared by both links
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CfgLink {
    /// Socket read timeout. The uplink loop checks for shutdown at this interval.
    pub recv_timeout_ms: u64,
    /// Largest datagram sent or received, header included
    pub max_datagram_size: usize,
    /// First rnti handed out
    pub rnti_first: u16,
    /// Last rnti handed out
    pub rnti_last: u16,
}

impl CfgLink {
    pub fn recv_timeout(&self) -> Duration {
        Duration::from_millis(self.recv_timeout_ms)
    }
}

impl Default for CfgLink {
    fn default() -> Self {
        Self {
            recv_timeout_ms: 100,
            max_datagram_size: MAX_UDP_PAYLOAD,
            rnti_first: Rnti::FIRST.0,
            rnti_last: Rnti::LAST.0,
        }
    }
}

/// Largest UDP payload over IPv4
pub const MAX_UDP_PAYLOAD: usize = 65507;

#[derive(Debug, Clone)]
pub struct StackConfig {
    pub debug_log: Option<String>,

    pub rrc: CfgRrcNet,
    pub rlc: CfgRlcNet,
    pub link: CfgLink,
}

impl StackConfig {
    /// Config with both links on the given address and ports, everything else default
    pub fn new(bind_addr: &str, rrc_port: u16, rlc_port: u16) -> Self {
        StackConfig {
            debug_log: None,
            rrc: CfgRrcNet { endpoint: CfgLinkEndpoint::new(bind_addr, rrc_port) },
            rlc: CfgRlcNet {
                endpoint: CfgLinkEndpoint::new(bind_addr, rlc_port),
                broadcast_interval_ms: default_broadcast_interval_ms(),
            },
            link: CfgLink::default(),
        }
    }

    /// Validate that all required configuration fields are properly set.
    pub fn validate(&self) -> Result<(), String> {
        for (name, ep) in [("rrc", &self.rrc.endpoint), ("rlc", &self.rlc.endpoint)] {
            if ep.bind_addr.is_empty() {
                return Err(format!("{}.bind_addr must be set", name));
            }
            if ep.bind_addr.parse::<Ipv4Addr>().is_err() {
                return Err(format!("{}.bind_addr is not an IPv4 address: {}", name, ep.bind_addr));
            }
        }

        // Port 0 is ephemeral, two links may both ask for it
        let (rrc, rlc) = (&self.rrc.endpoint, &self.rlc.endpoint);
        if rrc.bind_port != 0 && rrc == rlc {
            return Err(format!("rrc and rlc links cannot share {}:{}", rrc.bind_addr, rrc.bind_port));
        }

        if self.rlc.broadcast_interval_ms == 0 {
            return Err("rlc.broadcast_interval_ms must be non-zero".to_string());
        }
        if self.link.recv_timeout_ms == 0 {
            return Err("link.recv_timeout_ms must be non-zero".to_string());
        }
        if self.link.max_datagram_size == 0 || self.link.max_datagram_size > MAX_UDP_PAYLOAD {
            return Err(format!("link.max_datagram_size must be in 1..={}", MAX_UDP_PAYLOAD));
        }

        let (first, last) = (self.link.rnti_first, self.link.rnti_last);
        if !Rnti(first).is_assignable() || !Rnti(last).is_assignable() || first > last {
            return Err(format!(
                "invalid rnti range {}..={}, need {} <= rnti_first <= rnti_last <= {}",
                first,
                last,
                Rnti::FIRST.0,
                Rnti::LAST.0
            ));
        }

        Ok(())
    }
}

/// Global shared configuration, immutable after construction.
#[derive(Debug, Clone)]
pub struct SharedConfig {
    cfg: Arc<StackConfig>,
}

impl SharedConfig {
    pub fn new(bind_addr: &str, rrc_port: u16, rlc_port: u16) -> Result<Self, String> {
        Self::from_config(StackConfig::new(bind_addr, rrc_port, rlc_port))
    }

    /// Checks the config for validity before wrapping it
    pub fn from_config(cfg: StackConfig) -> Result<Self, String> {
        cfg.validate()?;
        Ok(Self { cfg: Arc::new(cfg) })
    }

    /// Access immutable config.
    pub fn config(&self) -> Arc<StackConfig> {
        Arc::clone(&self.cfg)
    }
}
