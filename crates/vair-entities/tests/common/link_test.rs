use std::net::{SocketAddrV4, UdpSocket};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::Receiver;
use vair_config::{SharedConfig, StackConfig};
use vair_core::debug::setup_logging_verbose;
use vair_entities::{RlcNet, RrcCollaborators, RrcNet, SessionRegistry};

use super::{Call, Recorder};

pub const WAIT: Duration = Duration::from_secs(2);
pub const QUIET: Duration = Duration::from_millis(300);

/// Both links on ephemeral loopback ports
pub fn test_config(customize: impl FnOnce(&mut StackConfig)) -> SharedConfig {
    let mut cfg = StackConfig::new("127.0.0.1", 0, 0);
    cfg.link.recv_timeout_ms = 20;
    cfg.rlc.broadcast_interval_ms = 50;
    customize(&mut cfg);
    SharedConfig::from_config(cfg).expect("valid test config")
}

pub struct RrcTest {
    pub net: RrcNet,
    pub registry: Arc<SessionRegistry>,
    pub recorder: Arc<Recorder>,
    pub calls: Receiver<Call>,
}

impl RrcTest {
    pub fn start(config: SharedConfig) -> Self {
        setup_logging_verbose();
        let registry = Arc::new(SessionRegistry::from_config(&config.config()));
        let (recorder, calls) = Recorder::new();
        let recorder = Arc::new(recorder);
        let collab = RrcCollaborators {
            signalling: recorder.clone(),
            bearers: recorder.clone(),
            user_plane: recorder.clone(),
        };
        let net = RrcNet::start(&config, registry.clone(), collab).expect("rrc link starts");
        Self { net, registry, recorder, calls }
    }

    pub fn addr(&self) -> SocketAddrV4 {
        self.net.local_addr().expect("bound")
    }
}

pub struct RlcTest {
    pub net: RlcNet,
    pub registry: Arc<SessionRegistry>,
    pub recorder: Arc<Recorder>,
    pub calls: Receiver<Call>,
}

impl RlcTest {
    pub fn start(config: SharedConfig) -> Self {
        Self::start_with(config, Recorder::new())
    }

    pub fn start_with(config: SharedConfig, (recorder, calls): (Recorder, Receiver<Call>)) -> Self {
        setup_logging_verbose();
        let registry = Arc::new(SessionRegistry::from_config(&config.config()));
        let recorder = Arc::new(recorder);
        let net = RlcNet::start(&config, registry.clone(), recorder.clone()).expect("rlc link starts");
        Self { net, registry, recorder, calls }
    }

    pub fn addr(&self) -> SocketAddrV4 {
        self.net.local_addr().expect("bound")
    }
}

/// Simulated device socket
pub struct Device {
    socket: UdpSocket,
}

impl Device {
    pub fn new() -> Self {
        let socket = UdpSocket::bind("127.0.0.1:0").expect("device socket");
        socket.set_read_timeout(Some(Duration::from_millis(50))).unwrap();
        Self { socket }
    }

    pub fn addr(&self) -> SocketAddrV4 {
        match self.socket.local_addr().unwrap() {
            std::net::SocketAddr::V4(a) => a,
            other => panic!("unexpected address {}", other),
        }
    }

    pub fn send(&self, frame: &[u8], to: SocketAddrV4) {
        assert_eq!(self.socket.send_to(frame, to).unwrap(), frame.len());
    }

    /// Next datagram within `timeout`
    pub fn recv_within(&self, timeout: Duration) -> Option<Vec<u8>> {
        let deadline = Instant::now() + timeout;
        let mut buf = vec![0u8; 65536];
        while Instant::now() < deadline {
            if let Ok((len, _)) = self.socket.recv_from(&mut buf) {
                return Some(buf[..len].to_vec());
            }
        }
        None
    }

    pub fn recv(&self) -> Vec<u8> {
        self.recv_within(WAIT).expect("datagram for device")
    }
}

pub fn next_call(calls: &Receiver<Call>) -> Call {
    calls.recv_timeout(WAIT).expect("collaborator call")
}

pub fn assert_no_call(calls: &Receiver<Call>) {
    if let Ok(call) = calls.recv_timeout(QUIET) {
        panic!("unexpected call {:?}", call);
    }
}

/// Polls `cond` until it holds or the wait expires
pub fn wait_until(mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + WAIT;
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    cond()
}
