use std::net::SocketAddrV4;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use vair_pdus::FrameBuf;

use crate::dl_queue::DownlinkQueue;
use crate::errors::LinkErr;
use crate::metrics::{LinkCounters, LinkMetrics};
use crate::network::transports::DatagramTransport;
use crate::registry::SessionRegistry;

/// Protocol spoken over a virtual link.
/// The link owns the threads and the socket; the protocol decides what each frame means.
pub trait LinkProtocol: Send + Sync + 'static {
    /// Downlink queue item
    type Item: Send + 'static;

    /// Handles one received datagram. Runs on the uplink thread.
    fn handle_uplink(&self, core: &LinkCore<Self::Item>, frame: FrameBuf, from: SocketAddrV4) -> Result<(), LinkErr>;

    /// Delivers one queued item. Runs on the downlink thread.
    fn handle_downlink(&self, core: &LinkCore<Self::Item>, item: Self::Item) -> Result<(), LinkErr>;

    /// Called on the uplink thread after every read, whether or not a datagram arrived
    fn tick(&self, _core: &LinkCore<Self::Item>, _now: Instant) {}
}

/// State shared by the two threads of a link and by its producer API
pub struct LinkCore<T> {
    label: &'static str,
    registry: Arc<SessionRegistry>,
    queue: DownlinkQueue<T>,
    counters: LinkCounters,
    transport: Arc<dyn DatagramTransport>,
    max_datagram_size: usize,
    running: AtomicBool,
}

impl<T> LinkCore<T> {
    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    pub fn queue(&self) -> &DownlinkQueue<T> {
        &self.queue
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Hands an item to the downlink thread. Returns false if the link is stopping.
    pub fn enqueue(&self, item: T) -> bool {
        match self.queue.push(item) {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!("{}: {}, dropping downlink item", self.label, e);
                self.counters.dl_dropped();
                false
            }
        }
    }

    /// Sends one complete frame
    pub fn send_frame(&self, frame: &[u8], dest: SocketAddrV4) -> Result<(), LinkErr> {
        if frame.len() > self.max_datagram_size {
            return Err(LinkErr::Oversized { len: frame.len(), max: self.max_datagram_size });
        }
        let sent = self.transport.send_to(frame, dest)?;
        if sent != frame.len() {
            return Err(LinkErr::ShortWrite { expected: frame.len(), sent });
        }
        self.counters.dl_sent();
        Ok(())
    }

    pub fn local_addr(&self) -> Option<SocketAddrV4> {
        self.transport.local_addr().ok()
    }

    pub fn metrics(&self) -> LinkMetrics {
        self.counters.snapshot(self.registry.len())
    }
}

/// Datagram link with one uplink (receive) thread and one downlink (send) thread.
///
/// Producers only enqueue. The uplink thread is parked in the socket read, the downlink
/// thread in the queue pop.
pub struct VirtualLink<P: LinkProtocol> {
    core: Arc<LinkCore<P::Item>>,
    protocol: Arc<P>,
    uplink: Mutex<Option<JoinHandle<()>>>,
    downlink: Mutex<Option<JoinHandle<()>>>,
    stopped: AtomicBool,
}

impl<P: LinkProtocol> VirtualLink<P> {
    /// Starts both threads on an already bound transport
    pub fn start(
        label: &'static str,
        transport: Arc<dyn DatagramTransport>,
        registry: Arc<SessionRegistry>,
        protocol: P,
        max_datagram_size: usize,
    ) -> Result<Self, LinkErr> {
        let core = Arc::new(LinkCore {
            label,
            registry,
            queue: DownlinkQueue::new(),
            counters: LinkCounters::default(),
            transport,
            max_datagram_size,
            running: AtomicBool::new(true),
        });
        let protocol = Arc::new(protocol);

        let downlink = {
            let core = core.clone();
            let protocol = protocol.clone();
            thread::Builder::new()
                .name(format!("{}-dl", label).to_lowercase())
                .spawn(move || downlink_loop::<P>(&core, &protocol))
                .map_err(|e| LinkErr::ThreadSpawn(e.to_string()))?
        };

        let uplink = {
            let core = core.clone();
            let protocol = protocol.clone();
            thread::Builder::new()
                .name(format!("{}-ul", label).to_lowercase())
                .spawn(move || uplink_loop::<P>(&core, &protocol))
        };
        let uplink = match uplink {
            Ok(handle) => handle,
            Err(e) => {
                core.running.store(false, Ordering::Release);
                core.queue.close();
                core.queue.signal_stop();
                let _ = downlink.join();
                return Err(LinkErr::ThreadSpawn(e.to_string()));
            }
        };

        if let Some(addr) = core.local_addr() {
            tracing::info!("{}: listening on {}", label, addr);
        }

        Ok(Self {
            core,
            protocol,
            uplink: Mutex::new(Some(uplink)),
            downlink: Mutex::new(Some(downlink)),
            stopped: AtomicBool::new(false),
        })
    }

    pub fn core(&self) -> &LinkCore<P::Item> {
        &self.core
    }

    pub fn protocol(&self) -> &P {
        &self.protocol
    }

    pub fn local_addr(&self) -> Option<SocketAddrV4> {
        self.core.local_addr()
    }

    pub fn metrics(&self) -> LinkMetrics {
        self.core.metrics()
    }

    /// Stops both threads, drops everything still queued and clears the session table.
    /// No socket I/O happens after this returns. Calling it again does nothing.
    pub fn stop(&self) {
        if self.stopped.swap(true, Ordering::AcqRel) {
            return;
        }
        let label = self.core.label;
        tracing::debug!("{}: stopping", label);

        self.core.queue.close();
        self.core.running.store(false, Ordering::Release);
        self.core.queue.signal_stop();

        for (name, slot) in [("downlink", &self.downlink), ("uplink", &self.uplink)] {
            let handle = slot.lock().unwrap_or_else(PoisonError::into_inner).take();
            if let Some(handle) = handle {
                if handle.join().is_err() {
                    tracing::error!("{}: {} thread panicked", label, name);
                }
            }
        }

        let dropped = self.core.queue.clear();
        if dropped > 0 {
            tracing::debug!("{}: dropped {} queued downlink items", label, dropped);
        }
        self.core.registry.clear();
        tracing::info!("{}: stopped", label);
    }
}

impl<P: LinkProtocol> Drop for VirtualLink<P> {
    fn drop(&mut self) {
        self.stop();
    }
}

fn uplink_loop<P: LinkProtocol>(core: &LinkCore<P::Item>, protocol: &P) {
    let mut buf = vec![0u8; core.max_datagram_size];

    while core.is_running() {
        match core.transport.recv_from(&mut buf) {
            Ok(Some((len, from))) => {
                let frame = FrameBuf::from_datagram(buf[..len].to_vec());
                match protocol.handle_uplink(core, frame, from) {
                    Ok(()) => core.counters.ul_accepted(),
                    Err(e) => {
                        core.counters.ul_dropped();
                        tracing::warn!("{}: dropping uplink frame from {}: {}", core.label, from, e);
                    }
                }
            }
            Ok(None) => {}
            Err(e) if e.is_transient() => {
                tracing::warn!("{}: {}", core.label, e);
            }
            Err(e) => {
                tracing::error!("{}: uplink loop ended: {}", core.label, e);
                break;
            }
        }
        protocol.tick(core, Instant::now());
    }
    tracing::debug!("{}: uplink thread exiting", core.label);
}

fn downlink_loop<P: LinkProtocol>(core: &LinkCore<P::Item>, protocol: &P) {
    while let Some(item) = core.queue.pop_blocking() {
        match protocol.handle_downlink(core, item) {
            Ok(()) => {}
            Err(LinkErr::ShortWrite { expected, sent }) => {
                core.counters.short_write();
                tracing::warn!("{}: short write, sent {} of {} bytes", core.label, sent, expected);
            }
            Err(e @ (LinkErr::Oversized { .. } | LinkErr::Network(_))) => {
                core.counters.dl_dropped();
                tracing::error!("{}: dropping downlink frame: {}", core.label, e);
            }
            Err(e) => {
                core.counters.dl_dropped();
                tracing::warn!("{}: dropping downlink frame: {}", core.label, e);
            }
        }
    }
    tracing::debug!("{}: downlink thread exiting", core.label);
}
