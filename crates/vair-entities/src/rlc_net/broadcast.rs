use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use vair_core::Rnti;
use vair_saps::{LinkUpperLayer, RlcDlMsg};

use crate::network::link::LinkCore;

/// Fires at most once per interval
pub(super) struct BroadcastTimer {
    interval: Duration,
    last: Mutex<Instant>,
}

impl BroadcastTimer {
    pub fn new(interval: Duration, now: Instant) -> Self {
        Self { interval, last: Mutex::new(now) }
    }

    /// True if the interval elapsed since the last time this returned true
    pub fn due(&self, now: Instant) -> bool {
        let mut last = self.last.lock().unwrap_or_else(PoisonError::into_inner);
        if now.saturating_duration_since(*last) >= self.interval {
            *last = now;
            true
        } else {
            false
        }
    }
}

/// Queues pending system information and paging for every device holding a handle.
/// Returns the number of frames queued.
pub(super) fn fan_out(core: &LinkCore<RlcDlMsg>, upper: &dyn LinkUpperLayer) -> usize {
    let si = upper.read_system_information();
    let paging = upper.read_paging();
    if si.is_none() && paging.is_none() {
        return 0;
    }

    let targets = core.registry().anonymous_addresses();
    let mut queued = 0;
    for (_, to) in &targets {
        for (sentinel, payload) in [(Rnti::SI_RNTI, &si), (Rnti::P_RNTI, &paging)] {
            if let Some(payload) = payload {
                let msg = RlcDlMsg::Broadcast { to: *to, sentinel, payload: payload.clone() };
                if core.enqueue(msg) {
                    queued += 1;
                }
            }
        }
    }
    tracing::trace!("RlcNet: broadcast {} frames to {} devices", queued, targets.len());
    queued
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timer_fires_once_per_interval() {
        let t0 = Instant::now();
        let timer = BroadcastTimer::new(Duration::from_millis(100), t0);
        assert!(!timer.due(t0 + Duration::from_millis(50)));
        assert!(timer.due(t0 + Duration::from_millis(100)));
        assert!(!timer.due(t0 + Duration::from_millis(150)));
        assert!(timer.due(t0 + Duration::from_millis(250)));
        // Clock going backwards never fires
        assert!(!timer.due(t0));
    }
}
