use std::sync::atomic::{AtomicU64, Ordering};

/// Snapshot of the counters of one link
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkMetrics {
    pub ul_accepted: u64,
    pub ul_dropped: u64,
    pub dl_sent: u64,
    pub dl_dropped: u64,
    pub short_writes: u64,
    /// Live sessions in the registry the link works on
    pub active_users: usize,
}

impl core::fmt::Display for LinkMetrics {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "ul {} ok / {} dropped, dl {} sent / {} dropped ({} short), {} users",
            self.ul_accepted, self.ul_dropped, self.dl_sent, self.dl_dropped, self.short_writes, self.active_users
        )
    }
}

/// Live counters, bumped from both link threads
#[derive(Debug, Default)]
pub struct LinkCounters {
    ul_accepted: AtomicU64,
    ul_dropped: AtomicU64,
    dl_sent: AtomicU64,
    dl_dropped: AtomicU64,
    short_writes: AtomicU64,
}

impl LinkCounters {
    pub fn ul_accepted(&self) {
        self.ul_accepted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn ul_dropped(&self) {
        self.ul_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn dl_sent(&self) {
        self.dl_sent.fetch_add(1, Ordering::Relaxed);
    }

    pub fn dl_dropped(&self) {
        self.dl_dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// A short write counts as a dropped frame too
    pub fn short_write(&self) {
        self.short_writes.fetch_add(1, Ordering::Relaxed);
        self.dl_dropped();
    }

    pub fn snapshot(&self, active_users: usize) -> LinkMetrics {
        LinkMetrics {
            ul_accepted: self.ul_accepted.load(Ordering::Relaxed),
            ul_dropped: self.ul_dropped.load(Ordering::Relaxed),
            dl_sent: self.dl_sent.load(Ordering::Relaxed),
            dl_dropped: self.dl_dropped.load(Ordering::Relaxed),
            short_writes: self.short_writes.load(Ordering::Relaxed),
            active_users,
        }
    }
}
