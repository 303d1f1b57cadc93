use std::sync::{PoisonError, RwLock};

use crossbeam_channel::{Receiver, Sender, bounded, select, unbounded};
use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum QueueErr {
    #[error("downlink queue closed")]
    Closed,
}

/// Multi-producer, single-consumer queue feeding a downlink sender thread.
///
/// `push` never blocks. `pop_blocking` parks the consumer until an item arrives or
/// `signal_stop` is called. Once `close` has returned no push is in flight and all
/// later pushes are refused, so nothing can be queued behind a stopped sender.
pub struct DownlinkQueue<T> {
    tx: Sender<T>,
    rx: Receiver<T>,
    stop_tx: Sender<()>,
    stop_rx: Receiver<()>,
    /// Pushes hold the read side while checking and sending; close takes the write side
    closed: RwLock<bool>,
}

impl<T> DownlinkQueue<T> {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        let (stop_tx, stop_rx) = bounded(1);
        Self { tx, rx, stop_tx, stop_rx, closed: RwLock::new(false) }
    }

    pub fn push(&self, item: T) -> Result<(), QueueErr> {
        let closed = self.closed.read().unwrap_or_else(PoisonError::into_inner);
        if *closed {
            return Err(QueueErr::Closed);
        }
        // We hold our own receiver, the channel cannot be disconnected
        self.tx.send(item).map_err(|_| QueueErr::Closed)
    }

    /// Waits for the next item. Returns None once a stop was signalled.
    pub fn pop_blocking(&self) -> Option<T> {
        select! {
            recv(self.rx) -> item => item.ok(),
            recv(self.stop_rx) -> _ => None,
        }
    }

    /// Refuses every later push
    pub fn close(&self) {
        let mut closed = self.closed.write().unwrap_or_else(PoisonError::into_inner);
        *closed = true;
    }

    pub fn is_closed(&self) -> bool {
        *self.closed.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Wakes the consumer out of `pop_blocking`
    pub fn signal_stop(&self) {
        let _ = self.stop_tx.try_send(());
    }

    /// Drops every pending item, returns how many were dropped
    pub fn clear(&self) -> usize {
        self.rx.try_iter().count()
    }

    /// Drops pending items for which `keep` returns false, preserving the order of the rest.
    /// Returns how many were dropped.
    pub fn retain<F: FnMut(&T) -> bool>(&self, mut keep: F) -> usize {
        // Block producers so the re-queued items stay in front of newer ones
        let _guard = self.closed.write().unwrap_or_else(PoisonError::into_inner);
        let pending: Vec<T> = self.rx.try_iter().collect();
        let mut dropped = 0;
        for item in pending {
            if keep(&item) {
                let _ = self.tx.send(item);
            } else {
                dropped += 1;
            }
        }
        dropped
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

impl<T> Default for DownlinkQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_fifo_order() {
        let q = DownlinkQueue::new();
        for i in 0..5 {
            q.push(i).unwrap();
        }
        assert_eq!(q.len(), 5);
        let got: Vec<i32> = (0..5).filter_map(|_| q.pop_blocking()).collect();
        assert_eq!(got, vec![0, 1, 2, 3, 4]);
        assert!(q.is_empty());
    }

    #[test]
    fn test_pop_wakes_on_push_from_other_thread() {
        let q = Arc::new(DownlinkQueue::new());
        let q2 = q.clone();
        let consumer = thread::spawn(move || q2.pop_blocking());
        thread::sleep(Duration::from_millis(20));
        q.push(42u32).unwrap();
        assert_eq!(consumer.join().unwrap(), Some(42));
    }

    #[test]
    fn test_stop_wakes_consumer() {
        let q: Arc<DownlinkQueue<u32>> = Arc::new(DownlinkQueue::new());
        let q2 = q.clone();
        let consumer = thread::spawn(move || q2.pop_blocking());
        thread::sleep(Duration::from_millis(20));
        q.signal_stop();
        assert_eq!(consumer.join().unwrap(), None);
    }

    #[test]
    fn test_push_after_close_rejected() {
        let q = DownlinkQueue::new();
        q.push(1u8).unwrap();
        q.close();
        assert!(q.is_closed());
        assert_eq!(q.push(2u8), Err(QueueErr::Closed));
        assert_eq!(q.clear(), 1);
        assert!(q.is_empty());
    }

    #[test]
    fn test_retain_keeps_order() {
        let q = DownlinkQueue::new();
        for i in 0..10u32 {
            q.push(i).unwrap();
        }
        assert_eq!(q.retain(|i| i % 3 != 0), 4);
        q.push(100).unwrap();
        let got: Vec<u32> = q.rx.try_iter().collect();
        assert_eq!(got, vec![1, 2, 4, 5, 7, 8, 100]);
    }
}
