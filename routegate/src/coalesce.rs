//! Request coalescing for identical in-flight work.
//!
//! When several callers miss the cache for the same key at the same time,
//! only the first one (the leader) runs the upstream work. Everyone else
//! subscribes to the leader's result.
//!
//! # Architecture
//!
//! ```text
//! Request A ─┐
//!            │                           Routing
//! Request B ─┼──► RequestCoalescer ────► Engine
//!            │        │                    │
//! Request C ─┘        │                    │
//!                     ▼                    ▼
//!               [A, B, C all           [One call]
//!                receive same              │
//!                result]◄──────────────────┘
//! ```
//!
//! # Implementation
//!
//! A `HashMap<String, broadcast::Sender<V>>` tracks in-flight keys. The
//! leader's entry is removed by a drop guard, so a leader that is cancelled
//! mid-flight closes the channel instead of stranding its waiters; they then
//! take the lead themselves.

use std::collections::HashMap;
use std::future::Future;

use parking_lot::Mutex;
use tokio::sync::broadcast;
use tracing::debug;

/// Statistics for monitoring coalescing effectiveness.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CoalescerStats {
    /// Total requests received
    pub total_requests: u64,
    /// Requests that waited for existing work
    pub coalesced_requests: u64,
    /// Requests that triggered new work
    pub new_requests: u64,
}

impl CoalescerStats {
    /// Returns the coalescing ratio (0.0 to 1.0)
    pub fn coalescing_ratio(&self) -> f64 {
        if self.total_requests == 0 {
            0.0
        } else {
            self.coalesced_requests as f64 / self.total_requests as f64
        }
    }
}

/// A value produced through the coalescer.
#[derive(Debug, Clone, PartialEq)]
pub struct Coalesced<V> {
    pub value: V,
    /// `true` if the value came from another caller's work
    pub shared: bool,
}

/// Tracks in-flight work by key.
pub struct RequestCoalescer<V> {
    in_flight: Mutex<HashMap<String, broadcast::Sender<V>>>,
    stats: Mutex<CoalescerStats>,
}

/// Removes the leader's entry when the leader finishes or is dropped.
struct LeaderGuard<'a, V> {
    in_flight: &'a Mutex<HashMap<String, broadcast::Sender<V>>>,
    key: &'a str,
}

impl<V> Drop for LeaderGuard<'_, V> {
    fn drop(&mut self) {
        self.in_flight.lock().remove(self.key);
    }
}

enum Registration<V> {
    Leader(broadcast::Sender<V>),
    Waiter(broadcast::Receiver<V>),
}

impl<V: Clone + Send + 'static> RequestCoalescer<V> {
    pub fn new() -> Self {
        Self {
            in_flight: Mutex::new(HashMap::new()),
            stats: Mutex::new(CoalescerStats::default()),
        }
    }

    /// Run `work` for `key` unless identical work is already in flight, in
    /// which case wait for and share its result.
    pub async fn run<F, Fut>(&self, key: &str, work: F) -> Coalesced<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = V>,
    {
        loop {
            match self.register(key) {
                Registration::Leader(tx) => {
                    let guard = LeaderGuard {
                        in_flight: &self.in_flight,
                        key,
                    };
                    let value = work().await;
                    // Unregister first so late arrivals start fresh work
                    drop(guard);

                    let waiters = tx.receiver_count();
                    let _ = tx.send(value.clone());
                    if waiters > 0 {
                        debug!(key = %key, waiters, "Broadcast result to coalesced waiters");
                    }
                    return Coalesced {
                        value,
                        shared: false,
                    };
                }
                Registration::Waiter(mut rx) => match rx.recv().await {
                    Ok(value) => {
                        return Coalesced {
                            value,
                            shared: true,
                        }
                    }
                    Err(_) => {
                        debug!(key = %key, "Leader abandoned request, retrying");
                    }
                },
            }
        }
    }

    fn register(&self, key: &str) -> Registration<V> {
        let mut in_flight = self.in_flight.lock();
        let mut stats = self.stats.lock();
        stats.total_requests += 1;

        if let Some(tx) = in_flight.get(key) {
            stats.coalesced_requests += 1;
            debug!(key = %key, "Coalescing request - waiting for in-flight work");
            Registration::Waiter(tx.subscribe())
        } else {
            // A single value is ever sent per channel
            let (tx, _rx) = broadcast::channel(1);
            in_flight.insert(key.to_string(), tx.clone());
            stats.new_requests += 1;
            Registration::Leader(tx)
        }
    }

    /// Returns a snapshot of the current statistics.
    pub fn stats(&self) -> CoalescerStats {
        self.stats.lock().clone()
    }

    /// Returns the number of currently in-flight keys.
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.lock().len()
    }
}

impl<V: Clone + Send + 'static> Default for RequestCoalescer<V> {
    fn default() -> Self {
        Self::new()
    }
}
