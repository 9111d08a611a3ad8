//! Directory of host queues, ordered by readiness
//!
//! Keeps every host queue reachable by class key and maintains an ordering
//! by (next ready time, key) so the scheduler can find the next queue to
//! serve without scanning them all.

use std::collections::{BTreeSet, HashMap};

use super::host_queue::HostQueue;

/// All host queues, indexed by class key and ordered by readiness
#[derive(Debug, Default)]
pub struct QueueDirectory {
    queues: HashMap<String, HostQueue>,

    /// Queues ordered by (next ready ms, class key). Ties on time resolve
    /// deterministically by key.
    order: BTreeSet<(i64, String)>,

    /// The ready time each queue was last ordered under. Mutating a queue
    /// invalidates its entry until [`reorder`](Self::reorder) runs.
    ordered_at: HashMap<String, i64>,
}

impl QueueDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of host queues
    pub fn len(&self) -> usize {
        self.queues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queues.is_empty()
    }

    /// Returns the queue for a class key, creating it (with the given
    /// valence) if this is the first URI for the host.
    ///
    /// The bool is true when the queue was created by this call.
    pub fn get_or_create(&mut self, class_key: &str, valence: u32) -> (&mut HostQueue, bool) {
        let created = !self.queues.contains_key(class_key);
        if created {
            let queue = HostQueue::new(class_key, valence);
            let ready = queue.next_ready_ms();
            self.order.insert((ready, class_key.to_string()));
            self.ordered_at.insert(class_key.to_string(), ready);
            self.queues.insert(class_key.to_string(), queue);
        }
        // contains_key/insert above guarantee presence
        (
            self.queues
                .get_mut(class_key)
                .unwrap_or_else(|| unreachable!()),
            created,
        )
    }

    pub fn get(&self, class_key: &str) -> Option<&HostQueue> {
        self.queues.get(class_key)
    }

    /// Mutable access to a queue. The caller must call
    /// [`reorder`](Self::reorder) afterwards if the queue was mutated.
    pub fn get_mut(&mut self, class_key: &str) -> Option<&mut HostQueue> {
        self.queues.get_mut(class_key)
    }

    /// Re-files a queue under its current ready time after a mutation
    pub fn reorder(&mut self, class_key: &str) {
        let Some(queue) = self.queues.get(class_key) else {
            return;
        };
        let ready = queue.next_ready_ms();
        if let Some(old) = self.ordered_at.get(class_key) {
            if *old == ready {
                return;
            }
            self.order.remove(&(*old, class_key.to_string()));
        }
        self.order.insert((ready, class_key.to_string()));
        self.ordered_at.insert(class_key.to_string(), ready);
    }

    /// The queue soonest to become ready: its class key and ready time
    /// (epoch ms, `i64::MAX` when it cannot become ready on its own)
    pub fn top(&self) -> Option<(&str, i64)> {
        self.order
            .iter()
            .next()
            .map(|(ready, key)| (key.as_str(), *ready))
    }

    /// Drops a queue entirely
    pub fn remove(&mut self, class_key: &str) {
        if self.queues.remove(class_key).is_some() {
            if let Some(old) = self.ordered_at.remove(class_key) {
                self.order.remove(&(old, class_key.to_string()));
            }
        }
    }

    /// Iterates queues in readiness order
    pub fn iter_ordered(&self) -> impl Iterator<Item = &HostQueue> {
        self.order
            .iter()
            .filter_map(move |(_, key)| self.queues.get(key))
    }
}
