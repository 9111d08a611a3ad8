//! Per-host politeness queue
//!
//! Each host (class key) gets one queue holding the URI records waiting to
//! be fetched from it, plus a set of politeness slots that gate how many
//! fetches may run against the host at once and how soon after a completed
//! fetch the next one may start.

use std::collections::{HashSet, VecDeque};

use crate::uri::{CrawlUri, SchedulingDirective};

/// One politeness slot of a host queue. The number of slots is the host's
/// valence: how many simultaneous fetches the host tolerates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    /// Available immediately
    Free,

    /// A record from this queue is currently being processed
    InFlight,

    /// Resting after a completed fetch until the given time (epoch ms)
    Cooling(i64),
}

impl Slot {
    /// Earliest time (epoch ms) this slot can host a fetch, or `i64::MAX`
    /// while a fetch is in flight
    fn available_at(&self) -> i64 {
        match self {
            Slot::Free => 0,
            Slot::InFlight => i64::MAX,
            Slot::Cooling(until) => *until,
        }
    }
}

/// Observable state of a host queue at a point in time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueState {
    /// Has a record that may be issued right now
    Ready,

    /// All slots are occupied, or records are in flight with nothing queued
    Busy,

    /// Waiting on a politeness cooldown or on record fetch times
    Snoozed,

    /// No records queued and none in flight
    Empty,
}

/// How a finished record settles back into (or out of) its queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
    /// Put the record back in the queue, fetchable at the given time
    Requeue { next_processing_ms: i64 },

    /// Drop the record but remember its URI for duplicate suppression
    Retire,

    /// Drop the record and forget the URI entirely, so it may be
    /// rediscovered and scheduled again later
    Forget,
}

/// The set of URI records waiting on one host, with politeness slots
#[derive(Debug)]
pub struct HostQueue {
    host_key: String,
    slots: Vec<Slot>,

    /// Waiting records. Indices below `high_water` form the grouped run of
    /// above-Normal-priority records at the head of the queue.
    entries: VecDeque<CrawlUri>,
    high_water: usize,

    /// Every URI ever admitted and not forgotten, for duplicate suppression
    known: HashSet<String>,

    /// Count of records completed and dropped with their URI remembered
    retired: u64,
}

impl HostQueue {
    /// Creates an empty queue for a host with the given valence (clamped to
    /// at least one slot)
    pub fn new(host_key: impl Into<String>, valence: u32) -> Self {
        let valence = valence.max(1) as usize;
        Self {
            host_key: host_key.into(),
            slots: vec![Slot::Free; valence],
            entries: VecDeque::new(),
            high_water: 0,
            known: HashSet::new(),
            retired: 0,
        }
    }

    pub fn host_key(&self) -> &str {
        &self.host_key
    }

    /// Number of records waiting in the queue
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of records currently issued from this queue
    pub fn in_flight(&self) -> usize {
        self.slots.iter().filter(|s| **s == Slot::InFlight).count()
    }

    /// Number of records retired from this queue
    pub fn retired(&self) -> u64 {
        self.retired
    }

    /// Whether the queue has ever admitted (and not forgotten) this URI
    pub fn knows(&self, uri: &str) -> bool {
        self.known.contains(uri)
    }

    /// True when the queue holds nothing at all: no waiting records,
    /// nothing in flight, and no remembered URIs. An exhausted queue can
    /// be dropped without losing duplicate suppression.
    pub fn is_exhausted(&self) -> bool {
        self.entries.is_empty() && self.in_flight() == 0 && self.known.is_empty()
    }

    /// Admits a newly scheduled record, unless its URI is already known.
    /// A `force_fetch` record bypasses duplicate suppression.
    ///
    /// Returns true if the record was admitted.
    pub fn enqueue(&mut self, record: CrawlUri) -> bool {
        if !record.force_fetch && self.known.contains(&record.uri) {
            return false;
        }
        self.known.insert(record.uri.clone());
        self.insert(record);
        true
    }

    /// Places a record into the queue. Above-Normal records join the back
    /// of the high-priority run at the head; Normal records join the tail.
    fn insert(&mut self, record: CrawlUri) {
        if record.directive > SchedulingDirective::Normal {
            self.entries.insert(self.high_water, record);
            self.high_water += 1;
        } else {
            self.entries.push_back(record);
        }
    }

    /// Earliest time (epoch ms) a record could be issued from this queue,
    /// or `i64::MAX` when nothing can ever become ready without further
    /// mutation (empty queue, or every slot in flight)
    pub fn next_ready_ms(&self) -> i64 {
        if self.entries.is_empty() {
            return i64::MAX;
        }
        let slot_ready = self
            .slots
            .iter()
            .map(Slot::available_at)
            .min()
            .unwrap_or(i64::MAX);
        if slot_ready == i64::MAX {
            return i64::MAX;
        }
        let record_ready = self
            .entries
            .iter()
            .map(|r| r.next_processing_ms)
            .min()
            .unwrap_or(i64::MAX);
        slot_ready.max(record_ready)
    }

    /// The queue's state as of `now`
    pub fn state(&self, now: i64) -> QueueState {
        if self.entries.is_empty() {
            return if self.in_flight() > 0 {
                QueueState::Busy
            } else {
                QueueState::Empty
            };
        }
        let ready_at = self.next_ready_ms();
        if ready_at == i64::MAX {
            QueueState::Busy
        } else if ready_at > now {
            QueueState::Snoozed
        } else {
            QueueState::Ready
        }
    }

    /// Issues the frontmost eligible record, claiming a politeness slot.
    ///
    /// Returns `None` unless the queue is [`QueueState::Ready`] as of `now`.
    pub fn dequeue(&mut self, now: i64) -> Option<CrawlUri> {
        let slot_index = self
            .slots
            .iter()
            .position(|s| s.available_at() <= now)?;
        let entry_index = self
            .entries
            .iter()
            .position(|r| r.next_processing_ms <= now)?;

        self.slots[slot_index] = Slot::InFlight;
        if entry_index < self.high_water {
            self.high_water -= 1;
        }
        // position() guarantees the index is occupied
        self.entries.remove(entry_index)
    }

    /// Settles a finished record: releases the in-flight slot (resting it
    /// until `cooldown_until_ms` when given) and applies the settlement.
    pub fn settle(
        &mut self,
        record: CrawlUri,
        settlement: Settlement,
        cooldown_until_ms: Option<i64>,
    ) {
        self.release_slot(cooldown_until_ms);
        match settlement {
            Settlement::Requeue { next_processing_ms } => {
                let mut record = record;
                record.next_processing_ms = next_processing_ms;
                // Requeued records skip duplicate suppression; their URI is
                // already in the known set.
                self.insert(record);
            }
            Settlement::Retire => {
                self.retired += 1;
            }
            Settlement::Forget => {
                self.known.remove(&record.uri);
            }
        }
    }

    /// Restores a URI into the duplicate-suppression set without queuing a
    /// record, used when reloading retired history from storage
    pub fn remember(&mut self, uri: impl Into<String>) {
        self.known.insert(uri.into());
        self.retired += 1;
    }

    /// Marks one slot as in flight without dequeuing, used when reloading
    /// a queue whose record was already issued
    pub fn claim_slot(&mut self) {
        if let Some(slot) = self.slots.iter_mut().find(|s| **s != Slot::InFlight) {
            *slot = Slot::InFlight;
        }
    }

    fn release_slot(&mut self, cooldown_until_ms: Option<i64>) {
        if let Some(slot) = self.slots.iter_mut().find(|s| **s == Slot::InFlight) {
            *slot = match cooldown_until_ms {
                Some(until) => Slot::Cooling(until),
                None => Slot::Free,
            };
        }
    }

    /// Iterates the waiting records in queue order
    pub fn iter(&self) -> impl Iterator<Item = &CrawlUri> {
        self.entries.iter()
    }
}
