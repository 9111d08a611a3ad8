//! The frontier scheduler
//!
//! The frontier owns every URI known to the crawl and decides which one is
//! fetched next. Workers call [`Frontier::next`] to receive a record,
//! process it, and hand it back through [`Frontier::finished`] with the
//! fetch outcome. Between those two calls the record's host queue keeps a
//! politeness slot claimed, so no host is ever hit harder than its valence
//! allows.
//!
//! All shared state sits behind one mutex; waiters park on a [`Notify`] and
//! are woken whenever a mutation could make a queue ready.

mod outcome;
mod report;

pub use outcome::{Disposition, FetchOutcome, FetchStatus};
pub use report::{FrontierReport, FrontierStats, HostReport};

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::Notify;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::politeness;
use crate::queue::{QueueDirectory, Settlement};
use crate::seeds::SeedList;
use crate::storage::FrontierStore;
use crate::uri::{class_key_for, now_ms, CrawlUri, SchedulingDirective};
use crate::FrontierError;

/// The crawl frontier
pub struct Frontier<S: FrontierStore> {
    config: Config,
    seeds: Arc<SeedList>,
    inner: Mutex<Inner>,
    wake: Notify,

    /// Persistence backend, locked separately so no write ever runs under
    /// the scheduler lock
    store: Mutex<S>,

    /// Records discovered mid-processing, admitted lazily at the next
    /// [`finished`](Frontier::finished) call
    deferred: Mutex<VecDeque<CrawlUri>>,
}

struct Inner {
    directory: QueueDirectory,
    stats: FrontierStats,
    paused: bool,
    terminated: bool,
}

/// A persistence write decided under the scheduler lock and applied after
/// releasing it
enum StoreOp {
    PutHost { host_key: String, valence: u32 },
    PutEntry(CrawlUri),
    SetInFlight { uri: String, in_flight: bool },
    Retire(CrawlUri),
    Delete(String),
    DeleteHost(String),
}

/// Outcome of one issue attempt under the lock
enum Step {
    Issued(CrawlUri),
    Until(i64),
    Signal,
    Retry,
}

impl<S: FrontierStore> Frontier<S> {
    /// Builds a frontier over the given store, reconstructing queues from
    /// any state persisted by an earlier run.
    ///
    /// Records that were in flight when the previous process stopped are
    /// requeued as immediately eligible; retired URIs re-enter the
    /// duplicate-suppression set without being queued.
    pub fn new(config: Config, mut store: S) -> Result<Self, FrontierError> {
        let seeds = Arc::new(SeedList::new(config.seeds.iter().cloned()));
        let valence = config.politeness.host_valence;

        let mut directory = QueueDirectory::new();
        for (host_key, host_valence) in store.hosts()? {
            directory.get_or_create(&host_key, host_valence);
        }

        let now = now_ms();
        let mut flushed = Vec::new();
        let mut requeued = 0usize;
        for entry in store.entries()? {
            let (queue, _) = directory.get_or_create(&entry.record.class_key, valence);
            if entry.retired {
                queue.remember(entry.record.uri.clone());
                continue;
            }
            let mut record = entry.record;
            if entry.in_flight {
                record.next_processing_ms = record.next_processing_ms.min(now);
                flushed.push(record.uri.clone());
            }
            if queue.enqueue(record) {
                requeued += 1;
            }
        }
        for uri in &flushed {
            if let Err(e) = store.set_in_flight(uri, false) {
                warn!(uri = %uri, error = %e, "failed to clear in-flight flag");
            }
        }

        let keys: Vec<String> = directory
            .iter_ordered()
            .map(|q| q.host_key().to_string())
            .collect();
        for key in &keys {
            directory.reorder(key);
        }

        if requeued > 0 {
            info!(
                records = requeued,
                interrupted = flushed.len(),
                hosts = directory.len(),
                "reconstructed frontier from storage"
            );
        }

        Ok(Self {
            config,
            seeds,
            inner: Mutex::new(Inner {
                directory,
                stats: FrontierStats::default(),
                paused: false,
                terminated: false,
            }),
            wake: Notify::new(),
            store: Mutex::new(store),
            deferred: Mutex::new(VecDeque::new()),
        })
    }

    /// Applies persistence writes collected under the scheduler lock. The
    /// lock must already be released; write failures are logged, never
    /// surfaced, since the in-memory frontier has already moved on.
    fn flush(&self, ops: Vec<StoreOp>) {
        if ops.is_empty() {
            return;
        }
        let mut store = self.store.lock().unwrap();
        for op in ops {
            let result = match &op {
                StoreOp::PutHost { host_key, valence } => store.put_host(host_key, *valence),
                StoreOp::PutEntry(record) => store.put_entry(record),
                StoreOp::SetInFlight { uri, in_flight } => store.set_in_flight(uri, *in_flight),
                StoreOp::Retire(record) => store.retire_entry(record),
                StoreOp::Delete(uri) => store.delete_entry(uri),
                StoreOp::DeleteHost(host_key) => store.delete_host(host_key),
            };
            if let Err(e) = result {
                warn!(error = %e, "failed to persist frontier mutation");
            }
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The live seed list
    pub fn seeds(&self) -> Arc<SeedList> {
        Arc::clone(&self.seeds)
    }

    /// Schedules every listed seed. Returns the number admitted (seeds
    /// already known from a previous run are suppressed as duplicates).
    pub fn load_seeds(&self) -> usize {
        let mut admitted = 0;
        for uri in self.seeds.snapshot() {
            match self.schedule(CrawlUri::seed(uri)) {
                Ok(true) => admitted += 1,
                Ok(false) => {}
                Err(e) => warn!(error = %e, "skipping unschedulable seed"),
            }
        }
        admitted
    }

    /// Admits a record to its host queue.
    ///
    /// Returns `Ok(false)` when the URI is already known to the queue and
    /// was suppressed as a duplicate. Fails only when no class key can be
    /// derived for the URI.
    pub fn schedule(&self, record: CrawlUri) -> Result<bool, FrontierError> {
        let mut record = record;
        if record.class_key.is_empty() {
            record.class_key = class_key_for(&record.uri).ok_or_else(|| {
                FrontierError::Unschedulable {
                    uri: record.uri.clone(),
                }
            })?;
        }

        // A seed whose first fetch redirected adopts its target as a seed.
        if record.is_seed_redirect() && self.seeds.push(record.uri.clone()) {
            info!(uri = %record.uri, via = ?record.via, "adopted redirected seed");
        }
        if record.is_seed {
            record.directive = record.directive.max(SchedulingDirective::Medium);
        }

        // Embedded resources near a navigational link jump the queue so
        // pages render complete in the archive.
        let hops = record.trans_hop_count();
        if record.directive == SchedulingDirective::Normal
            && hops > 0
            && hops <= self.config.politeness.preference_embed_hops
        {
            record.directive = SchedulingDirective::Medium;
        }

        let valence = self.config.politeness.host_valence;
        let key = record.class_key.clone();

        let mut ops = Vec::new();
        let mut inner = self.inner.lock().unwrap();
        let (_, created) = inner.directory.get_or_create(&key, valence);
        if created {
            ops.push(StoreOp::PutHost {
                host_key: key.clone(),
                valence,
            });
        }

        let admitted = inner
            .directory
            .get_mut(&key)
            .map(|queue| queue.enqueue(record.clone()))
            .unwrap_or(false);

        if !admitted {
            drop(inner);
            debug!(uri = %record.uri, "duplicate suppressed");
            return Ok(false);
        }

        inner.stats.discovered += 1;
        ops.push(StoreOp::PutEntry(record.clone()));
        inner.directory.reorder(&key);
        drop(inner);

        self.flush(ops);
        debug!(uri = %record.uri, host = %key, "scheduled");
        self.wake.notify_waiters();
        Ok(true)
    }

    /// Queues a record for admission at the next [`finished`] call.
    ///
    /// Workers use this for URIs extracted from fetched content, so
    /// discovery never contends with the issue path mid-fetch.
    pub fn schedule_deferred(&self, record: CrawlUri) {
        self.deferred.lock().unwrap().push_back(record);
    }

    /// Hands out the next record eligible for processing.
    ///
    /// Waits for as long as every queue is busy, snoozed, or empty, and
    /// while the frontier is paused. Fails once the frontier has been
    /// terminated.
    pub async fn next(&self) -> Result<CrawlUri, FrontierError> {
        loop {
            let notified = self.wake.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            let step = {
                let mut inner = self.inner.lock().unwrap();
                if inner.terminated {
                    return Err(FrontierError::Terminated);
                }
                if inner.paused {
                    Step::Signal
                } else {
                    Self::try_issue(&mut inner)
                }
            };

            match step {
                Step::Issued(record) => {
                    self.flush(vec![StoreOp::SetInFlight {
                        uri: record.uri.clone(),
                        in_flight: true,
                    }]);
                    return Ok(record);
                }
                Step::Retry => continue,
                Step::Signal => notified.await,
                Step::Until(ready_ms) => {
                    let wait = (ready_ms - now_ms()).max(0) as u64;
                    tokio::select! {
                        _ = &mut notified => {}
                        _ = tokio::time::sleep(Duration::from_millis(wait)) => {}
                    }
                }
            }
        }
    }

    fn try_issue(inner: &mut Inner) -> Step {
        let Some((key, ready)) = inner.directory.top() else {
            return Step::Signal;
        };
        if ready == i64::MAX {
            // Every queue is busy or empty; only a mutation can help.
            return Step::Signal;
        }
        let now = now_ms();
        if ready > now {
            return Step::Until(ready);
        }

        let key = key.to_string();
        let record = inner
            .directory
            .get_mut(&key)
            .and_then(|queue| queue.dequeue(now));
        inner.directory.reorder(&key);

        match record {
            Some(record) => {
                inner.stats.issued += 1;
                debug!(uri = %record.uri, host = %key, "issued");
                Step::Issued(record)
            }
            None => {
                // Only a stale ordering explains an empty-handed dequeue;
                // a queue whose fresh ready time is due always yields.
                debug_assert!(
                    inner
                        .directory
                        .get(&key)
                        .map_or(true, |queue| queue.next_ready_ms() > now),
                    "queue claimed ready but yielded no record"
                );
                debug!(host = %key, "queue readiness was stale");
                Step::Retry
            }
        }
    }

    /// Returns a processed record, settling it according to the fetch
    /// outcome: snooze and requeue on success (or retire in one-shot
    /// mode), requeue for retry on transient errors, retire or forget on
    /// terminal outcomes.
    ///
    /// Any records passed to [`schedule_deferred`] since the last call are
    /// admitted first.
    pub fn finished(&self, record: CrawlUri, outcome: FetchOutcome) -> Disposition {
        self.drain_deferred();

        let mut record = record;
        record.fetch_attempts += 1;
        record.last_fetch_status = Some(outcome.status);

        let politeness_config = &self.config.politeness;
        let (disposition, snooze_ms) =
            politeness::settle(politeness_config, &outcome, record.fetch_attempts);
        let now = now_ms();
        // Snoozes run from when the fetch actually finished, not from when
        // the worker got around to reporting it.
        let anchor = outcome.fetch_completed_ms.unwrap_or(now);
        let key = record.class_key.clone();

        let mut ops = Vec::new();
        let mut inner = self.inner.lock().unwrap();
        let (settlement, cooldown) = match disposition {
            Disposition::Success => {
                inner.stats.succeeded += 1;
                let cooldown = Some(anchor + snooze_ms as i64);
                if self.config.frontier.one_shot {
                    ops.push(StoreOp::Retire(record.clone()));
                    (Settlement::Retire, cooldown)
                } else {
                    // Revisit mode: the record goes back in at normal
                    // priority, eligible once the host has rested.
                    record.directive = SchedulingDirective::Normal;
                    record.next_processing_ms = anchor + snooze_ms as i64;
                    ops.push(StoreOp::PutEntry(record.clone()));
                    (
                        Settlement::Requeue {
                            next_processing_ms: record.next_processing_ms,
                        },
                        cooldown,
                    )
                }
            }
            Disposition::PromptRetry => {
                record.next_processing_ms = now;
                ops.push(StoreOp::PutEntry(record.clone()));
                (Settlement::Requeue {
                    next_processing_ms: now,
                }, None)
            }
            Disposition::DelayedRetry => {
                record.next_processing_ms = now + politeness_config.retry_delay_ms();
                ops.push(StoreOp::PutEntry(record.clone()));
                (Settlement::Requeue {
                    next_processing_ms: record.next_processing_ms,
                }, None)
            }
            Disposition::Disregard => {
                inner.stats.disregarded += 1;
                (Self::settle_terminal(&record, &mut ops), None)
            }
            Disposition::Failure => {
                inner.stats.failed += 1;
                (Self::settle_terminal(&record, &mut ops), None)
            }
        };

        debug!(
            uri = %record.uri,
            status = %outcome.status,
            disposition = ?disposition,
            attempts = record.fetch_attempts,
            "finished"
        );

        if let Some(queue) = inner.directory.get_mut(&key) {
            queue.settle(record, settlement, cooldown);
        }
        inner.directory.reorder(&key);

        // A queue with nothing waiting, nothing in flight, and no history
        // worth keeping is dropped; the host re-registers on rediscovery.
        if inner
            .directory
            .get(&key)
            .map_or(false, |queue| queue.is_exhausted())
        {
            inner.directory.remove(&key);
            ops.push(StoreOp::DeleteHost(key.clone()));
            debug!(host = %key, "dropped exhausted host queue");
        }
        drop(inner);

        self.flush(ops);
        self.wake.notify_waiters();
        disposition
    }

    fn settle_terminal(record: &CrawlUri, ops: &mut Vec<StoreOp>) -> Settlement {
        let forgotten = record
            .last_fetch_status
            .map(politeness::should_be_forgotten)
            .unwrap_or(false);
        if forgotten {
            ops.push(StoreOp::Delete(record.uri.clone()));
            Settlement::Forget
        } else {
            ops.push(StoreOp::Retire(record.clone()));
            Settlement::Retire
        }
    }

    fn drain_deferred(&self) {
        loop {
            let record = self.deferred.lock().unwrap().pop_front();
            let Some(record) = record else { break };
            if let Err(e) = self.schedule(record) {
                debug!(error = %e, "dropping unschedulable deferred record");
            }
        }
    }

    /// Stops issuing records until [`unpause`](Self::unpause). Records
    /// already issued may still be finished.
    pub fn pause(&self) {
        self.inner.lock().unwrap().paused = true;
        info!("frontier paused");
    }

    pub fn unpause(&self) {
        self.inner.lock().unwrap().paused = false;
        info!("frontier unpaused");
        self.wake.notify_waiters();
    }

    /// Shuts the frontier down: every pending and future [`next`] call
    /// fails with [`FrontierError::Terminated`].
    pub fn terminate(&self) {
        self.inner.lock().unwrap().terminated = true;
        info!("frontier terminated");
        self.wake.notify_waiters();
    }

    pub fn is_terminated(&self) -> bool {
        self.inner.lock().unwrap().terminated
    }

    /// Total records waiting across all host queues
    pub fn queued_count(&self) -> usize {
        let inner = self.inner.lock().unwrap();
        inner.directory.iter_ordered().map(|q| q.len()).sum()
    }

    /// Records currently issued and not yet finished
    pub fn in_flight_count(&self) -> usize {
        let inner = self.inner.lock().unwrap();
        inner.directory.iter_ordered().map(|q| q.in_flight()).sum()
    }

    /// True when nothing is queued and nothing is in flight
    pub fn is_idle(&self) -> bool {
        let inner = self.inner.lock().unwrap();
        let idle = inner
            .directory
            .iter_ordered()
            .all(|q| q.is_empty() && q.in_flight() == 0);
        idle
    }

    pub fn stats(&self) -> FrontierStats {
        self.inner.lock().unwrap().stats
    }

    /// Snapshot of all queues and counters, in readiness order
    pub fn report(&self) -> FrontierReport {
        let inner = self.inner.lock().unwrap();
        let now = now_ms();
        let hosts = inner
            .directory
            .iter_ordered()
            .map(|queue| HostReport {
                host_key: queue.host_key().to_string(),
                state: queue.state(now),
                queued: queue.len(),
                in_flight: queue.in_flight(),
                retired: queue.retired(),
                next_ready_ms: queue.next_ready_ms(),
            })
            .collect();
        FrontierReport {
            generated_at_ms: now,
            stats: inner.stats,
            hosts,
        }
    }
}
