//! URI record handling for seine
//!
//! This module provides the crawl URI record type, scheduling metadata
//! enums, and the class-key derivation that assigns URIs to host queues.

mod class_key;
mod record;

pub use class_key::{class_key_for, trans_hop_count};
pub use record::{CrawlUri, SchedulingDirective, ViaContext};

use chrono::Utc;

/// Returns the current wall-clock time in epoch milliseconds.
///
/// Scheduling times are wall-clock (not monotonic) so that persisted
/// frontier state remains meaningful across process restarts.
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}
