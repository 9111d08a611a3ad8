//! Frontier progress counters and the operator-facing report

use std::fmt;

use crate::queue::QueueState;

/// Lifetime counters for one frontier process
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrontierStats {
    /// Records admitted to a queue
    pub discovered: u64,

    /// Records handed out for processing
    pub issued: u64,

    /// Fetches that made server contact
    pub succeeded: u64,

    /// Records that ended in terminal failure
    pub failed: u64,

    /// Records ruled out without being failures
    pub disregarded: u64,
}

impl FrontierStats {
    /// Total records that reached a terminal state
    pub fn finished(&self) -> u64 {
        self.failed + self.disregarded
    }
}

/// Snapshot of one host queue for reporting
#[derive(Debug, Clone)]
pub struct HostReport {
    pub host_key: String,
    pub state: QueueState,
    pub queued: usize,
    pub in_flight: usize,
    pub retired: u64,

    /// Earliest time the queue can become ready (epoch ms), `i64::MAX`
    /// when it cannot without further input
    pub next_ready_ms: i64,
}

/// Point-in-time snapshot of the whole frontier, in queue-readiness order
#[derive(Debug, Clone)]
pub struct FrontierReport {
    pub generated_at_ms: i64,
    pub stats: FrontierStats,
    pub hosts: Vec<HostReport>,
}

impl FrontierReport {
    /// Total records waiting across all queues
    pub fn queued_total(&self) -> usize {
        self.hosts.iter().map(|h| h.queued).sum()
    }

    /// Total records currently issued
    pub fn in_flight_total(&self) -> usize {
        self.hosts.iter().map(|h| h.in_flight).sum()
    }

    /// A single-line summary suitable for periodic progress logging
    pub fn one_line(&self) -> String {
        let mut ready = 0;
        let mut busy = 0;
        let mut snoozed = 0;
        let mut empty = 0;
        for host in &self.hosts {
            match host.state {
                QueueState::Ready => ready += 1,
                QueueState::Busy => busy += 1,
                QueueState::Snoozed => snoozed += 1,
                QueueState::Empty => empty += 1,
            }
        }
        format!(
            "{} queues: {} ready, {} busy, {} snoozed, {} empty; {} queued, {} in flight",
            self.hosts.len(),
            ready,
            busy,
            snoozed,
            empty,
            self.queued_total(),
            self.in_flight_total()
        )
    }
}

fn state_label(state: QueueState) -> &'static str {
    match state {
        QueueState::Ready => "READY",
        QueueState::Busy => "BUSY",
        QueueState::Snoozed => "SNOOZED",
        QueueState::Empty => "EMPTY",
    }
}

impl fmt::Display for FrontierReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Frontier report")?;
        writeln!(
            f,
            "  discovered {}  issued {}  succeeded {}  failed {}  disregarded {}",
            self.stats.discovered,
            self.stats.issued,
            self.stats.succeeded,
            self.stats.failed,
            self.stats.disregarded
        )?;
        writeln!(
            f,
            "  {} host queue(s), {} queued, {} in flight",
            self.hosts.len(),
            self.queued_total(),
            self.in_flight_total()
        )?;
        for host in &self.hosts {
            let ready = if host.next_ready_ms == i64::MAX {
                "-".to_string()
            } else {
                let wait_ms = host.next_ready_ms - self.generated_at_ms;
                if wait_ms <= 0 {
                    "now".to_string()
                } else {
                    format!("+{}ms", wait_ms)
                }
            };
            writeln!(
                f,
                "  {:<30} {:<8} queued {:<6} in-flight {:<3} retired {:<6} ready {}",
                host.host_key,
                state_label(host.state),
                host.queued,
                host.in_flight,
                host.retired,
                ready
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_totals() {
        let report = FrontierReport {
            generated_at_ms: 1_000,
            stats: FrontierStats::default(),
            hosts: vec![
                HostReport {
                    host_key: "a.com".to_string(),
                    state: QueueState::Ready,
                    queued: 3,
                    in_flight: 1,
                    retired: 0,
                    next_ready_ms: 0,
                },
                HostReport {
                    host_key: "b.com".to_string(),
                    state: QueueState::Snoozed,
                    queued: 2,
                    in_flight: 0,
                    retired: 5,
                    next_ready_ms: 9_000,
                },
            ],
        };
        assert_eq!(report.queued_total(), 5);
        assert_eq!(report.in_flight_total(), 1);
    }

    #[test]
    fn test_one_line_census() {
        let report = FrontierReport {
            generated_at_ms: 1_000,
            stats: FrontierStats::default(),
            hosts: vec![
                HostReport {
                    host_key: "a.com".to_string(),
                    state: QueueState::Ready,
                    queued: 3,
                    in_flight: 0,
                    retired: 0,
                    next_ready_ms: 0,
                },
                HostReport {
                    host_key: "b.com".to_string(),
                    state: QueueState::Snoozed,
                    queued: 1,
                    in_flight: 0,
                    retired: 0,
                    next_ready_ms: 9_000,
                },
            ],
        };
        let line = report.one_line();
        assert!(line.contains("2 queues"));
        assert!(line.contains("1 ready"));
        assert!(line.contains("1 snoozed"));
        assert!(line.contains("4 queued"));
    }

    #[test]
    fn test_render_mentions_hosts_and_counts() {
        let report = FrontierReport {
            generated_at_ms: 1_000,
            stats: FrontierStats {
                discovered: 10,
                issued: 4,
                succeeded: 3,
                failed: 1,
                disregarded: 0,
            },
            hosts: vec![HostReport {
                host_key: "a.com".to_string(),
                state: QueueState::Snoozed,
                queued: 6,
                in_flight: 0,
                retired: 3,
                next_ready_ms: 5_000,
            }],
        };
        let text = report.to_string();
        assert!(text.contains("a.com"));
        assert!(text.contains("SNOOZED"));
        assert!(text.contains("discovered 10"));
        assert!(text.contains("+4000ms"));
    }
}
