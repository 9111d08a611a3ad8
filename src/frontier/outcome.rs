//! Fetch outcome taxonomy
//!
//! The frontier never performs I/O itself; the fetch transport reports what
//! happened through a [`FetchOutcome`], and the scheduler classifies it into
//! a [`Disposition`] via the politeness policy.

use std::fmt;

/// Status of a completed (or abandoned) fetch attempt, as reported by the
/// fetch transport or the scope oracle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchStatus {
    /// An HTTP response was received with the given status code. Receiving
    /// any response is a successful contact as far as the frontier is
    /// concerned; content-level handling belongs to the caller.
    Http(u16),

    /// Processing deferred until a precondition (e.g. robots.txt) is fetched
    Deferred,

    /// A 401 challenge for which credentials were loaded; worth an
    /// immediate retry with those credentials
    AuthChallenge,

    /// TCP connection could not be established
    ConnectFailed,

    /// Connection was lost mid-fetch
    ConnectLost,

    /// Hostname did not resolve
    DomainUnresolvable,

    /// robots.txt forbids fetching this URI
    RobotsPrecluded,

    /// Scope oracle ruled the URI out of scope
    OutOfScope,

    /// Too many embed hops from the last navigational link
    TooManyEmbedHops,

    /// Too many link hops from the seed
    TooManyLinkHops,

    /// Operator blocked this URI
    BlockedByUser,

    /// Operator deleted this URI
    DeletedByUser,

    /// An unexpected internal error occurred while processing the record
    RuntimeError,
}

impl FetchStatus {
    /// True when the fetch made successful contact with the server
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Http(_))
    }

    /// Converts the status to a database string representation
    pub fn to_db_string(&self) -> String {
        match self {
            Self::Http(code) => format!("http:{}", code),
            Self::Deferred => "deferred".to_string(),
            Self::AuthChallenge => "auth_challenge".to_string(),
            Self::ConnectFailed => "connect_failed".to_string(),
            Self::ConnectLost => "connect_lost".to_string(),
            Self::DomainUnresolvable => "domain_unresolvable".to_string(),
            Self::RobotsPrecluded => "robots_precluded".to_string(),
            Self::OutOfScope => "out_of_scope".to_string(),
            Self::TooManyEmbedHops => "too_many_embed_hops".to_string(),
            Self::TooManyLinkHops => "too_many_link_hops".to_string(),
            Self::BlockedByUser => "blocked_by_user".to_string(),
            Self::DeletedByUser => "deleted_by_user".to_string(),
            Self::RuntimeError => "runtime_error".to_string(),
        }
    }

    /// Parses a status from its database string representation
    pub fn from_db_string(s: &str) -> Option<Self> {
        if let Some(code) = s.strip_prefix("http:") {
            return code.parse().ok().map(Self::Http);
        }
        match s {
            "deferred" => Some(Self::Deferred),
            "auth_challenge" => Some(Self::AuthChallenge),
            "connect_failed" => Some(Self::ConnectFailed),
            "connect_lost" => Some(Self::ConnectLost),
            "domain_unresolvable" => Some(Self::DomainUnresolvable),
            "robots_precluded" => Some(Self::RobotsPrecluded),
            "out_of_scope" => Some(Self::OutOfScope),
            "too_many_embed_hops" => Some(Self::TooManyEmbedHops),
            "too_many_link_hops" => Some(Self::TooManyLinkHops),
            "blocked_by_user" => Some(Self::BlockedByUser),
            "deleted_by_user" => Some(Self::DeletedByUser),
            "runtime_error" => Some(Self::RuntimeError),
            _ => None,
        }
    }
}

impl fmt::Display for FetchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_string())
    }
}

/// What the fetch transport observed for one issued record
#[derive(Debug, Clone, Copy)]
pub struct FetchOutcome {
    pub status: FetchStatus,

    /// Wall-clock time (epoch ms) the fetch began, if contact was attempted
    pub fetch_began_ms: Option<i64>,

    /// Wall-clock time (epoch ms) the fetch completed
    pub fetch_completed_ms: Option<i64>,
}

impl FetchOutcome {
    /// An outcome with no timing information (no server contact was made)
    pub fn of(status: FetchStatus) -> Self {
        Self {
            status,
            fetch_began_ms: None,
            fetch_completed_ms: None,
        }
    }

    /// A successful HTTP fetch with observed timing
    pub fn success(code: u16, fetch_began_ms: i64, fetch_completed_ms: i64) -> Self {
        Self {
            status: FetchStatus::Http(code),
            fetch_began_ms: Some(fetch_began_ms),
            fetch_completed_ms: Some(fetch_completed_ms),
        }
    }

    /// Observed fetch duration in milliseconds, when both timestamps are
    /// present and ordered
    pub fn fetch_duration_ms(&self) -> Option<u64> {
        match (self.fetch_began_ms, self.fetch_completed_ms) {
            (Some(began), Some(completed)) if completed >= began => {
                Some((completed - began) as u64)
            }
            _ => None,
        }
    }
}

/// Terminal classification of a fetch outcome for one record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Contact succeeded; snooze the host and (in revisit mode) requeue
    Success,

    /// Retry as soon as the host queue is ready again, without delay
    PromptRetry,

    /// Transient failure; retry after the configured delay
    DelayedRetry,

    /// Terminal but not a failure (robots, scope, operator block)
    Disregard,

    /// Terminal failure (retries exhausted or non-retryable error)
    Failure,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_is_success() {
        assert!(FetchStatus::Http(200).is_success());
        assert!(FetchStatus::Http(404).is_success());
        assert!(!FetchStatus::ConnectFailed.is_success());
        assert!(!FetchStatus::RobotsPrecluded.is_success());
    }

    #[test]
    fn test_status_db_string_roundtrip() {
        let statuses = [
            FetchStatus::Http(200),
            FetchStatus::Http(503),
            FetchStatus::Deferred,
            FetchStatus::AuthChallenge,
            FetchStatus::ConnectFailed,
            FetchStatus::ConnectLost,
            FetchStatus::DomainUnresolvable,
            FetchStatus::RobotsPrecluded,
            FetchStatus::OutOfScope,
            FetchStatus::TooManyEmbedHops,
            FetchStatus::TooManyLinkHops,
            FetchStatus::BlockedByUser,
            FetchStatus::DeletedByUser,
            FetchStatus::RuntimeError,
        ];
        for status in statuses {
            let parsed = FetchStatus::from_db_string(&status.to_db_string());
            assert_eq!(parsed, Some(status));
        }
        assert_eq!(FetchStatus::from_db_string("bogus"), None);
        assert_eq!(FetchStatus::from_db_string("http:notanumber"), None);
    }

    #[test]
    fn test_fetch_duration() {
        let outcome = FetchOutcome::success(200, 1_000, 1_250);
        assert_eq!(outcome.fetch_duration_ms(), Some(250));

        assert_eq!(FetchOutcome::of(FetchStatus::ConnectFailed).fetch_duration_ms(), None);

        // Inverted timestamps are treated as unknown, not negative.
        let inverted = FetchOutcome {
            status: FetchStatus::Http(200),
            fetch_began_ms: Some(2_000),
            fetch_completed_ms: Some(1_000),
        };
        assert_eq!(inverted.fetch_duration_ms(), None);
    }
}
