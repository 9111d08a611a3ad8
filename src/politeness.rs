//! Politeness and retry policy
//!
//! Pure functions that decide how long a host must rest after a fetch and
//! how a fetch outcome is classified. Keeping these free of scheduler state
//! makes the policy trivially testable.

use crate::config::PolitenessConfig;
use crate::frontier::{Disposition, FetchOutcome, FetchStatus};

/// Computes how long (ms) a host queue slot must cool down after a fetch.
///
/// The snooze is proportional to the observed fetch duration (slow servers
/// are visited less often), clamped to the configured floor and ceiling.
/// When no duration was observed the floor applies.
pub fn snooze_duration_ms(config: &PolitenessConfig, fetch_duration_ms: Option<u64>) -> u64 {
    let proportional = match fetch_duration_ms {
        Some(duration) => (config.delay_factor * duration as f64) as u64,
        None => config.min_delay_ms,
    };
    proportional.clamp(config.min_delay_ms, config.max_delay_ms)
}

/// Classifies a fetch outcome into a disposition.
///
/// `attempts` is the total number of attempts made so far, including the one
/// being classified. Retryable statuses are retried while
/// `attempts <= max_retries`; beyond that they become terminal failures.
pub fn classify(config: &PolitenessConfig, status: FetchStatus, attempts: u32) -> Disposition {
    if status.is_success() {
        return Disposition::Success;
    }
    match status {
        // Retried without extra delay: the blocking condition is expected
        // to clear as soon as the host queue is ready again.
        FetchStatus::Deferred | FetchStatus::AuthChallenge => {
            if attempts <= config.max_retries {
                Disposition::PromptRetry
            } else {
                Disposition::Failure
            }
        }

        // Transient network trouble, retried after a long delay.
        FetchStatus::ConnectFailed
        | FetchStatus::ConnectLost
        | FetchStatus::DomainUnresolvable => {
            if attempts <= config.max_retries {
                Disposition::DelayedRetry
            } else {
                Disposition::Failure
            }
        }

        // Terminal, but not a failure of the crawl: the URI was ruled out.
        FetchStatus::RobotsPrecluded
        | FetchStatus::OutOfScope
        | FetchStatus::TooManyEmbedHops
        | FetchStatus::TooManyLinkHops
        | FetchStatus::BlockedByUser
        | FetchStatus::DeletedByUser => Disposition::Disregard,

        FetchStatus::RuntimeError => Disposition::Failure,

        // is_success() handled above
        FetchStatus::Http(_) => Disposition::Success,
    }
}

/// Whether a terminal record should be forgotten entirely rather than
/// remembered for duplicate suppression.
///
/// Out-of-scope, hop-limited, and operator-blocked URIs may become eligible
/// again if the scope or block list changes, so they are dropped without a
/// trace. Everything else stays in the duplicate-suppression set so it is
/// not rescheduled.
pub fn should_be_forgotten(status: FetchStatus) -> bool {
    matches!(
        status,
        FetchStatus::OutOfScope
            | FetchStatus::TooManyEmbedHops
            | FetchStatus::TooManyLinkHops
            | FetchStatus::BlockedByUser
    )
}

/// Builds the classification for a full outcome: the disposition plus the
/// slot cooldown to apply when the disposition is a success.
pub fn settle(
    config: &PolitenessConfig,
    outcome: &FetchOutcome,
    attempts: u32,
) -> (Disposition, u64) {
    let disposition = classify(config, outcome.status, attempts);
    let snooze_ms = snooze_duration_ms(config, outcome.fetch_duration_ms());
    (disposition, snooze_ms)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> PolitenessConfig {
        PolitenessConfig {
            delay_factor: 5.0,
            min_delay_ms: 2_000,
            max_delay_ms: 30_000,
            max_retries: 3,
            retry_delay_seconds: 900,
            host_valence: 1,
            preference_embed_hops: 1,
        }
    }

    #[test]
    fn test_snooze_proportional_to_duration() {
        let config = test_config();
        assert_eq!(snooze_duration_ms(&config, Some(1_000)), 5_000);
        assert_eq!(snooze_duration_ms(&config, Some(2_000)), 10_000);
    }

    #[test]
    fn test_snooze_clamped_to_floor_and_ceiling() {
        let config = test_config();
        // 5 * 100 = 500ms is below the 2s floor.
        assert_eq!(snooze_duration_ms(&config, Some(100)), 2_000);
        // 5 * 60_000 = 300s is above the 30s ceiling.
        assert_eq!(snooze_duration_ms(&config, Some(60_000)), 30_000);
        // No observed duration gets the floor.
        assert_eq!(snooze_duration_ms(&config, None), 2_000);
    }

    #[test]
    fn test_snooze_always_within_bounds() {
        let config = test_config();
        for duration in [0, 1, 399, 400, 401, 5_999, 6_000, 6_001, 1_000_000] {
            let snooze = snooze_duration_ms(&config, Some(duration));
            assert!(snooze >= config.min_delay_ms);
            assert!(snooze <= config.max_delay_ms);
        }
    }

    #[test]
    fn test_any_http_response_is_success() {
        let config = test_config();
        for code in [200, 301, 404, 500, 503] {
            assert_eq!(
                classify(&config, FetchStatus::Http(code), 1),
                Disposition::Success
            );
        }
    }

    #[test]
    fn test_retry_until_exhausted() {
        let config = test_config();
        // max_retries = 3: attempts 1..=3 retry, the 4th fails out.
        for attempts in 1..=3 {
            assert_eq!(
                classify(&config, FetchStatus::ConnectFailed, attempts),
                Disposition::DelayedRetry
            );
        }
        assert_eq!(
            classify(&config, FetchStatus::ConnectFailed, 4),
            Disposition::Failure
        );
    }

    #[test]
    fn test_prompt_retry_statuses() {
        let config = test_config();
        assert_eq!(
            classify(&config, FetchStatus::Deferred, 1),
            Disposition::PromptRetry
        );
        assert_eq!(
            classify(&config, FetchStatus::AuthChallenge, 1),
            Disposition::PromptRetry
        );
        assert_eq!(
            classify(&config, FetchStatus::Deferred, 4),
            Disposition::Failure
        );
    }

    #[test]
    fn test_disregard_statuses() {
        let config = test_config();
        for status in [
            FetchStatus::RobotsPrecluded,
            FetchStatus::OutOfScope,
            FetchStatus::TooManyEmbedHops,
            FetchStatus::TooManyLinkHops,
            FetchStatus::BlockedByUser,
            FetchStatus::DeletedByUser,
        ] {
            assert_eq!(classify(&config, status, 1), Disposition::Disregard);
        }
    }

    #[test]
    fn test_runtime_error_is_failure() {
        let config = test_config();
        assert_eq!(
            classify(&config, FetchStatus::RuntimeError, 1),
            Disposition::Failure
        );
    }

    #[test]
    fn test_forgotten_statuses() {
        assert!(should_be_forgotten(FetchStatus::OutOfScope));
        assert!(should_be_forgotten(FetchStatus::TooManyEmbedHops));
        assert!(should_be_forgotten(FetchStatus::TooManyLinkHops));
        assert!(should_be_forgotten(FetchStatus::BlockedByUser));
        assert!(!should_be_forgotten(FetchStatus::RobotsPrecluded));
        assert!(!should_be_forgotten(FetchStatus::Deferred));
        assert!(!should_be_forgotten(FetchStatus::Http(404)));
    }

    #[test]
    fn test_settle_combines_classification_and_snooze() {
        let config = test_config();
        let outcome = FetchOutcome::success(200, 10_000, 11_000);
        let (disposition, snooze_ms) = settle(&config, &outcome, 1);
        assert_eq!(disposition, Disposition::Success);
        assert_eq!(snooze_ms, 5_000);
    }
}
