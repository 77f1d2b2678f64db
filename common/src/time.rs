//! Time utilities and constants for AtomicRename protocol.

use chrono::{DateTime, Duration, Utc};

/// Protocol timing constants.
pub mod constants {
    use super::Duration;

    /// Default bound on waiting for a single prepare vote (30 seconds).
    pub fn vote_timeout() -> Duration {
        Duration::seconds(30)
    }

    /// Default bound on delivering a commit/abort decision (10 seconds).
    pub fn decision_timeout() -> Duration {
        Duration::seconds(10)
    }
}

/// A timestamp with timezone (always UTC for AtomicRename).
pub type Timestamp = DateTime<Utc>;

/// Get the current timestamp.
pub fn now() -> Timestamp {
    Utc::now()
}

/// Duration extensions for convenient conversion.
pub trait DurationExt {
    fn as_std(&self) -> std::time::Duration;
}

impl DurationExt for Duration {
    fn as_std(&self) -> std::time::Duration {
        self.to_std().unwrap_or(std::time::Duration::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants_are_positive() {
        assert!(constants::vote_timeout() > Duration::zero());
        assert!(constants::decision_timeout() > Duration::zero());
    }

    #[test]
    fn test_duration_as_std() {
        assert_eq!(
            Duration::seconds(2).as_std(),
            std::time::Duration::from_secs(2)
        );
        // Negative durations clamp to zero rather than panic
        assert_eq!(Duration::seconds(-1).as_std(), std::time::Duration::ZERO);
    }
}
