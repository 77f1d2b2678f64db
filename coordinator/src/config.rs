//! Coordinator configuration.

use std::time::Duration;

use atomicrename_common::time::{constants, DurationExt};

/// Main coordinator configuration.
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Bound on waiting for a single participant's prepare vote. A vote
    /// that does not arrive in time counts as an abort vote.
    pub vote_timeout: Duration,
    /// Bound on delivering a commit/abort decision to one participant.
    pub decision_timeout: Duration,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            vote_timeout: constants::vote_timeout().as_std(),
            decision_timeout: constants::decision_timeout().as_std(),
        }
    }
}

impl CoordinatorConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(ms) = std::env::var("ATOMICRENAME_VOTE_TIMEOUT_MS") {
            if let Ok(ms) = ms.parse() {
                config.vote_timeout = Duration::from_millis(ms);
            }
        }

        if let Ok(ms) = std::env::var("ATOMICRENAME_DECISION_TIMEOUT_MS") {
            if let Ok(ms) = ms.parse() {
                config.decision_timeout = Duration::from_millis(ms);
            }
        }

        config
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.vote_timeout.is_zero() {
            return Err("Vote timeout cannot be zero".to_string());
        }

        if self.decision_timeout.is_zero() {
            return Err("Decision timeout cannot be zero".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CoordinatorConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_config() {
        let mut config = CoordinatorConfig::default();
        config.vote_timeout = Duration::ZERO;
        assert!(config.validate().is_err());
    }
}
