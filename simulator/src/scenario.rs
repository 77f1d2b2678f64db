//! Simulation scenarios.

use serde::{Deserialize, Serialize};

/// A simulation scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario name.
    pub name: String,
    /// Description.
    pub description: String,
    /// Steps in the scenario.
    pub steps: Vec<ScenarioStep>,
}

/// A step in a scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ScenarioStep {
    /// Run a rename transaction through the coordinator.
    Rename { old_key: String, new_key: String },
    /// Hold a lock on a key at one participant, as a concurrent in-flight
    /// transaction would, so a later rename of that key conflicts.
    HoldLock { participant_index: usize, key: String },
}

impl Scenario {
    /// Load a scenario by name.
    pub fn load(name: &str) -> anyhow::Result<Self> {
        match name {
            "rename" => Ok(Self::rename()),
            "missing-key" => Ok(Self::missing_key()),
            "contended" => Ok(Self::contended()),
            _ => Err(anyhow::anyhow!("Unknown scenario: {}", name)),
        }
    }

    /// A scenario consisting of one rename with the given keys.
    pub fn single_rename(old_key: &str, new_key: &str) -> Self {
        Self {
            name: "single-rename".to_string(),
            description: format!("Rename {old_key} to {new_key}"),
            steps: vec![ScenarioStep::Rename {
                old_key: old_key.to_string(),
                new_key: new_key.to_string(),
            }],
        }
    }

    /// The canonical rename: one store holds the key, the rest agree
    /// vacuously.
    fn rename() -> Self {
        Self {
            name: "rename".to_string(),
            description: "Rename a key held by a single participant".to_string(),
            steps: vec![ScenarioStep::Rename {
                old_key: "apple".to_string(),
                new_key: "APPLE".to_string(),
            }],
        }
    }

    /// Rename of a key no participant holds: every vote is vacuous and the
    /// round commits without touching any store.
    fn missing_key() -> Self {
        Self {
            name: "missing-key".to_string(),
            description: "Rename a key absent from every store".to_string(),
            steps: vec![ScenarioStep::Rename {
                old_key: "plum".to_string(),
                new_key: "PLUM".to_string(),
            }],
        }
    }

    /// A stale lock forces the owning participant to vote abort.
    fn contended() -> Self {
        Self {
            name: "contended".to_string(),
            description: "Rename a key locked by another in-flight transaction".to_string(),
            steps: vec![
                ScenarioStep::HoldLock {
                    participant_index: 0,
                    key: "apple".to_string(),
                },
                ScenarioStep::Rename {
                    old_key: "apple".to_string(),
                    new_key: "APPLE".to_string(),
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_scenarios_load() {
        for name in ["rename", "missing-key", "contended"] {
            assert!(Scenario::load(name).is_ok());
        }
    }

    #[test]
    fn test_unknown_scenario_fails() {
        assert!(Scenario::load("does-not-exist").is_err());
    }
}
