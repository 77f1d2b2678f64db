//! Wiring glue: participants, transport, and coordinator for one run.

use std::sync::Arc;

use tracing::info;

use atomicrename_common::{RenameTransaction, Vote};
use atomicrename_coordinator::{CoordinatorConfig, TransactionCoordinator};
use atomicrename_participant::{spawn_participant, Participant, ParticipantHandle};

/// Keys used to seed participant stores, one per participant, cycling.
const SEED_KEYS: [&str; 5] = ["apple", "banana", "cherry", "date", "fig"];

/// A set of participants served behind mailboxes plus a coordinator
/// addressing them.
pub struct Cluster {
    participants: Vec<Arc<Participant>>,
    coordinator: TransactionCoordinator,
}

impl Cluster {
    /// Build `size` participants, each seeded with one key and served by
    /// its own mailbox task, and a coordinator over them in order.
    pub fn build(size: usize, config: CoordinatorConfig) -> Self {
        let participants: Vec<Arc<Participant>> = (0..size)
            .map(|i| {
                let key = SEED_KEYS[i % SEED_KEYS.len()];
                Arc::new(Participant::with_entries(format!("store-{i}"), [(key, key)]))
            })
            .collect();

        let handles: Vec<Arc<dyn ParticipantHandle>> = participants
            .iter()
            .map(|p| Arc::new(spawn_participant(p.clone())) as Arc<dyn ParticipantHandle>)
            .collect();

        info!(participants = size, "cluster built");

        Self {
            participants,
            coordinator: TransactionCoordinator::new(config, handles),
        }
    }

    /// The coordinator addressing this cluster.
    pub fn coordinator(&self) -> &TransactionCoordinator {
        &self.coordinator
    }

    /// The participants, for store inspection.
    pub fn participants(&self) -> &[Arc<Participant>] {
        &self.participants
    }

    /// Hold a lock on `key` at one participant, as a concurrent in-flight
    /// transaction would.
    pub fn hold_lock(&self, participant_index: usize, key: &str) -> anyhow::Result<()> {
        let participant = self
            .participants
            .get(participant_index)
            .ok_or_else(|| anyhow::anyhow!("No participant at index {participant_index}"))?;

        let placeholder = RenameTransaction::new(key, format!("{key}-held"));
        match participant.prepare(&placeholder) {
            Vote::Commit => {
                info!(
                    participant_id = %participant.id(),
                    key = %key,
                    "lock held by simulated in-flight transaction"
                );
                Ok(())
            }
            Vote::Abort => Err(anyhow::anyhow!(
                "key {key} is already locked at {}",
                participant.id()
            )),
        }
    }

    /// Log every participant's store contents.
    pub fn report_stores(&self) {
        for participant in &self.participants {
            let mut entries: Vec<String> = participant
                .store()
                .entries()
                .iter()
                .map(|(key, value)| format!("{key}={value}"))
                .collect();
            entries.sort();
            info!(
                participant_id = %participant.id(),
                entries = %entries.join(", "),
                "store contents"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_cluster_seeding_cycles_keys() {
        let cluster = Cluster::build(7, CoordinatorConfig::default());

        assert_eq!(cluster.participants().len(), 7);
        assert_eq!(cluster.coordinator().participant_count(), 7);
        assert!(cluster.participants()[0].store().contains_key("apple"));
        assert!(cluster.participants()[5].store().contains_key("apple"));
        assert!(cluster.participants()[6].store().contains_key("banana"));
    }

    #[tokio::test]
    async fn test_hold_lock_rejects_bad_index() {
        let cluster = Cluster::build(2, CoordinatorConfig::default());
        assert!(cluster.hold_lock(9, "apple").is_err());
        assert!(cluster.hold_lock(0, "apple").is_ok());
    }
}
