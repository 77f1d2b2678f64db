//! Participant node logic: vote on, apply, and abandon renames.

use tracing::{debug, info, warn};

use atomicrename_common::{ParticipantId, RenameTransaction, Result, Vote};

use crate::handle::ParticipantHandle;
use crate::store::{KeyStore, LockAttempt};

/// A participant in the rename protocol.
///
/// Owns a private [`KeyStore`]; mutated only through `prepare`, `commit`,
/// and `abort` in response to coordinator requests.
pub struct Participant {
    id: ParticipantId,
    store: KeyStore,
}

impl Participant {
    /// Create a participant with an empty store.
    pub fn new(id: impl Into<ParticipantId>) -> Self {
        Self {
            id: id.into(),
            store: KeyStore::new(),
        }
    }

    /// Create a participant seeded with initial entries.
    pub fn with_entries<I, K, V>(id: impl Into<ParticipantId>, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            id: id.into(),
            store: KeyStore::with_entries(entries),
        }
    }

    /// This participant's identity.
    pub fn id(&self) -> &ParticipantId {
        &self.id
    }

    /// The participant's store, for seeding and inspection.
    pub fn store(&self) -> &KeyStore {
        &self.store
    }

    /// Phase one: vote on a rename.
    ///
    /// Votes commit when the old key is absent (nothing to protect) or when
    /// its lock was acquired for this transaction; votes abort when another
    /// in-flight transaction holds the key.
    pub fn prepare(&self, transaction: &RenameTransaction) -> Vote {
        match self.store.try_lock(&transaction.old_key, transaction.id) {
            LockAttempt::Acquired => {
                debug!(
                    participant_id = %self.id,
                    transaction_id = %transaction.id,
                    old_key = %transaction.old_key,
                    "key locked, voting commit"
                );
                Vote::Commit
            }
            LockAttempt::Absent => {
                debug!(
                    participant_id = %self.id,
                    transaction_id = %transaction.id,
                    old_key = %transaction.old_key,
                    "key absent, voting commit"
                );
                Vote::Commit
            }
            LockAttempt::AlreadyLocked => {
                warn!(
                    participant_id = %self.id,
                    transaction_id = %transaction.id,
                    old_key = %transaction.old_key,
                    "key locked by another transaction, voting abort"
                );
                Vote::Abort
            }
        }
    }

    /// Phase two: apply the commit decision.
    ///
    /// Applies the rename only when this participant locked the old key for
    /// the deciding transaction; otherwise nothing to do. Always succeeds,
    /// idempotent.
    pub fn commit(&self, transaction: &RenameTransaction) {
        let applied = self.store.apply_rename(
            transaction.id,
            &transaction.old_key,
            &transaction.new_key,
        );
        if applied {
            info!(
                participant_id = %self.id,
                transaction_id = %transaction.id,
                old_key = %transaction.old_key,
                new_key = %transaction.new_key,
                "rename committed"
            );
        } else {
            debug!(
                participant_id = %self.id,
                transaction_id = %transaction.id,
                "no lock held for transaction, commit is a no-op"
            );
        }
    }

    /// Phase two: apply the abort decision.
    ///
    /// Releases the lock if this transaction holds it; no other state
    /// change. Always succeeds, idempotent.
    pub fn abort(&self, transaction: &RenameTransaction) {
        if self.store.release(&transaction.old_key, transaction.id) {
            info!(
                participant_id = %self.id,
                transaction_id = %transaction.id,
                old_key = %transaction.old_key,
                "lock released on abort"
            );
        } else {
            debug!(
                participant_id = %self.id,
                transaction_id = %transaction.id,
                "no lock held for transaction, abort is a no-op"
            );
        }
    }
}

#[async_trait::async_trait]
impl ParticipantHandle for Participant {
    fn id(&self) -> &ParticipantId {
        &self.id
    }

    async fn prepare(&self, transaction: &RenameTransaction) -> Result<Vote> {
        Ok(Participant::prepare(self, transaction))
    }

    async fn commit(&self, transaction: &RenameTransaction) -> Result<()> {
        Participant::commit(self, transaction);
        Ok(())
    }

    async fn abort(&self, transaction: &RenameTransaction) -> Result<()> {
        Participant::abort(self, transaction);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_participant() -> Participant {
        Participant::with_entries("store-0", [("apple", "apple")])
    }

    #[test]
    fn test_prepare_votes_commit_and_locks() {
        let participant = create_test_participant();
        let txn = RenameTransaction::new("apple", "APPLE");

        assert_eq!(participant.prepare(&txn), Vote::Commit);
        assert!(participant.store().is_locked("apple"));
    }

    #[test]
    fn test_prepare_votes_commit_on_absent_key_without_locking() {
        let participant = create_test_participant();
        let txn = RenameTransaction::new("plum", "PLUM");

        assert_eq!(participant.prepare(&txn), Vote::Commit);
        assert!(!participant.store().is_locked("plum"));
    }

    #[test]
    fn test_prepare_votes_abort_on_contended_key() {
        let participant = create_test_participant();
        let first = RenameTransaction::new("apple", "APPLE");
        let second = RenameTransaction::new("apple", "Apple");

        assert_eq!(participant.prepare(&first), Vote::Commit);
        assert_eq!(participant.prepare(&second), Vote::Abort);
        // The loser's abort must not disturb the holder's lock.
        participant.abort(&second);
        assert_eq!(participant.store().lock_owner("apple"), Some(first.id));
    }

    #[test]
    fn test_commit_applies_rename_once() {
        let participant = create_test_participant();
        let txn = RenameTransaction::new("apple", "APPLE");

        participant.prepare(&txn);
        participant.commit(&txn);

        assert!(!participant.store().contains_key("apple"));
        assert_eq!(participant.store().get("APPLE"), Some("APPLE".to_string()));
        assert!(!participant.store().is_locked("apple"));

        // Second delivery of the same decision changes nothing.
        let after_first = participant.store().entries();
        participant.commit(&txn);
        assert_eq!(participant.store().entries(), after_first);
    }

    #[test]
    fn test_commit_without_lock_leaves_store_unchanged() {
        let participant = create_test_participant();
        let txn = RenameTransaction::new("plum", "PLUM");

        participant.prepare(&txn);
        participant.commit(&txn);

        assert_eq!(participant.store().len(), 1);
        assert!(participant.store().contains_key("apple"));
        assert!(!participant.store().contains_key("PLUM"));
    }

    #[test]
    fn test_abort_is_idempotent_noop_without_lock() {
        let participant = create_test_participant();
        let txn = RenameTransaction::new("apple", "APPLE");

        // Never prepared: abort must leave everything untouched.
        participant.abort(&txn);
        assert_eq!(participant.store().len(), 1);
        assert!(!participant.store().is_locked("apple"));

        participant.prepare(&txn);
        participant.abort(&txn);
        participant.abort(&txn);
        assert!(!participant.store().is_locked("apple"));
        assert!(participant.store().contains_key("apple"));
    }
}
