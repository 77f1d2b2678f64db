//! Rename-transaction vocabulary and state machine for the AtomicRename
//! protocol.

use crate::{ParticipantId, TransactionId};
use serde::{Deserialize, Serialize};

/// Descriptor of a single key-rename transaction.
///
/// Ephemeral: it exists for the duration of one coordinator-driven round and
/// is never persisted. The id scopes lock ownership on participants and ties
/// log lines together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameTransaction {
    /// Unique transaction identifier.
    pub id: TransactionId,
    /// Key to be renamed away.
    pub old_key: String,
    /// Key the entry is renamed to.
    pub new_key: String,
}

impl RenameTransaction {
    /// Create a new rename transaction with a fresh id.
    pub fn new(old_key: impl Into<String>, new_key: impl Into<String>) -> Self {
        Self {
            id: TransactionId::new(),
            old_key: old_key.into(),
            new_key: new_key.into(),
        }
    }
}

/// A participant's response during the prepare phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Vote {
    /// The participant can apply the rename (or holds nothing to protect).
    Commit,
    /// The participant refuses; the key is locked by another transaction.
    Abort,
}

impl Vote {
    /// Check if this vote allows the transaction to proceed.
    pub fn is_commit(&self) -> bool {
        matches!(self, Vote::Commit)
    }
}

/// Transaction status representing the lifecycle state of one round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    /// Transaction created, prepare phase not yet started.
    Initiated,
    /// Collecting votes from participants in list order.
    Preparing,
    /// Unanimous commit votes; broadcasting the commit decision.
    Committing,
    /// At least one abort vote (or unreachable participant); broadcasting
    /// the abort decision.
    Aborting,
    /// All participants received the commit decision.
    Committed,
    /// All participants received the abort decision.
    Aborted,
}

impl TransactionStatus {
    /// Check if this is a final state.
    pub fn is_final(&self) -> bool {
        matches!(self, TransactionStatus::Committed | TransactionStatus::Aborted)
    }

    /// Check if the transaction is in progress.
    pub fn is_in_progress(&self) -> bool {
        !self.is_final()
    }

    /// Get valid next states from current state.
    pub fn valid_transitions(&self) -> &[TransactionStatus] {
        match self {
            TransactionStatus::Initiated => &[TransactionStatus::Preparing],
            TransactionStatus::Preparing => {
                &[TransactionStatus::Committing, TransactionStatus::Aborting]
            }
            TransactionStatus::Committing => &[TransactionStatus::Committed],
            TransactionStatus::Aborting => &[TransactionStatus::Aborted],
            TransactionStatus::Committed => &[],
            TransactionStatus::Aborted => &[],
        }
    }

    /// Check if transition to given state is valid.
    pub fn can_transition_to(&self, next: TransactionStatus) -> bool {
        self.valid_transitions().contains(&next)
    }
}

/// Why a transaction was aborted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AbortReason {
    /// The participant answered the prepare with an abort vote.
    VoteAbort,
    /// The participant did not answer in time or the transport failed;
    /// treated as an implicit abort vote.
    Unreachable,
}

/// Final, caller-visible outcome of a transaction round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionOutcome {
    /// Every queried participant voted commit and the decision was
    /// broadcast.
    Committed,
    /// The round was aborted; `participant` names the node that caused it.
    Aborted {
        participant: ParticipantId,
        reason: AbortReason,
    },
}

impl TransactionOutcome {
    /// Check if the transaction committed.
    pub fn is_committed(&self) -> bool {
        matches!(self, TransactionOutcome::Committed)
    }

    /// Check if the transaction aborted.
    pub fn is_aborted(&self) -> bool {
        !self.is_committed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_descriptor() {
        let txn = RenameTransaction::new("apple", "APPLE");
        assert_eq!(txn.old_key, "apple");
        assert_eq!(txn.new_key, "APPLE");
    }

    #[test]
    fn test_valid_transitions() {
        assert!(TransactionStatus::Initiated.can_transition_to(TransactionStatus::Preparing));
        assert!(TransactionStatus::Preparing.can_transition_to(TransactionStatus::Committing));
        assert!(TransactionStatus::Preparing.can_transition_to(TransactionStatus::Aborting));
        assert!(TransactionStatus::Committing.can_transition_to(TransactionStatus::Committed));
        assert!(TransactionStatus::Aborting.can_transition_to(TransactionStatus::Aborted));
    }

    #[test]
    fn test_invalid_transitions() {
        // No skipping the prepare phase
        assert!(!TransactionStatus::Initiated.can_transition_to(TransactionStatus::Committing));
        // A chosen decision cannot be reversed
        assert!(!TransactionStatus::Committing.can_transition_to(TransactionStatus::Aborting));
        assert!(!TransactionStatus::Aborting.can_transition_to(TransactionStatus::Committing));
    }

    #[test]
    fn test_final_states() {
        assert!(TransactionStatus::Committed.is_final());
        assert!(TransactionStatus::Aborted.is_final());
        assert!(!TransactionStatus::Preparing.is_final());
    }

    #[test]
    fn test_outcome_accessors() {
        assert!(TransactionOutcome::Committed.is_committed());

        let aborted = TransactionOutcome::Aborted {
            participant: ParticipantId::new("store-1"),
            reason: AbortReason::VoteAbort,
        };
        assert!(aborted.is_aborted());
    }
}
