//! Core transaction coordinator implementation.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::time::timeout;
use tracing::{error, info, instrument, warn};

use atomicrename_common::{
    AbortReason, ParticipantId, RenameError, RenameTransaction, Result, TransactionId,
    TransactionOutcome, TransactionStatus, Vote,
};
use atomicrename_participant::ParticipantHandle;

use crate::config::CoordinatorConfig;
use crate::metrics::{CoordinatorMetrics, MetricsSnapshot};
use crate::transaction::TransactionRecord;

/// The coordinator that drives two-phase rename rounds.
///
/// Holds an ordered list of participant handles, fixed at construction.
/// One round runs at a time: prepare calls go out sequentially in list
/// order, the votes are aggregated, and the resulting decision is
/// broadcast to every participant.
pub struct TransactionCoordinator {
    /// Configuration.
    config: CoordinatorConfig,
    /// Participants, in broadcast order.
    participants: Vec<Arc<dyn ParticipantHandle>>,
    /// Records of transactions this coordinator has driven.
    transactions: DashMap<TransactionId, TransactionRecord>,
    /// Protocol metrics.
    metrics: CoordinatorMetrics,
}

impl TransactionCoordinator {
    /// Create a coordinator over an ordered participant list.
    pub fn new(config: CoordinatorConfig, participants: Vec<Arc<dyn ParticipantHandle>>) -> Self {
        Self {
            config,
            participants,
            transactions: DashMap::new(),
            metrics: CoordinatorMetrics::new(),
        }
    }

    /// Drive one rename transaction to a terminal outcome.
    ///
    /// Phase one asks each participant to vote, in list order, stopping at
    /// the first abort vote or unreachable participant. Phase two
    /// broadcasts the resulting decision to every participant, including,
    /// on abort, those never asked to prepare, for which the abort is a
    /// safe no-op.
    #[instrument(skip(self))]
    pub async fn initiate_transaction(
        &self,
        old_key: &str,
        new_key: &str,
    ) -> Result<TransactionOutcome> {
        self.validate_request(old_key, new_key)?;

        let transaction = RenameTransaction::new(old_key, new_key);
        let mut record = TransactionRecord::new(transaction.clone());
        self.metrics.transaction_initiated();

        record.transition_to(TransactionStatus::Preparing)?;
        info!(
            transaction_id = %transaction.id,
            participants = self.participants.len(),
            "prepare phase started"
        );

        let fault = self.collect_votes(&transaction).await;

        let outcome = match fault {
            None => {
                record.transition_to(TransactionStatus::Committing)?;
                info!(
                    transaction_id = %transaction.id,
                    "unanimous commit votes, broadcasting commit"
                );
                self.broadcast_commit(&transaction).await;
                record.transition_to(TransactionStatus::Committed)?;
                self.metrics.transaction_committed();
                TransactionOutcome::Committed
            }
            Some((participant, reason)) => {
                record.transition_to(TransactionStatus::Aborting)?;
                info!(
                    transaction_id = %transaction.id,
                    participant_id = %participant,
                    reason = ?reason,
                    "broadcasting abort"
                );
                self.broadcast_abort(&transaction).await;
                record.transition_to(TransactionStatus::Aborted)?;
                record.aborted_by = Some(participant.clone());
                record.abort_reason = Some(reason);
                self.metrics.transaction_aborted();
                TransactionOutcome::Aborted { participant, reason }
            }
        };

        info!(
            transaction_id = %transaction.id,
            status = ?record.status,
            duration_ms = record.timing.total_duration_ms(),
            "transaction finished"
        );
        self.transactions.insert(transaction.id, record);

        Ok(outcome)
    }

    /// Get the record of a transaction this coordinator drove.
    pub fn get_transaction(&self, transaction_id: TransactionId) -> Result<TransactionRecord> {
        self.transactions
            .get(&transaction_id)
            .map(|record| record.clone())
            .ok_or(RenameError::TransactionNotFound(transaction_id))
    }

    /// Records of all transactions driven so far.
    pub fn transactions(&self) -> Vec<TransactionRecord> {
        self.transactions
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Number of participants this coordinator addresses.
    pub fn participant_count(&self) -> usize {
        self.participants.len()
    }

    /// Current metrics snapshot.
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    // --- Private methods ---

    fn validate_request(&self, old_key: &str, new_key: &str) -> Result<()> {
        if old_key.is_empty() {
            return Err(RenameError::InvalidTransaction {
                message: "Old key must not be empty".to_string(),
                field: Some("old_key".to_string()),
            });
        }

        if new_key.is_empty() {
            return Err(RenameError::InvalidTransaction {
                message: "New key must not be empty".to_string(),
                field: Some("new_key".to_string()),
            });
        }

        if old_key == new_key {
            return Err(RenameError::InvalidTransaction {
                message: "Old and new key must differ".to_string(),
                field: Some("new_key".to_string()),
            });
        }

        Ok(())
    }

    /// Ask participants to vote, in list order, stopping at the first
    /// fault. Returns the participant and reason that force an abort, or
    /// `None` on unanimous commit votes.
    async fn collect_votes(
        &self,
        transaction: &RenameTransaction,
    ) -> Option<(ParticipantId, AbortReason)> {
        for handle in &self.participants {
            let vote = timeout(self.config.vote_timeout, handle.prepare(transaction)).await;
            match vote {
                Ok(Ok(Vote::Commit)) => {
                    self.metrics.vote_commit();
                }
                Ok(Ok(Vote::Abort)) => {
                    self.metrics.vote_abort();
                    return Some((handle.id().clone(), AbortReason::VoteAbort));
                }
                Ok(Err(e)) => {
                    self.metrics.prepare_failure();
                    warn!(
                        transaction_id = %transaction.id,
                        participant_id = %handle.id(),
                        error = %e,
                        "prepare failed, treating as abort vote"
                    );
                    return Some((handle.id().clone(), AbortReason::Unreachable));
                }
                Err(_) => {
                    self.metrics.prepare_failure();
                    warn!(
                        transaction_id = %transaction.id,
                        participant_id = %handle.id(),
                        "prepare vote timed out, treating as abort vote"
                    );
                    return Some((handle.id().clone(), AbortReason::Unreachable));
                }
            }
        }
        None
    }

    /// Deliver the commit decision to every participant in list order.
    ///
    /// Commit is infallible at the participant once it has voted; a
    /// transport failure here is logged and does not change the outcome.
    async fn broadcast_commit(&self, transaction: &RenameTransaction) {
        for handle in &self.participants {
            match timeout(self.config.decision_timeout, handle.commit(transaction)).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    error!(
                        transaction_id = %transaction.id,
                        participant_id = %handle.id(),
                        error = %e,
                        "commit delivery failed"
                    );
                }
                Err(_) => {
                    error!(
                        transaction_id = %transaction.id,
                        participant_id = %handle.id(),
                        "commit delivery timed out"
                    );
                }
            }
        }
    }

    /// Deliver the abort decision to every participant in list order,
    /// including participants that were never asked to prepare.
    async fn broadcast_abort(&self, transaction: &RenameTransaction) {
        for handle in &self.participants {
            match timeout(self.config.decision_timeout, handle.abort(transaction)).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    error!(
                        transaction_id = %transaction.id,
                        participant_id = %handle.id(),
                        error = %e,
                        "abort delivery failed"
                    );
                }
                Err(_) => {
                    error!(
                        transaction_id = %transaction.id,
                        participant_id = %handle.id(),
                        "abort delivery timed out"
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atomicrename_participant::Participant;

    fn create_test_coordinator() -> TransactionCoordinator {
        let participants: Vec<Arc<dyn ParticipantHandle>> = vec![Arc::new(
            Participant::with_entries("store-0", [("apple", "apple")]),
        )];
        TransactionCoordinator::new(CoordinatorConfig::default(), participants)
    }

    #[tokio::test]
    async fn test_coordinator_creation() {
        let coordinator = create_test_coordinator();
        assert_eq!(coordinator.participant_count(), 1);
        assert!(coordinator.transactions().is_empty());
    }

    #[tokio::test]
    async fn test_empty_keys_are_rejected() {
        let coordinator = create_test_coordinator();

        let err = coordinator.initiate_transaction("", "APPLE").await.unwrap_err();
        assert!(matches!(err, RenameError::InvalidTransaction { .. }));

        let err = coordinator.initiate_transaction("apple", "").await.unwrap_err();
        assert!(matches!(err, RenameError::InvalidTransaction { .. }));
    }

    #[tokio::test]
    async fn test_identical_keys_are_rejected() {
        let coordinator = create_test_coordinator();

        let err = coordinator
            .initiate_transaction("apple", "apple")
            .await
            .unwrap_err();
        assert!(matches!(err, RenameError::InvalidTransaction { .. }));
        // Rejected requests never become transactions.
        assert!(coordinator.transactions().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_transaction_lookup() {
        let coordinator = create_test_coordinator();
        let err = coordinator.get_transaction(TransactionId::new()).unwrap_err();
        assert!(matches!(err, RenameError::TransactionNotFound(_)));
    }
}
