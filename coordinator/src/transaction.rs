//! Per-transaction records kept by the coordinator.

use chrono::{DateTime, Utc};

use atomicrename_common::{
    AbortReason, ParticipantId, RenameError, RenameTransaction, TransactionOutcome,
    TransactionStatus,
};

/// A transaction as the coordinator tracks it through one round.
#[derive(Debug, Clone)]
pub struct TransactionRecord {
    /// The descriptor this record tracks.
    pub transaction: RenameTransaction,
    /// Current lifecycle status.
    pub status: TransactionStatus,
    /// Timing metrics.
    pub timing: TransactionTiming,
    /// Participant that caused an abort, if the round aborted.
    pub aborted_by: Option<ParticipantId>,
    /// Why the round aborted, if it did.
    pub abort_reason: Option<AbortReason>,
}

impl TransactionRecord {
    /// Create a record for a freshly initiated transaction.
    pub fn new(transaction: RenameTransaction) -> Self {
        Self {
            transaction,
            status: TransactionStatus::Initiated,
            timing: TransactionTiming::new(),
            aborted_by: None,
            abort_reason: None,
        }
    }

    /// Transition to a new status, stamping the timing as phases pass.
    pub fn transition_to(&mut self, next: TransactionStatus) -> Result<(), RenameError> {
        if !self.status.can_transition_to(next) {
            return Err(RenameError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;

        let now = Utc::now();
        match next {
            TransactionStatus::Preparing => self.timing.prepare_started_at = Some(now),
            TransactionStatus::Committing | TransactionStatus::Aborting => {
                self.timing.decided_at = Some(now)
            }
            TransactionStatus::Committed | TransactionStatus::Aborted => {
                self.timing.completed_at = Some(now)
            }
            TransactionStatus::Initiated => {}
        }
        Ok(())
    }

    /// The caller-visible outcome, once the record is terminal.
    pub fn outcome(&self) -> Option<TransactionOutcome> {
        match self.status {
            TransactionStatus::Committed => Some(TransactionOutcome::Committed),
            TransactionStatus::Aborted => self
                .aborted_by
                .clone()
                .zip(self.abort_reason)
                .map(|(participant, reason)| TransactionOutcome::Aborted {
                    participant,
                    reason,
                }),
            _ => None,
        }
    }
}

/// Timing metrics for one transaction round.
#[derive(Debug, Clone)]
pub struct TransactionTiming {
    /// When the transaction was initiated.
    pub initiated_at: DateTime<Utc>,
    /// When the prepare phase started.
    pub prepare_started_at: Option<DateTime<Utc>>,
    /// When the commit/abort decision was reached.
    pub decided_at: Option<DateTime<Utc>>,
    /// When the decision broadcast finished.
    pub completed_at: Option<DateTime<Utc>>,
}

impl TransactionTiming {
    /// Create new timing with the current timestamp as initiation time.
    pub fn new() -> Self {
        Self {
            initiated_at: Utc::now(),
            prepare_started_at: None,
            decided_at: None,
            completed_at: None,
        }
    }

    /// Duration of the vote-collection phase in milliseconds.
    pub fn vote_duration_ms(&self) -> Option<i64> {
        match (self.prepare_started_at, self.decided_at) {
            (Some(started), Some(decided)) => Some((decided - started).num_milliseconds()),
            _ => None,
        }
    }

    /// Total round duration in milliseconds (if completed).
    pub fn total_duration_ms(&self) -> Option<i64> {
        self.completed_at
            .map(|completed| (completed - self.initiated_at).num_milliseconds())
    }
}

impl Default for TransactionTiming {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_record() -> TransactionRecord {
        TransactionRecord::new(RenameTransaction::new("apple", "APPLE"))
    }

    #[test]
    fn test_commit_path_transitions() {
        let mut record = create_test_record();

        record.transition_to(TransactionStatus::Preparing).unwrap();
        record.transition_to(TransactionStatus::Committing).unwrap();
        record.transition_to(TransactionStatus::Committed).unwrap();

        assert_eq!(record.outcome(), Some(TransactionOutcome::Committed));
        assert!(record.timing.total_duration_ms().is_some());
        assert!(record.timing.vote_duration_ms().is_some());
    }

    #[test]
    fn test_abort_path_records_cause() {
        let mut record = create_test_record();

        record.transition_to(TransactionStatus::Preparing).unwrap();
        record.transition_to(TransactionStatus::Aborting).unwrap();
        record.transition_to(TransactionStatus::Aborted).unwrap();
        record.aborted_by = Some(ParticipantId::new("store-2"));
        record.abort_reason = Some(AbortReason::VoteAbort);

        assert_eq!(
            record.outcome(),
            Some(TransactionOutcome::Aborted {
                participant: ParticipantId::new("store-2"),
                reason: AbortReason::VoteAbort,
            })
        );
    }

    #[test]
    fn test_invalid_transition_is_rejected() {
        let mut record = create_test_record();

        let err = record
            .transition_to(TransactionStatus::Committed)
            .unwrap_err();
        assert!(matches!(err, RenameError::InvalidTransition { .. }));
        assert_eq!(record.status, TransactionStatus::Initiated);
    }

    #[test]
    fn test_no_outcome_before_terminal() {
        let mut record = create_test_record();
        assert!(record.outcome().is_none());

        record.transition_to(TransactionStatus::Preparing).unwrap();
        assert!(record.outcome().is_none());
    }
}
