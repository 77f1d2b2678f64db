//! Protocol message types.
//!
//! These types represent the request/response pairs exchanged between the
//! coordinator and participants. Each message carries the protocol version,
//! its type tag, and a timestamp, so the same shapes survive a move to a
//! real transport unchanged.

use atomicrename_common::{
    ParticipantId, RenameError, RenameTransaction, TransactionId, Vote,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Protocol version spoken by this implementation.
pub const PROTOCOL_VERSION: &str = "1.0";

/// Message type enumeration: the complete wire vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageType {
    /// Coordinator asks a participant to vote on a rename.
    Prepare,
    /// Participant agrees to the rename.
    VoteCommit,
    /// Participant refuses the rename.
    VoteAbort,
    /// Coordinator's binding commit decision.
    Commit,
    /// Coordinator's binding abort decision.
    Abort,
}

impl MessageType {
    /// Check if this type is a participant vote.
    pub fn is_vote(&self) -> bool {
        matches!(self, MessageType::VoteCommit | MessageType::VoteAbort)
    }

    /// Check if this type is a coordinator decision.
    pub fn is_decision(&self) -> bool {
        matches!(self, MessageType::Commit | MessageType::Abort)
    }
}

impl From<Vote> for MessageType {
    fn from(vote: Vote) -> Self {
        match vote {
            Vote::Commit => MessageType::VoteCommit,
            Vote::Abort => MessageType::VoteAbort,
        }
    }
}

impl TryFrom<MessageType> for Vote {
    type Error = RenameError;

    fn try_from(message_type: MessageType) -> Result<Self, Self::Error> {
        match message_type {
            MessageType::VoteCommit => Ok(Vote::Commit),
            MessageType::VoteAbort => Ok(Vote::Abort),
            other => Err(RenameError::InvalidMessage(format!(
                "expected a vote, got {other:?}"
            ))),
        }
    }
}

/// Prepare request sent to a participant during phase one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrepareRequest {
    /// Protocol version.
    pub version: String,
    /// Message type identifier (always `PREPARE`).
    pub message_type: MessageType,
    /// Transaction this request belongs to.
    pub transaction_id: TransactionId,
    /// Key to be renamed away.
    pub old_key: String,
    /// Key the entry is renamed to.
    pub new_key: String,
    /// Request timestamp.
    pub timestamp: DateTime<Utc>,
}

impl PrepareRequest {
    /// Create a prepare request for a transaction.
    pub fn new(transaction: &RenameTransaction) -> Self {
        Self {
            version: PROTOCOL_VERSION.to_string(),
            message_type: MessageType::Prepare,
            transaction_id: transaction.id,
            old_key: transaction.old_key.clone(),
            new_key: transaction.new_key.clone(),
            timestamp: Utc::now(),
        }
    }

    /// Reconstruct the transaction descriptor carried by this request.
    pub fn transaction(&self) -> RenameTransaction {
        RenameTransaction {
            id: self.transaction_id,
            old_key: self.old_key.clone(),
            new_key: self.new_key.clone(),
        }
    }
}

/// Vote response returned by a participant during phase one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoteMessage {
    /// Protocol version.
    pub version: String,
    /// Message type identifier (`VOTE_COMMIT` or `VOTE_ABORT`).
    pub message_type: MessageType,
    /// Transaction this vote responds to.
    pub transaction_id: TransactionId,
    /// Participant casting the vote.
    pub participant_id: ParticipantId,
    /// Response timestamp.
    pub timestamp: DateTime<Utc>,
}

impl VoteMessage {
    /// Create a vote message.
    pub fn new(transaction_id: TransactionId, participant_id: ParticipantId, vote: Vote) -> Self {
        Self {
            version: PROTOCOL_VERSION.to_string(),
            message_type: vote.into(),
            transaction_id,
            participant_id,
            timestamp: Utc::now(),
        }
    }

    /// Extract the vote carried by this message.
    pub fn vote(&self) -> Result<Vote, RenameError> {
        Vote::try_from(self.message_type)
    }
}

/// Decision broadcast sent to every participant during phase two.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionMessage {
    /// Protocol version.
    pub version: String,
    /// Message type identifier (`COMMIT` or `ABORT`).
    pub message_type: MessageType,
    /// Transaction this decision concludes.
    pub transaction_id: TransactionId,
    /// Key to be renamed away.
    pub old_key: String,
    /// Key the entry is renamed to.
    pub new_key: String,
    /// Decision timestamp.
    pub timestamp: DateTime<Utc>,
}

impl DecisionMessage {
    /// Create a commit decision for a transaction.
    pub fn commit(transaction: &RenameTransaction) -> Self {
        Self::decision(transaction, MessageType::Commit)
    }

    /// Create an abort decision for a transaction.
    pub fn abort(transaction: &RenameTransaction) -> Self {
        Self::decision(transaction, MessageType::Abort)
    }

    fn decision(transaction: &RenameTransaction, message_type: MessageType) -> Self {
        debug_assert!(message_type.is_decision());
        Self {
            version: PROTOCOL_VERSION.to_string(),
            message_type,
            transaction_id: transaction.id,
            old_key: transaction.old_key.clone(),
            new_key: transaction.new_key.clone(),
            timestamp: Utc::now(),
        }
    }

    /// Reconstruct the transaction descriptor carried by this decision.
    pub fn transaction(&self) -> RenameTransaction {
        RenameTransaction {
            id: self.transaction_id,
            old_key: self.old_key.clone(),
            new_key: self.new_key.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_transaction() -> RenameTransaction {
        RenameTransaction::new("apple", "APPLE")
    }

    #[test]
    fn test_wire_vocabulary() {
        let names: Vec<String> = [
            MessageType::Prepare,
            MessageType::VoteCommit,
            MessageType::VoteAbort,
            MessageType::Commit,
            MessageType::Abort,
        ]
        .iter()
        .map(|t| serde_json::to_value(t).unwrap().as_str().unwrap().to_string())
        .collect();

        assert_eq!(
            names,
            vec!["PREPARE", "VOTE_COMMIT", "VOTE_ABORT", "COMMIT", "ABORT"]
        );
    }

    #[test]
    fn test_prepare_request_round_trip() {
        let txn = create_test_transaction();
        let request = PrepareRequest::new(&txn);

        assert_eq!(request.message_type, MessageType::Prepare);
        assert_eq!(request.transaction(), txn);
    }

    #[test]
    fn test_vote_extraction() {
        let txn = create_test_transaction();
        let msg = VoteMessage::new(txn.id, ParticipantId::new("store-0"), Vote::Abort);

        assert_eq!(msg.message_type, MessageType::VoteAbort);
        assert_eq!(msg.vote().unwrap(), Vote::Abort);
    }

    #[test]
    fn test_vote_from_non_vote_type_fails() {
        assert!(Vote::try_from(MessageType::Prepare).is_err());
        assert!(Vote::try_from(MessageType::Commit).is_err());
    }

    #[test]
    fn test_decision_constructors() {
        let txn = create_test_transaction();

        assert_eq!(
            DecisionMessage::commit(&txn).message_type,
            MessageType::Commit
        );
        assert_eq!(DecisionMessage::abort(&txn).message_type, MessageType::Abort);
        assert_eq!(DecisionMessage::commit(&txn).transaction(), txn);
    }
}
