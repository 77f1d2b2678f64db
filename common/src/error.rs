//! Error types for AtomicRename protocol.

use crate::{ParticipantId, TransactionId, TransactionStatus};
use thiserror::Error;

/// Main error type for AtomicRename operations.
///
/// A business-level abort is a normal protocol outcome, not an error; these
/// variants cover malformed requests and transport-level failures only.
#[derive(Error, Debug)]
pub enum RenameError {
    /// Invalid transaction request.
    #[error("Invalid transaction: {message}")]
    InvalidTransaction {
        message: String,
        field: Option<String>,
    },

    /// Invalid message on the participant boundary.
    #[error("Invalid message: {0}")]
    InvalidMessage(String),

    /// Participant cannot be reached over its channel.
    #[error("Participant unreachable: {0}")]
    ParticipantUnreachable(ParticipantId),

    /// A participant did not respond within the configured bound.
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// Transaction not found in the coordinator's registry.
    #[error("Transaction not found: {0}")]
    TransactionNotFound(TransactionId),

    /// Invalid state transition.
    #[error("Invalid transition from {from:?} to {to:?}")]
    InvalidTransition {
        from: TransactionStatus,
        to: TransactionStatus,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

impl RenameError {
    /// Check if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            RenameError::ParticipantUnreachable(_) | RenameError::Timeout(_)
        )
    }

    /// Get error code for log correlation.
    pub fn error_code(&self) -> &'static str {
        match self {
            RenameError::InvalidTransaction { .. } => "INVALID_TRANSACTION",
            RenameError::InvalidMessage(_) => "INVALID_MESSAGE",
            RenameError::ParticipantUnreachable(_) => "PARTICIPANT_UNREACHABLE",
            RenameError::Timeout(_) => "TIMEOUT",
            RenameError::TransactionNotFound(_) => "TRANSACTION_NOT_FOUND",
            RenameError::InvalidTransition { .. } => "INVALID_TRANSITION",
            RenameError::ConfigurationError(_) => "CONFIGURATION_ERROR",
        }
    }
}

/// Result type alias for AtomicRename operations.
pub type Result<T> = std::result::Result<T, RenameError>;
