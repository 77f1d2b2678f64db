//! The request/response seam between coordinator and participants.

use atomicrename_common::{ParticipantId, RenameTransaction, Result, Vote};

/// Operations a coordinator can request of a participant.
///
/// Every method is one request/response exchange. The coordinator only
/// talks through this trait, so a participant may sit behind a direct call,
/// an in-process mailbox, or a real transport without the protocol logic
/// changing.
#[async_trait::async_trait]
pub trait ParticipantHandle: Send + Sync {
    /// Stable identity of the participant behind this handle.
    fn id(&self) -> &ParticipantId;

    /// Phase one: ask the participant to vote on a rename.
    async fn prepare(&self, transaction: &RenameTransaction) -> Result<Vote>;

    /// Phase two: deliver the binding commit decision.
    async fn commit(&self, transaction: &RenameTransaction) -> Result<()>;

    /// Phase two: deliver the binding abort decision.
    async fn abort(&self, transaction: &RenameTransaction) -> Result<()>;
}
