//! In-process mailbox transport for participants.
//!
//! Each participant runs behind an addressable mpsc channel: a spawned
//! service task owns the node and serves protocol messages, replying over
//! oneshot channels. [`ParticipantChannel`] is the coordinator-side handle.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use atomicrename_common::{ParticipantId, RenameError, RenameTransaction, Result, Vote};
use atomicrename_protocol::{DecisionMessage, MessageType, PrepareRequest, VoteMessage};

use crate::handle::ParticipantHandle;
use crate::participant::Participant;

const MAILBOX_CAPACITY: usize = 16;

/// Requests a participant's service task can receive.
#[derive(Debug)]
pub enum ParticipantRequest {
    /// Phase-one prepare; the vote is returned on `reply`.
    Prepare {
        request: PrepareRequest,
        reply: oneshot::Sender<VoteMessage>,
    },
    /// Phase-two decision; `reply` acknowledges application.
    Decision {
        message: DecisionMessage,
        reply: oneshot::Sender<()>,
    },
}

/// Coordinator-side handle to a participant served over a mailbox.
#[derive(Clone)]
pub struct ParticipantChannel {
    id: ParticipantId,
    requests: mpsc::Sender<ParticipantRequest>,
}

/// Spawn a service task for `participant` and return a channel handle
/// addressing it.
pub fn spawn_participant(participant: Arc<Participant>) -> ParticipantChannel {
    let (requests, mailbox) = mpsc::channel(MAILBOX_CAPACITY);
    let id = participant.id().clone();
    tokio::spawn(serve(participant, mailbox));
    ParticipantChannel { id, requests }
}

async fn serve(participant: Arc<Participant>, mut mailbox: mpsc::Receiver<ParticipantRequest>) {
    while let Some(request) = mailbox.recv().await {
        match request {
            ParticipantRequest::Prepare { request, reply } => {
                let transaction = request.transaction();
                let vote = participant.prepare(&transaction);
                let message =
                    VoteMessage::new(transaction.id, participant.id().clone(), vote);
                if reply.send(message).is_err() {
                    warn!(
                        participant_id = %participant.id(),
                        transaction_id = %transaction.id,
                        "vote reply dropped, requester gone"
                    );
                }
            }
            ParticipantRequest::Decision { message, reply } => {
                let transaction = message.transaction();
                match message.message_type {
                    MessageType::Commit => participant.commit(&transaction),
                    MessageType::Abort => participant.abort(&transaction),
                    other => {
                        warn!(
                            participant_id = %participant.id(),
                            message_type = ?other,
                            "ignoring non-decision message"
                        );
                    }
                }
                let _ = reply.send(());
            }
        }
    }
    debug!(participant_id = %participant.id(), "mailbox closed, service task exiting");
}

impl ParticipantChannel {
    async fn deliver(&self, message: DecisionMessage) -> Result<()> {
        let (reply, ack) = oneshot::channel();
        self.requests
            .send(ParticipantRequest::Decision { message, reply })
            .await
            .map_err(|_| RenameError::ParticipantUnreachable(self.id.clone()))?;
        ack.await
            .map_err(|_| RenameError::ParticipantUnreachable(self.id.clone()))
    }
}

#[async_trait::async_trait]
impl ParticipantHandle for ParticipantChannel {
    fn id(&self) -> &ParticipantId {
        &self.id
    }

    async fn prepare(&self, transaction: &RenameTransaction) -> Result<Vote> {
        let (reply, response) = oneshot::channel();
        self.requests
            .send(ParticipantRequest::Prepare {
                request: PrepareRequest::new(transaction),
                reply,
            })
            .await
            .map_err(|_| RenameError::ParticipantUnreachable(self.id.clone()))?;
        let message = response
            .await
            .map_err(|_| RenameError::ParticipantUnreachable(self.id.clone()))?;
        message.vote()
    }

    async fn commit(&self, transaction: &RenameTransaction) -> Result<()> {
        self.deliver(DecisionMessage::commit(transaction)).await
    }

    async fn abort(&self, transaction: &RenameTransaction) -> Result<()> {
        self.deliver(DecisionMessage::abort(transaction)).await
    }
}
