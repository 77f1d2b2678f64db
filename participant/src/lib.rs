//! AtomicRename Participant Library
//!
//! A participant owns a private key-value store with a per-key lock table
//! and answers the coordinator's prepare/commit/abort requests. The
//! [`ParticipantHandle`] trait is the request/response seam the coordinator
//! calls through; [`spawn_participant`] serves a participant behind an
//! in-process mailbox so the same seam works over message passing.

pub mod channel;
pub mod handle;
pub mod participant;
pub mod store;

pub use channel::{spawn_participant, ParticipantChannel};
pub use handle::ParticipantHandle;
pub use participant::Participant;
pub use store::{KeyStore, LockAttempt};
