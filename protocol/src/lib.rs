//! AtomicRename Protocol Messages
//!
//! Message types exchanged between the coordinator and participants. The
//! vocabulary on this boundary is exactly five values: `PREPARE`,
//! `VOTE_COMMIT`, `VOTE_ABORT`, `COMMIT`, `ABORT`.

pub mod messages;

pub use messages::*;
