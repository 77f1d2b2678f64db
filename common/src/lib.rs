//! AtomicRename Common Types
//!
//! This crate contains shared types used across the AtomicRename protocol,
//! including identifiers, the rename-transaction vocabulary, and errors.

pub mod error;
pub mod identifiers;
pub mod time;
pub mod transaction;

pub use error::*;
pub use identifiers::*;
pub use time::*;
pub use transaction::*;
