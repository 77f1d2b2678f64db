//! AtomicRename Coordinator
//!
//! The coordinator drives the two-phase rename round: broadcast prepare,
//! collect votes, decide, broadcast commit or abort. It holds non-exclusive
//! handles to a fixed, ordered set of participants and never touches their
//! internals directly.

pub mod config;
pub mod coordinator;
pub mod metrics;
pub mod transaction;

pub use config::CoordinatorConfig;
pub use coordinator::TransactionCoordinator;
pub use metrics::{CoordinatorMetrics, MetricsSnapshot};
pub use transaction::{TransactionRecord, TransactionTiming};
