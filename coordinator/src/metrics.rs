//! Metrics collection for coordinator monitoring.

use std::sync::atomic::{AtomicU64, Ordering};

/// Coordinator metrics.
#[derive(Debug, Default)]
pub struct CoordinatorMetrics {
    /// Total transactions initiated.
    pub transactions_total: AtomicU64,
    /// Transactions that committed.
    pub transactions_committed: AtomicU64,
    /// Transactions that aborted.
    pub transactions_aborted: AtomicU64,
    /// Transactions currently in flight.
    pub transactions_active: AtomicU64,
    /// Commit votes received.
    pub votes_commit: AtomicU64,
    /// Abort votes received.
    pub votes_abort: AtomicU64,
    /// Prepare calls that timed out or failed in transport.
    pub prepare_failures: AtomicU64,
}

impl CoordinatorMetrics {
    /// Create new metrics instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a transaction starting.
    pub fn transaction_initiated(&self) {
        self.transactions_total.fetch_add(1, Ordering::Relaxed);
        self.transactions_active.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a transaction committing.
    pub fn transaction_committed(&self) {
        self.transactions_committed.fetch_add(1, Ordering::Relaxed);
        self.transactions_active.fetch_sub(1, Ordering::Relaxed);
    }

    /// Record a transaction aborting.
    pub fn transaction_aborted(&self) {
        self.transactions_aborted.fetch_add(1, Ordering::Relaxed);
        self.transactions_active.fetch_sub(1, Ordering::Relaxed);
    }

    /// Record a commit vote.
    pub fn vote_commit(&self) {
        self.votes_commit.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an abort vote.
    pub fn vote_abort(&self) {
        self.votes_abort.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a prepare call that produced no vote.
    pub fn prepare_failure(&self) {
        self.prepare_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current metrics snapshot.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            transactions_total: self.transactions_total.load(Ordering::Relaxed),
            transactions_committed: self.transactions_committed.load(Ordering::Relaxed),
            transactions_aborted: self.transactions_aborted.load(Ordering::Relaxed),
            transactions_active: self.transactions_active.load(Ordering::Relaxed),
            votes_commit: self.votes_commit.load(Ordering::Relaxed),
            votes_abort: self.votes_abort.load(Ordering::Relaxed),
            prepare_failures: self.prepare_failures.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of metrics at a point in time.
#[derive(Debug, Clone)]
pub struct MetricsSnapshot {
    pub transactions_total: u64,
    pub transactions_committed: u64,
    pub transactions_aborted: u64,
    pub transactions_active: u64,
    pub votes_commit: u64,
    pub votes_abort: u64,
    pub prepare_failures: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_increment() {
        let metrics = CoordinatorMetrics::new();

        metrics.transaction_initiated();
        metrics.transaction_initiated();
        metrics.transaction_committed();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.transactions_total, 2);
        assert_eq!(snapshot.transactions_committed, 1);
        assert_eq!(snapshot.transactions_active, 1);
    }

    #[test]
    fn test_vote_counters() {
        let metrics = CoordinatorMetrics::new();

        metrics.vote_commit();
        metrics.vote_commit();
        metrics.vote_abort();
        metrics.prepare_failure();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.votes_commit, 2);
        assert_eq!(snapshot.votes_abort, 1);
        assert_eq!(snapshot.prepare_failures, 1);
    }
}
