//! Key-value store with per-key transaction locks.

use std::collections::HashMap;

use parking_lot::Mutex;

use atomicrename_common::TransactionId;

/// Outcome of a lock acquisition attempt during prepare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockAttempt {
    /// The key is present and locked for the requesting transaction.
    Acquired,
    /// The key is absent; there is nothing to protect.
    Absent,
    /// The key is present but locked by another in-flight transaction.
    AlreadyLocked,
}

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<String, String>,
    locks: HashMap<String, TransactionId>,
}

/// A participant's private key-value store and lock table.
///
/// Entries and locks live behind one mutex so a prepare's presence check
/// and lock acquisition happen as a single atomic step. Each lock records
/// the transaction that owns it; release and rename only act on locks the
/// releasing transaction holds, which keeps commit and abort idempotent
/// under duplicate delivery.
#[derive(Debug, Default)]
pub struct KeyStore {
    inner: Mutex<Inner>,
}

impl KeyStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with the given entries.
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let store = Self::new();
        {
            let mut inner = store.inner.lock();
            for (key, value) in entries {
                inner.entries.insert(key.into(), value.into());
            }
        }
        store
    }

    /// Insert an entry.
    pub fn insert(&self, key: impl Into<String>, value: impl Into<String>) {
        self.inner.lock().entries.insert(key.into(), value.into());
    }

    /// Get the value for a key, if present.
    pub fn get(&self, key: &str) -> Option<String> {
        self.inner.lock().entries.get(key).cloned()
    }

    /// Check whether a key is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.lock().entries.contains_key(key)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    /// Check whether the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().entries.is_empty()
    }

    /// Attempt to lock `key` for `owner`.
    ///
    /// Re-locking a key already held by the same transaction reports
    /// `Acquired` without changing the table, so duplicate prepares are
    /// harmless.
    pub fn try_lock(&self, key: &str, owner: TransactionId) -> LockAttempt {
        let mut inner = self.inner.lock();
        if !inner.entries.contains_key(key) {
            return LockAttempt::Absent;
        }
        match inner.locks.get(key) {
            Some(holder) if *holder == owner => LockAttempt::Acquired,
            Some(_) => LockAttempt::AlreadyLocked,
            None => {
                inner.locks.insert(key.to_string(), owner);
                LockAttempt::Acquired
            }
        }
    }

    /// Release the lock on `key` if `owner` holds it.
    ///
    /// Returns whether a lock was released. A lock held by a different
    /// transaction is left untouched.
    pub fn release(&self, key: &str, owner: TransactionId) -> bool {
        let mut inner = self.inner.lock();
        match inner.locks.get(key) {
            Some(holder) if *holder == owner => {
                inner.locks.remove(key);
                true
            }
            _ => false,
        }
    }

    /// Apply the rename decided for `owner`: drop `old_key`, write the
    /// `new_key` entry (the value equals the new key name in this model),
    /// and release the lock.
    ///
    /// Returns whether the rename was applied. Without the lock the call is
    /// a no-op, so a vacuously-agreeing participant is never mutated and a
    /// repeated commit changes nothing.
    pub fn apply_rename(&self, owner: TransactionId, old_key: &str, new_key: &str) -> bool {
        let mut inner = self.inner.lock();
        match inner.locks.get(old_key) {
            Some(holder) if *holder == owner => {
                inner.locks.remove(old_key);
                inner.entries.remove(old_key);
                inner.entries.insert(new_key.to_string(), new_key.to_string());
                true
            }
            _ => false,
        }
    }

    /// Check whether a key is currently locked.
    pub fn is_locked(&self, key: &str) -> bool {
        self.inner.lock().locks.contains_key(key)
    }

    /// Get the transaction currently holding a key's lock, if any.
    pub fn lock_owner(&self, key: &str) -> Option<TransactionId> {
        self.inner.lock().locks.get(key).copied()
    }

    /// Number of keys currently locked.
    pub fn locked_key_count(&self) -> usize {
        self.inner.lock().locks.len()
    }

    /// Snapshot of all entries, for inspection and reporting.
    pub fn entries(&self) -> HashMap<String, String> {
        self.inner.lock().entries.clone()
    }
}
