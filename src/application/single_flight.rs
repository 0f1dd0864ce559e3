//! Keyed single-flight guard.
//!
//! At most one holder per key. A second `try_acquire` for a held key returns
//! `None`; the caller drops the duplicate rather than waiting. Dropping the
//! guard releases the key, including on panic or early return.

use std::collections::HashSet;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Set of keys currently in flight.
#[derive(Debug)]
pub struct SingleFlight<K: Eq + Hash> {
    in_flight: Arc<Mutex<HashSet<K>>>,
}

impl<K: Eq + Hash> Clone for SingleFlight<K> {
    fn clone(&self) -> Self {
        Self {
            in_flight: Arc::clone(&self.in_flight),
        }
    }
}

impl<K: Eq + Hash> Default for SingleFlight<K> {
    fn default() -> Self {
        Self {
            in_flight: Arc::new(Mutex::new(HashSet::new())),
        }
    }
}

fn lock<K>(set: &Mutex<HashSet<K>>) -> MutexGuard<'_, HashSet<K>> {
    // The set stays consistent even if a holder panicked mid-insert.
    set.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<K: Eq + Hash + Clone> SingleFlight<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims `key`, or `None` if it is already held.
    pub fn try_acquire(&self, key: K) -> Option<FlightGuard<K>> {
        if !lock(&self.in_flight).insert(key.clone()) {
            return None;
        }
        Some(FlightGuard {
            key: Some(key),
            in_flight: Arc::clone(&self.in_flight),
        })
    }

    pub fn is_in_flight(&self, key: &K) -> bool {
        lock(&self.in_flight).contains(key)
    }
}

/// Holds a key until dropped.
#[derive(Debug)]
pub struct FlightGuard<K: Eq + Hash> {
    key: Option<K>,
    in_flight: Arc<Mutex<HashSet<K>>>,
}

impl<K: Eq + Hash> Drop for FlightGuard<K> {
    fn drop(&mut self) {
        if let Some(key) = self.key.take() {
            lock(&self.in_flight).remove(&key);
        }
    }
}
