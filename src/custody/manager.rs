// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Custody bookkeeping: a monotonically allocated custody ID per
//! custody-accepted bundle, and the storage boundary a real backing store
//! plugs into.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use rand::Rng;

use crate::codec::eid::Eid;
use crate::error::CustodyError;

/// What the custody table remembers about one outstanding custody-accepted
/// bundle.
#[derive(Debug, Clone)]
pub struct CustodyRecord {
    pub bundle_source: Eid,
    pub expiration_secs: u64,
}

/// The storage boundary the orchestration layer calls through. A real
/// backing store (disk-backed, in a real deployment) implements this; tests
/// use an in-memory one.
pub trait BundleStore: Send + Sync {
    fn store(&self, custody_id: u64, bundle_bytes: Vec<u8>, expiration_secs: u64);
    fn load(&self, custody_id: u64) -> Option<Vec<u8>>;
    fn remove(&self, custody_id: u64);
}

/// In-memory `BundleStore`, for tests and for nodes that accept the
/// durability trade-off of an all-memory store.
#[derive(Debug, Default)]
pub struct InMemoryBundleStore {
    bundles: DashMap<u64, (Vec<u8>, u64)>,
}

impl BundleStore for InMemoryBundleStore {
    fn store(&self, custody_id: u64, bundle_bytes: Vec<u8>, expiration_secs: u64) {
        self.bundles
            .insert(custody_id, (bundle_bytes, expiration_secs));
    }

    fn load(&self, custody_id: u64) -> Option<Vec<u8>> {
        self.bundles.get(&custody_id).map(|e| e.0.clone())
    }

    fn remove(&self, custody_id: u64) {
        self.bundles.remove(&custody_id);
    }
}

/// Tracks which custody IDs are currently outstanding and allocates new
/// ones monotonically.
#[derive(Debug, Default)]
pub struct CustodyManager {
    next_id: AtomicU64,
    outstanding: DashMap<u64, CustodyRecord>,
}

impl CustodyManager {
    /// Starts custody IDs from a random offset rather than zero, so that two
    /// nodes restarting around the same time don't hand out colliding IDs to
    /// the same peer.
    pub fn new() -> Self {
        Self::with_start_id(rand::rng().random_range(0..=u64::MAX / 2))
    }

    pub fn with_start_id(start_id: u64) -> Self {
        Self {
            next_id: AtomicU64::new(start_id),
            outstanding: DashMap::new(),
        }
    }

    /// Allocates the next custody ID and records it as outstanding.
    pub fn accept(
        &self,
        bundle_source: Eid,
        expiration_secs: u64,
    ) -> Result<u64, CustodyError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        if id == u64::MAX {
            return Err(CustodyError::IdsExhausted);
        }
        self.outstanding.insert(
            id,
            CustodyRecord {
                bundle_source,
                expiration_secs,
            },
        );
        Ok(id)
    }

    /// Marks a custody ID as resolved (acknowledged or expired), removing it
    /// from the outstanding set.
    pub fn release(&self, custody_id: u64) -> Result<CustodyRecord, CustodyError> {
        self.outstanding
            .remove(&custody_id)
            .map(|(_, record)| record)
            .ok_or(CustodyError::UnknownCustodyId(custody_id))
    }

    pub fn is_outstanding(&self, custody_id: u64) -> bool {
        self.outstanding.contains_key(&custody_id)
    }

    pub fn outstanding_count(&self) -> usize {
        self.outstanding.len()
    }

    pub fn outstanding_ids(&self) -> Vec<u64> {
        self.outstanding.iter().map(|e| *e.key()).collect()
    }
}
