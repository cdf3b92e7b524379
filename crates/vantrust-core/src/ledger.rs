// Copyright (c) 2026 Vantrust Contributors
// SPDX-License-Identifier: Apache-2.0

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::PathBuf;
use thiserror::Error;

use crate::snapshot;

pub type Hash32 = [u8; 32];

pub const GENESIS_SUBJECT: &str = "Genesis";
pub const GENESIS_PAYLOAD: &str = "Initial Block";

/// Sentinel previous-hash of the genesis entry; canonicalizes to `"0"`.
pub const GENESIS_PREV: Hash32 = [0u8; 32];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    Genesis,
    Issue,
    Revoke,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Genesis => "Genesis",
            EventKind::Issue => "Issue",
            EventKind::Revoke => "Revoke",
        }
    }
}

/// One record of the hash chain. Entries are never mutated or removed once
/// appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub subject_id: String,
    pub kind: EventKind,
    pub payload: String,
    /// Wall-clock instant of the append, RFC 3339.
    pub timestamp: String,
    pub prev_hash: Hash32,
    pub hash: Hash32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultKind {
    /// Recomputing the entry digest does not reproduce the stored hash.
    HashMismatch,
    /// The entry's `prev_hash` is not the hash of the preceding entry.
    LinkMismatch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("chain fault at entry {index}: {kind:?}")]
pub struct ChainFault {
    pub index: usize,
    pub kind: FaultKind,
}

/// Wall-clock timestamp in the format ledger entries carry.
pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Canonical previous-hash encoding: lowercase hex, except the genesis
/// sentinel which seeds the chain as the literal `"0"`.
fn prev_hex(prev_hash: &Hash32) -> String {
    if prev_hash == &GENESIS_PREV {
        "0".to_string()
    } else {
        hex::encode(prev_hash)
    }
}

/// Digest over the canonical concatenation of the entry fields. Identical
/// inputs produce byte-identical digests.
pub fn entry_hash(
    subject_id: &str,
    kind: EventKind,
    payload: &str,
    timestamp: &str,
    prev_hash: &Hash32,
) -> Hash32 {
    let mut h = Sha256::new();
    h.update(subject_id.as_bytes());
    h.update(kind.as_str().as_bytes());
    h.update(payload.as_bytes());
    h.update(timestamp.as_bytes());
    h.update(prev_hex(prev_hash).as_bytes());
    h.finalize().into()
}

/// Recompute every digest and confirm every `prev_hash` linkage, stopping at
/// the first offending entry.
pub fn audit(entries: &[LedgerEntry]) -> Result<(), ChainFault> {
    let mut prev = GENESIS_PREV;
    for (index, entry) in entries.iter().enumerate() {
        if entry.prev_hash != prev {
            return Err(ChainFault {
                index,
                kind: FaultKind::LinkMismatch,
            });
        }
        let recomputed = entry_hash(
            &entry.subject_id,
            entry.kind,
            &entry.payload,
            &entry.timestamp,
            &entry.prev_hash,
        );
        if recomputed != entry.hash {
            return Err(ChainFault {
                index,
                kind: FaultKind::HashMismatch,
            });
        }
        prev = entry.hash;
    }
    Ok(())
}

/// Append-only hash chain, exclusively owned by the certificate authority.
///
/// A snapshot path, when set, is rewritten in full on every append. A failed
/// write is reported and the in-memory append stands; durability is
/// best-effort.
#[derive(Debug)]
pub struct Ledger {
    entries: Vec<LedgerEntry>,
    snapshot_path: Option<PathBuf>,
}

impl Ledger {
    /// In-memory chain seeded with the genesis entry.
    pub fn new() -> Self {
        Self::build(None)
    }

    /// Chain persisted to `path` as an ordered JSON array on every append.
    pub fn with_snapshot(path: impl Into<PathBuf>) -> Self {
        Self::build(Some(path.into()))
    }

    fn build(snapshot_path: Option<PathBuf>) -> Self {
        let mut ledger = Self {
            entries: Vec::new(),
            snapshot_path,
        };
        ledger.push_entry(GENESIS_SUBJECT, EventKind::Genesis, GENESIS_PAYLOAD);
        ledger
    }

    /// Append an event record. The genesis entry is created at construction;
    /// callers append `Issue` and `Revoke` events only.
    pub fn append(&mut self, subject_id: &str, kind: EventKind, payload: &str) -> &LedgerEntry {
        self.push_entry(subject_id, kind, payload)
    }

    fn push_entry(&mut self, subject_id: &str, kind: EventKind, payload: &str) -> &LedgerEntry {
        let timestamp = now_rfc3339();
        let prev_hash = self.entries.last().map(|e| e.hash).unwrap_or(GENESIS_PREV);
        let hash = entry_hash(subject_id, kind, payload, &timestamp, &prev_hash);
        self.entries.push(LedgerEntry {
            subject_id: subject_id.to_string(),
            kind,
            payload: payload.to_string(),
            timestamp,
            prev_hash,
            hash,
        });
        self.persist();
        let index = self.entries.len() - 1;
        &self.entries[index]
    }

    fn persist(&self) {
        let Some(path) = &self.snapshot_path else {
            return;
        };
        if let Err(err) = snapshot::write(path, &self.entries) {
            tracing::warn!(
                path = %path.display(),
                error = %err,
                "ledger snapshot write failed; in-memory chain unaffected"
            );
        }
    }

    pub fn verify_chain(&self) -> Result<(), ChainFault> {
        audit(&self.entries)
    }

    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn tail_hash(&self) -> Hash32 {
        self.entries.last().map(|e| e.hash).unwrap_or(GENESIS_PREV)
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}
