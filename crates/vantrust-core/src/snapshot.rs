// Copyright (c) 2026 Vantrust Contributors
// SPDX-License-Identifier: Apache-2.0

//! On-disk form of the ledger: an ordered JSON array rewritten in full on
//! every append. Each element carries the subject, the payload (`action`),
//! the RFC 3339 timestamp and the entry digest as 64 hex chars. Previous
//! hashes are not stored; linkage is implied by element order and re-derived
//! on load.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{TrustError, TrustResult};
use crate::ledger::{EventKind, Hash32, LedgerEntry, GENESIS_PREV, GENESIS_SUBJECT};

// Re-exported so fuzz targets and the driver can audit a loaded snapshot
// without going through a Ledger instance.
pub use crate::ledger::audit;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotRecord {
    pub vehicle_id: String,
    pub action: String,
    pub timestamp: String,
    pub hash: String,
}

impl SnapshotRecord {
    fn from_entry(entry: &LedgerEntry) -> Self {
        Self {
            vehicle_id: entry.subject_id.clone(),
            action: entry.payload.clone(),
            timestamp: entry.timestamp.clone(),
            hash: hex::encode(entry.hash),
        }
    }
}

/// Full-file overwrite of the snapshot; never an incremental append.
pub fn write(path: &Path, entries: &[LedgerEntry]) -> TrustResult<()> {
    let records: Vec<SnapshotRecord> = entries.iter().map(SnapshotRecord::from_entry).collect();
    let bytes = serde_json::to_vec_pretty(&records)?;
    fs::write(path, bytes)?;
    Ok(())
}

pub fn load(path: &Path) -> TrustResult<Vec<LedgerEntry>> {
    let bytes = fs::read(path)?;
    let records: Vec<SnapshotRecord> = serde_json::from_slice(&bytes)?;
    from_records(records)
}

/// Rebuild chain entries from snapshot records. Event kinds are re-derived
/// from the payload shape (`Cert-` prefixed payloads were issuances, the
/// rest revocations); the first record must be the genesis record.
pub fn from_records(records: Vec<SnapshotRecord>) -> TrustResult<Vec<LedgerEntry>> {
    let mut entries = Vec::with_capacity(records.len());
    let mut prev = GENESIS_PREV;
    for (index, record) in records.into_iter().enumerate() {
        let kind = infer_kind(index, &record)?;
        let hash = decode_hash(index, &record.hash)?;
        entries.push(LedgerEntry {
            subject_id: record.vehicle_id,
            kind,
            payload: record.action,
            timestamp: record.timestamp,
            prev_hash: prev,
            hash,
        });
        prev = hash;
    }
    Ok(entries)
}

/// Load a snapshot and recheck every digest and linkage.
pub fn load_and_audit(path: &Path) -> TrustResult<Vec<LedgerEntry>> {
    let entries = load(path)?;
    if let Err(fault) = crate::ledger::audit(&entries) {
        return Err(TrustError::MalformedSnapshot(fault.to_string()));
    }
    Ok(entries)
}

fn infer_kind(index: usize, record: &SnapshotRecord) -> TrustResult<EventKind> {
    if index == 0 {
        if record.vehicle_id != GENESIS_SUBJECT {
            return Err(TrustError::MalformedSnapshot(
                "first record is not the genesis record".to_string(),
            ));
        }
        return Ok(EventKind::Genesis);
    }
    if record.action.starts_with("Cert-") {
        Ok(EventKind::Issue)
    } else {
        Ok(EventKind::Revoke)
    }
}

fn decode_hash(index: usize, hash_hex: &str) -> TrustResult<Hash32> {
    let bytes = hex::decode(hash_hex)
        .map_err(|_| TrustError::MalformedSnapshot(format!("record {index}: hash is not hex")))?;
    Hash32::try_from(bytes.as_slice()).map_err(|_| {
        TrustError::MalformedSnapshot(format!("record {index}: hash is not 32 bytes"))
    })
}
