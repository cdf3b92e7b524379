// Copyright (c) 2026 Vantrust Contributors
// SPDX-License-Identifier: Apache-2.0

//! Read-only projection of driver observations to a human-readable event
//! log. Rows carry a synthetic transaction id standing in for an on-chain
//! anchor; it is derived from the row contents so repeated exports agree.

use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;

use crate::error::TrustResult;
use crate::ledger::{EventKind, LedgerEntry};

pub const CSV_HEADER: &str = "time,event,vehicle,details,blockchain_tx";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    pub time: String,
    pub event: String,
    pub vehicle: String,
    pub details: String,
    pub tx_id: String,
}

impl EventRecord {
    pub fn new(
        time: impl Into<String>,
        event: impl Into<String>,
        vehicle: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        let time = time.into();
        let event = event.into();
        let vehicle = vehicle.into();
        let details = details.into();
        let tx_id = anchor_tx_id(&time, &event, &vehicle, &details);
        Self {
            time,
            event,
            vehicle,
            details,
            tx_id,
        }
    }

    /// Project a ledger entry to an event-log row.
    pub fn from_entry(entry: &LedgerEntry) -> Self {
        let details = match entry.kind {
            EventKind::Genesis => "Chain initialized".to_string(),
            EventKind::Issue => format!("Certificate issued: {}", entry.payload),
            EventKind::Revoke => "Certificate revoked".to_string(),
        };
        Self::new(
            entry.timestamp.clone(),
            entry.kind.as_str(),
            entry.subject_id.clone(),
            details,
        )
    }
}

/// Synthetic 16-hex-char transaction id for one row.
pub fn anchor_tx_id(time: &str, event: &str, vehicle: &str, details: &str) -> String {
    let mut h = Sha256::new();
    h.update(time.as_bytes());
    h.update(event.as_bytes());
    h.update(vehicle.as_bytes());
    h.update(details.as_bytes());
    let digest = h.finalize();
    hex::encode(&digest[..8])
}

fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

pub fn to_csv(records: &[EventRecord]) -> String {
    let mut out = String::from(CSV_HEADER);
    out.push('\n');
    for r in records {
        out.push_str(&format!(
            "{},{},{},{},{}\n",
            csv_field(&r.time),
            csv_field(&r.event),
            csv_field(&r.vehicle),
            csv_field(&r.details),
            csv_field(&r.tx_id),
        ));
    }
    out
}

pub fn write_csv(path: &Path, records: &[EventRecord]) -> TrustResult<()> {
    fs::write(path, to_csv(records))?;
    Ok(())
}
