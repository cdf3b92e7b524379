// Copyright (c) 2026 Vantrust Contributors
// SPDX-License-Identifier: Apache-2.0

use ed25519_dalek::VerifyingKey;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::{TrustError, TrustResult};
use crate::ledger::{ChainFault, EventKind, Ledger, LedgerEntry};
use crate::registry::KeyRegistry;

/// Lightweight credential handle. Revocation is tracked by the authority's
/// revocation set, never by mutating an issued certificate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Certificate {
    pub subject_id: String,
    /// Timestamp of the ledger `Issue` entry, RFC 3339.
    pub issued_at: String,
}

/// Central authority: exclusive owner of the ledger, the key registry and
/// the revocation set. All access to those structures goes through here.
#[derive(Debug)]
pub struct CertificateAuthority {
    ledger: Ledger,
    registry: KeyRegistry,
    revoked: HashSet<String>,
}

impl CertificateAuthority {
    pub fn new() -> Self {
        Self::with_ledger(Ledger::new())
    }

    /// Authority whose ledger snapshots to `path` on every append.
    pub fn with_snapshot(path: impl AsRef<Path>) -> Self {
        Self::with_ledger(Ledger::with_snapshot(path.as_ref()))
    }

    fn with_ledger(ledger: Ledger) -> Self {
        Self {
            ledger,
            registry: KeyRegistry::new(),
            revoked: HashSet::new(),
        }
    }

    /// Bind the key, then record the issuance. A key already bound to some
    /// identity is refused before anything reaches the ledger, whatever
    /// identity string the caller claims.
    pub fn issue_certificate(
        &mut self,
        subject_id: &str,
        public_key: &VerifyingKey,
    ) -> TrustResult<Certificate> {
        if !self.registry.try_bind(public_key.as_bytes()) {
            tracing::warn!(subject_id, "duplicate public key; certificate refused");
            return Err(TrustError::SybilDetected(subject_id.to_string()));
        }
        let payload = format!("Cert-{subject_id}");
        let entry = self.ledger.append(subject_id, EventKind::Issue, &payload);
        let certificate = Certificate {
            subject_id: subject_id.to_string(),
            issued_at: entry.timestamp.clone(),
        };
        tracing::info!(subject_id, "certificate issued");
        Ok(certificate)
    }

    /// Add the subject to the revocation set and record a `Revoke` entry.
    /// Revocation is a blocklist operation: no key binding is checked, and
    /// unknown subjects are accepted. Returns the elapsed wall-clock
    /// duration of the operation.
    pub fn revoke_certificate(&mut self, subject_id: &str) -> Duration {
        let started = Instant::now();
        self.revoked.insert(subject_id.to_string());
        self.ledger.append(subject_id, EventKind::Revoke, "revoked");
        let latency = started.elapsed();
        tracing::info!(
            subject_id,
            latency_us = latency.as_micros() as u64,
            "certificate revoked"
        );
        latency
    }

    /// Pure lookup; unknown subjects are simply not revoked.
    pub fn is_revoked(&self, subject_id: &str) -> bool {
        self.revoked.contains(subject_id)
    }

    pub fn verify_chain(&self) -> Result<(), ChainFault> {
        self.ledger.verify_chain()
    }

    pub fn ledger_entries(&self) -> &[LedgerEntry] {
        self.ledger.entries()
    }

    pub fn ledger_len(&self) -> usize {
        self.ledger.len()
    }

    pub fn revoked_count(&self) -> usize {
        self.revoked.len()
    }
}

impl Default for CertificateAuthority {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared handle for concurrent callers. Appends are serialized behind one
/// lock, so the registry bind and ledger append of an issuance are observed
/// as a single unit and no two appends interleave on the tail hash.
#[derive(Debug, Clone)]
pub struct SharedAuthority {
    inner: Arc<Mutex<CertificateAuthority>>,
}

impl SharedAuthority {
    pub fn new(authority: CertificateAuthority) -> Self {
        Self {
            inner: Arc::new(Mutex::new(authority)),
        }
    }

    pub fn issue_certificate(
        &self,
        subject_id: &str,
        public_key: &VerifyingKey,
    ) -> TrustResult<Certificate> {
        self.inner.lock().issue_certificate(subject_id, public_key)
    }

    pub fn revoke_certificate(&self, subject_id: &str) -> Duration {
        self.inner.lock().revoke_certificate(subject_id)
    }

    pub fn is_revoked(&self, subject_id: &str) -> bool {
        self.inner.lock().is_revoked(subject_id)
    }

    pub fn verify_chain(&self) -> Result<(), ChainFault> {
        self.inner.lock().verify_chain()
    }

    pub fn ledger_len(&self) -> usize {
        self.inner.lock().ledger_len()
    }

    /// Read-only view of the entries while the lock is held.
    pub fn with_entries<R>(&self, f: impl FnOnce(&[LedgerEntry]) -> R) -> R {
        f(self.inner.lock().ledger_entries())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::VehicleIdentity;

    #[test]
    fn issuance_appends_one_issue_entry() {
        let mut ca = CertificateAuthority::new();
        let v1 = VehicleIdentity::generate("V1");
        let cert = ca.issue_certificate("V1", v1.declared_key()).unwrap();
        assert_eq!(cert.subject_id, "V1");
        assert_eq!(ca.ledger_len(), 2);
        let entry = &ca.ledger_entries()[1];
        assert_eq!(entry.kind, EventKind::Issue);
        assert_eq!(entry.payload, "Cert-V1");
        assert_eq!(entry.timestamp, cert.issued_at);
    }

    #[test]
    fn duplicate_key_is_sybil_and_leaves_ledger_unchanged() {
        let mut ca = CertificateAuthority::new();
        let v1 = VehicleIdentity::generate("V1");
        ca.issue_certificate("V1", v1.declared_key()).unwrap();
        let len_before = ca.ledger_len();

        let err = ca.issue_certificate("V1-clone", v1.declared_key()).unwrap_err();
        assert!(matches!(err, TrustError::SybilDetected(id) if id == "V1-clone"));
        assert_eq!(ca.ledger_len(), len_before);
        assert!(ca.verify_chain().is_ok());
    }

    #[test]
    fn same_subject_with_fresh_key_is_not_sybil() {
        // Sybil detection keys on the public key, not the identity string.
        let mut ca = CertificateAuthority::new();
        let a = VehicleIdentity::generate("V1");
        let b = VehicleIdentity::generate("V1");
        ca.issue_certificate("V1", a.declared_key()).unwrap();
        assert!(ca.issue_certificate("V1", b.declared_key()).is_ok());
    }

    #[test]
    fn revocation_is_monotone_across_other_revocations() {
        let mut ca = CertificateAuthority::new();
        ca.revoke_certificate("V3");
        assert!(ca.is_revoked("V3"));
        ca.revoke_certificate("V1");
        ca.revoke_certificate("V5");
        assert!(ca.is_revoked("V3"));
        assert!(ca.is_revoked("V1"));
        assert!(!ca.is_revoked("V2"));
    }

    #[test]
    fn repeat_revocation_reports_latency_and_keeps_one_set_entry() {
        let mut ca = CertificateAuthority::new();
        let _ = ca.revoke_certificate("V3");
        let _ = ca.revoke_certificate("V3");
        assert_eq!(ca.revoked_count(), 1);
        // Each call still records its own Revoke entry.
        assert_eq!(ca.ledger_len(), 3);
        assert!(ca.verify_chain().is_ok());
    }

    #[test]
    fn unknown_subject_is_not_revoked() {
        let ca = CertificateAuthority::new();
        assert!(!ca.is_revoked("nobody"));
    }

    #[test]
    fn revocation_entry_lands_on_the_chain() {
        let mut ca = CertificateAuthority::new();
        let v1 = VehicleIdentity::generate("V1");
        ca.issue_certificate("V1", v1.declared_key()).unwrap();
        ca.revoke_certificate("V1");
        let entries = ca.ledger_entries();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[2].kind, EventKind::Revoke);
        assert_eq!(entries[2].subject_id, "V1");
        assert_eq!(entries[2].payload, "revoked");
        assert!(ca.verify_chain().is_ok());
    }
}
