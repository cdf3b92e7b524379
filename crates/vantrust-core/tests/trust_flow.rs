// Copyright (c) 2026 Vantrust Contributors
// SPDX-License-Identifier: Apache-2.0

use std::thread;
use std::time::Duration;

use tempfile::TempDir;

use vantrust_core::authority::{CertificateAuthority, SharedAuthority};
use vantrust_core::gate::{AuthOutcome, AuthenticationGate, GatePolicy};
use vantrust_core::identity::VehicleIdentity;
use vantrust_core::ledger::EventKind;
use vantrust_core::snapshot;
use vantrust_core::TrustError;

fn gate_with_interval(ms: u64) -> AuthenticationGate {
    AuthenticationGate::new(GatePolicy {
        min_interval: Duration::from_millis(ms),
    })
}

#[test]
fn five_vehicle_lifecycle() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("blockchain.json");
    let authority = SharedAuthority::new(CertificateAuthority::with_snapshot(&path));
    let gate = gate_with_interval(1000);

    let mut vehicles: Vec<VehicleIdentity> = (1..=5)
        .map(|i| VehicleIdentity::generate(format!("V{i}")))
        .collect();
    for v in &vehicles {
        authority.issue_certificate(&v.id, v.declared_key()).unwrap();
    }

    // Genesis plus five issuances.
    assert_eq!(authority.ledger_len(), 6);
    assert!(authority.verify_chain().is_ok());

    authority.revoke_certificate("V3");
    assert!(authority.is_revoked("V3"));
    for id in ["V1", "V2", "V4", "V5"] {
        assert!(!authority.is_revoked(id));
    }

    assert_eq!(gate.authenticate(&mut vehicles[2], &authority), AuthOutcome::Revoked);

    assert_eq!(
        gate.authenticate(&mut vehicles[0], &authority),
        AuthOutcome::Authenticated
    );
    assert_eq!(
        gate.authenticate(&mut vehicles[0], &authority),
        AuthOutcome::RateLimited
    );

    // The on-disk snapshot replays to the same chain.
    let entries = snapshot::load_and_audit(&path).unwrap();
    assert_eq!(entries.len(), 7);
    assert_eq!(entries[6].kind, EventKind::Revoke);
    assert_eq!(entries[6].subject_id, "V3");
}

#[test]
fn sybil_attempt_gains_no_ledger_entry() {
    let authority = SharedAuthority::new(CertificateAuthority::new());
    let v1 = VehicleIdentity::generate("V1");
    authority.issue_certificate("V1", v1.declared_key()).unwrap();
    let before = authority.ledger_len();

    let err = authority
        .issue_certificate("V1-shadow", v1.declared_key())
        .unwrap_err();
    assert!(matches!(err, TrustError::SybilDetected(_)));
    assert_eq!(authority.ledger_len(), before);
}

#[test]
fn concurrent_issuance_keeps_the_chain_intact() {
    let authority = SharedAuthority::new(CertificateAuthority::new());
    let mut handles = Vec::new();
    for t in 0..8 {
        let authority = authority.clone();
        handles.push(thread::spawn(move || {
            for i in 0..4 {
                let v = VehicleIdentity::generate(format!("T{t}-V{i}"));
                authority.issue_certificate(&v.id, v.declared_key()).unwrap();
            }
        }));
    }
    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(authority.ledger_len(), 1 + 8 * 4);
    assert!(authority.verify_chain().is_ok());
    authority.with_entries(|entries| {
        for i in 1..entries.len() {
            assert_eq!(entries[i].prev_hash, entries[i - 1].hash);
        }
    });
}

#[test]
fn racing_the_same_key_binds_exactly_once() {
    let authority = SharedAuthority::new(CertificateAuthority::new());
    let v = VehicleIdentity::generate("V1");
    let key = *v.declared_key();

    let mut handles = Vec::new();
    for t in 0..4 {
        let authority = authority.clone();
        handles.push(thread::spawn(move || {
            authority.issue_certificate(&format!("claimant-{t}"), &key).is_ok()
        }));
    }
    let successes = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|ok| *ok)
        .count();
    assert_eq!(successes, 1);
    // One bind means one Issue entry past genesis.
    assert_eq!(authority.ledger_len(), 2);
    assert!(authority.verify_chain().is_ok());
}
