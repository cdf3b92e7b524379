#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use vantrust_core::ledger::{EventKind, Ledger};

#[derive(Debug, Arbitrary)]
enum Op {
    Issue { subject: String },
    Revoke { subject: String },
}

fuzz_target!(|ops: Vec<Op>| {
    let mut ledger = Ledger::new();
    for op in &ops {
        match op {
            Op::Issue { subject } => {
                ledger.append(subject, EventKind::Issue, &format!("Cert-{subject}"));
            }
            Op::Revoke { subject } => {
                ledger.append(subject, EventKind::Revoke, "revoked");
            }
        }
    }
    assert!(ledger.verify_chain().is_ok());
    assert_eq!(ledger.len(), ops.len() + 1);
});
