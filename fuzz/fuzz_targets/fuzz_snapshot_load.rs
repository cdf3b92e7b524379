#![no_main]

use libfuzzer_sys::fuzz_target;
use vantrust_core::snapshot::{self, SnapshotRecord};

// Arbitrary bytes through the snapshot parser and chain audit: must never
// panic, whatever the records claim.
fuzz_target!(|data: &[u8]| {
    let Ok(records) = serde_json::from_slice::<Vec<SnapshotRecord>>(data) else {
        return;
    };
    if let Ok(entries) = snapshot::from_records(records) {
        let _ = snapshot::audit(&entries);
    }
});
