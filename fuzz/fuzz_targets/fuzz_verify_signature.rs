#![no_main]

use libfuzzer_sys::fuzz_target;
use vantrust_core::identity;

// Verification is total: any split of the input into signature, key and
// message bytes returns a bool.
fuzz_target!(|data: &[u8]| {
    let sig_len = data.len().min(64);
    let (sig, rest) = data.split_at(sig_len);
    let key_len = rest.len().min(32);
    let (key, message) = rest.split_at(key_len);
    let _ = identity::verify(message, sig, key);
});
