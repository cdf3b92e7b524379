// Copyright (c) 2026 Vantrust Contributors
// SPDX-License-Identifier: Apache-2.0

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use std::fmt;
use std::time::Instant;

/// A vehicle on the simulated network: an Ed25519 keypair, the verifying key
/// the vehicle declares to roadside units, and the gate-maintained rate-limit
/// state.
///
/// The declared key is normally the one derived from the signing key, but it
/// is held separately: a forged declaration is exactly what the
/// authentication challenge has to catch. `last_auth` and `auth_count` are
/// mutated only by the gate during authentication attempts.
pub struct VehicleIdentity {
    pub id: String,
    signing_key: SigningKey,
    declared_key: VerifyingKey,
    pub last_auth: Option<Instant>,
    pub auth_count: u64,
}

impl VehicleIdentity {
    pub fn generate(id: impl Into<String>) -> Self {
        let signing_key = SigningKey::generate(&mut OsRng);
        let declared_key = signing_key.verifying_key();
        Self {
            id: id.into(),
            signing_key,
            declared_key,
            last_auth: None,
            auth_count: 0,
        }
    }

    pub fn declared_key(&self) -> &VerifyingKey {
        &self.declared_key
    }

    /// Replace the declared verifying key. After a forged declaration the
    /// signing key no longer matches what the gate verifies against.
    pub fn set_declared_key(&mut self, key: VerifyingKey) {
        self.declared_key = key;
    }

    pub fn sign(&self, message: &[u8]) -> Signature {
        self.signing_key.sign(message)
    }
}

impl fmt::Debug for VehicleIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VehicleIdentity")
            .field("id", &self.id)
            .field("declared_key", &hex::encode(self.declared_key.as_bytes()))
            .field("auth_count", &self.auth_count)
            .finish_non_exhaustive()
    }
}

/// Total signature verification: true iff `signature` is valid for `message`
/// under `public_key`. Malformed keys or signatures of any length return
/// false; nothing here panics or propagates.
pub fn verify(message: &[u8], signature: &[u8], public_key: &[u8]) -> bool {
    let Ok(key_bytes) = <[u8; 32]>::try_from(public_key) else {
        return false;
    };
    let Ok(key) = VerifyingKey::from_bytes(&key_bytes) else {
        return false;
    };
    let Ok(sig) = Signature::from_slice(signature) else {
        return false;
    };
    key.verify(message, &sig).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_then_verify_roundtrip() {
        let vehicle = VehicleIdentity::generate("V1");
        let sig = vehicle.sign(b"auth_request");
        assert!(verify(
            b"auth_request",
            &sig.to_bytes(),
            vehicle.declared_key().as_bytes()
        ));
    }

    #[test]
    fn tampering_one_signature_byte_fails_verification() {
        let vehicle = VehicleIdentity::generate("V1");
        let mut sig = vehicle.sign(b"auth_request").to_bytes();
        sig[0] ^= 0x01;
        assert!(!verify(
            b"auth_request",
            &sig,
            vehicle.declared_key().as_bytes()
        ));
    }

    #[test]
    fn different_message_fails_verification() {
        let vehicle = VehicleIdentity::generate("V1");
        let sig = vehicle.sign(b"auth_request");
        assert!(!verify(
            b"other_message",
            &sig.to_bytes(),
            vehicle.declared_key().as_bytes()
        ));
    }

    #[test]
    fn malformed_inputs_return_false_without_panicking() {
        let vehicle = VehicleIdentity::generate("V1");
        let sig = vehicle.sign(b"auth_request");
        let key = vehicle.declared_key().as_bytes();
        assert!(!verify(b"auth_request", &sig.to_bytes(), &[]));
        assert!(!verify(b"auth_request", &sig.to_bytes(), &key[..16]));
        assert!(!verify(b"auth_request", &[], key));
        assert!(!verify(b"auth_request", &[0u8; 7], key));
        assert!(!verify(b"auth_request", &[0u8; 64], &[0u8; 32]));
    }

    #[test]
    fn forged_declaration_does_not_verify_own_signatures() {
        let mut mallory = VehicleIdentity::generate("V9");
        let victim = VehicleIdentity::generate("V1");
        mallory.set_declared_key(*victim.declared_key());
        let sig = mallory.sign(b"auth_request");
        assert!(!verify(
            b"auth_request",
            &sig.to_bytes(),
            mallory.declared_key().as_bytes()
        ));
    }
}
