// Copyright (c) 2026 Vantrust Contributors
// SPDX-License-Identifier: Apache-2.0

use std::fmt;
use std::time::{Duration, Instant};

use crate::authority::SharedAuthority;
use crate::identity::{self, VehicleIdentity};

/// Fixed challenge message signed during authentication.
pub const AUTH_CHALLENGE: &[u8] = b"auth_request";

/// Terminal outcome of one authentication attempt. The attempt holds no
/// state beyond its result; every identity is back to idle once the call
/// returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthOutcome {
    Authenticated,
    Revoked,
    RateLimited,
    Failed,
}

impl AuthOutcome {
    /// Log label; rate limiting reports as `DoS`.
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthOutcome::Authenticated => "Authenticated",
            AuthOutcome::Revoked => "Revoked",
            AuthOutcome::RateLimited => "DoS",
            AuthOutcome::Failed => "Failed",
        }
    }
}

impl fmt::Display for AuthOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GatePolicy {
    /// Minimum spacing between attempts from one identity.
    pub min_interval: Duration,
}

impl Default for GatePolicy {
    fn default() -> Self {
        Self {
            min_interval: Duration::from_secs(1),
        }
    }
}

/// Roadside-unit authentication logic.
///
/// Check order is cost order: the interval guard runs before anything else,
/// the revocation lookup before any signature work. A throttled attempt
/// leaves `last_auth` untouched and never reaches the authority.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthenticationGate {
    policy: GatePolicy,
}

impl AuthenticationGate {
    pub fn new(policy: GatePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> GatePolicy {
        self.policy
    }

    pub fn authenticate(
        &self,
        vehicle: &mut VehicleIdentity,
        authority: &SharedAuthority,
    ) -> AuthOutcome {
        let now = Instant::now();
        if let Some(last) = vehicle.last_auth {
            if now.duration_since(last) < self.policy.min_interval {
                return AuthOutcome::RateLimited;
            }
        }
        vehicle.last_auth = Some(now);
        vehicle.auth_count += 1;

        if authority.is_revoked(&vehicle.id) {
            return AuthOutcome::Revoked;
        }

        let signature = vehicle.sign(AUTH_CHALLENGE);
        if identity::verify(
            AUTH_CHALLENGE,
            &signature.to_bytes(),
            vehicle.declared_key().as_bytes(),
        ) {
            AuthOutcome::Authenticated
        } else {
            AuthOutcome::Failed
        }
    }
}
