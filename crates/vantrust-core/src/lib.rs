// Copyright [2026] [Vantrust Contributors]
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// Copyright (c) 2026 Vantrust Contributors
// SPDX-License-Identifier: Apache-2.0

//! vantrust-core
//!
//! Trust machinery for a simulated vehicular ad-hoc network (VANET).
//!
//! This crate implements the core protocol pieces:
//! - hash-chained append-only ledger of issuance/revocation events, with a
//!   full-file JSON snapshot on every append
//! - public-key registry detecting duplicate-key (Sybil) registrations
//! - certificate authority owning the ledger, registry and revocation set
//! - vehicle identities with Ed25519 signing keys
//! - roadside-unit authentication gate (rate limit, revocation lookup,
//!   signature challenge, in that order)
//!
//! Transport between vehicles and roadside units is simulated: everything is
//! an in-process call made by a driver that owns the identities.

#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod authority;
pub mod error;
pub mod export;
pub mod gate;
pub mod identity;
pub mod ledger;
pub mod registry;
pub mod snapshot;

pub use crate::authority::{Certificate, CertificateAuthority, SharedAuthority};
pub use crate::error::{TrustError, TrustResult};
pub use crate::gate::{AuthOutcome, AuthenticationGate, GatePolicy};
pub use crate::identity::VehicleIdentity;
pub use crate::ledger::{ChainFault, EventKind, Ledger, LedgerEntry};
