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

//! Headless driver for the VANET trust core. Stands in for the excluded
//! GUI/simulation layer: it issues certificates, runs authentication ticks
//! against the roadside gate, revokes vehicles mid-run, audits the chain and
//! exports the event log.

#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};
use serde_json::json;
use tracing_subscriber::EnvFilter;

use vantrust_core::authority::{CertificateAuthority, SharedAuthority};
use vantrust_core::export::{self, EventRecord};
use vantrust_core::gate::{AuthOutcome, AuthenticationGate, GatePolicy};
use vantrust_core::identity::VehicleIdentity;
use vantrust_core::snapshot;

#[derive(Parser)]
#[command(name = "vantrustctl")]
#[command(about = "Headless VANET trust simulation driver")]
struct Cli {
    #[arg(long, default_value = "info", global = true)]
    log: String,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Issue certificates for a fleet, run authentication ticks, revoke
    /// vehicles mid-run, export the event log.
    Scenario {
        #[arg(long, default_value = "./data")]
        data_dir: PathBuf,
        #[arg(long, default_value_t = 5)]
        vehicles: u32,
        #[arg(long, default_value_t = 10)]
        ticks: u32,
        /// Pause between ticks, milliseconds.
        #[arg(long, default_value_t = 1000)]
        tick_ms: u64,
        /// Minimum spacing between attempts from one vehicle, milliseconds.
        #[arg(long, default_value_t = 1000)]
        min_interval_ms: u64,
        /// Vehicles to revoke halfway through the run (repeatable).
        #[arg(long)]
        revoke: Vec<String>,
        /// Append the attack drill (Sybil, replay, DoS, forged key).
        #[arg(long)]
        attacks: bool,
    },
    /// Load a ledger snapshot and re-verify every digest and linkage.
    Verify {
        #[arg(long)]
        snapshot: PathBuf,
    },
    /// Project a ledger snapshot to the event-log CSV.
    Export {
        #[arg(long)]
        snapshot: PathBuf,
        #[arg(long)]
        out: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(cli.log.clone()))
        .init();

    let out = match cli.cmd {
        Command::Scenario {
            data_dir,
            vehicles,
            ticks,
            tick_ms,
            min_interval_ms,
            revoke,
            attacks,
        } => run_scenario(
            data_dir,
            vehicles,
            ticks,
            tick_ms,
            min_interval_ms,
            revoke,
            attacks,
        ),
        Command::Verify { snapshot } => run_verify(snapshot),
        Command::Export { snapshot, out } => run_export(snapshot, out),
    };
    match out {
        Ok(v) => println!("{v}"),
        Err(msg) => {
            println!("{}", json!({ "error": msg }));
            std::process::exit(1);
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn run_scenario(
    data_dir: PathBuf,
    vehicles: u32,
    ticks: u32,
    tick_ms: u64,
    min_interval_ms: u64,
    revoke: Vec<String>,
    attacks: bool,
) -> Result<serde_json::Value, String> {
    std::fs::create_dir_all(&data_dir).map_err(|e| e.to_string())?;
    let snapshot_path = data_dir.join("blockchain.json");
    let csv_path = data_dir.join("vanet_log.csv");
    tracing::info!(vehicles, ticks, data_dir = %data_dir.display(), "scenario started");

    let authority = SharedAuthority::new(CertificateAuthority::with_snapshot(&snapshot_path));
    let gate = AuthenticationGate::new(GatePolicy {
        min_interval: Duration::from_millis(min_interval_ms),
    });

    let mut fleet: Vec<VehicleIdentity> = (1..=vehicles)
        .map(|i| VehicleIdentity::generate(format!("V{i}")))
        .collect();
    let mut log: Vec<EventRecord> = Vec::new();
    let mut outcome_counts: BTreeMap<String, u64> = BTreeMap::new();
    let mut auth_latencies_us: BTreeMap<String, Vec<u64>> = BTreeMap::new();
    let mut revocation_latencies_us: Vec<u64> = Vec::new();

    for v in &fleet {
        match authority.issue_certificate(&v.id, v.declared_key()) {
            Ok(cert) => log.push(EventRecord::new(
                cert.issued_at.clone(),
                "Issuance",
                v.id.clone(),
                format!("Certificate issued: Cert-{}", v.id),
            )),
            Err(err) => log.push(EventRecord::new(
                now_label(),
                "Sybil",
                v.id.clone(),
                err.to_string(),
            )),
        }
    }

    let revoke_at = ticks / 2;
    for tick in 0..ticks {
        if tick == revoke_at {
            for id in &revoke {
                let latency = authority.revoke_certificate(id);
                revocation_latencies_us.push(latency.as_micros() as u64);
                log.push(EventRecord::new(
                    now_label(),
                    "Revocation",
                    id.clone(),
                    format!("Vehicle revoked due to misbehavior, latency {} us", latency.as_micros()),
                ));
            }
        }

        for (i, v) in fleet.iter_mut().enumerate() {
            let rsu = i % 2 + 1;
            let started = Instant::now();
            let outcome = gate.authenticate(v, &authority);
            let latency_us = started.elapsed().as_micros() as u64;
            *outcome_counts.entry(outcome.to_string()).or_default() += 1;
            if outcome == AuthOutcome::Authenticated {
                auth_latencies_us.entry(v.id.clone()).or_default().push(latency_us);
            }
            log.push(EventRecord::new(
                now_label(),
                "Authentication",
                v.id.clone(),
                format!("{outcome} at RSU {rsu}"),
            ));
        }

        if tick + 1 < ticks {
            std::thread::sleep(Duration::from_millis(tick_ms));
        }
    }

    let mut attack_report = serde_json::Value::Null;
    if attacks {
        attack_report = run_attacks(&gate, &authority, &mut fleet, &mut log)?;
    }

    export::write_csv(&csv_path, &log).map_err(|e| e.to_string())?;

    let audit = match authority.verify_chain() {
        Ok(()) => json!({ "intact": true }),
        Err(fault) => json!({ "intact": false, "fault": fault.to_string() }),
    };
    let avg_auth_latency_us: BTreeMap<String, u64> = auth_latencies_us
        .iter()
        .map(|(id, xs)| (id.clone(), xs.iter().sum::<u64>() / xs.len().max(1) as u64))
        .collect();

    Ok(json!({
        "vehicles": vehicles,
        "ticks": ticks,
        "ledger_entries": authority.ledger_len(),
        "outcomes": outcome_counts,
        "avg_auth_latency_us": avg_auth_latency_us,
        "revocation_latencies_us": revocation_latencies_us,
        "chain": audit,
        "snapshot": snapshot_path.display().to_string(),
        "event_log": csv_path.display().to_string(),
        "attacks": attack_report,
    }))
}

/// The attack drill: duplicate-key issuance, a backdated (replayed) attempt,
/// an immediate retry, and a forged key declaration.
fn run_attacks(
    gate: &AuthenticationGate,
    authority: &SharedAuthority,
    fleet: &mut [VehicleIdentity],
    log: &mut Vec<EventRecord>,
) -> Result<serde_json::Value, String> {
    let Some(first) = fleet.first_mut() else {
        return Err("attack drill needs at least one vehicle".to_string());
    };

    let sybil_blocked = authority
        .issue_certificate(&format!("{}-shadow", first.id), first.declared_key())
        .is_err();
    log.push(EventRecord::new(
        now_label(),
        "Attack",
        first.id.clone(),
        format!("Sybil drill: duplicate key blocked={sybil_blocked}"),
    ));

    // Replay: a captured attempt resubmitted after the interval has elapsed
    // is accepted as fresh. That is the known limitation of an
    // interval-only freshness check.
    first.last_auth = Instant::now().checked_sub(Duration::from_secs(5));
    let replay_outcome = gate.authenticate(first, authority);
    log.push(EventRecord::new(
        now_label(),
        "Attack",
        first.id.clone(),
        format!("Replay drill: outcome {replay_outcome}"),
    ));

    let dos_outcome = gate.authenticate(first, authority);
    log.push(EventRecord::new(
        now_label(),
        "Attack",
        first.id.clone(),
        format!("DoS drill: outcome {dos_outcome}"),
    ));

    let victim_key = *first.declared_key();
    let mut forger = VehicleIdentity::generate("V-forged");
    forger.set_declared_key(victim_key);
    let forged_outcome = gate.authenticate(&mut forger, authority);
    log.push(EventRecord::new(
        now_label(),
        "Attack",
        forger.id.clone(),
        format!("Forged declaration drill: outcome {forged_outcome}"),
    ));

    Ok(json!({
        "sybil_blocked": sybil_blocked,
        "replay_outcome": replay_outcome.to_string(),
        "dos_outcome": dos_outcome.to_string(),
        "forged_outcome": forged_outcome.to_string(),
    }))
}

fn run_verify(snapshot_path: PathBuf) -> Result<serde_json::Value, String> {
    let entries = snapshot::load(&snapshot_path).map_err(|e| e.to_string())?;
    match snapshot::audit(&entries) {
        Ok(()) => Ok(json!({ "intact": true, "entries": entries.len() })),
        Err(fault) => Ok(json!({
            "intact": false,
            "entries": entries.len(),
            "fault_index": fault.index,
            "fault": fault.to_string(),
        })),
    }
}

fn run_export(snapshot_path: PathBuf, out: PathBuf) -> Result<serde_json::Value, String> {
    let entries = snapshot::load_and_audit(&snapshot_path).map_err(|e| e.to_string())?;
    let records: Vec<EventRecord> = entries.iter().map(EventRecord::from_entry).collect();
    export::write_csv(&out, &records).map_err(|e| e.to_string())?;
    Ok(json!({ "rows": records.len(), "out": out.display().to_string() }))
}

/// Wall-clock label for driver-side rows, in the same format ledger entries
/// carry.
fn now_label() -> String {
    vantrust_core::ledger::now_rfc3339()
}
