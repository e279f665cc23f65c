//! End-to-end smoke test for the ballotvest binary.
//!
//! Initialises a fresh store from the genesis template, runs an election
//! through registration, voting, finalization and a vested claim, and checks
//! the JSON each step prints.
//!
//! Run with:
//!   cargo test -p ballotvest-cli --test smoke

use std::path::PathBuf;
use std::process::{Command, Output};

use serde_json::Value;

const PERIOD: i64 = 30 * 24 * 3600;

// ── Store lifecycle ───────────────────────────────────────────────────────────

struct StoreGuard {
    data_dir: PathBuf,
}

impl StoreGuard {
    fn new(name: &str) -> Self {
        let data_dir = std::env::temp_dir().join(format!("ballotvest_smoke_{}_{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&data_dir);
        Self { data_dir }
    }

    fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_ballotvest"))
            .arg("--data-dir")
            .arg(&self.data_dir)
            .args(args)
            .env("RUST_LOG", "warn")
            .output()
            .expect("spawn ballotvest")
    }

    /// Run and parse stdout as JSON, panicking on a non-zero exit.
    fn json(&self, args: &[&str]) -> Value {
        let out = self.run(args);
        assert!(
            out.status.success(),
            "ballotvest {:?} failed: {}",
            args,
            String::from_utf8_lossy(&out.stderr)
        );
        serde_json::from_slice(&out.stdout)
            .unwrap_or_else(|e| panic!("ballotvest {args:?} printed invalid JSON: {e}"))
    }

    fn fails(&self, args: &[&str]) -> String {
        let out = self.run(args);
        assert!(!out.status.success(), "ballotvest {:?} unexpectedly succeeded", args);
        String::from_utf8_lossy(&out.stderr).into_owned()
    }
}

impl Drop for StoreGuard {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.data_dir);
    }
}

fn event_names(events: &Value) -> Vec<String> {
    events
        .as_array()
        .expect("event list")
        .iter()
        .map(|e| match e {
            Value::String(s) => s.clone(),
            Value::Object(m) => m.keys().next().cloned().unwrap_or_default(),
            other => panic!("unexpected event shape {other}"),
        })
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[test]
fn genesis_template_is_valid_json() {
    let store = StoreGuard::new("template");
    let template = store.json(&["genesis-template"]);
    assert_eq!(template["owner"], "@owner");
    assert!(template["balances"]["reward-pool"].as_u64().unwrap() > 0);
}

#[test]
fn calls_require_genesis() {
    let store = StoreGuard::new("no_genesis");
    let err = store.fails(&["--caller", "@alice", "register"]);
    assert!(err.contains("genesis"), "{err}");
}

#[test]
fn election_to_vested_claim() {
    let store = StoreGuard::new("lifecycle");

    let genesis = store.json(&["genesis"]);
    assert!(genesis["reward_pool"].is_string());
    store.fails(&["genesis"]);

    // ── Registration ──────────────────────────────────────────────────────────
    for voter in ["@alice", "@bob"] {
        let events = store.json(&["--caller", voter, "--now", "0", "register"]);
        assert_eq!(event_names(&events), vec!["VoterRegistered"]);
    }
    store.fails(&["--caller", "@mallory", "--now", "0", "register"]);

    // ── Election ──────────────────────────────────────────────────────────────
    let created = store.json(&[
        "--caller", "@owner", "--now", "0",
        "create-election", "--name", "council",
        "--candidates", "xavier,yolanda",
        "--addresses", "@xavier,@yolanda",
        "--start", "100", "--end", "200",
    ]);
    assert_eq!(created[0]["ElectionCreated"]["id"], 0);

    store.fails(&["--caller", "@alice", "--now", "50", "vote", "--election", "0", "--candidate", "0"]);
    store.json(&["--caller", "@alice", "--now", "150", "vote", "--election", "0", "--candidate", "1"]);
    store.json(&["--caller", "@bob", "--now", "150", "vote", "--election", "0", "--candidate", "1"]);
    store.fails(&["--caller", "@bob", "--now", "160", "vote", "--election", "0", "--candidate", "0"]);

    let leading = store.json(&["leading", "--id", "0"]);
    assert_eq!(leading["name"], "yolanda");
    assert_eq!(leading["vote_count"], 2);

    store.fails(&["--caller", "@owner", "--now", "200", "finalize", "--election", "0"]);
    let finalized = store.json(&["--caller", "@owner", "--now", "201", "finalize", "--election", "0"]);
    assert_eq!(
        event_names(&finalized),
        vec!["VestingAdded", "RewardDistributed", "ElectionFinalized"]
    );
    assert_eq!(store.json(&["election", "--id", "0"])["finalized"], true);

    // ── Vesting ───────────────────────────────────────────────────────────────
    let later = (201 + 3 * PERIOD).to_string();
    let vesting = store.json(&["--now", &later, "vesting", "--account", "@yolanda"]);
    assert_eq!(vesting["claimable"], 300);
    assert_eq!(vesting["info"]["total"], 1_000);

    let timeline = store.json(&["timeline", "--account", "@yolanda"]);
    assert_eq!(timeline.as_array().unwrap().len(), 10);

    let claimed = store.json(&["--caller", "@yolanda", "--now", &later, "claim"]);
    assert_eq!(claimed[0]["TokensClaimed"]["amount"], 300);
    store.fails(&["--caller", "@yolanda", "--now", &later, "claim"]);

    let balance = store.json(&["balance", "--account", "@yolanda"]);
    assert_eq!(balance["balance"], 300);
    let custody = store.json(&["balance", "--account", "vesting-custody"]);
    assert_eq!(custody["balance"], 700);

    let events = store.json(&["events"]);
    let seqs: Vec<u64> = events.as_array().unwrap().iter().map(|r| r["seq"].as_u64().unwrap()).collect();
    assert_eq!(seqs, (0..seqs.len() as u64).collect::<Vec<_>>());
}
