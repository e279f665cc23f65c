//! ballotvest
//!
//! Command-line driver for a local ballotvest ledger. Every state-changing
//! subcommand runs one atomic step against the sled store in `--data-dir`
//! and prints the events it emitted; read subcommands print JSON.
//!
//! Usage:
//!   ballotvest genesis-template
//!   ballotvest genesis          [--params <json>]
//!   ballotvest register         --caller <account>
//!   ballotvest create-election  --caller <owner> --name <n> --candidates a,b --addresses @a,@b --start <ts> --end <ts>
//!   ballotvest vote             --caller <account> --election <id> --candidate <index>
//!   ballotvest finalize         --caller <owner> --election <id>
//!   ballotvest claim            --caller <account>
//!   ballotvest vesting          --account <account>
//!
//! Accounts are `@label`, `reward-pool`, `vesting-custody`, or a base-58 /
//! `0x` hex address.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use ballotvest_core::action::{Action, Call};
use ballotvest_core::types::{Address, Balance, ElectionId, Timestamp};
use ballotvest_core::vesting::{VestingInfo, VestingSchedule};
use ballotvest_genesis::{apply_genesis, resolve_account, GenesisParams};
use ballotvest_state::{StateDb, StateEngine, TokenLedger};
use ballotvest_vesting::VestingQuery;

// ── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "ballotvest",
    version,
    about = "Token-gated elections with vested rewards for the winners"
)]
struct Args {
    /// Directory for the persistent state database.
    #[arg(long, global = true, default_value = "~/.ballotvest/data")]
    data_dir: PathBuf,

    /// Account issuing the call.
    #[arg(long, global = true)]
    caller: Option<String>,

    /// Clock reading in Unix seconds. Defaults to the system clock.
    #[arg(long, global = true, allow_negative_numbers = true)]
    now: Option<Timestamp>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a genesis parameter file to start from.
    GenesisTemplate,

    /// Initialise a fresh store.
    Genesis {
        /// Genesis params JSON. The template is used when omitted.
        #[arg(long)]
        params: Option<PathBuf>,
    },

    /// Grant or revoke admin rights. Owner only.
    SetAdmin {
        #[arg(long)]
        account: String,
        /// Revoke instead of grant.
        #[arg(long, default_value_t = false)]
        revoke: bool,
    },

    /// Register the caller as a voter.
    Register,

    /// Open a new election. Owner only.
    CreateElection {
        #[arg(long)]
        name: String,
        /// Candidate names (comma-separated).
        #[arg(long, value_delimiter = ',')]
        candidates: Vec<String>,
        /// Candidate payout accounts, in the same order (comma-separated).
        #[arg(long, value_delimiter = ',')]
        addresses: Vec<String>,
        /// Voting opens at this Unix timestamp (inclusive).
        #[arg(long, allow_negative_numbers = true)]
        start: Timestamp,
        /// Voting closes after this Unix timestamp (inclusive).
        #[arg(long, allow_negative_numbers = true)]
        end: Timestamp,
    },

    /// Cast the caller's ballot.
    Vote {
        #[arg(long)]
        election: ElectionId,
        /// 0-based candidate index.
        #[arg(long)]
        candidate: usize,
    },

    /// Close an ended election and vest its reward. Owner only.
    Finalize {
        #[arg(long)]
        election: ElectionId,
    },

    /// Create a vesting schedule directly. Owner or admin.
    AddVesting {
        #[arg(long)]
        beneficiary: String,
        #[arg(long)]
        amount: Balance,
    },

    /// Withdraw everything the caller has unlocked.
    Claim,

    /// Show an election, or list all of them.
    Election {
        #[arg(long)]
        id: Option<ElectionId>,
    },

    /// Show the leading candidate of an election.
    Leading {
        #[arg(long)]
        id: ElectionId,
    },

    /// Show an account's vesting position.
    Vesting {
        #[arg(long)]
        account: String,
    },

    /// Show the per-period unlock timeline of an account's schedule.
    Timeline {
        #[arg(long)]
        account: String,
    },

    /// Show an account's token balance.
    Balance {
        #[arg(long)]
        account: String,
    },

    /// Dump the event log.
    Events,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn,ballotvest=info")),
        )
        .init();

    let args = Args::parse();
    let now = args.now.unwrap_or_else(|| chrono::Utc::now().timestamp());

    if let Command::GenesisTemplate = args.command {
        println!("{}", GenesisParams::template().to_json_pretty()?);
        return Ok(());
    }

    // ── State database ────────────────────────────────────────────────────────
    let data_dir = expand_tilde(&args.data_dir);
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("creating data dir {}", data_dir.display()))?;
    let db = Arc::new(StateDb::open(&data_dir).context("opening state database")?);

    if let Command::Genesis { params } = &args.command {
        return cmd_genesis(&db, params.as_deref());
    }

    let engine = StateEngine::open(Arc::clone(&db)).context("store has no genesis; run `ballotvest genesis` first")?;

    match args.command {
        Command::GenesisTemplate | Command::Genesis { .. } => Ok(()),

        // ── Calls ─────────────────────────────────────────────────────────────
        Command::SetAdmin { account, revoke } => {
            let account = parse_account(&account)?;
            submit(&engine, &args.caller, Action::SetAdmin { account, authorized: !revoke }, now)
        }

        Command::Register => submit(&engine, &args.caller, Action::RegisterVoter, now),

        Command::CreateElection { name, candidates, addresses, start, end } => {
            let candidate_addresses = addresses
                .iter()
                .map(|a| parse_account(a))
                .collect::<anyhow::Result<Vec<_>>>()?;
            let action = Action::CreateElection {
                name,
                candidate_names: candidates,
                candidate_addresses,
                start_time: start,
                end_time: end,
            };
            submit(&engine, &args.caller, action, now)
        }

        Command::Vote { election, candidate } => {
            let action = Action::Vote { election_id: election, candidate_index: candidate };
            submit(&engine, &args.caller, action, now)
        }

        Command::Finalize { election } => {
            submit(&engine, &args.caller, Action::Finalize { election_id: election }, now)
        }

        Command::AddVesting { beneficiary, amount } => {
            let beneficiary = parse_account(&beneficiary)?;
            submit(&engine, &args.caller, Action::AddVesting { beneficiary, amount }, now)
        }

        Command::Claim => submit(&engine, &args.caller, Action::Claim, now),

        // ── Views ─────────────────────────────────────────────────────────────
        Command::Election { id } => match id {
            Some(id) => print_json(&engine.election(id)?),
            None => print_json(&engine.registry().elections()?),
        },

        Command::Leading { id } => print_json(&engine.leading_candidate(id)?),

        Command::Vesting { account } => {
            let account = parse_account(&account)?;
            let query = VestingQuery::new(&db, engine.params().period_secs);
            let summary = match query.get(&account)? {
                Some(_) => Some(query.describe(&account, now)?),
                None => None,
            };
            print_json(&VestingView {
                account,
                schedule: engine.schedule(&account)?,
                info: engine.vesting_info(&account, now)?,
                claimable: engine.claimable_amount(&account, now)?,
                summary,
            })
        }

        Command::Timeline { account } => {
            let account = parse_account(&account)?;
            let query = VestingQuery::new(&db, engine.params().period_secs);
            print_json(&query.timeline(&account)?)
        }

        Command::Balance { account } => {
            let account = parse_account(&account)?;
            let balance = engine.token().balance_of(&account)?;
            print_json(&BalanceView { account, balance })
        }

        Command::Events => print_json(&engine.events()?),
    }
}

// ── Output shapes ─────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct GenesisView {
    owner: Address,
    reward_pool: Address,
    vesting_custody: Address,
}

#[derive(Serialize)]
struct VestingView {
    account: Address,
    schedule: Option<VestingSchedule>,
    info: VestingInfo,
    claimable: Balance,
    summary: Option<String>,
}

#[derive(Serialize)]
struct BalanceView {
    account: Address,
    balance: Balance,
}

// ── Command handlers ──────────────────────────────────────────────────────────

fn cmd_genesis(db: &StateDb, params_path: Option<&Path>) -> anyhow::Result<()> {
    let params = match params_path {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading genesis params {}", path.display()))?;
            GenesisParams::from_json(&json)?
        }
        None => {
            info!("no genesis params given; using the template");
            GenesisParams::template()
        }
    };
    let accounts = apply_genesis(db, &params).context("applying genesis")?;
    print_json(&GenesisView {
        owner: accounts.owner,
        reward_pool: accounts.reward_pool,
        vesting_custody: accounts.vesting_custody,
    })
}

fn submit(engine: &StateEngine, caller: &Option<String>, action: Action, now: Timestamp) -> anyhow::Result<()> {
    let Some(caller) = caller else {
        bail!("--caller is required for this command");
    };
    let call = Call::new(parse_account(caller)?, action);
    let events = engine.apply(&call, now)?;
    engine.db.flush()?;
    print_json(&events)
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn parse_account(s: &str) -> anyhow::Result<Address> {
    resolve_account(s).with_context(|| format!("invalid account `{s}`"))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn expand_tilde(path: &Path) -> PathBuf {
    if let Ok(stripped) = path.strip_prefix("~") {
        if let Ok(home) = std::env::var("HOME").or_else(|_| std::env::var("USERPROFILE")) {
            return PathBuf::from(home).join(stripped);
        }
    }
    path.to_path_buf()
}
