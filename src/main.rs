//! Brokerage Wallet - scripted session runner
//!
//! ```text
//! ┌──────────┐    ┌──────────┐    ┌──────────────┐    ┌──────────┐
//! │  Config  │───▶│  Wallet  │◀──▶│ MemoryToken  │    │  Output  │
//! │  (YAML)  │    │          │    │    Bank      │    │  (JSON)  │
//! └──────────┘    └────▲─────┘    └──────────────┘    └──────────┘
//!                      │ steps
//!                 ┌────┴─────┐
//!                 │  Script  │
//!                 │  (YAML)  │
//!                 └──────────┘
//! ```
//!
//! Usage: `brokerage_wallet [--env dev] [--script fixtures/scenario.yaml]`

use std::sync::Arc;

use anyhow::Context;
use serde::Serialize;

use brokerage_wallet::config::AppConfig;
use brokerage_wallet::ledger::Holding;
use brokerage_wallet::logging::init_logging;
use brokerage_wallet::script::{self, Script, StepOutcome};
use brokerage_wallet::{BrokerageWallet, MemoryTokenBank, WalletEvent};

fn get_arg(names: &[&str]) -> Option<String> {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if names.contains(&args[i].as_str()) && i + 1 < args.len() {
            return Some(args[i + 1].clone());
        }
    }
    None
}

#[derive(Serialize)]
struct Report<'a> {
    outcomes: &'a [StepOutcome],
    holdings: Vec<Holding>,
    events: &'a [WalletEvent],
}

fn main() -> anyhow::Result<()> {
    let env = get_arg(&["--env", "-e"]).unwrap_or_else(|| "dev".to_string());
    let script_path =
        get_arg(&["--script", "-s"]).unwrap_or_else(|| "fixtures/scenario.yaml".to_string());

    let app_config = AppConfig::load(&env)?;
    let _log_guard = init_logging(&app_config);

    tracing::info!(
        env = %env,
        version = env!("CARGO_PKG_VERSION"),
        git = env!("GIT_HASH"),
        "Starting brokerage wallet"
    );

    let bank = Arc::new(MemoryTokenBank::new(app_config.wallet.custody));
    let mut wallet = BrokerageWallet::from_config(&app_config.wallet, bank.clone())
        .context("Failed to open event journal")?;

    let script = Script::from_file(&script_path)?;
    let outcomes = script::run(&mut wallet, &bank, &script);

    let report = Report {
        outcomes: &outcomes,
        holdings: wallet.ledger().entries(),
        events: wallet.events(),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
