//! Run paths driven by the CLI.
//!
//! - [`DryRunReport`] validates the loaded config and describes what a run
//!   would do, without touching a backend.
//! - [`run`] is the minimal execution path: check the bot is enabled,
//!   resolve the wallet key, connect the chosen backend and read the state of
//!   every configured market once.

use std::fmt;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::backend::{Backend, BackendError, BackendKind, MarketState};
use crate::config::{resolve_private_key, AppConfig, ConfigError, RpcConfig};

// ---------------------------------------------------------------------------
// Dry run
// ---------------------------------------------------------------------------

/// Everything a dry run prints. Holds the key status, never the key.
#[derive(Debug, Clone, Serialize)]
pub struct DryRunReport {
    pub config_path: String,
    pub backend: String,
    pub bot_enabled: bool,
    pub rpc_url: String,
    pub rpc_chain_id: i64,
    /// "OK" or "ERROR: <reason>".
    pub private_key: String,
    pub markets: Vec<String>,
    pub stake: f64,
    pub cadence_seconds: i64,
}

impl DryRunReport {
    /// Build the report. A private key that cannot be resolved is reported,
    /// not returned as an error.
    pub fn new(config_path: &Path, cfg: &AppConfig, backend: BackendKind) -> Self {
        let private_key = match resolve_private_key(cfg.wallet()) {
            Ok(_) => "OK".to_string(),
            Err(e) => format!("ERROR: {e}"),
        };

        Self {
            config_path: config_path.display().to_string(),
            backend: backend.to_string(),
            bot_enabled: cfg.bot().enabled(),
            rpc_url: cfg.rpc().url().to_string(),
            rpc_chain_id: cfg.rpc().chain_id(),
            private_key,
            markets: cfg.predictoor().markets().to_vec(),
            stake: cfg.predictoor().stake(),
            cadence_seconds: cfg.predictoor().cadence_seconds(),
        }
    }
}

impl fmt::Display for DryRunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[DRY-RUN] Config OK")?;
        writeln!(f, "[DRY-RUN] Using config: {}", self.config_path)?;
        writeln!(f, "[DRY-RUN] backend = {}", self.backend)?;
        writeln!(f, "[DRY-RUN] bot.enabled = {}", self.bot_enabled)?;
        writeln!(f, "[DRY-RUN] rpc.url = {}", self.rpc_url)?;
        writeln!(f, "[DRY-RUN] rpc.chain_id = {}", self.rpc_chain_id)?;
        writeln!(f, "[DRY-RUN] wallet.private_key = {}", self.private_key)?;
        writeln!(f, "[DRY-RUN] predictoor.markets = {:?}", self.markets)?;
        writeln!(f, "[DRY-RUN] predictoor.stake = {}", self.stake)?;
        writeln!(f, "[DRY-RUN] predictoor.cadence_seconds = {}", self.cadence_seconds)?;
        for market in &self.markets {
            writeln!(
                f,
                "[DRY-RUN] Planned: predict {market} every {}s staking {}",
                self.cadence_seconds, self.stake
            )?;
        }
        write!(
            f,
            "[DRY-RUN] Next steps: connect RPC, load markets, fetch data, score, submit predictions."
        )
    }
}

// ---------------------------------------------------------------------------
// Run
// ---------------------------------------------------------------------------

/// Why a run stopped early.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Result of a completed run.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// `[bot].enabled = false`; nothing was done.
    Disabled,
    /// One state per configured market, in config order.
    Completed(Vec<MarketState>),
}

/// Minimal execution path.
///
/// `connect` builds the backend and is only called once the bot is enabled
/// and the private key resolves.
pub fn run<F>(cfg: &AppConfig, connect: F) -> Result<RunOutcome, RunError>
where
    F: FnOnce(&RpcConfig) -> Result<Box<dyn Backend>, BackendError>,
{
    if !cfg.bot().enabled() {
        info!("Bot is disabled in config");
        return Ok(RunOutcome::Disabled);
    }

    resolve_private_key(cfg.wallet())?;

    let backend = connect(cfg.rpc())?;
    info!(
        markets = cfg.predictoor().markets().len(),
        chain_id = cfg.rpc().chain_id(),
        "Backend connected"
    );

    let states = cfg
        .predictoor()
        .markets()
        .iter()
        .map(|market| backend.get_market_state(market))
        .collect::<Result<Vec<_>, _>>()?;

    for state in &states {
        info!(market_id = %state.market_id, price = state.price, "Market state");
    }

    Ok(RunOutcome::Completed(states))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
