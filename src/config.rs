//! Configuration loading from TOML with environment variable resolution.
//!
//! Reads `config.toml` into a `toml::Table` and validates it section by
//! section into strongly-typed, immutable structs. Validation is strict:
//! no type coercion, blank strings rejected, and every error names the
//! offending `[section].field` so a user can fix the file without reading
//! the source.
//!
//! The wallet secret is referenced either directly or by env-var name and
//! resolved on demand via [`resolve_private_key`].

use std::fmt;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use toml::{Table, Value};
use tracing::{debug, info};

/// Application name, used for the default config directory.
pub const APP_NAME: &str = "predictoor-bot";

/// Minimum allowed `[predictoor].cadence_seconds`.
pub const MIN_CADENCE_SECONDS: i64 = 5;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Any failure to load, validate or resolve configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Missing [{0}] section")]
    MissingSection(&'static str),

    /// A field is missing, mistyped, or out of range.
    #[error("{0}")]
    Invalid(String),

    #[error("Environment variable not set: {0}")]
    EnvVarNotSet(String),

    #[error("Wallet config invalid (no private key source)")]
    NoPrivateKeySource,
}

pub type Result<T> = std::result::Result<T, ConfigError>;

// ---------------------------------------------------------------------------
// Config types
// ---------------------------------------------------------------------------

/// Top-level application configuration.
///
/// Only built by [`load_config`] / [`AppConfig::from_table`], so every
/// instance has passed full validation. Read-only after construction.
#[derive(Debug)]
pub struct AppConfig {
    bot: BotConfig,
    rpc: RpcConfig,
    wallet: WalletConfig,
    predictoor: PredictoorConfig,
}

impl AppConfig {
    /// Assemble from already-validated sections.
    pub(crate) fn new(
        bot: BotConfig,
        rpc: RpcConfig,
        wallet: WalletConfig,
        predictoor: PredictoorConfig,
    ) -> Self {
        Self {
            bot,
            rpc,
            wallet,
            predictoor,
        }
    }

    pub fn bot(&self) -> &BotConfig {
        &self.bot
    }

    pub fn rpc(&self) -> &RpcConfig {
        &self.rpc
    }

    pub fn wallet(&self) -> &WalletConfig {
        &self.wallet
    }

    pub fn predictoor(&self) -> &PredictoorConfig {
        &self.predictoor
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BotConfig {
    enabled: bool,
}

impl BotConfig {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RpcConfig {
    url: String,
    chain_id: i64,
}

impl RpcConfig {
    /// The url is kept as written but must not be blank.
    pub fn new(url: impl Into<String>, chain_id: i64) -> Result<Self> {
        let url = url.into();
        if url.trim().is_empty() {
            return Err(invalid("[rpc].url must be a non-empty string"));
        }
        Ok(Self { url, chain_id })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn chain_id(&self) -> i64 {
        self.chain_id
    }
}

/// Where the wallet private key comes from.
///
/// At least one source is always set; the only way to build one is
/// [`WalletConfig::new`].
pub struct WalletConfig {
    private_key: Option<SecretString>,
    /// e.g. "PREDICTOOR_PRIVATE_KEY"
    private_key_env: Option<String>,
}

impl WalletConfig {
    /// Build a wallet config from optional sources, trimming both.
    pub fn new(private_key: Option<&str>, private_key_env: Option<&str>) -> Result<Self> {
        if let Some(pk) = private_key {
            if pk.trim().is_empty() {
                return Err(invalid("[wallet].private_key must be a non-empty string if set"));
            }
        }
        if let Some(env) = private_key_env {
            if env.trim().is_empty() {
                return Err(invalid("[wallet].private_key_env must be a non-empty string if set"));
            }
        }
        if private_key.is_none() && private_key_env.is_none() {
            return Err(invalid(
                "Provide either [wallet].private_key OR [wallet].private_key_env",
            ));
        }

        Ok(Self {
            private_key: private_key.map(|pk| SecretString::new(pk.trim().to_string())),
            private_key_env: private_key_env.map(|env| env.trim().to_string()),
        })
    }

    pub fn has_private_key(&self) -> bool {
        self.private_key.is_some()
    }

    pub fn private_key_env(&self) -> Option<&str> {
        self.private_key_env.as_deref()
    }
}

impl fmt::Debug for WalletConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletConfig")
            .field("private_key", &self.private_key.as_ref().map(|_| "[REDACTED]"))
            .field("private_key_env", &self.private_key_env)
            .finish()
    }
}

/// Prediction parameters: which markets, how much to stake, how often.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictoorConfig {
    markets: Vec<String>,
    stake: f64,
    cadence_seconds: i64,
}

impl PredictoorConfig {
    /// Validate value ranges. Market ids are expected to be trimmed and
    /// non-blank already.
    pub fn new(markets: Vec<String>, stake: f64, cadence_seconds: i64) -> Result<Self> {
        if markets.is_empty() {
            return Err(invalid("[predictoor].markets must contain at least one market"));
        }
        if markets.iter().any(|m| m.trim().is_empty()) {
            return Err(invalid("[predictoor].markets must be a list of non-empty strings"));
        }
        if stake.is_nan() || stake <= 0.0 {
            return Err(invalid("[predictoor].stake must be > 0"));
        }
        if cadence_seconds < MIN_CADENCE_SECONDS {
            return Err(invalid(format!(
                "[predictoor].cadence_seconds must be >= {MIN_CADENCE_SECONDS}"
            )));
        }

        Ok(Self {
            markets,
            stake,
            cadence_seconds,
        })
    }

    pub fn markets(&self) -> &[String] {
        &self.markets
    }

    pub fn stake(&self) -> f64 {
        self.stake
    }

    pub fn cadence_seconds(&self) -> i64 {
        self.cadence_seconds
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Load and validate configuration from a TOML file.
pub fn load_config(path: impl AsRef<Path>) -> Result<AppConfig> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }

    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let doc: Table = contents.parse().map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let config = AppConfig::from_table(&doc)?;

    info!(
        path = %path.display(),
        enabled = config.bot().enabled(),
        chain_id = config.rpc().chain_id(),
        markets = config.predictoor().markets().len(),
        cadence_seconds = config.predictoor().cadence_seconds(),
        "Configuration loaded"
    );

    Ok(config)
}

impl AppConfig {
    /// Validate an already-parsed document.
    ///
    /// All four sections are checked for presence before any field.
    pub fn from_table(doc: &Table) -> Result<Self> {
        let bot_s = require_section(doc, "bot")?;
        let rpc_s = require_section(doc, "rpc")?;
        let wallet_s = require_section(doc, "wallet")?;
        let pred_s = require_section(doc, "predictoor")?;

        let bot = BotConfig::new(require_bool(bot_s, "enabled", "[bot]")?);
        let rpc = RpcConfig::new(
            require_str(rpc_s, "url", "[rpc]")?,
            require_int(rpc_s, "chain_id", "[rpc]")?,
        )?;
        let wallet = load_wallet(wallet_s)?;

        let markets = require_list_str(pred_s, "markets", "[predictoor]")?;
        let stake = require_float(pred_s, "stake", "[predictoor]")?;
        let cadence_seconds = require_int(pred_s, "cadence_seconds", "[predictoor]")?;
        let predictoor = PredictoorConfig::new(markets, stake, cadence_seconds)?;

        Ok(Self {
            bot,
            rpc,
            wallet,
            predictoor,
        })
    }
}

fn load_wallet(section: &Table) -> Result<WalletConfig> {
    let private_key = optional_str(
        section,
        "private_key",
        "[wallet].private_key must be a non-empty string if set",
    )?;
    let private_key_env = optional_str(
        section,
        "private_key_env",
        "[wallet].private_key_env must be a non-empty string if set",
    )?;
    WalletConfig::new(private_key, private_key_env)
}

/// Default config location: `<user config dir>/predictoor-bot/config.toml`.
///
/// Honors `XDG_CONFIG_HOME`, then `$HOME/.config`; falls back to a path
/// relative to the working directory when neither is set.
pub fn default_config_path() -> PathBuf {
    let root = std::env::var_os("XDG_CONFIG_HOME")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(|| {
            std::env::var_os("HOME")
                .filter(|v| !v.is_empty())
                .map(|home| PathBuf::from(home).join(".config"))
        })
        .unwrap_or_else(|| PathBuf::from(".config"));
    root.join(APP_NAME).join("config.toml")
}

// ---------------------------------------------------------------------------
// Secret resolution
// ---------------------------------------------------------------------------

/// Resolve the wallet private key.
///
/// A direct `private_key` wins; otherwise the variable named by
/// `private_key_env` is read and trimmed. The value is never logged.
pub fn resolve_private_key(cfg: &WalletConfig) -> Result<SecretString> {
    if let Some(pk) = &cfg.private_key {
        debug!(source = "config", "Resolved wallet private key");
        return Ok(SecretString::new(pk.expose_secret().clone()));
    }

    if let Some(name) = &cfg.private_key_env {
        let value = std::env::var(name).unwrap_or_default();
        let value = value.trim();
        if value.is_empty() {
            return Err(ConfigError::EnvVarNotSet(name.clone()));
        }
        debug!(source = "env", var = %name, "Resolved wallet private key");
        return Ok(SecretString::new(value.to_string()));
    }

    Err(ConfigError::NoPrivateKeySource)
}

// ---------------------------------------------------------------------------
// Field helpers
// ---------------------------------------------------------------------------

fn invalid(msg: impl Into<String>) -> ConfigError {
    ConfigError::Invalid(msg.into())
}

fn require_section<'a>(doc: &'a Table, name: &'static str) -> Result<&'a Table> {
    match doc.get(name) {
        Some(Value::Table(t)) => Ok(t),
        _ => Err(ConfigError::MissingSection(name)),
    }
}

fn require_bool(section: &Table, key: &str, path: &str) -> Result<bool> {
    match section.get(key) {
        Some(Value::Boolean(b)) => Ok(*b),
        _ => Err(invalid(format!("{path}.{key} must be a boolean"))),
    }
}

fn require_str<'a>(section: &'a Table, key: &str, path: &str) -> Result<&'a str> {
    match section.get(key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s),
        _ => Err(invalid(format!("{path}.{key} must be a non-empty string"))),
    }
}

fn require_int(section: &Table, key: &str, path: &str) -> Result<i64> {
    match section.get(key) {
        Some(Value::Integer(i)) => Ok(*i),
        _ => Err(invalid(format!("{path}.{key} must be an integer"))),
    }
}

fn require_float(section: &Table, key: &str, path: &str) -> Result<f64> {
    match section.get(key) {
        Some(Value::Integer(i)) => Ok(*i as f64),
        Some(Value::Float(f)) => Ok(*f),
        _ => Err(invalid(format!("{path}.{key} must be a number"))),
    }
}

fn require_list_str(section: &Table, key: &str, path: &str) -> Result<Vec<String>> {
    let err = || invalid(format!("{path}.{key} must be a list of non-empty strings"));
    let Some(Value::Array(items)) = section.get(key) else {
        return Err(err());
    };
    items
        .iter()
        .map(|item| match item {
            Value::String(s) if !s.trim().is_empty() => Ok(s.trim().to_string()),
            _ => Err(err()),
        })
        .collect()
}

/// An optional field: absent is fine, present must be a non-blank string.
fn optional_str<'a>(section: &'a Table, key: &str, msg: &str) -> Result<Option<&'a str>> {
    match section.get(key) {
        None => Ok(None),
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(Some(s)),
        Some(_) => Err(invalid(msg)),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
