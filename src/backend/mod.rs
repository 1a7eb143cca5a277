//! Prediction backends.
//!
//! Defines the `Backend` trait and provides implementations for:
//! - `mock` — fixed canned values for tests and dry runs
//! - `pdr` — adapter to the external pdr-backend (import-checked at construction)
//!
//! The backend is chosen once per run through [`BackendKind`].

pub mod mock;
pub mod pdr;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::RpcConfig;

// ---------------------------------------------------------------------------
// Shared types
// ---------------------------------------------------------------------------

/// Snapshot of a market as reported by a backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketState {
    pub market_id: String,
    pub price: f64,
}

impl fmt::Display for MarketState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ {:.4}", self.market_id, self.price)
    }
}

/// Receipt for a submitted prediction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxReceipt {
    pub tx_hash: String,
}

/// Errors raised by backends. Never used for configuration problems.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// The backend's external dependency could not be acquired.
    #[error("{backend} is not available ({reason}). {remediation}")]
    NotAvailable {
        backend: &'static str,
        reason: String,
        remediation: &'static str,
    },

    /// A backend operation failed at runtime.
    #[error("{backend} request failed: {message}")]
    Request {
        backend: &'static str,
        message: String,
    },
}

impl BackendError {
    pub fn is_not_available(&self) -> bool {
        matches!(self, Self::NotAvailable { .. })
    }
}

// ---------------------------------------------------------------------------
// Contract
// ---------------------------------------------------------------------------

/// Abstraction over "where market data comes from and where predictions go".
///
/// Each call is one logical request with one logical response. An
/// implementation may retry internally but must surface a single outcome.
pub trait Backend: Send + Sync {
    /// Current state of a single market.
    fn get_market_state(&self, market_id: &str) -> Result<MarketState, BackendError>;

    /// Submit a prediction for `market_id`, committing `stake`.
    fn submit_prediction(
        &self,
        market_id: &str,
        prediction: f64,
        stake: f64,
    ) -> Result<TxReceipt, BackendError>;

    /// Backend name for logging and identification.
    fn name(&self) -> &str;
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// Which backend implementation to run with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendKind {
    #[default]
    Mock,
    Pdr,
}

impl BackendKind {
    /// Construct the selected backend. For `Pdr` this checks that pdr-backend
    /// imports and fails with [`BackendError::NotAvailable`] if it does not.
    pub fn connect(self, rpc: &RpcConfig) -> Result<Box<dyn Backend>, BackendError> {
        match self {
            Self::Mock => Ok(Box::new(mock::MockBackend::new())),
            Self::Pdr => Ok(Box::new(pdr::PdrBackendAdapter::new(rpc.url(), rpc.chain_id())?)),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mock => write!(f, "mock"),
            Self::Pdr => write!(f, "pdr"),
        }
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mock" => Ok(Self::Mock),
            "pdr" | "pdr-backend" => Ok(Self::Pdr),
            other => Err(format!("unknown backend '{other}' (expected 'mock' or 'pdr')")),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
