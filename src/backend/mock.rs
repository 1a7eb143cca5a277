//! Mock backend.
//!
//! Deterministic `Backend` with fixed return values and no side effects.
//! Lets the runner and dry-run paths execute without any network
//! dependency.

use tracing::debug;

use super::{Backend, BackendError, MarketState, TxReceipt};

/// Price reported for every market.
pub const MOCK_PRICE: f64 = 1.0;

/// Hash returned for every submission.
pub const MOCK_TX_HASH: &str = "mock_tx_hash";

#[derive(Debug, Clone, Copy, Default)]
pub struct MockBackend;

impl MockBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Backend for MockBackend {
    fn get_market_state(&self, market_id: &str) -> Result<MarketState, BackendError> {
        debug!(market_id, "Mock market state");
        Ok(MarketState {
            market_id: market_id.to_string(),
            price: MOCK_PRICE,
        })
    }

    fn submit_prediction(
        &self,
        market_id: &str,
        prediction: f64,
        stake: f64,
    ) -> Result<TxReceipt, BackendError> {
        debug!(market_id, prediction, stake, "Mock prediction submitted");
        Ok(TxReceipt {
            tx_hash: MOCK_TX_HASH.to_string(),
        })
    }

    fn name(&self) -> &str {
        "mock"
    }
}
