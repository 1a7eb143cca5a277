//! Backend contract tests.
//!
//! Every `Backend` is used through `dyn Backend` only, the way the runner
//! uses it.

use predictoor_bot::backend::mock::MockBackend;
use predictoor_bot::backend::pdr::PdrBackendAdapter;
use predictoor_bot::backend::{Backend, BackendError, BackendKind, MarketState, TxReceipt};
use predictoor_bot::config::RpcConfig;

fn rpc(url: &str, chain_id: i64) -> RpcConfig {
    RpcConfig::new(url, chain_id).unwrap()
}

#[test]
fn test_mock_backend_contract() {
    let backend: Box<dyn Backend> = Box::new(MockBackend::new());

    let state = backend.get_market_state("TEST").unwrap();
    assert_eq!(
        state,
        MarketState {
            market_id: "TEST".to_string(),
            price: 1.0,
        }
    );

    let receipt = backend.submit_prediction("TEST", 0.5, 1.0).unwrap();
    assert_eq!(
        receipt,
        TxReceipt {
            tx_hash: "mock_tx_hash".to_string(),
        }
    );
}

#[test]
fn test_mock_values_are_fresh_per_call() {
    let backend = MockBackend::new();
    let a = backend.get_market_state("X").unwrap();
    let b = backend.get_market_state("Y").unwrap();
    assert_eq!(a.market_id, "X");
    assert_eq!(b.market_id, "Y");
    assert_eq!(a.price, b.price);
}

#[test]
fn test_pdr_adapter_raises_if_missing() {
    for (url, chain_id) in [("http://localhost:8545", 1), ("https://example.org/rpc", 137)] {
        let err = PdrBackendAdapter::with_python(url, chain_id, "/nonexistent/bin/python3")
            .unwrap_err();
        assert!(
            matches!(err, BackendError::NotAvailable { .. }),
            "unexpected error: {err}"
        );
    }
}

#[test]
fn test_backend_kind_selects_mock() {
    let backend = BackendKind::Mock
        .connect(&rpc("http://localhost:8545", 1))
        .unwrap();
    assert_eq!(backend.name(), "mock");
    assert_eq!(
        backend.submit_prediction("BTC/USDT", 0.9, 3.0).unwrap().tx_hash,
        "mock_tx_hash"
    );
}

#[test]
fn test_market_state_serialises() {
    let state = MarketState {
        market_id: "BTC/USDT".to_string(),
        price: 0.25,
    };
    let json = serde_json::to_string(&state).unwrap();
    assert_eq!(json, r#"{"market_id":"BTC/USDT","price":0.25}"#);
}
