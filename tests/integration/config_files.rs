//! Config loading against real files, through to a mock run.

use std::io::Write;
use std::path::Path;

use secrecy::ExposeSecret;
use tempfile::NamedTempFile;

use predictoor_bot::backend::{BackendError, BackendKind};
use predictoor_bot::config::{load_config, resolve_private_key, ConfigError};
use predictoor_bot::runner::{run, DryRunReport, RunError, RunOutcome};

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

fn config_with_wallet(wallet: &str, enabled: bool) -> String {
    format!(
        r#"
[bot]
enabled = {enabled}

[rpc]
url = "http://127.0.0.1:8545"
chain_id = 23294

[wallet]
{wallet}

[predictoor]
markets = ["BTC/USDT", "ETH/USDT", "BTC/USDT"]
stake = 0.5
cadence_seconds = 5
"#
    )
}

#[test]
fn test_example_config_loads() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("config.example.toml");
    let cfg = load_config(&path).expect("example config should be valid");

    assert!(cfg.bot().enabled());
    assert_eq!(cfg.rpc().chain_id(), 8996);
    assert_eq!(cfg.wallet().private_key_env(), Some("PREDICTOOR_PRIVATE_KEY"));
    assert_eq!(cfg.predictoor().markets(), ["BTC/USDT", "ETH/USDT"]);
    assert_eq!(cfg.predictoor().cadence_seconds(), 300);
}

#[test]
fn test_round_trip_values() {
    let file = write_config(&config_with_wallet(r#"private_key = "abc123""#, true));
    let cfg = load_config(file.path()).unwrap();

    assert!(cfg.bot().enabled());
    assert_eq!(cfg.rpc().url(), "http://127.0.0.1:8545");
    assert_eq!(cfg.rpc().chain_id(), 23294);
    assert_eq!(cfg.predictoor().markets(), ["BTC/USDT", "ETH/USDT", "BTC/USDT"]);
    assert_eq!(cfg.predictoor().stake(), 0.5);
    assert_eq!(cfg.predictoor().cadence_seconds(), 5);
    assert_eq!(resolve_private_key(cfg.wallet()).unwrap().expose_secret(), "abc123");
}

#[test]
fn test_direct_key_beats_env() {
    std::env::set_var("PREDICTOOR_IT_PRECEDENCE", "from-env");
    let file = write_config(&config_with_wallet(
        "private_key = \"direct\"\nprivate_key_env = \"PREDICTOOR_IT_PRECEDENCE\"",
        true,
    ));
    let cfg = load_config(file.path()).unwrap();
    assert_eq!(resolve_private_key(cfg.wallet()).unwrap().expose_secret(), "direct");
}

#[test]
fn test_env_key_resolution() {
    std::env::set_var("PREDICTOOR_IT_FOO_KEY", "abc");
    let file = write_config(&config_with_wallet(
        r#"private_key_env = "PREDICTOOR_IT_FOO_KEY""#,
        true,
    ));
    let cfg = load_config(file.path()).unwrap();
    assert_eq!(resolve_private_key(cfg.wallet()).unwrap().expose_secret(), "abc");

    std::env::set_var("PREDICTOOR_IT_FOO_KEY", "");
    assert!(matches!(
        resolve_private_key(cfg.wallet()),
        Err(ConfigError::EnvVarNotSet(_))
    ));
}

#[test]
fn test_missing_wallet_source_rejected() {
    let file = write_config(&config_with_wallet("", true));
    let err = load_config(file.path()).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Provide either [wallet].private_key OR [wallet].private_key_env"
    );
}

#[test]
fn test_full_mock_run() {
    let file = write_config(&config_with_wallet(r#"private_key = "abc123""#, true));
    let cfg = load_config(file.path()).unwrap();

    let outcome = run(&cfg, |rpc| BackendKind::Mock.connect(rpc)).unwrap();
    let RunOutcome::Completed(states) = outcome else {
        panic!("expected a completed run");
    };
    assert_eq!(states.len(), 3);
    assert!(states.iter().all(|s| s.price == 1.0));
    assert_eq!(states[2].market_id, "BTC/USDT");
}

#[test]
fn test_disabled_run() {
    let file = write_config(&config_with_wallet(r#"private_key = "abc123""#, false));
    let cfg = load_config(file.path()).unwrap();
    assert_eq!(
        run(&cfg, |rpc| BackendKind::Mock.connect(rpc)).unwrap(),
        RunOutcome::Disabled
    );
}

#[test]
fn test_run_with_unavailable_backend() {
    let file = write_config(&config_with_wallet(r#"private_key = "abc123""#, true));
    let cfg = load_config(file.path()).unwrap();

    let err = run(&cfg, |rpc| {
        predictoor_bot::backend::pdr::PdrBackendAdapter::with_python(
            rpc.url(),
            rpc.chain_id(),
            "/nonexistent/bin/python3",
        )
        .map(|a| Box::new(a) as Box<dyn predictoor_bot::backend::Backend>)
    })
    .unwrap_err();
    assert!(matches!(
        err,
        RunError::Backend(BackendError::NotAvailable { .. })
    ));
}

#[test]
fn test_dry_run_never_prints_key() {
    let file = write_config(&config_with_wallet(r#"private_key = "abc123""#, true));
    let cfg = load_config(file.path()).unwrap();
    let report = DryRunReport::new(file.path(), &cfg, BackendKind::Mock).to_string();
    assert!(report.contains("[DRY-RUN] wallet.private_key = OK"));
    assert!(!report.contains("abc123"));
}
