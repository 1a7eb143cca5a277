//! pdr-backend adapter.
//!
//! Bridges the bot to the external pdr-backend. This is the only module
//! that knows about it: nothing else may reference the Python package, so
//! the rest of the crate works on machines where it is not installed.
//!
//! pdr-backend is a Python package, so the dependency is acquired at
//! construction by asking a Python interpreter to import it
//! (`<python> -c "import pdr_backend ..."`). The interpreter is `python3` on
//! PATH unless `PDR_BACKEND_PYTHON` names another one. A launch failure, a
//! failed import, or an interpreter that does not finish within
//! [`IMPORT_CHECK_TIMEOUT`] is reported as [`BackendError::NotAvailable`];
//! the underlying I/O error is flattened into the message and never escapes
//! this module. A hung interpreter is killed.
//!
//! The operations are placeholders until real delegation lands. They return
//! `price = 0.0` and `tx_hash = "TODO"` and log a warning on every call.

use std::ffi::{OsStr, OsString};
use std::io::Read;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use super::{Backend, BackendError, MarketState, TxReceipt};

const BACKEND_NAME: &str = "pdr-backend";

/// Interpreter used when no override is given.
pub const DEFAULT_PYTHON: &str = "python3";

/// Env var naming the interpreter that has pdr-backend installed.
pub const PYTHON_ENV: &str = "PDR_BACKEND_PYTHON";

/// Upper bound on the import check. Importing pdr-backend pulls in its
/// scientific stack, which is slow on a cold start.
pub const IMPORT_CHECK_TIMEOUT: Duration = Duration::from_secs(30);

const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Imports the package and prints its installed version, or `unknown`.
const IMPORT_CHECK: &str = "import pdr_backend\n\
try:\n    \
    from importlib.metadata import version\n    \
    print(version('pdr-backend'))\n\
except Exception:\n    \
    print('unknown')\n";

const REMEDIATION: &str = "Install pdr-backend (pip install pdr-backend) into `python3` \
     or point PDR_BACKEND_PYTHON at an interpreter that has it, or run with --backend mock.";

pub const PLACEHOLDER_PRICE: f64 = 0.0;
pub const PLACEHOLDER_TX_HASH: &str = "TODO";

/// Handle on an interpreter that imported pdr-backend.
#[derive(Debug, Clone)]
struct PdrBackend {
    python: OsString,
    version: String,
}

/// Adapter from the `Backend` contract to pdr-backend.
///
/// Stub: operations return placeholder values.
#[derive(Debug, Clone)]
pub struct PdrBackendAdapter {
    rpc_url: String,
    chain_id: i64,
    pdr: PdrBackend,
}

impl PdrBackendAdapter {
    /// Check the interpreter named by `PDR_BACKEND_PYTHON`, or `python3` on
    /// PATH.
    pub fn new(rpc_url: &str, chain_id: i64) -> Result<Self, BackendError> {
        let python = std::env::var_os(PYTHON_ENV)
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| OsString::from(DEFAULT_PYTHON));
        Self::with_python(rpc_url, chain_id, python)
    }

    /// Check an explicit interpreter path.
    pub fn with_python(
        rpc_url: &str,
        chain_id: i64,
        python: impl AsRef<OsStr>,
    ) -> Result<Self, BackendError> {
        let pdr = import_pdr_backend(python.as_ref())?;
        info!(
            rpc_url,
            chain_id,
            python = %pdr.python.to_string_lossy(),
            version = %pdr.version,
            "pdr-backend available"
        );
        Ok(Self {
            rpc_url: rpc_url.to_string(),
            chain_id,
            pdr,
        })
    }

    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    pub fn chain_id(&self) -> i64 {
        self.chain_id
    }

    /// Installed pdr-backend version, or `unknown` if the package carries no
    /// distribution metadata.
    pub fn backend_version(&self) -> &str {
        &self.pdr.version
    }
}

fn import_pdr_backend(python: &OsStr) -> Result<PdrBackend, BackendError> {
    let stdout = run_checked(python, &["-c", IMPORT_CHECK], IMPORT_CHECK_TIMEOUT).map_err(
        |reason| not_available(format!("pdr_backend could not be imported: {reason}")),
    )?;

    let version = match stdout.trim() {
        "" => "unknown".to_string(),
        v => v.to_string(),
    };
    Ok(PdrBackend {
        python: python.to_os_string(),
        version,
    })
}

/// Run `program args...` to completion and return its stdout.
///
/// The child gets no stdin and its stderr is discarded. Output is expected
/// to be a single short line. Past `timeout` the child is killed and
/// reaped.
fn run_checked(program: &OsStr, args: &[&str], timeout: Duration) -> Result<String, String> {
    let display = program.to_string_lossy();
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| format!("failed to launch `{display}`: {e}"))?;

    let deadline = Instant::now() + timeout;
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) if Instant::now() >= deadline => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(format!("`{display}` did not finish within {timeout:?}"));
            }
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(e) => {
                let _ = child.kill();
                return Err(format!("failed to wait for `{display}`: {e}"));
            }
        }
    };

    if !status.success() {
        return Err(format!("`{display}` exited with {status}"));
    }

    let mut stdout = String::new();
    if let Some(mut pipe) = child.stdout.take() {
        if let Err(e) = pipe.read_to_string(&mut stdout) {
            debug!(error = %e, "Discarding unreadable output");
        }
    }
    Ok(stdout)
}

fn not_available(reason: String) -> BackendError {
    BackendError::NotAvailable {
        backend: BACKEND_NAME,
        reason,
        remediation: REMEDIATION,
    }
}

// TODO: delegate both operations to pdr-backend, mapping its results into
// MarketState/TxReceipt and its failures into BackendError::Request.
impl Backend for PdrBackendAdapter {
    fn get_market_state(&self, market_id: &str) -> Result<MarketState, BackendError> {
        warn!(market_id, "pdr-backend adapter is a stub; returning placeholder price");
        Ok(MarketState {
            market_id: market_id.to_string(),
            price: PLACEHOLDER_PRICE,
        })
    }

    fn submit_prediction(
        &self,
        market_id: &str,
        prediction: f64,
        stake: f64,
    ) -> Result<TxReceipt, BackendError> {
        warn!(
            market_id,
            prediction, stake, "pdr-backend adapter is a stub; nothing was submitted"
        );
        Ok(TxReceipt {
            tx_hash: PLACEHOLDER_TX_HASH.to_string(),
        })
    }

    fn name(&self) -> &str {
        BACKEND_NAME
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
