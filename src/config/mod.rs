//! Process-wide settings, read once at startup.
//!
//! Nothing here is re-read during a request. Build a [`Config`] in `main`,
//! wrap it in an `Arc`, and hand it to the router.

use anyhow::{Context, Result, bail};
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_PYTHON_BIN: &str = "PYTHON_BIN";
pub const ENV_DEBUG: &str = "PW_CHECKER_DEBUG";
pub const ENV_ALLOW_HTTP: &str = "PW_CHECKER_ALLOW_HTTP";
pub const ENV_TIMEOUT_SECS: &str = "PW_CHECKER_TIMEOUT_SECS";

/// Operator configuration shared by every request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// Explicit interpreter. When set, no discovery happens.
    pub python_bin: Option<PathBuf>,
    /// Return diagnostic detail to every caller, not just local ones.
    pub debug: bool,
    /// Serve non-local callers over plain HTTP instead of redirecting.
    pub allow_http: bool,
    /// Upper bound on a single engine run. `None` waits forever.
    pub engine_timeout: Option<Duration>,
}

impl Config {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`. Tests pass a closure over a map.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let python_bin = lookup(ENV_PYTHON_BIN)
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        // Only the exact value "1" turns a switch on.
        let debug = lookup(ENV_DEBUG).as_deref() == Some("1");
        let allow_http = lookup(ENV_ALLOW_HTTP).as_deref() == Some("1");

        let engine_timeout = match lookup(ENV_TIMEOUT_SECS) {
            Some(raw) if !raw.trim().is_empty() => Some(parse_timeout(&raw)?),
            _ => None,
        };

        Ok(Self {
            python_bin,
            debug,
            allow_http,
            engine_timeout,
        })
    }
}

fn parse_timeout(raw: &str) -> Result<Duration> {
    let secs: u64 = raw
        .trim()
        .parse()
        .with_context(|| format!("{ENV_TIMEOUT_SECS} must be a whole number of seconds"))?;
    if secs == 0 {
        bail!("{ENV_TIMEOUT_SECS} must be greater than zero");
    }
    Ok(Duration::from_secs(secs))
}
