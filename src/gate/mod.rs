//! Pre-request security gate.
//!
//! Every request is classified before any handler sees it: is the caller
//! local, did it arrive over an encrypted transport, and may it see
//! diagnostic detail. Non-local plaintext requests are bounced to HTTPS
//! unless the operator explicitly allows plain HTTP.

pub mod headers;

use axum::http::{HeaderMap, Uri};
use std::net::{IpAddr, SocketAddr};

use crate::config::Config;
use crate::consts::HTTPS_PORT;

/// Header a terminating front end sets to say the client used TLS.
pub const FRONT_END_HTTPS: &str = "front-end-https";

/// Transport and trust signals pulled out of one inbound request.
#[derive(Debug, Clone)]
pub struct RequestSignals {
    pub remote_addr: IpAddr,
    /// Address the listener accepted the connection on.
    pub local_addr: SocketAddr,
    pub host: Option<String>,
    pub front_end_https: Option<String>,
    pub forwarded_proto: Option<String>,
    pub path_and_query: String,
}

impl RequestSignals {
    pub fn from_parts(
        remote: SocketAddr,
        local_addr: SocketAddr,
        uri: &Uri,
        headers: &HeaderMap,
    ) -> Self {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        Self {
            remote_addr: remote.ip(),
            local_addr,
            host: header("host"),
            front_end_https: header(FRONT_END_HTTPS),
            forwarded_proto: header("x-forwarded-proto"),
            path_and_query: uri
                .path_and_query()
                .map(|pq| pq.as_str().to_string())
                .unwrap_or_else(|| "/".to_string()),
        }
    }

    /// Loopback callers, including IPv4 addresses mapped into IPv6.
    pub fn is_local_address(&self) -> bool {
        self.remote_addr.to_canonical().is_loopback()
    }

    /// `localhost` or any `*.localhost` name in the Host header.
    pub fn is_local_host(&self) -> bool {
        match self.host.as_deref() {
            Some(host) => {
                let name = host_name(host).to_ascii_lowercase();
                let name = name.trim_end_matches('.');
                name == "localhost" || name.ends_with(".localhost")
            }
            None => false,
        }
    }

    /// Whether the client-facing hop was encrypted.
    ///
    /// `Front-End-Https` and `X-Forwarded-Proto` are taken at face value
    /// from any peer. Deployments must sit behind a reverse proxy that
    /// strips or overwrites both headers; otherwise a client can claim https
    /// and skip its own redirect.
    pub fn is_secure(&self) -> bool {
        let direct = self
            .front_end_https
            .as_deref()
            .map(|v| !v.trim().is_empty() && !v.trim().eq_ignore_ascii_case("off"))
            .unwrap_or(false);

        // Proxies may append; the first entry is the client-facing hop.
        let forwarded = self
            .forwarded_proto
            .as_deref()
            .and_then(|v| v.split(',').next())
            .map(|v| v.trim().eq_ignore_ascii_case("https"))
            .unwrap_or(false);

        direct || self.local_addr.port() == HTTPS_PORT || forwarded
    }

    /// Same host and path under the https scheme.
    pub fn https_url(&self) -> String {
        let host = match self.host.as_deref() {
            Some(host) if !host.is_empty() => host.to_string(),
            _ => match self.local_addr.ip() {
                IpAddr::V4(ip) => ip.to_string(),
                IpAddr::V6(ip) => format!("[{ip}]"),
            },
        };
        format!("https://{}{}", host, self.path_and_query)
    }
}

/// Strip an optional port from a Host header value.
fn host_name(host: &str) -> &str {
    if let Some(rest) = host.strip_prefix('[') {
        return rest.split(']').next().unwrap_or(rest);
    }
    match host.rsplit_once(':') {
        Some((name, port)) if port.chars().all(|c| c.is_ascii_digit()) => name,
        _ => host,
    }
}

/// Whether the request goes on to the handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Allow,
    /// Permanent redirect to this URL. No further processing.
    Redirect(String),
}

/// The gate's ruling on one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateDecision {
    pub verdict: Verdict,
    /// Drives the HSTS header.
    pub secure: bool,
    /// Whether error responses may carry diagnostic detail.
    pub debug_visible: bool,
}

/// Classifies requests against the operator's transport policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct SecurityGate {
    debug: bool,
    allow_http: bool,
}

impl SecurityGate {
    pub fn new(config: &Config) -> Self {
        Self {
            debug: config.debug,
            allow_http: config.allow_http,
        }
    }

    pub fn evaluate(&self, signals: &RequestSignals) -> GateDecision {
        let secure = signals.is_secure();
        let local_addr = signals.is_local_address();
        let local = local_addr || signals.is_local_host();

        let verdict = if !secure && !local && !self.allow_http {
            Verdict::Redirect(signals.https_url())
        } else {
            Verdict::Allow
        };

        GateDecision {
            verdict,
            secure,
            // A localhost Host header is caller-controlled, so only the
            // socket address grants debug detail.
            debug_visible: self.debug || local_addr,
        }
    }
}
