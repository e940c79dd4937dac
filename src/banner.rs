//! Startup banner.

use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use crate::resolver::Candidate;

/// Startup settings shown to the operator.
pub struct BannerInfo<'a> {
    pub listen: SocketAddr,
    pub script: &'a Path,
    /// `Some` when PYTHON_BIN pins the interpreter.
    pub python_bin: Option<&'a Path>,
    pub platform: &'a str,
    pub candidates: &'a [Candidate],
    pub debug: bool,
    pub allow_http: bool,
    pub timeout: Option<Duration>,
}

pub fn render_banner(info: &BannerInfo) -> String {
    let interpreter = match info.python_bin {
        Some(bin) => format!("{} (PYTHON_BIN)", bin.display()),
        None => format!("auto, {} host", info.platform),
    };
    let candidates = info
        .candidates
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(" -> ");
    let transport = if info.allow_http {
        "plain http allowed"
    } else {
        "https enforced for remote callers"
    };
    let debug = if info.debug {
        "on for every caller"
    } else {
        "local callers only"
    };
    let timeout = match info.timeout {
        Some(t) => format!("{}s", t.as_secs()),
        None => "none".to_string(),
    };

    format!(
        r#"
   breachcheck {}

   listen       http://{}
   engine       {}
   interpreter  {}
   candidates   {}
   transport    {}
   debug        {}
   timeout      {}
"#,
        env!("CARGO_PKG_VERSION"),
        info.listen,
        info.script.display(),
        interpreter,
        candidates,
        transport,
        debug,
        timeout,
    )
}

pub fn print_banner(info: &BannerInfo) {
    println!("{}", render_banner(info));
}
