use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;

use breachcheck::banner::{BannerInfo, print_banner};
use breachcheck::config::Config;
use breachcheck::consts::{DEFAULT_BIND, DEFAULT_SCRIPT};
use breachcheck::server::{self, AppState};

#[derive(Parser)]
#[command(
    name = "breachcheck",
    version,
    about = "Check passwords against a breach engine over HTTPS."
)]
struct Cli {
    /// Address to listen on
    #[arg(short, long, env = "PW_CHECKER_BIND", default_value = DEFAULT_BIND)]
    bind: String,

    /// Engine script passed to the interpreter (relative to the working directory)
    #[arg(short, long, env = "PW_CHECKER_SCRIPT", default_value = DEFAULT_SCRIPT)]
    script: PathBuf,

    /// Kill the engine after this many seconds (overrides PW_CHECKER_TIMEOUT_SECS)
    #[arg(short, long)]
    timeout: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("breachcheck=info")),
        )
        .with_target(true)
        .init();

    let cli = Cli::parse();

    let mut config = Config::from_env()?;
    if let Some(secs) = cli.timeout {
        if secs == 0 {
            anyhow::bail!("--timeout must be greater than zero");
        }
        config.engine_timeout = Some(Duration::from_secs(secs));
    }

    let script = if cli.script.is_absolute() {
        cli.script
    } else {
        std::env::current_dir()
            .context("cannot determine working directory")?
            .join(cli.script)
    };
    if !script.is_file() {
        tracing::warn!(op = "server.init", script = %script.display(), "engine script not found");
    }

    let listener = TcpListener::bind(&cli.bind)
        .await
        .with_context(|| format!("failed to bind {}", cli.bind))?;
    let local_addr = listener.local_addr()?;

    let state = Arc::new(AppState::new(&config, script.clone(), local_addr));
    let candidates = state.resolver.candidates();
    let platform = state.resolver.platform().to_string();

    print_banner(&BannerInfo {
        listen: local_addr,
        script: &script,
        python_bin: config.python_bin.as_deref(),
        platform: &platform,
        candidates: &candidates,
        debug: config.debug,
        allow_http: config.allow_http,
        timeout: config.engine_timeout,
    });

    tracing::info!(
        op = "server.start",
        listen = %local_addr,
        candidates = candidates.len(),
        debug = config.debug,
        allow_http = config.allow_http,
        "listening"
    );

    server::serve(listener, state).await
}
