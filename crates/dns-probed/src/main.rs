// # dns-resolve-exporter
//
// This daemon is a THIN integration layer: all probing logic lives in
// dns-probe-core.
//
// The daemon is responsible for:
// 1. Reading configuration from flags and environment variables
// 2. Initializing logging and the runtime
// 3. Launching one probe loop per target
// 4. Serving /metrics, /healthz and /readyz
// 5. Shutting down on SIGINT/SIGTERM
//
// ## Configuration
//
// - `-s, --server` / `DNS_RESOLVE_EXPORTER_DNSServer`: resolver, host or host:port
// - `-i, --interval` / `DNS_RESOLVE_EXPORTER_PROBE_INTERVAL`: probe interval (5s)
// - `--timeout` / `DNS_RESOLVE_EXPORTER_PROBE_TIMEOUT`: probe timeout (5s)
// - `--shutdown-grace-period` / `DNS_RESOLVE_EXPORTER_SHUTDOWN_GRACE_PERIOD`: (1s)
// - `--log-level` / `DNS_RESOLVE_EXPORTER_LOG_LEVEL`: (info)
// - `--log-format` / `DNS_RESOLVE_EXPORTER_LOG_FORMAT`: json or text (json)
// - `--listen` / `DNS_RESOLVE_EXPORTER_LISTEN`: (0.0.0.0:8080)
//
// ## Example
//
// ```bash
// dns-resolve-exporter --server 1.1.1.1 --interval 10s --timeout 2s \
//     example.com www.example.com
// ```

mod cli;
mod http;
mod logging;

use anyhow::Result;
use clap::Parser;
use dns_probe_core::{ProbeConfig, Prober};
use prometheus::Registry;
use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::cli::Cli;
use crate::http::AppState;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProbeExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<ProbeExitCode> for ExitCode {
    fn from(code: ProbeExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match cli.probe_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ProbeExitCode::ConfigError.into();
        }
    };

    let level = match cli.level() {
        Ok(level) => level,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ProbeExitCode::ConfigError.into();
        }
    };

    if let Err(e) = logging::init_logging(level, cli.log_format) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return ProbeExitCode::ConfigError.into();
    }

    info!(
        version = env!("CARGO_PKG_VERSION"),
        targets = config.targets.len(),
        "build info"
    );

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!(error = %e, "failed to create tokio runtime");
            return ProbeExitCode::RuntimeError.into();
        }
    };

    let registry = Registry::new();
    let prober = match Prober::from_config(&config, Some(&registry)) {
        Ok(prober) => Arc::new(prober),
        Err(e) => {
            error!(error = %e, "failed to create prober");
            return ProbeExitCode::ConfigError.into();
        }
    };

    let result = rt.block_on(async {
        let listener = match bind_listener(cli.listen).await {
            Ok(listener) => listener,
            Err(code) => return code,
        };

        if let Err(e) = run_daemon(&cli, listener, config, prober, registry).await {
            error!(error = %e, "failed to execute");
            ProbeExitCode::RuntimeError
        } else {
            ProbeExitCode::CleanShutdown
        }
    });

    result.into()
}

/// Bind the metrics listener, a failure being a startup error
async fn bind_listener(addr: SocketAddr) -> std::result::Result<TcpListener, ProbeExitCode> {
    TcpListener::bind(addr).await.map_err(|e| {
        error!(listen = %addr, error = %e, "failed to bind listener");
        ProbeExitCode::ConfigError
    })
}

/// Run the probe loops and the HTTP server until a shutdown signal
async fn run_daemon(
    cli: &Cli,
    listener: TcpListener,
    config: ProbeConfig,
    prober: Arc<Prober>,
    registry: Registry,
) -> Result<()> {
    let shutdown = CancellationToken::new();

    info!(
        server = prober.server(),
        interval = ?config.interval,
        timeout = ?config.timeout,
        "starting probes"
    );
    let mut loops = Arc::clone(&prober).spawn_all(shutdown.clone(), config.targets);

    info!(listen = %cli.listen, "serving metrics");

    let app = http::router(AppState {
        registry,
        shutdown: shutdown.clone(),
    });

    let signals = tokio::spawn(watch_signals(shutdown.clone()));
    let server = axum::serve(listener, app)
        .with_graceful_shutdown(http_shutdown(shutdown.clone(), cli.shutdown_grace_period));

    // The server only returns on its own if it failed
    let served = server.await;
    shutdown.cancel();
    signals.abort();

    while let Some(joined) = loops.join_next().await {
        if let Err(e) = joined {
            error!(error = %e, "probe loop panicked");
        }
    }

    served?;
    info!("shutdown complete");
    Ok(())
}

/// Cancel `shutdown` on the first SIGINT/SIGTERM
async fn watch_signals(shutdown: CancellationToken) {
    match wait_for_signal().await {
        Ok(signal) => info!(signal, "shutdown signal received"),
        Err(e) => error!(error = %e, "signal handler failed"),
    }
    shutdown.cancel();
}

/// Resolves once the grace period after cancellation has elapsed
///
/// Readiness reports 503 during the grace period so load balancers can
/// drain before the listener closes.
async fn http_shutdown(shutdown: CancellationToken, grace_period: Duration) {
    shutdown.cancelled().await;
    tokio::time::sleep(grace_period).await;
    info!("http server shutting down");
}

/// Wait for shutdown signals (SIGTERM, SIGINT)
///
/// # Returns
///
/// Returns the name of the signal received.
#[cfg(unix)]
async fn wait_for_signal() -> Result<&'static str> {
    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGINT handler: {}", e))?;

    let signal = tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    };

    Ok(signal)
}

/// Wait for shutdown signals (SIGINT only)
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
async fn wait_for_signal() -> Result<&'static str> {
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to wait for CTRL-C: {}", e))?;
    Ok("SIGINT")
}
