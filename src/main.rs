use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use ping_sweep_rs::client::{HttpTransport, SweepController, SweepOutcome};
use ping_sweep_rs::netdetect;
use ping_sweep_rs::server::{self, AppState};
use ping_sweep_rs::sweep::{SweepConfig, SweepEngine};
use ping_sweep_rs::types::SweepResponse;
use ping_sweep_rs::view::TerminalView;

/// ping-sweep-rs — find which hosts of a subnet answer ping.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "ping-sweep-rs",
    version,
    about = "Find which hosts of a subnet answer ping, over a small JSON API.",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Run the sweep service (`POST /api/ping`) and serve the static UI.
    Serve {
        /// Address to listen on.
        #[arg(long, default_value = "0.0.0.0:5000")]
        bind: String,

        /// Directory with static UI files served for non-API paths.
        #[arg(long = "ui-dir", default_value = "ui")]
        ui_dir: PathBuf,

        /// Refuse subnets with more hosts than this.
        #[arg(long = "max-hosts", default_value_t = 1024)]
        max_hosts: u128,

        /// Max concurrent pings per sweep.
        #[arg(long, default_value_t = 64)]
        concurrency: usize,

        /// Per-host ping timeout in milliseconds.
        #[arg(long = "timeout-ms", default_value_t = 1000)]
        timeout_ms: u64,
    },

    /// Ask a running sweep service to sweep a subnet and print the result.
    Sweep {
        /// Base URL of the sweep service.
        #[arg(long, default_value = "http://127.0.0.1:5000")]
        server: String,

        /// Any address inside the subnet. Defaults to the first local IPv4 address.
        #[arg(long)]
        ip: Option<String>,

        /// Subnet prefix length, e.g. 24.
        #[arg(long, default_value = "24")]
        subnet: String,

        /// Write the sweep result as pretty JSON to this path (optional).
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Serve {
            bind,
            ui_dir,
            max_hosts,
            concurrency,
            timeout_ms,
        } => {
            println!("ping-sweep-rs service configuration:");
            println!("  bind         : {bind}");
            println!("  ui_dir       : {}", ui_dir.display());
            println!("  max_hosts    : {max_hosts}");
            println!("  concurrency  : {concurrency}");
            println!("  timeout_ms   : {timeout_ms}");

            let config = SweepConfig {
                max_hosts,
                concurrency,
                timeout: Duration::from_millis(timeout_ms),
            };
            serve(&bind, ui_dir, config).await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Sweep {
            server,
            ip,
            subnet,
            output,
        } => {
            let ip = ip.unwrap_or_else(default_ip);
            let view = TerminalView::new(ip, subnet);
            let mut controller = SweepController::new(view, HttpTransport::new(&server));

            match controller.trigger().await {
                SweepOutcome::Completed(resp) => {
                    if let Some(path) = output.as_deref() {
                        write_results_json(path, &resp)?;
                        println!("Wrote JSON results to {}", path.display());
                    }
                    Ok(ExitCode::SUCCESS)
                }
                _ => Ok(ExitCode::FAILURE),
            }
        }
    }
}

async fn serve(bind: &str, ui_dir: PathBuf, config: SweepConfig) -> Result<()> {
    let shutdown = CancellationToken::new();
    let state = AppState::new(SweepEngine::with_ping(config), shutdown.clone());

    tokio::spawn(server::cancel_on_signal(tokio::signal::ctrl_c(), shutdown));

    println!("Sweep service at http://{bind} (Ctrl+C to stop)");
    server::spawn_server(bind, ui_dir, state).await
}

/// First local IPv4 address, or empty (which the client rejects) when none is found.
fn default_ip() -> String {
    match netdetect::detect_local_ipv4s() {
        Ok(ips) => ips.first().map(|ip| ip.to_string()).unwrap_or_default(),
        Err(e) => {
            tracing::warn!(error = %e, "failed to detect local addresses");
            String::new()
        }
    }
}

fn write_results_json(path: &std::path::Path, results: &SweepResponse) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    serde_json::to_writer_pretty(file, results)?;
    Ok(())
}
