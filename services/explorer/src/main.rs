//! Floodsar explorer.
//!
//! Local dashboard for floodsar results:
//! - Lists dataset dates found in the cache
//! - Streams cropped GeoTIFF rasters to the browser
//! - Builds scatter-plot inputs from k-means outputs and runs the
//!   plotting script on a small worker pool
//! - Pushes newly available plots to connected browsers

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tokio::sync::broadcast;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use explorer::config::ExplorerConfig;
use explorer::dispatcher::{Dispatcher, ScriptExecutor};
use explorer::requestor::PlotRequestor;
use explorer::server;
use explorer::state::AppState;

#[derive(Parser, Debug)]
#[command(name = "explorer")]
#[command(about = "Browse floodsar rasters and render cluster scatter plots")]
struct Args {
    /// Listen address
    #[arg(short, long, env = "EXPLORER_LISTEN", default_value = "0.0.0.0:45678")]
    listen: SocketAddr,

    /// Floodsar cache directory (kmeans_inputs/, kmeans_outputs/)
    #[arg(long, env = "EXPLORER_CACHE_DIR", default_value = "cache")]
    cache_dir: PathBuf,

    /// Static assets directory
    #[arg(long, env = "EXPLORER_STATIC_DIR", default_value = "static")]
    static_dir: PathBuf,

    /// Scripts directory (plotting script, inputfiles/, plots/)
    #[arg(long, env = "EXPLORER_SCRIPTS_DIR", default_value = "scripts")]
    scripts_dir: PathBuf,

    /// Plotting script (default: <scripts-dir>/plot.sh)
    #[arg(long, env = "EXPLORER_PLOT_SCRIPT")]
    plot_script: Option<PathBuf>,

    /// Directory of cropped GeoTIFF rasters
    #[arg(long, env = "EXPLORER_CROPPED_DIR", default_value = "../.floodsar-cache/cropped")]
    cropped_dir: PathBuf,

    /// Maximum concurrent plotting processes
    #[arg(long, default_value = "4")]
    workers: usize,

    /// Dispatcher polling interval in milliseconds
    #[arg(long, default_value = "100")]
    tick_ms: u64,

    /// Do not scan k-means outputs for plots at startup
    #[arg(long)]
    skip_plot_scan: bool,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Args {
    fn into_config(self) -> ExplorerConfig {
        let plot_script = self
            .plot_script
            .unwrap_or_else(|| self.scripts_dir.join("plot.sh"));

        ExplorerConfig {
            listen: self.listen,
            cache_dir: self.cache_dir,
            static_dir: self.static_dir,
            scripts_dir: self.scripts_dir,
            plot_script,
            cropped_dir: self.cropped_dir,
            workers: self.workers,
            tick: Duration::from_millis(self.tick_ms),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .json()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let skip_plot_scan = args.skip_plot_scan;
    let config = args.into_config();

    info!(
        cache = %config.cache_dir.display(),
        scripts = %config.scripts_dir.display(),
        workers = config.workers,
        "Starting floodsar explorer"
    );

    let state = Arc::new(AppState::new(config.clone()));

    if !skip_plot_scan {
        let requestor = PlotRequestor::new(&config, state.queue.clone());
        match requestor.request_all().await {
            Ok(queued) => info!(queued, "Let's wait now"),
            Err(e) => error!(error = %e, "Plot scan failed"),
        }
    }

    let dispatcher = Arc::new(
        Dispatcher::new(
            state.queue.clone(),
            Arc::new(ScriptExecutor::from_config(&config)),
            config.workers,
            config.tick,
            config.plots_dir(),
        )
        .with_notifications(state.hub.clone()),
    );

    let (shutdown_tx, _) = broadcast::channel::<()>(1);

    let dispatcher_task = tokio::spawn({
        let dispatcher = dispatcher.clone();
        let shutdown = shutdown_tx.subscribe();
        async move { dispatcher.run(shutdown).await }
    });

    // Handle Ctrl+C
    let shutdown_tx_clone = shutdown_tx.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Received shutdown signal");
        shutdown_tx_clone.send(()).ok();
    });

    server::run_server(state, config.listen, shutdown_tx.subscribe()).await?;
    dispatcher_task.await?;

    info!(
        active = dispatcher.active(),
        queued = dispatcher.queued(),
        "Explorer stopped"
    );

    Ok(())
}
