//! Runtime configuration for the explorer service.
//!
//! All filesystem locations are resolved once at startup and passed
//! around as an `ExplorerConfig` value.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default HTTP port of the dashboard.
pub const DEFAULT_PORT: u16 = 45678;

/// Default number of plotting processes allowed to run at once.
pub const DEFAULT_WORKERS: usize = 4;

/// Default dispatcher tick.
pub const DEFAULT_TICK: Duration = Duration::from_millis(100);

#[derive(Debug, Clone)]
pub struct ExplorerConfig {
    /// Address the HTTP server binds to
    pub listen: SocketAddr,
    /// Shared floodsar cache (`kmeans_inputs/`, `kmeans_outputs/`)
    pub cache_dir: PathBuf,
    /// Static assets served before the cache directory
    pub static_dir: PathBuf,
    /// Directory holding the plotting script, its inputs and its plots
    pub scripts_dir: PathBuf,
    /// Plotting script invoked as `<script> <dateid> <numClasses>`
    pub plot_script: PathBuf,
    /// Cropped GeoTIFF rasters served by `/file/:filename`
    pub cropped_dir: PathBuf,
    /// Maximum concurrent plotting processes
    pub workers: usize,
    /// Dispatcher polling interval
    pub tick: Duration,
}

impl ExplorerConfig {
    pub fn kmeans_inputs_dir(&self) -> PathBuf {
        self.cache_dir.join("kmeans_inputs")
    }

    pub fn kmeans_outputs_dir(&self) -> PathBuf {
        self.cache_dir.join("kmeans_outputs")
    }

    /// Where generated CSV files are written for the plotting script.
    pub fn input_files_dir(&self) -> PathBuf {
        self.scripts_dir.join("inputfiles")
    }

    pub fn plots_dir(&self) -> PathBuf {
        self.scripts_dir.join("plots")
    }

    /// Config rooted at `root`, using the default layout below it.
    pub fn rooted_at(root: &Path) -> Self {
        let scripts_dir = root.join("scripts");
        Self {
            listen: SocketAddr::from(([127, 0, 0, 1], DEFAULT_PORT)),
            cache_dir: root.join("cache"),
            static_dir: root.join("static"),
            plot_script: scripts_dir.join("plot.sh"),
            scripts_dir,
            cropped_dir: root.join("cropped"),
            workers: DEFAULT_WORKERS,
            tick: DEFAULT_TICK,
        }
    }
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            cache_dir: PathBuf::from("cache"),
            static_dir: PathBuf::from("static"),
            scripts_dir: PathBuf::from("scripts"),
            plot_script: PathBuf::from("scripts/plot.sh"),
            cropped_dir: PathBuf::from("../.floodsar-cache/cropped"),
            workers: DEFAULT_WORKERS,
            tick: DEFAULT_TICK,
        }
    }
}
