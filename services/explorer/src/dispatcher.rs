//! Worker pool dispatcher for plot jobs.
//!
//! A fixed-interval loop takes jobs off the shared [`PlotQueue`] and hands
//! them to a [`CommandExecutor`]. At most `workers` executions run at the
//! same time; a job stays queued until a slot frees up. Failures are
//! logged and never retried.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use explorer_common::{ExplorerError, ExplorerResult, ImageAvailable, PlotJob};
use tokio::sync::{broadcast, Semaphore};
use tracing::{debug, error, info, warn};

use crate::config::ExplorerConfig;
use crate::notify::NotificationHub;
use crate::queue::PlotQueue;

/// Captured result of one plotting run.
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    pub success: bool,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

/// Runs the external plotting step for a job.
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    async fn run(&self, job: &PlotJob) -> ExplorerResult<CommandOutput>;
}

/// Executes the plotting script as `<script> <dateid> <numClasses>`.
#[derive(Debug, Clone)]
pub struct ScriptExecutor {
    script: PathBuf,
    working_dir: PathBuf,
}

impl ScriptExecutor {
    /// Relative paths are resolved against the current directory now, since
    /// the child is started inside `working_dir`.
    pub fn new(script: impl Into<PathBuf>, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            script: absolutize(script.into()),
            working_dir: absolutize(working_dir.into()),
        }
    }

    pub fn script(&self) -> &Path {
        &self.script
    }

    pub fn from_config(config: &ExplorerConfig) -> Self {
        Self::new(&config.plot_script, &config.scripts_dir)
    }
}

#[async_trait]
impl CommandExecutor for ScriptExecutor {
    async fn run(&self, job: &PlotJob) -> ExplorerResult<CommandOutput> {
        let output = tokio::process::Command::new(&self.script)
            .args(job.script_args())
            .current_dir(&self.working_dir)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| ExplorerError::io(&self.script, e))?;

        Ok(CommandOutput {
            success: output.status.success(),
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

fn absolutize(path: PathBuf) -> PathBuf {
    std::path::absolute(&path).unwrap_or(path)
}

pub struct Dispatcher {
    queue: Arc<PlotQueue>,
    executor: Arc<dyn CommandExecutor>,
    slots: Arc<Semaphore>,
    workers: usize,
    tick: Duration,
    plots_dir: PathBuf,
    hub: Option<NotificationHub>,
}

impl Dispatcher {
    pub fn new(
        queue: Arc<PlotQueue>,
        executor: Arc<dyn CommandExecutor>,
        workers: usize,
        tick: Duration,
        plots_dir: PathBuf,
    ) -> Self {
        let workers = workers.max(1);
        Self {
            queue,
            executor,
            slots: Arc::new(Semaphore::new(workers)),
            workers,
            tick,
            plots_dir,
            hub: None,
        }
    }

    /// Announce finished plots on `hub`.
    pub fn with_notifications(mut self, hub: NotificationHub) -> Self {
        self.hub = Some(hub);
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Number of executions currently in flight.
    pub fn active(&self) -> usize {
        self.workers - self.slots.available_permits()
    }

    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Dispatch at most one job. Returns whether a job was started.
    ///
    /// Must be called from within a tokio runtime.
    pub fn tick(&self) -> bool {
        if self.queue.is_empty() {
            return false;
        }

        let permit = match self.slots.clone().try_acquire_owned() {
            Ok(permit) => permit,
            Err(_) => {
                debug!(queued = self.queue.len(), "All plot workers busy");
                return false;
            }
        };

        let Some(job) = self.queue.pop() else {
            return false;
        };

        info!(
            dateid = %job.dateid,
            classes = job.num_classes,
            free_workers = self.slots.available_permits(),
            "Plotting"
        );

        let executor = self.executor.clone();
        let plots_dir = self.plots_dir.clone();
        let hub = self.hub.clone();

        tokio::spawn(async move {
            let _permit = permit;
            let result = executor.run(&job).await;
            finish_job(&job, result, &plots_dir, hub.as_ref()).await;
        });

        true
    }

    /// Poll the queue every tick until shutdown is signalled.
    pub async fn run(&self, mut shutdown: broadcast::Receiver<()>) {
        let mut interval = tokio::time::interval(self.tick);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        info!(
            workers = self.workers,
            tick_ms = self.tick.as_millis() as u64,
            "Plot dispatcher started"
        );

        loop {
            tokio::select! {
                _ = shutdown.recv() => {
                    info!(active = self.active(), queued = self.queued(), "Shutting down plot dispatcher");
                    break;
                }
                _ = interval.tick() => {
                    self.tick();
                }
            }
        }
    }
}

async fn finish_job(
    job: &PlotJob,
    result: ExplorerResult<CommandOutput>,
    plots_dir: &Path,
    hub: Option<&NotificationHub>,
) {
    let output = match result {
        Ok(output) => output,
        Err(e) => {
            error!(dateid = %job.dateid, classes = job.num_classes, error = %e, "Plot command could not run");
            return;
        }
    };

    if !output.stdout.is_empty() {
        debug!(dateid = %job.dateid, stdout = %output.stdout, "Plot command output");
    }

    if !output.success {
        let e = ExplorerError::CommandFailed(format!(
            "exit code {:?}: {}",
            output.exit_code,
            output.stderr.trim()
        ));
        error!(dateid = %job.dateid, classes = job.num_classes, error = %e, "Plot failed");
        return;
    }

    info!(dateid = %job.dateid, classes = job.num_classes, "Plot finished");

    let Some(hub) = hub else {
        return;
    };

    let image = job.image_name();
    if tokio::fs::try_exists(plots_dir.join(image.file_name()))
        .await
        .unwrap_or(false)
    {
        hub.publish(ImageAvailable::for_image(&image));
    } else {
        warn!(image = %image, "Plot finished but image is missing");
    }
}
