//! Shared application state.

use std::sync::Arc;

use crate::config::ExplorerConfig;
use crate::notify::NotificationHub;
use crate::queue::PlotQueue;

pub struct AppState {
    pub config: ExplorerConfig,
    pub queue: Arc<PlotQueue>,
    pub hub: NotificationHub,
}

impl AppState {
    pub fn new(config: ExplorerConfig) -> Self {
        Self {
            config,
            queue: Arc::new(PlotQueue::new()),
            hub: NotificationHub::new(),
        }
    }
}
