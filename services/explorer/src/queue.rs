//! In-memory FIFO of requested plots.
//!
//! The queue is unbounded and lives only as long as the process.

use std::collections::VecDeque;
use std::sync::Mutex;

use explorer_common::PlotJob;

#[derive(Debug, Default)]
pub struct PlotQueue {
    jobs: Mutex<VecDeque<PlotJob>>,
}

impl PlotQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, job: PlotJob) {
        self.lock().push_back(job);
    }

    pub fn pop(&self) -> Option<PlotJob> {
        self.lock().pop_front()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Copy of the pending jobs in dispatch order.
    pub fn snapshot(&self) -> Vec<PlotJob> {
        self.lock().iter().cloned().collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<PlotJob>> {
        // A poisoned queue still holds valid jobs.
        self.jobs.lock().unwrap_or_else(|e| e.into_inner())
    }
}
