use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;

/// Point-in-time copy of the scheduler's counters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessingStats {
    pub total_cycles: u64,
    pub completed_tasks: u64,
    pub failed_tasks: u64,
    /// Handler time of finished tasks, successful or not.
    pub total_processing_time: Duration,
    pub start_time: DateTime<Utc>,
}

impl ProcessingStats {
    pub fn finished_tasks(&self) -> u64 {
        self.completed_tasks + self.failed_tasks
    }

    pub fn average_task_time(&self) -> Option<Duration> {
        let finished = u32::try_from(self.finished_tasks()).ok()?;
        (finished > 0).then(|| self.total_processing_time / finished)
    }
}

#[derive(Debug)]
pub(crate) struct StatsCollector {
    total_cycles: AtomicU64,
    completed_tasks: AtomicU64,
    failed_tasks: AtomicU64,
    processing_nanos: AtomicU64,
    start_time: Mutex<DateTime<Utc>>,
}

impl StatsCollector {
    pub fn new() -> Self {
        Self {
            total_cycles: AtomicU64::new(0),
            completed_tasks: AtomicU64::new(0),
            failed_tasks: AtomicU64::new(0),
            processing_nanos: AtomicU64::new(0),
            start_time: Mutex::new(Utc::now()),
        }
    }

    pub fn record_cycle(&self) {
        self.total_cycles.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_task(&self, success: bool, elapsed: Duration) {
        let counter = if success {
            &self.completed_tasks
        } else {
            &self.failed_tasks
        };
        counter.fetch_add(1, Ordering::Relaxed);
        let nanos = u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX);
        self.processing_nanos.fetch_add(nanos, Ordering::Relaxed);
    }

    pub fn mark_started(&self) {
        *self.start_time.lock() = Utc::now();
    }

    pub fn reset(&self) {
        self.total_cycles.store(0, Ordering::Relaxed);
        self.completed_tasks.store(0, Ordering::Relaxed);
        self.failed_tasks.store(0, Ordering::Relaxed);
        self.processing_nanos.store(0, Ordering::Relaxed);
        self.mark_started();
    }

    pub fn snapshot(&self) -> ProcessingStats {
        let nanos = self.processing_nanos.load(Ordering::Relaxed);
        ProcessingStats {
            total_cycles: self.total_cycles.load(Ordering::Relaxed),
            completed_tasks: self.completed_tasks.load(Ordering::Relaxed),
            failed_tasks: self.failed_tasks.load(Ordering::Relaxed),
            total_processing_time: Duration::from_nanos(nanos),
            start_time: *self.start_time.lock(),
        }
    }
}
