//! Orchestrator counters.
//!
//! Tracks events processed, task outcomes, the automation rate and a running
//! mean of per-event processing time. Counters live only in memory; callers
//! persist a [`MetricsSnapshot`] if they want one.

use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::domain::models::MetricsSnapshot;

/// Completed tasks as a percentage of created tasks; 0 when nothing was created.
#[allow(clippy::cast_precision_loss)]
pub fn automation_rate(created: u64, completed: u64) -> f64 {
    if created == 0 {
        return 0.0;
    }
    completed as f64 / created as f64 * 100.0
}

/// Running counters for the orchestrator.
#[derive(Debug, Clone)]
pub struct MetricsTracker {
    events_processed: u64,
    tasks_created: u64,
    tasks_completed: u64,
    tasks_failed: u64,
    automation_rate: f64,
    average_response_time_secs: f64,
    started_at: DateTime<Utc>,
}

impl Default for MetricsTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsTracker {
    /// Tracker with zeroed counters, started now.
    pub fn new() -> Self {
        Self {
            events_processed: 0,
            tasks_created: 0,
            tasks_completed: 0,
            tasks_failed: 0,
            automation_rate: 0.0,
            average_response_time_secs: 0.0,
            started_at: Utc::now(),
        }
    }

    /// Count one handled event and fold its processing time into the mean.
    #[allow(clippy::cast_precision_loss)]
    pub fn record_event_processed(&mut self, elapsed: Duration) {
        self.events_processed += 1;
        let n = self.events_processed as f64;
        let latest = elapsed.as_secs_f64();
        self.average_response_time_secs =
            (self.average_response_time_secs * (n - 1.0) + latest) / n;
    }

    /// Count a task handed to an executor.
    pub fn record_task_created(&mut self) {
        self.tasks_created += 1;
    }

    /// Count a task the executor accepted.
    pub fn record_task_completed(&mut self) {
        self.tasks_completed += 1;
    }

    /// Count a task the executor rejected.
    pub fn record_task_failed(&mut self) {
        self.tasks_failed += 1;
    }

    /// Recompute the automation rate from the current counters.
    pub fn refresh_automation_rate(&mut self) {
        self.automation_rate = automation_rate(self.tasks_created, self.tasks_completed);
    }

    /// Events handled since start.
    pub fn events_processed(&self) -> u64 {
        self.events_processed
    }

    pub fn tasks_created(&self) -> u64 {
        self.tasks_created
    }

    pub fn tasks_completed(&self) -> u64 {
        self.tasks_completed
    }

    pub fn tasks_failed(&self) -> u64 {
        self.tasks_failed
    }

    /// Completed over created, in percent.
    pub fn automation_rate(&self) -> f64 {
        self.automation_rate
    }

    /// Mean handling time per event.
    pub fn average_response_time_secs(&self) -> f64 {
        self.average_response_time_secs
    }

    /// Copy of the current counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            events_processed: self.events_processed,
            tasks_created: self.tasks_created,
            tasks_completed: self.tasks_completed,
            tasks_failed: self.tasks_failed,
            automation_rate: self.automation_rate,
            average_response_time_secs: self.average_response_time_secs,
            started_at: self.started_at,
            captured_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_automation_rate_zero_when_nothing_created() {
        assert!(automation_rate(0, 0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_automation_rate_percentage() {
        assert!((automation_rate(5, 3) - 60.0).abs() < 1e-9);
        assert!((automation_rate(4, 4) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_running_mean() {
        let mut tracker = MetricsTracker::new();
        tracker.record_event_processed(Duration::from_secs(2));
        tracker.record_event_processed(Duration::from_secs(4));
        tracker.record_event_processed(Duration::from_secs(6));
        assert_eq!(tracker.events_processed(), 3);
        assert!((tracker.average_response_time_secs() - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_rate_only_changes_on_refresh() {
        let mut tracker = MetricsTracker::new();
        for _ in 0..5 {
            tracker.record_task_created();
        }
        for _ in 0..3 {
            tracker.record_task_completed();
        }
        tracker.record_task_failed();
        assert!(tracker.automation_rate().abs() < f64::EPSILON);

        tracker.refresh_automation_rate();
        assert!((tracker.automation_rate() - 60.0).abs() < 1e-9);

        let snapshot = tracker.snapshot();
        assert_eq!(snapshot.tasks_created, 5);
        assert_eq!(snapshot.tasks_completed, 3);
        assert_eq!(snapshot.tasks_failed, 1);
        assert!(snapshot.captured_at >= snapshot.started_at);
    }
}
