// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Cancellable fixed-interval background tasks.
//!
//! Used for periodic data reloads and for the expiry-driven session refresh.
//! The interval is independent of token expiry.

use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

/// Default period for dashboard data reloads.
pub const DEFAULT_DATA_REFRESH_INTERVAL: Duration = Duration::from_secs(300);

/// Shortest period a task runs at. Shorter periods, zero included, are raised to it.
pub const MIN_PERIOD: Duration = Duration::from_millis(1);

/// A task that runs a closure every `period` until cancelled.
///
/// Cancelling (explicitly or by dropping the handle) aborts the task
/// immediately, including a tick that is mid-flight.
#[derive(Debug)]
pub struct PeriodicTask {
    name: String,
    handle: JoinHandle<()>,
    cancelled: Arc<AtomicBool>,
    ticks: Arc<AtomicU64>,
}

impl PeriodicTask {
    /// Spawns a task whose first tick fires one `period` from now.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<F, Fut>(name: impl Into<String>, period: Duration, tick: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self::spawn_inner(name.into(), period, false, tick)
    }

    /// Spawns a task that ticks once right away, then every `period`.
    pub fn spawn_immediate<F, Fut>(name: impl Into<String>, period: Duration, tick: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self::spawn_inner(name.into(), period, true, tick)
    }

    fn spawn_inner<F, Fut>(name: String, period: Duration, immediate: bool, mut tick: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let period = if period < MIN_PERIOD {
            tracing::warn!(task = %name, period_ms = period.as_millis() as u64, "Period too short, using minimum");
            MIN_PERIOD
        } else {
            period
        };

        let cancelled = Arc::new(AtomicBool::new(false));
        let ticks = Arc::new(AtomicU64::new(0));

        let task_ticks = ticks.clone();
        let task_name = name.clone();
        let handle = tokio::spawn(async move {
            let start = if immediate {
                time::Instant::now()
            } else {
                time::Instant::now() + period
            };
            let mut interval = time::interval_at(start, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                interval.tick().await;
                tracing::trace!(task = %task_name, "Periodic tick");
                tick().await;
                task_ticks.fetch_add(1, Ordering::Relaxed);
            }
        });

        tracing::debug!(task = %name, period_ms = period.as_millis() as u64, "Periodic task started");

        Self {
            name,
            handle,
            cancelled,
            ticks,
        }
    }

    /// Task name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of completed ticks.
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    /// Stops the task. Idempotent.
    pub fn cancel(&self) {
        if !self.cancelled.swap(true, Ordering::SeqCst) {
            self.handle.abort();
            tracing::debug!(task = %self.name, "Periodic task cancelled");
        }
    }

    /// Returns `true` once [`PeriodicTask::cancel`] was called.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

impl Drop for PeriodicTask {
    fn drop(&mut self) {
        self.cancel();
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn counter_task(period: Duration, immediate: bool) -> (PeriodicTask, Arc<AtomicUsize>) {
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        let tick = move || {
            let c = c.clone();
            async move {
                c.fetch_add(1, Ordering::SeqCst);
            }
        };
        let task = if immediate {
            PeriodicTask::spawn_immediate("test", period, tick)
        } else {
            PeriodicTask::spawn("test", period, tick)
        };
        (task, count)
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_on_interval() {
        let (task, count) = counter_task(Duration::from_secs(300), false);

        time::sleep(Duration::from_secs(299)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);

        time::sleep(Duration::from_secs(2)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);

        time::sleep(Duration::from_secs(600)).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);
        assert_eq!(task.ticks(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_immediate_first_tick() {
        let (_task, count) = counter_task(Duration::from_secs(60), true);
        time::sleep(Duration::from_millis(1)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_ticks() {
        let (task, count) = counter_task(DEFAULT_DATA_REFRESH_INTERVAL, false);

        time::sleep(Duration::from_secs(301)).await;
        task.cancel();
        task.cancel();
        assert!(task.is_cancelled());

        time::sleep(Duration::from_secs(3000)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_period_runs_at_minimum() {
        let (task, count) = counter_task(Duration::ZERO, true);

        time::sleep(Duration::from_millis(5)).await;
        assert!(count.load(Ordering::SeqCst) >= 2);
        assert!(!task.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels() {
        let (task, count) = counter_task(Duration::from_secs(10), false);
        drop(task);

        time::sleep(Duration::from_secs(100)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }
}
