//! Warmup / measurement window (§4.8, §4.10, §5's cancellation model):
//! a warmup deadline after which `measuring` flips 0→1 exactly once, and a
//! total deadline all workers poll to know when to stop. Built on bare
//! `std::time::Instant` and atomics rather than a cancellation-token crate —
//! the corpus never reaches for one, and polling a shared deadline is enough
//! to satisfy "every worker observes cancellation on every loop iteration".

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

#[derive(Clone)]
pub struct RunWindow {
    warmup_deadline: Instant,
    total_deadline: Instant,
    execution: Duration,
    measuring: Arc<AtomicBool>,
    started_at: Arc<OnceLock<Instant>>,
}

impl RunWindow {
    pub fn new(warmup: Duration, execution: Duration) -> Self {
        let now = Instant::now();
        Self {
            warmup_deadline: now + warmup,
            total_deadline: now + warmup + execution,
            execution,
            measuring: Arc::new(AtomicBool::new(warmup.is_zero())),
            started_at: Arc::new(OnceLock::new()),
        }
    }

    /// True once the total window has elapsed; workers treat this as their
    /// stop signal.
    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.total_deadline
    }

    pub fn is_measuring(&self) -> bool {
        self.measuring.load(Ordering::Acquire)
    }

    /// Records the start-of-measurement instant exactly once. No-op if not
    /// currently measuring, or if already recorded.
    pub fn mark_measured_start(&self) {
        if self.is_measuring() {
            self.started_at.get_or_init(Instant::now);
        }
    }

    /// `reads / elapsed` uses this; falls back to the configured execution
    /// window if no measured operation ever happened.
    pub fn elapsed_since_start(&self) -> Duration {
        match self.started_at.get() {
            Some(t) => t.elapsed(),
            None => self.execution,
        }
    }

    /// Sleeps out the warmup window, flips `measuring`, then sleeps out the
    /// remaining execution window. Driven by one coordinating task while
    /// workers poll [`RunWindow::is_expired`] independently.
    pub async fn drive(&self) {
        let now = Instant::now();
        if self.warmup_deadline > now {
            tokio::time::sleep(self.warmup_deadline - now).await;
        }
        self.measuring.store(true, Ordering::Release);

        let now = Instant::now();
        if self.total_deadline > now {
            tokio::time::sleep(self.total_deadline - now).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn measuring_flips_after_warmup_and_start_is_recorded_once() {
        let window = RunWindow::new(Duration::from_millis(20), Duration::from_millis(50));
        assert!(!window.is_measuring());
        let driver = tokio::spawn({
            let w = window.clone();
            async move { w.drive().await }
        });
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert!(window.is_measuring());
        window.mark_measured_start();
        let first = window.elapsed_since_start();
        tokio::time::sleep(Duration::from_millis(10)).await;
        window.mark_measured_start();
        let second = window.elapsed_since_start();
        assert!(second >= first);
        driver.await.unwrap();
        assert!(window.is_expired());
    }

    #[test]
    fn zero_warmup_starts_measuring_immediately() {
        let window = RunWindow::new(Duration::ZERO, Duration::from_secs(1));
        assert!(window.is_measuring());
    }

    #[test]
    fn elapsed_falls_back_to_execution_window_when_nothing_measured() {
        let window = RunWindow::new(Duration::from_secs(0), Duration::from_millis(123));
        assert_eq!(window.elapsed_since_start(), Duration::from_millis(123));
    }
}
