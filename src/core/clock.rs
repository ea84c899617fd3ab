//! Clock implementations
//!
//! - [`TokioClock`] waits for real on the tokio timer.
//! - [`ManualClock`] advances a virtual time instead of waiting. It backs the
//!   `instant` pacing mode, benchmarks and tests.
//! - [`Pacing`] selects between the two at runtime.

use super::traits::Clock;
use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// Real-time clock backed by `tokio::time`
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

impl Clock for TokioClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    async fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }
}

#[derive(Debug)]
struct ManualState {
    now: DateTime<Utc>,
    sleeps: Vec<Duration>,
}

/// Virtual clock that never waits
///
/// Every `sleep` advances the virtual time by the requested duration and is
/// recorded, then yields once to the scheduler so other tasks (for example a
/// progress consumer) get to run. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    state: Arc<Mutex<ManualState>>,
}

impl ManualClock {
    /// Create a clock starting at `start`
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            state: Arc::new(Mutex::new(ManualState {
                now: start,
                sleeps: Vec::new(),
            })),
        }
    }

    /// Create a clock starting at the current wall-clock time
    pub fn starting_now() -> Self {
        Self::new(Utc::now())
    }

    /// Fixed start time used by [`Default`]: 2024-01-01T09:00:00Z
    pub fn default_start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0)
            .single()
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
    }

    /// Every duration slept so far, in order
    pub fn sleeps(&self) -> Vec<Duration> {
        self.lock().sleeps.clone()
    }

    /// Total simulated time slept so far
    pub fn elapsed(&self) -> Duration {
        self.lock().sleeps.iter().sum()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ManualState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(Self::default_start())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.lock().now
    }

    async fn sleep(&self, duration: Duration) {
        {
            let mut state = self.lock();
            let delta = TimeDelta::from_std(duration).unwrap_or(TimeDelta::MAX);
            state.now = state
                .now
                .checked_add_signed(delta)
                .unwrap_or(DateTime::<Utc>::MAX_UTC);
            state.sleeps.push(duration);
        }
        tokio::task::yield_now().await;
    }
}

/// Runtime choice between real and virtual time
#[derive(Debug, Clone)]
pub enum Pacing {
    Realtime(TokioClock),
    Instant(ManualClock),
}

impl Clock for Pacing {
    fn now(&self) -> DateTime<Utc> {
        match self {
            Pacing::Realtime(clock) => clock.now(),
            Pacing::Instant(clock) => clock.now(),
        }
    }

    async fn sleep(&self, duration: Duration) {
        match self {
            Pacing::Realtime(clock) => clock.sleep(duration).await,
            Pacing::Instant(clock) => clock.sleep(duration).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_manual_clock_advances_without_waiting() {
        let clock = ManualClock::default();
        let shared = clock.clone();
        let started = std::time::Instant::now();

        clock.sleep(Duration::from_secs(60)).await;
        shared.sleep(Duration::from_millis(500)).await;

        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(clock.elapsed(), Duration::from_millis(60_500));
        assert_eq!(
            shared.sleeps(),
            vec![Duration::from_secs(60), Duration::from_millis(500)]
        );
        assert_eq!(
            clock.now(),
            ManualClock::default_start() + TimeDelta::milliseconds(60_500)
        );
    }

    #[tokio::test]
    async fn test_tokio_clock_sleeps() {
        let clock = TokioClock;
        let started = std::time::Instant::now();

        clock.sleep(Duration::from_millis(20)).await;

        assert!(started.elapsed() >= Duration::from_millis(20));
    }

    #[tokio::test]
    async fn test_pacing_dispatch() {
        let manual = ManualClock::default();
        let pacing = Pacing::Instant(manual.clone());

        pacing.sleep(Duration::from_secs(2)).await;

        assert_eq!(manual.elapsed(), Duration::from_secs(2));
        assert_eq!(pacing.now(), manual.now());
    }
}
