//! Core traits for time, randomness and message delivery
//!
//! These seams keep the simulation engine free of wall-clock waits and
//! ambient randomness, so tests can run a full batch instantly and force
//! either send outcome.

use crate::types::{CustomerRecord, SendResult};
use chrono::{DateTime, Utc};
use std::future::Future;
use std::time::Duration;

/// Source of wall-clock time and simulated delays
///
/// Implementations are cheap to clone; the engine and the message simulator
/// each hold a handle to the same underlying clock.
pub trait Clock: Clone + Send + Sync {
    /// Current wall-clock time
    fn now(&self) -> DateTime<Utc>;

    /// Suspend for the given simulated duration
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send;
}

/// Source of the Bernoulli draws that decide send outcomes
pub trait RandomSource: Send {
    /// Bernoulli trial: returns true with the given probability
    fn chance(&mut self, probability: f64) -> bool;
}

/// Delivers one message for one customer record
///
/// Delivery never fails with an error: an unsuccessful send is reported
/// through `SendResult::succeeded`.
pub trait Messenger: Send {
    /// Attempt a send for a record that already passed attachment validation
    fn send(&mut self, record: &CustomerRecord) -> impl Future<Output = SendResult> + Send;
}
