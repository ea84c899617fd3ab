//! Message simulator
//!
//! Stands in for a real messaging gateway: waits out a simulated latency,
//! draws the outcome from a [`RandomSource`] and renders the message body.

use super::traits::{Clock, Messenger, RandomSource};
use crate::types::{CustomerRecord, InputMode, SendResult, SimulationConfig};
use std::time::Duration;
use tracing::debug;

/// Result message stored for a record that reached the engine without an attachment
pub const MISSING_ATTACHMENT_MESSAGE: &str = "Failed: Missing PDF Attachment";

/// Render the greeting sent to a customer
///
/// Deterministic in the record's name, invoice reference, amount and
/// attachment.
pub fn render_message(record: &CustomerRecord) -> String {
    match record.mode {
        InputMode::Invoice => match record.amount {
            Some(amount) => format!(
                "Hi {}, your invoice #{} for GH₵ {} is ready. Thank you for your business!",
                record.name, record.invoice_ref, amount
            ),
            None => format!(
                "Hi {}, your invoice #{} is ready. Thank you for your business!",
                record.name, record.invoice_ref
            ),
        },
        InputMode::Document => format!(
            "Hi {}, please find your document {} attached. Thank you for your business!",
            record.name,
            record.attachment.as_deref().unwrap_or(&record.expected_attachment)
        ),
    }
}

/// Simulated message gateway
///
/// Each send waits `latency` on the clock, then succeeds with
/// `success_probability`. It never returns an error.
#[derive(Debug, Clone)]
pub struct MessageSimulator<C, R> {
    clock: C,
    random: R,
    latency: Duration,
    success_probability: f64,
}

impl<C: Clock, R: RandomSource> MessageSimulator<C, R> {
    /// Create a simulator using the latency and success probability from `config`
    pub fn new(clock: C, random: R, config: &SimulationConfig) -> Self {
        Self {
            clock,
            random,
            latency: config.send_latency,
            success_probability: config.success_probability,
        }
    }
}

impl<C: Clock, R: RandomSource> Messenger for MessageSimulator<C, R> {
    async fn send(&mut self, record: &CustomerRecord) -> SendResult {
        self.clock.sleep(self.latency).await;

        let succeeded = self.random.chance(self.success_probability);
        let timestamp = self.clock.now();
        debug!(record = %record.id, succeeded, "simulated send resolved");

        SendResult {
            succeeded,
            timestamp,
            message: render_message(record),
        }
    }
}
