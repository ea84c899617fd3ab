//! Simulation engine
//!
//! This module provides the SimulationEngine that drives a batch through the
//! delivery state machine, one record at a time, in load order:
//!
//! - records without an attachment fail after a short preparation delay,
//!   without reaching the messenger
//! - records with an attachment wait out the upload delay, then go to the
//!   messenger, whose result decides `Sent` or `Failed`
//!
//! Every transition is applied to the batch before the next one starts, and
//! published as a [`RunEvent`] when an event channel is attached.

use super::events::{EventSink, ProgressSnapshot, RunEvent};
use super::messenger::MISSING_ATTACHMENT_MESSAGE;
use super::traits::{Clock, Messenger};
use crate::types::{
    Batch, BatchStatistics, FailureReason, ProcessingStage, RunPhase, SendResult, SimulationConfig,
};
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Sequential batch simulation engine
///
/// Owns the batch exclusively for the duration of [`SimulationEngine::run`];
/// observers only see owned snapshots through the event channel.
pub struct SimulationEngine<C, M> {
    clock: C,
    messenger: M,
    config: SimulationConfig,
    events: EventSink,
    cancellation: CancellationToken,
}

impl<C: Clock, M: Messenger> SimulationEngine<C, M> {
    /// Create a new SimulationEngine
    ///
    /// # Arguments
    ///
    /// * `clock` - Time source for the preparation and upload delays
    /// * `messenger` - Delivers messages for records that have an attachment
    /// * `config` - Delay settings; the messenger carries its own latency
    pub fn new(clock: C, messenger: M, config: SimulationConfig) -> Self {
        SimulationEngine {
            clock,
            messenger,
            config,
            events: EventSink::default(),
            cancellation: CancellationToken::new(),
        }
    }

    /// Publish run events on `sender`
    pub fn with_events(mut self, sender: UnboundedSender<RunEvent>) -> Self {
        self.events = EventSink::new(sender);
        self
    }

    /// Stop before the next record once `token` is cancelled
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    pub fn messenger(&self) -> &M {
        &self.messenger
    }

    /// Run the whole batch
    ///
    /// Resets every record and the statistics first, so running a finished
    /// batch again starts over instead of resuming. Per-record failures never
    /// abort the run.
    ///
    /// # Returns
    ///
    /// The final statistics. After an uncancelled run
    /// `succeeded + failed == total`.
    pub async fn run(&mut self, batch: &mut Batch) -> BatchStatistics {
        batch.begin_run();
        let total = batch.len();
        if batch.is_empty() {
            warn!("running an empty batch");
        }
        info!(total, mode = %batch.mode(), attached = batch.attached_count(), "simulation started");
        self.events.publish(RunEvent::Started { total });

        for index in 0..total {
            if self.cancellation.is_cancelled() {
                return self.cancel(batch, index);
            }
            self.process_record(batch, index).await;
        }

        batch.finish(RunPhase::Finished);
        let stats = batch.stats();
        info!(
            total = stats.total,
            succeeded = stats.succeeded,
            failed = stats.failed,
            "simulation finished"
        );
        self.events.publish(RunEvent::Finished {
            stats,
            phase: RunPhase::Finished,
        });

        stats
    }

    async fn process_record(&mut self, batch: &mut Batch, index: usize) {
        batch.mark_processing(index, ProcessingStage::Preparing);
        self.notify(batch, index);

        if batch.records()[index].attachment.is_none() {
            self.clock.sleep(self.config.preparation_delay).await;

            let result = SendResult {
                succeeded: false,
                timestamp: self.clock.now(),
                message: MISSING_ATTACHMENT_MESSAGE.to_string(),
            };
            debug!(record = %batch.records()[index].id, "missing attachment");
            batch.resolve_failed(index, FailureReason::MissingAttachment, result);
            self.notify(batch, index);
            return;
        }

        self.clock.sleep(self.config.upload_delay).await;
        batch.mark_processing(index, ProcessingStage::UploadingAttachment);
        self.notify(batch, index);

        let result = self.messenger.send(&batch.records()[index]).await;
        debug!(record = %batch.records()[index].id, succeeded = result.succeeded, "send resolved");
        if result.succeeded {
            batch.resolve_sent(index, result);
        } else {
            batch.resolve_failed(index, FailureReason::SendRejected, result);
        }
        self.notify(batch, index);
    }

    fn cancel(&mut self, batch: &mut Batch, from: usize) -> BatchStatistics {
        let cancelled = batch.cancel_from(from);
        for index in from..batch.len() {
            self.notify(batch, index);
        }
        batch.finish(RunPhase::Cancelled);

        let stats = batch.stats();
        warn!(
            cancelled,
            succeeded = stats.succeeded,
            failed = stats.failed,
            "simulation cancelled"
        );
        self.events.publish(RunEvent::Finished {
            stats,
            phase: RunPhase::Cancelled,
        });

        stats
    }

    fn notify(&mut self, batch: &Batch, index: usize) {
        if !self.events.is_attached() {
            return;
        }
        if let Some(snapshot) = ProgressSnapshot::capture(batch, index) {
            self.events.publish(RunEvent::Progress(snapshot));
        }
    }
}
