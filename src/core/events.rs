//! Run events
//!
//! The engine publishes a [`RunEvent`] after every state change. Each
//! snapshot is an owned copy, so observers never hold a reference into the
//! batch while the engine mutates it.

use crate::types::{Batch, BatchStatistics, CustomerRecord, RunPhase};
use serde::Serialize;
use tokio::sync::mpsc::UnboundedSender;

/// Copy of one record's state right after a transition
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressSnapshot {
    /// Batch version at the time of the snapshot
    pub version: u64,
    /// Zero-based position of the record in the batch
    pub index: usize,
    pub record: CustomerRecord,
    pub stats: BatchStatistics,
}

impl ProgressSnapshot {
    pub(crate) fn capture(batch: &Batch, index: usize) -> Option<Self> {
        let record = batch.records().get(index)?.clone();
        Some(Self {
            version: batch.version(),
            index,
            record,
            stats: batch.stats(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RunEvent {
    Started { total: usize },
    Progress(ProgressSnapshot),
    Finished { stats: BatchStatistics, phase: RunPhase },
}

/// Optional event sink
///
/// Publishing never fails: with no channel attached, or once the receiver
/// is gone, events are dropped.
#[derive(Debug, Clone, Default)]
pub(crate) struct EventSink {
    sender: Option<UnboundedSender<RunEvent>>,
}

impl EventSink {
    pub(crate) fn new(sender: UnboundedSender<RunEvent>) -> Self {
        Self {
            sender: Some(sender),
        }
    }

    pub(crate) fn publish(&mut self, event: RunEvent) {
        let Some(sender) = &self.sender else {
            return;
        };
        if sender.send(event).is_err() {
            // receiver dropped, stop cloning snapshots for nobody
            self.sender = None;
        }
    }

    pub(crate) fn is_attached(&self) -> bool {
        self.sender.is_some()
    }
}
