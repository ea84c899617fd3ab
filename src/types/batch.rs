//! Batch-level types
//!
//! A batch is the full ordered set of customer records loaded for one
//! simulation, together with its input mode, running statistics and the
//! phase of the most recent run.

use super::customer::{
    CustomerRecord, DeliveryStatus, FailureReason, ProcessingStage, SendResult,
};
use serde::Serialize;
use std::fmt;

/// Column layout of an input file
///
/// Resolved once at parse time from the header row. Each mode has its own
/// fixed set of required columns and its own way of shaping records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InputMode {
    /// `name, phone, amount, invoice`
    ///
    /// The expected attachment is derived as `<invoice>.pdf`.
    Invoice,

    /// `customer name, customer number, pdf filename`
    ///
    /// The expected attachment is the `pdf filename` column verbatim.
    Document,
}

impl InputMode {
    /// Every accepted mode, in detection priority order
    pub const ALL: [InputMode; 2] = [InputMode::Document, InputMode::Invoice];

    /// Required header columns (lowercase) for this mode
    pub fn required_columns(&self) -> &'static [&'static str] {
        match self {
            InputMode::Invoice => &["name", "phone", "amount", "invoice"],
            InputMode::Document => &["customer name", "customer number", "pdf filename"],
        }
    }

    /// Column holding the mandatory display name
    pub fn name_column(&self) -> &'static str {
        match self {
            InputMode::Invoice => "name",
            InputMode::Document => "customer name",
        }
    }

    /// Column holding the mandatory contact number
    pub fn phone_column(&self) -> &'static str {
        match self {
            InputMode::Invoice => "phone",
            InputMode::Document => "customer number",
        }
    }

    /// Detect the mode from normalized (trimmed, lowercase) header names
    ///
    /// Returns the first mode whose required columns are all present.
    /// Document mode wins when a header satisfies both.
    pub fn detect(headers: &[String]) -> Option<InputMode> {
        Self::ALL.into_iter().find(|mode| {
            mode.required_columns()
                .iter()
                .all(|required| headers.iter().any(|h| h == required))
        })
    }
}

impl fmt::Display for InputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputMode::Invoice => write!(f, "invoice"),
            InputMode::Document => write!(f, "document"),
        }
    }
}

/// Aggregate outcome counters for a run
///
/// `succeeded + failed + cancelled <= total` at all times during a run.
/// After a completed run `succeeded + failed == total`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchStatistics {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub cancelled: usize,
}

impl BatchStatistics {
    /// Fresh counters for a batch of `total` records
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    /// Number of records that reached a terminal state
    pub fn resolved(&self) -> usize {
        self.succeeded + self.failed + self.cancelled
    }

    /// Whether every record has been accounted for
    pub fn is_complete(&self) -> bool {
        self.resolved() == self.total
    }
}

/// Lifecycle phase of the most recent run over a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    /// Loaded, never run
    Idle,
    /// A run is in progress
    Running,
    /// The last run processed every record
    Finished,
    /// The last run was stopped before reaching every record
    Cancelled,
}

/// An owned, versioned batch of customer records
///
/// The version increments on every mutation, so snapshots taken by
/// observers can be ordered without comparing their contents.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    mode: InputMode,
    records: Vec<CustomerRecord>,
    stats: BatchStatistics,
    phase: RunPhase,
    version: u64,
}

impl Batch {
    /// Create a batch from freshly parsed records
    pub fn new(mode: InputMode, records: Vec<CustomerRecord>) -> Self {
        let stats = BatchStatistics::new(records.len());
        Self {
            mode,
            records,
            stats,
            phase: RunPhase::Idle,
            version: 0,
        }
    }

    pub fn mode(&self) -> InputMode {
        self.mode
    }

    pub fn records(&self) -> &[CustomerRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn stats(&self) -> BatchStatistics {
        self.stats
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// The record the engine currently owns, if any
    pub fn current(&self) -> Option<&CustomerRecord> {
        self.records.iter().find(|r| r.status.is_processing())
    }

    /// Number of records with an attachment bound
    pub fn attached_count(&self) -> usize {
        self.records.iter().filter(|r| r.attachment.is_some()).count()
    }

    pub(crate) fn records_mut(&mut self) -> &mut [CustomerRecord] {
        self.version += 1;
        &mut self.records
    }

    /// Reset every record and the statistics, and mark the run active
    pub(crate) fn begin_run(&mut self) {
        for record in &mut self.records {
            record.reset_outcome();
        }
        self.stats = BatchStatistics::new(self.records.len());
        self.phase = RunPhase::Running;
        self.version += 1;
    }

    /// Move the record at `index` into a processing sub-stage
    pub(crate) fn mark_processing(&mut self, index: usize, stage: ProcessingStage) {
        self.records[index].status = DeliveryStatus::Processing(stage);
        self.version += 1;
    }

    /// Apply the terminal `Sent` transition together with its outcome
    ///
    /// Statistics are updated in the same step so observers never see a
    /// terminal record without its counter.
    pub(crate) fn resolve_sent(&mut self, index: usize, result: SendResult) {
        self.stats.succeeded += 1;
        self.apply_outcome(index, DeliveryStatus::Sent, result);
    }

    /// Apply a terminal `Failed` transition together with its outcome
    pub(crate) fn resolve_failed(&mut self, index: usize, reason: FailureReason, result: SendResult) {
        self.stats.failed += 1;
        self.apply_outcome(index, DeliveryStatus::Failed(reason), result);
    }

    fn apply_outcome(&mut self, index: usize, status: DeliveryStatus, result: SendResult) {
        let record = &mut self.records[index];
        record.status = status;
        record.result = Some(result);
        self.version += 1;
    }

    /// Mark every record from `start` onwards as cancelled
    pub(crate) fn cancel_from(&mut self, start: usize) -> usize {
        let mut cancelled = 0;
        for record in self.records.iter_mut().skip(start) {
            record.status = DeliveryStatus::Cancelled;
            record.result = None;
            cancelled += 1;
        }
        self.stats.cancelled += cancelled;
        self.version += 1;
        cancelled
    }

    /// Close the run in the given phase
    pub(crate) fn finish(&mut self, phase: RunPhase) {
        self.phase = phase;
        self.version += 1;
    }
}
