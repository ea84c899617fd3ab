//! Customer-related types for the bulk send simulator
//!
//! This module defines the customer record, its per-run delivery status,
//! and the outcome produced once a send attempt resolves.

use super::batch::InputMode;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;

/// Record identifier
///
/// Assigned at ingestion and unique within one loaded batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RecordId(pub u64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Sub-stage of a record that is currently being processed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingStage {
    /// The record was picked up and its preconditions are being checked
    Preparing,
    /// The bound attachment is being "uploaded" ahead of the send
    UploadingAttachment,
}

/// Why a record ended in the `Failed` state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// No attachment was bound when the engine reached the record
    MissingAttachment,
    /// The message simulator reported an unsuccessful send
    SendRejected,
}

/// Delivery status of a single record within a run
///
/// Transitions are monotonic within one run:
/// `Waiting -> Processing -> {Sent | Failed | Cancelled}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "detail", rename_all = "snake_case")]
pub enum DeliveryStatus {
    /// Not yet reached by the engine
    Waiting,
    /// Currently owned by the engine
    Processing(ProcessingStage),
    /// The send attempt succeeded
    Sent,
    /// The record failed, see [`FailureReason`]
    Failed(FailureReason),
    /// The run was cancelled before the engine reached this record
    Cancelled,
}

impl DeliveryStatus {
    /// Whether no further transitions happen for this record in the current run
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            DeliveryStatus::Sent | DeliveryStatus::Failed(_) | DeliveryStatus::Cancelled
        )
    }

    /// Whether the engine is currently working on this record
    pub fn is_processing(&self) -> bool {
        matches!(self, DeliveryStatus::Processing(_))
    }

    /// Human readable label, as shown next to a record while a run progresses
    pub fn label(&self) -> &'static str {
        match self {
            DeliveryStatus::Waiting => "Waiting",
            DeliveryStatus::Processing(ProcessingStage::Preparing) => "Preparing...",
            DeliveryStatus::Processing(ProcessingStage::UploadingAttachment) => {
                "Uploading PDF..."
            }
            DeliveryStatus::Sent => "Sent",
            DeliveryStatus::Failed(FailureReason::MissingAttachment) => "Missing PDF",
            DeliveryStatus::Failed(FailureReason::SendRejected) => "Failed",
            DeliveryStatus::Cancelled => "Cancelled",
        }
    }

    /// Status string used in the exported results report
    ///
    /// Exactly one of `SUCCESS`, `FAILED` or `PENDING`.
    pub fn report_label(&self) -> &'static str {
        match self {
            DeliveryStatus::Sent => "SUCCESS",
            DeliveryStatus::Failed(_) => "FAILED",
            DeliveryStatus::Waiting | DeliveryStatus::Processing(_) | DeliveryStatus::Cancelled => {
                "PENDING"
            }
        }
    }
}

/// Terminal outcome of a record, stored once the engine resolves it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SendResult {
    /// Whether the message was delivered
    pub succeeded: bool,
    /// Wall-clock time at which the outcome resolved
    pub timestamp: DateTime<Utc>,
    /// Rendered message body, or a failure description
    pub message: String,
}

/// A single customer's data plus its simulation status and outcome
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerRecord {
    /// Unique identifier within the batch
    pub id: RecordId,

    /// Input layout this record was loaded from
    pub mode: InputMode,

    /// Display name, never empty
    pub name: String,

    /// Contact number, never empty (no format validation)
    pub phone: String,

    /// Invoice amount, only present for invoice-mode input with a parseable amount
    pub amount: Option<Decimal>,

    /// Invoice number or document filename stem
    pub invoice_ref: String,

    /// Filename this record expects to be matched against
    pub expected_attachment: String,

    /// Bound attachment filename
    ///
    /// Set by the attachment matcher and never cleared by the engine.
    pub attachment: Option<String>,

    /// Status within the current run
    pub status: DeliveryStatus,

    /// Outcome, populated if and only if the status is `Sent` or `Failed`
    pub result: Option<SendResult>,
}

impl CustomerRecord {
    /// Create a fresh record in the `Waiting` state with no attachment bound
    pub fn new(
        id: RecordId,
        mode: InputMode,
        name: impl Into<String>,
        phone: impl Into<String>,
        invoice_ref: impl Into<String>,
        expected_attachment: impl Into<String>,
    ) -> Self {
        Self {
            id,
            mode,
            name: name.into(),
            phone: phone.into(),
            amount: None,
            invoice_ref: invoice_ref.into(),
            expected_attachment: expected_attachment.into(),
            attachment: None,
            status: DeliveryStatus::Waiting,
            result: None,
        }
    }

    /// Set the invoice amount
    pub fn with_amount(mut self, amount: Option<Decimal>) -> Self {
        self.amount = amount;
        self
    }

    /// Put the record back to `Waiting` with no outcome, keeping the attachment
    pub fn reset_outcome(&mut self) {
        self.status = DeliveryStatus::Waiting;
        self.result = None;
    }
}
