//! Bulk Send Simulator Library
//! # Overview
//!
//! This library simulates bulk delivery of invoice messages with PDF
//! attachments: it parses a customer list, binds uploaded file names to
//! customers, runs every customer through a simulated send, and exports a
//! results report.
//!
//! # Architecture
//!
//! - [`types`] - Core data types (CustomerRecord, Batch, statistics, errors)
//! - [`io`] - Input parsing, sample data, templates and report serialization
//! - [`crate::core`] - Business logic components:
//!   - [`crate::core::matcher`] - Attachment name matching
//!   - [`crate::core::messenger`] - Message simulator
//!   - [`crate::core::engine`] - Sequential run orchestration
//!   - [`crate::core::session`] - Batch lifecycle
//! - [`progress`] - Rendering of run events
//! - [`logging`] - Tracing subscriber setup
//! - [`cli`] / [`runner`] - Command-line surface
//!
//! # Delivery States
//!
//! Each record moves through:
//!
//! - **Waiting**: not yet reached
//! - **Processing**: `Preparing`, then `UploadingAttachment` when an attachment is bound
//! - **Sent**: the simulated send succeeded
//! - **Failed**: no attachment bound, or the simulated send was rejected
//! - **Cancelled**: the run stopped before reaching the record
//!
//! Exactly one record is processing at any time during a run, and records
//! are processed in load order.

// Module declarations
pub mod cli;
pub mod core;
pub mod io;
pub mod logging;
pub mod progress;
pub mod runner;
pub mod types;

pub use self::core::{match_attachments, MessageSimulator, Session, SimulationEngine};
pub use io::{parse_customers, write_results_csv};
pub use types::{
    Batch, BatchStatistics, CustomerRecord, DeliveryStatus, FailureReason, InputMode, RecordId,
    SenderError, SimulationConfig,
};
