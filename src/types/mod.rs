//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `customer`: Customer records, delivery status and send outcomes
//! - `batch`: Batches, input modes and run statistics
//! - `config`: Simulation timing and probability configuration
//! - `error`: Error types for the simulator

pub mod batch;
pub mod config;
pub mod customer;
pub mod error;

pub use batch::{Batch, BatchStatistics, InputMode, RunPhase};
pub use config::SimulationConfig;
pub use customer::{
    CustomerRecord, DeliveryStatus, FailureReason, ProcessingStage, RecordId, SendResult,
};
pub use error::{FormatError, SenderError};
