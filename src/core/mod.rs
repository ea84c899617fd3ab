//! Core simulation module
//!
//! This module contains the simulation components:
//! - `traits` - Seams for time, randomness and message delivery
//! - `clock` - Real and virtual clocks
//! - `random` - Seeded and fixed send outcomes
//! - `matcher` - Attachment name matching
//! - `messenger` - Message simulator and message rendering
//! - `engine` - Sequential run orchestration
//! - `events` - Progress snapshots published during a run
//! - `session` - Batch lifecycle

pub mod clock;
pub mod engine;
pub mod events;
pub mod matcher;
pub mod messenger;
pub mod random;
pub mod session;
pub mod traits;

pub use clock::{ManualClock, Pacing, TokioClock};
pub use engine::SimulationEngine;
pub use events::{ProgressSnapshot, RunEvent};
pub use matcher::match_attachments;
pub use messenger::{render_message, MessageSimulator, MISSING_ATTACHMENT_MESSAGE};
pub use random::{FixedOutcome, SeededRandom};
pub use session::Session;
pub use traits::{Clock, Messenger, RandomSource};
