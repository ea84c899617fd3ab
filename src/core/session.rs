//! Batch lifecycle
//!
//! A [`Session`] holds at most one loaded batch and walks it through
//! load, attachment binding, run, export and reset.

use super::engine::SimulationEngine;
use super::matcher::match_attachments;
use super::traits::{Clock, Messenger};
use crate::io::{parse_customers, sample_batch, write_results_csv};
use crate::types::{Batch, BatchStatistics, FormatError, SenderError};
use std::io::Write;
use tracing::info;

#[derive(Debug, Default)]
pub struct Session {
    batch: Option<Batch>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// The loaded batch, if any
    pub fn batch(&self) -> Option<&Batch> {
        self.batch.as_ref()
    }

    /// Replace the current batch with the built-in sample
    pub fn load_sample(&mut self) -> &Batch {
        info!("loading sample batch");
        self.batch.insert(sample_batch())
    }

    /// Parse `text` and make it the current batch
    ///
    /// # Errors
    ///
    /// Returns the parser's [`FormatError`]; the previously loaded batch, if
    /// any, stays in place.
    pub fn load_text(&mut self, text: &str) -> Result<&Batch, FormatError> {
        let batch = parse_customers(text)?;
        Ok(self.batch.insert(batch))
    }

    /// Bind uploaded file names to the current batch
    ///
    /// Returns the number of newly bound records, 0 when no batch is loaded.
    pub fn bind_attachments<S: AsRef<str>>(&mut self, names: &[S]) -> usize {
        match self.batch.as_mut() {
            Some(batch) => match_attachments(batch.records_mut(), names),
            None => 0,
        }
    }

    /// Run the current batch to completion (or cancellation)
    ///
    /// # Errors
    ///
    /// `SenderError::NoBatchLoaded` when nothing has been loaded.
    pub async fn run<C: Clock, M: Messenger>(
        &mut self,
        engine: &mut SimulationEngine<C, M>,
    ) -> Result<BatchStatistics, SenderError> {
        let batch = self.batch.as_mut().ok_or(SenderError::NoBatchLoaded)?;
        Ok(engine.run(batch).await)
    }

    /// Write the results report for the current batch
    pub fn export(&self, output: &mut dyn Write) -> Result<(), SenderError> {
        let batch = self.batch.as_ref().ok_or(SenderError::NoBatchLoaded)?;
        write_results_csv(batch.records(), output)
    }

    /// Discard the current batch
    pub fn reset(&mut self) {
        if self.batch.take().is_some() {
            info!("batch discarded");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::ManualClock;
    use crate::core::messenger::MessageSimulator;
    use crate::core::random::FixedOutcome;
    use crate::types::{RunPhase, SimulationConfig};
    use rstest::rstest;

    fn engine() -> SimulationEngine<ManualClock, MessageSimulator<ManualClock, FixedOutcome>> {
        let clock = ManualClock::default();
        let config = SimulationConfig::default();
        let messenger = MessageSimulator::new(clock.clone(), FixedOutcome::always_succeed(), &config);
        SimulationEngine::new(clock, messenger, config)
    }

    #[rstest]
    #[case::header_only("name,phone,amount,invoice")]
    #[case::unterminated_quote("name,phone,amount,invoice\n\"Ama Asante,233209876543,1500.00,INV-004\nKofi Boateng,233245678901,10.00,INV-005\n")]
    fn test_failed_load_keeps_previous_batch(#[case] text: &str) {
        let mut session = Session::new();
        session.load_sample();

        assert!(session.load_text(text).is_err());

        assert_eq!(session.batch().map(Batch::len), Some(5));
    }

    #[test]
    fn test_bind_without_batch_is_noop() {
        let mut session = Session::new();
        assert_eq!(session.bind_attachments(&["INV-001.pdf"]), 0);
        assert!(session.batch().is_none());
    }

    #[tokio::test]
    async fn test_run_without_batch() {
        let mut session = Session::new();

        let err = session.run(&mut engine()).await.unwrap_err();

        assert!(matches!(err, SenderError::NoBatchLoaded));
    }

    #[tokio::test]
    async fn test_full_lifecycle() {
        let mut session = Session::new();
        session.load_sample();
        assert_eq!(session.bind_attachments(&["inv-001.PDF", "INV-005.pdf"]), 2);

        let stats = session.run(&mut engine()).await.unwrap();
        assert_eq!((stats.succeeded, stats.failed), (2, 3));
        assert_eq!(session.batch().map(Batch::phase), Some(RunPhase::Finished));

        let mut out = Vec::new();
        session.export(&mut out).unwrap();
        let report = String::from_utf8(out).unwrap();
        assert_eq!(report.lines().count(), 6);
        assert!(report.lines().nth(1).unwrap().contains("SUCCESS"));

        session.reset();
        assert!(session.batch().is_none());
        assert!(matches!(
            session.export(&mut Vec::new()),
            Err(SenderError::NoBatchLoaded)
        ));
    }

    #[test]
    fn test_load_text_replaces_batch() {
        let mut session = Session::new();
        session.load_sample();

        let batch = session
            .load_text("customer name,customer number,pdf filename\nEfua,0244,a.pdf\n")
            .unwrap();

        assert_eq!(batch.len(), 1);
        assert_eq!(batch.mode(), crate::types::InputMode::Document);
    }
}
