//! Run progress reporting
//!
//! Renders the engine's [`RunEvent`]s while a batch runs. Progress is written
//! to **stderr** so stdout stays parseable when the report goes there.

use crate::core::RunEvent;
use crate::types::RunPhase;
use clap::ValueEnum;
use std::io::{self, Write};
use tokio::sync::mpsc::UnboundedReceiver;

/// Receives every event of a run, in order
pub trait ProgressReporter: Send {
    fn report(&mut self, event: &RunEvent);
}

/// Human-friendly lines: `[2/5] Grace Adu (233201234567)  Uploading PDF...`
pub struct HumanProgress<W = io::Stderr> {
    out: W,
}

impl HumanProgress {
    pub fn stderr() -> Self {
        Self { out: io::stderr() }
    }
}

impl<W: Write> HumanProgress<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

fn human_line(event: &RunEvent) -> String {
    match event {
        RunEvent::Started { total } => format!("sending to {} customers", total),
        RunEvent::Progress(snapshot) => format!(
            "[{}/{}] {} ({})  {}",
            snapshot.index + 1,
            snapshot.stats.total,
            snapshot.record.name,
            snapshot.record.phone,
            snapshot.record.status.label()
        ),
        RunEvent::Finished { stats, phase } => {
            let verb = match phase {
                RunPhase::Cancelled => "cancelled",
                _ => "finished",
            };
            let mut line = format!(
                "{}: {} sent, {} failed of {}",
                verb, stats.succeeded, stats.failed, stats.total
            );
            if stats.cancelled > 0 {
                line.push_str(&format!(", {} not attempted", stats.cancelled));
            }
            line
        }
    }
}

impl<W: Write + Send> ProgressReporter for HumanProgress<W> {
    fn report(&mut self, event: &RunEvent) {
        let _ = writeln!(self.out, "{}", human_line(event));
        let _ = self.out.flush();
    }
}

/// Machine-readable progress: one JSON object per line
pub struct JsonProgress<W = io::Stderr> {
    out: W,
}

impl JsonProgress {
    pub fn stderr() -> Self {
        Self { out: io::stderr() }
    }
}

impl<W: Write> JsonProgress<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> ProgressReporter for JsonProgress<W> {
    fn report(&mut self, event: &RunEvent) {
        if let Ok(line) = serde_json::to_string(event) {
            let _ = writeln!(self.out, "{}", line);
            let _ = self.out.flush();
        }
    }
}

/// No-op reporter when progress is disabled.
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn report(&mut self, _event: &RunEvent) {}
}

/// Progress format for the CLI
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum ProgressFormat {
    #[default]
    Human,
    Json,
    Quiet,
}

impl ProgressFormat {
    pub fn reporter(&self) -> Box<dyn ProgressReporter> {
        match self {
            ProgressFormat::Human => Box::new(HumanProgress::stderr()),
            ProgressFormat::Json => Box::new(JsonProgress::stderr()),
            ProgressFormat::Quiet => Box::new(NoProgress),
        }
    }
}

/// Feed every event from `events` to `reporter` until the sender side closes
///
/// Returns the number of events seen.
pub async fn consume(mut events: UnboundedReceiver<RunEvent>, mut reporter: Box<dyn ProgressReporter>) -> usize {
    let mut seen = 0;
    while let Some(event) = events.recv().await {
        reporter.report(&event);
        seen += 1;
    }
    seen
}
