//! Command execution
//!
//! Wires the library together for the CLI:
//!
//! ```text
//! SimulationRunner
//!     ├── input (file via tokio::fs, or the built-in sample)
//!     ├── attachment names (--attach, --attachments DIR)
//!     ├── SimulationEngine<Pacing, MessageSimulator<Pacing, SeededRandom>>
//!     ├── progress consumer task (RunEvent channel)
//!     └── Ctrl-C watcher (CancellationToken)
//! ```
//!
//! The results report goes to the `--output` file or to the caller's writer.

use crate::cli::{Command, PacingMode, RunArgs, TemplateArgs};
use crate::core::{
    ManualClock, MessageSimulator, Pacing, SeededRandom, Session, SimulationEngine, TokioClock,
};
use crate::io::{list_attachment_names, write_template_csv};
use crate::progress::{self, ProgressFormat};
use crate::types::{BatchStatistics, SenderError, SimulationConfig};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Where the customers come from
#[derive(Debug, Clone, PartialEq)]
pub enum InputSource {
    File(PathBuf),
    Sample,
}

/// Everything a simulation run needs, independent of the CLI parser
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub source: InputSource,
    pub attachment_dirs: Vec<PathBuf>,
    pub attach: Vec<String>,
    pub output: Option<PathBuf>,
    pub pacing: PacingMode,
    pub seed: Option<u64>,
    pub config: SimulationConfig,
    pub progress: ProgressFormat,
    /// Cancel the run on Ctrl-C
    pub handle_interrupt: bool,
}

impl RunOptions {
    /// Instant, seeded, quiet options for the given source
    pub fn instant(source: InputSource) -> Self {
        Self {
            source,
            attachment_dirs: Vec::new(),
            attach: Vec::new(),
            output: None,
            pacing: PacingMode::Instant,
            seed: Some(0),
            config: SimulationConfig::default(),
            progress: ProgressFormat::Quiet,
            handle_interrupt: false,
        }
    }
}

impl From<&RunArgs> for RunOptions {
    fn from(args: &RunArgs) -> Self {
        let source = match &args.input_file {
            Some(path) if !args.sample => InputSource::File(path.clone()),
            _ => InputSource::Sample,
        };
        Self {
            source,
            attachment_dirs: args.attachment_dirs.clone(),
            attach: args.attach.clone(),
            output: args.output.clone(),
            pacing: args.pacing,
            seed: args.seed,
            config: args.to_simulation_config(),
            progress: args.progress,
            handle_interrupt: true,
        }
    }
}

/// Runs one simulation from options to report
#[derive(Debug, Clone)]
pub struct SimulationRunner {
    options: RunOptions,
}

impl SimulationRunner {
    pub fn new(options: RunOptions) -> Self {
        Self { options }
    }

    /// Run the simulation and write the results report
    ///
    /// The report goes to the `output` path from the options when set,
    /// otherwise to `output`.
    ///
    /// # Errors
    ///
    /// Fatal errors only: unreadable input, malformed input, missing
    /// attachment directories, unwritable output or runtime setup failure.
    /// Per-record failures end up in the report.
    pub fn run(&self, output: &mut dyn Write) -> Result<BatchStatistics, SenderError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(|e| SenderError::runtime(format!("failed to create tokio runtime: {}", e)))?;

        runtime.block_on(self.run_async(output))
    }

    async fn run_async(&self, output: &mut dyn Write) -> Result<BatchStatistics, SenderError> {
        let mut session = Session::new();
        match &self.options.source {
            InputSource::Sample => {
                session.load_sample();
            }
            InputSource::File(path) => {
                let text = read_input(path).await?;
                session.load_text(&text)?;
            }
        }

        let names = self.attachment_names().await?;
        let bound = session.bind_attachments(names.as_slice());
        debug!(offered = names.len(), bound, "attachments bound");

        let clock = match self.options.pacing {
            PacingMode::Realtime => Pacing::Realtime(TokioClock),
            PacingMode::Instant => Pacing::Instant(ManualClock::starting_now()),
        };
        let random = match self.options.seed {
            Some(seed) => SeededRandom::new(seed),
            None => SeededRandom::from_entropy(),
        };
        let messenger = MessageSimulator::new(clock.clone(), random, &self.options.config);

        let token = CancellationToken::new();
        let (tx, rx) = mpsc::unbounded_channel();
        let mut engine = SimulationEngine::new(clock, messenger, self.options.config.clone())
            .with_events(tx)
            .with_cancellation(token.clone());

        let reporter = tokio::spawn(progress::consume(rx, self.options.progress.reporter()));
        let watcher = self.options.handle_interrupt.then(|| {
            let token = token.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    info!("interrupt received, stopping before the next record");
                    token.cancel();
                }
            })
        });

        let stats = session.run(&mut engine).await?;

        // closes the event channel so the reporter drains and exits
        drop(engine);
        if let Some(watcher) = watcher {
            watcher.abort();
        }
        reporter.await.map_err(SenderError::runtime)?;

        self.write_report(&session, output).await?;
        Ok(stats)
    }

    async fn attachment_names(&self) -> Result<Vec<String>, SenderError> {
        let mut names = self.options.attach.clone();
        for dir in &self.options.attachment_dirs {
            names.extend(list_attachment_names(dir).await?);
        }
        Ok(names)
    }

    async fn write_report(&self, session: &Session, output: &mut dyn Write) -> Result<(), SenderError> {
        match &self.options.output {
            Some(path) => {
                let mut buffer = Vec::new();
                session.export(&mut buffer)?;
                tokio::fs::write(path, buffer)
                    .await
                    .map_err(|e| SenderError::output(format!("'{}': {}", path.display(), e)))?;
                info!(path = %path.display(), "report written");
                Ok(())
            }
            None => session.export(output),
        }
    }
}

async fn read_input(path: &Path) -> Result<String, SenderError> {
    match tokio::fs::read_to_string(path).await {
        Ok(text) => Ok(text),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(SenderError::file_not_found(path.display().to_string()))
        }
        Err(e) => Err(e.into()),
    }
}

/// Write a blank input template to the given file or to `output`
pub fn write_template(args: &TemplateArgs, output: &mut dyn Write) -> Result<(), SenderError> {
    match &args.output {
        Some(path) => {
            let file = File::create(path)
                .map_err(|e| SenderError::output(format!("'{}': {}", path.display(), e)))?;
            let mut writer = BufWriter::new(file);
            write_template_csv(args.mode.into(), &mut writer)?;
            writer.flush().map_err(SenderError::output)
        }
        None => write_template_csv(args.mode.into(), output),
    }
}

/// Execute a parsed subcommand, writing stdout-bound output to `output`
pub fn execute(command: &Command, output: &mut dyn Write) -> Result<(), SenderError> {
    match command {
        Command::Run(args) => SimulationRunner::new(RunOptions::from(args))
            .run(output)
            .map(|_| ()),
        Command::Template(args) => write_template(args, output),
    }
}
