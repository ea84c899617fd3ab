use crate::progress::ProgressFormat;
use crate::types::{InputMode, SimulationConfig};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;
use tracing::Level;

/// Simulate bulk delivery of invoice messages with PDF attachments
#[derive(Parser, Debug)]
#[command(name = "bulk-send-simulator")]
#[command(about = "Simulate bulk delivery of invoice messages with PDF attachments", long_about = None)]
pub struct CliArgs {
    /// Log level for diagnostics on stderr (RUST_LOG takes precedence)
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "warn", global = true)]
    pub log_level: Level,

    /// Emit diagnostics as JSON lines
    #[arg(long = "json-logs", global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a simulation over a customer file or the built-in sample
    Run(RunArgs),
    /// Write a blank input template
    Template(TemplateArgs),
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Input CSV file path containing customer records
    #[arg(
        value_name = "INPUT",
        required_unless_present = "sample",
        conflicts_with = "sample",
        help = "Path to the input CSV file"
    )]
    pub input_file: Option<PathBuf>,

    /// Use the built-in sample customers instead of an input file
    #[arg(long = "sample")]
    pub sample: bool,

    /// Directory whose file names are offered as uploaded attachments
    #[arg(long = "attachments", value_name = "DIR")]
    pub attachment_dirs: Vec<PathBuf>,

    /// A single uploaded attachment name
    #[arg(long = "attach", value_name = "NAME")]
    pub attach: Vec<String>,

    /// Write the results report here instead of stdout
    #[arg(long = "output", short = 'o', value_name = "FILE")]
    pub output: Option<PathBuf>,

    #[arg(
        long = "pacing",
        value_name = "PACING",
        default_value = "realtime",
        help = "Pacing: 'realtime' waits out every delay, 'instant' advances a virtual clock"
    )]
    pub pacing: PacingMode,

    /// Seed for send outcomes; omit for a fresh random stream
    #[arg(long = "seed", value_name = "N")]
    pub seed: Option<u64>,

    #[arg(
        long = "success-rate",
        value_name = "P",
        help = "Probability that a send succeeds (default: 0.95, range: 0-1)"
    )]
    pub success_rate: Option<f64>,

    #[arg(long = "latency-ms", value_name = "MS", help = "Simulated send latency (default: 2000)")]
    pub latency_ms: Option<u64>,

    #[arg(
        long = "upload-delay-ms",
        value_name = "MS",
        help = "Simulated attachment upload time (default: 1000)"
    )]
    pub upload_delay_ms: Option<u64>,

    #[arg(
        long = "prepare-delay-ms",
        value_name = "MS",
        help = "Pause before failing a record without attachment (default: 500)"
    )]
    pub prepare_delay_ms: Option<u64>,

    #[arg(long = "progress", value_name = "FORMAT", default_value = "human")]
    pub progress: ProgressFormat,
}

#[derive(Args, Debug)]
pub struct TemplateArgs {
    /// Which column set to write
    #[arg(long = "mode", value_name = "MODE", default_value = "invoice")]
    pub mode: TemplateMode,

    /// Write the template here instead of stdout
    #[arg(long = "output", short = 'o', value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// How simulated delays are waited out
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum PacingMode {
    Realtime,
    Instant,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum TemplateMode {
    Invoice,
    Document,
}

impl From<TemplateMode> for InputMode {
    fn from(mode: TemplateMode) -> Self {
        match mode {
            TemplateMode::Invoice => InputMode::Invoice,
            TemplateMode::Document => InputMode::Document,
        }
    }
}

impl RunArgs {
    /// Create a SimulationConfig from CLI arguments
    ///
    /// Values not given on the command line fall back to the defaults; an
    /// out-of-range success rate falls back with a warning.
    pub fn to_simulation_config(&self) -> SimulationConfig {
        let default = SimulationConfig::default();
        let millis = |value: Option<u64>, fallback: Duration| value.map(Duration::from_millis).unwrap_or(fallback);

        if self.success_rate.is_none()
            && self.latency_ms.is_none()
            && self.upload_delay_ms.is_none()
            && self.prepare_delay_ms.is_none()
        {
            return default;
        }

        SimulationConfig::new(
            millis(self.prepare_delay_ms, default.preparation_delay),
            millis(self.upload_delay_ms, default.upload_delay),
            millis(self.latency_ms, default.send_latency),
            self.success_rate.unwrap_or(default.success_probability),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn run_args(args: &[&str]) -> RunArgs {
        match CliArgs::try_parse_from(args).unwrap().command {
            Command::Run(run) => run,
            other => panic!("expected run, got {:?}", other),
        }
    }

    #[rstest]
    #[case::input_file(&["program", "run", "customers.csv"], Some("customers.csv"), false)]
    #[case::sample(&["program", "run", "--sample"], None, true)]
    fn test_input_source(#[case] args: &[&str], #[case] input: Option<&str>, #[case] sample: bool) {
        let parsed = run_args(args);
        assert_eq!(parsed.input_file, input.map(PathBuf::from));
        assert_eq!(parsed.sample, sample);
    }

    #[rstest]
    #[case::neither(&["program", "run"])]
    #[case::both(&["program", "run", "--sample", "customers.csv"])]
    #[case::bad_pacing(&["program", "run", "--sample", "--pacing", "fast"])]
    #[case::bad_progress(&["program", "run", "--sample", "--progress", "loud"])]
    #[case::no_subcommand(&["program"])]
    fn test_rejected_arguments(#[case] args: &[&str]) {
        assert!(CliArgs::try_parse_from(args).is_err());
    }

    #[test]
    fn test_defaults() {
        let parsed = CliArgs::try_parse_from(["program", "run", "--sample"]).unwrap();
        assert_eq!(parsed.log_level, Level::WARN);
        assert!(!parsed.json_logs);

        let Command::Run(run) = parsed.command else {
            panic!("expected run");
        };
        assert_eq!(run.pacing, PacingMode::Realtime);
        assert_eq!(run.progress, ProgressFormat::Human);
        assert!(run.attachment_dirs.is_empty());
        assert!(run.attach.is_empty());
        assert_eq!(run.to_simulation_config(), SimulationConfig::default());
    }

    #[test]
    fn test_repeatable_attachment_flags() {
        let run = run_args(&[
            "program", "run", "--sample", "--attach", "INV-001.pdf", "--attach", "INV-002.pdf",
            "--attachments", "uploads", "--attachments", "more",
        ]);
        assert_eq!(run.attach, vec!["INV-001.pdf", "INV-002.pdf"]);
        assert_eq!(run.attachment_dirs, vec![PathBuf::from("uploads"), PathBuf::from("more")]);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let parsed =
            CliArgs::try_parse_from(["program", "run", "--sample", "--log-level", "debug", "--json-logs"])
                .unwrap();
        assert_eq!(parsed.log_level, Level::DEBUG);
        assert!(parsed.json_logs);
    }

    #[rstest]
    #[case::latency(&["program", "run", "--sample", "--latency-ms", "10"], 500, 1000, 10, 0.95)]
    #[case::all_custom(
        &["program", "run", "--sample", "--prepare-delay-ms", "1", "--upload-delay-ms", "2", "--latency-ms", "3", "--success-rate", "0.5"],
        1,
        2,
        3,
        0.5
    )]
    #[case::rate_out_of_range(&["program", "run", "--sample", "--success-rate", "1.5"], 500, 1000, 2000, 0.95)]
    fn test_simulation_config_conversion(
        #[case] args: &[&str],
        #[case] prepare: u64,
        #[case] upload: u64,
        #[case] latency: u64,
        #[case] probability: f64,
    ) {
        let config = run_args(args).to_simulation_config();

        assert_eq!(config.preparation_delay, Duration::from_millis(prepare));
        assert_eq!(config.upload_delay, Duration::from_millis(upload));
        assert_eq!(config.send_latency, Duration::from_millis(latency));
        assert_eq!(config.success_probability, probability);
    }

    #[rstest]
    #[case::default(&["program", "template"], TemplateMode::Invoice)]
    #[case::document(&["program", "template", "--mode", "document"], TemplateMode::Document)]
    fn test_template_mode(#[case] args: &[&str], #[case] expected: TemplateMode) {
        let Command::Template(template) = CliArgs::try_parse_from(args).unwrap().command else {
            panic!("expected template");
        };
        assert_eq!(template.mode, expected);
        assert!(template.output.is_none());
    }
}
