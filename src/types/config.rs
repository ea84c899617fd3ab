//! Simulation timing and outcome configuration

use std::time::Duration;
use tracing::warn;

/// Configuration for a simulation run
///
/// Controls the simulated delays the engine and message simulator wait
/// through, and the probability that a send attempt succeeds.
#[derive(Clone, Debug, PartialEq)]
pub struct SimulationConfig {
    /// Pause before a record without an attachment is failed
    pub preparation_delay: Duration,
    /// Simulated attachment upload time
    pub upload_delay: Duration,
    /// Simulated network latency of a send attempt
    pub send_latency: Duration,
    /// Probability in `[0, 1]` that a send attempt succeeds
    pub success_probability: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            preparation_delay: Duration::from_millis(500),
            upload_delay: Duration::from_millis(1000),
            send_latency: Duration::from_millis(2000),
            success_probability: 0.95,
        }
    }
}

impl SimulationConfig {
    /// Create a new SimulationConfig with custom values
    ///
    /// A success probability that is NaN or outside `[0, 1]` falls back to
    /// the default with a warning.
    pub fn new(
        preparation_delay: Duration,
        upload_delay: Duration,
        send_latency: Duration,
        success_probability: f64,
    ) -> Self {
        let default = Self::default();

        let success_probability = if (0.0..=1.0).contains(&success_probability) {
            success_probability
        } else {
            warn!(
                requested = success_probability,
                fallback = default.success_probability,
                "invalid success probability, using default"
            );
            default.success_probability
        };

        Self {
            preparation_delay,
            upload_delay,
            send_latency,
            success_probability,
        }
    }
}
