//! Integrator configuration.

use arbor_model::{Error, Result};
use serde::{Deserialize, Serialize};

/// Embedded Runge-Kutta pair used for stepping and error estimation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    /// Kutta-Merson: five stages, 4th order with an embedded error estimate.
    #[default]
    Merson,
    /// Cash-Karp: six stages, 5th order propagated with an embedded 4th order.
    CashKarp,
}

/// Settings for [`Integrator`](crate::Integrator) and [`TimeStepper`](crate::TimeStepper).
///
/// Missing fields take their defaults when deserialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntegratorConfig {
    pub method: Method,
    /// Relative and absolute local error bound per step.
    pub accuracy: f64,
    /// Simulated time between reporter calls.
    pub report_interval: f64,
    /// Smallest step the controller may take before giving up.
    pub min_step: f64,
    pub max_step: f64,
    /// First step tried after initialization.
    pub initial_step: f64,
}

impl Default for IntegratorConfig {
    fn default() -> Self {
        Self {
            method: Method::default(),
            accuracy: 1e-3,
            report_interval: 1.0 / 30.0,
            min_step: 1e-10,
            max_step: 0.1,
            initial_step: 1e-3,
        }
    }
}

impl IntegratorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn with_accuracy(mut self, accuracy: f64) -> Self {
        self.accuracy = accuracy;
        self
    }

    pub fn with_report_interval(mut self, interval: f64) -> Self {
        self.report_interval = interval;
        self
    }

    pub fn with_min_step(mut self, min_step: f64) -> Self {
        self.min_step = min_step;
        self
    }

    pub fn with_max_step(mut self, max_step: f64) -> Self {
        self.max_step = max_step;
        self
    }

    pub fn with_initial_step(mut self, initial_step: f64) -> Self {
        self.initial_step = initial_step;
        self
    }

    /// Reject non-positive or inconsistent settings.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("accuracy", self.accuracy),
            ("report_interval", self.report_interval),
            ("min_step", self.min_step),
            ("max_step", self.max_step),
            ("initial_step", self.initial_step),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(Error::InvalidParameter(format!(
                    "{name} must be positive and finite, got {value}"
                )));
            }
        }
        if self.min_step > self.max_step {
            return Err(Error::InvalidParameter(format!(
                "min_step {} exceeds max_step {}",
                self.min_step, self.max_step
            )));
        }
        Ok(())
    }
}
