//! Time stepper: drives the integrator and reports at fixed intervals.

use crate::config::IntegratorConfig;
use crate::integrator::{Integrator, IntegratorStats};
use crate::reporter::{NullReporter, Reporter};
use arbor_model::{Error, Result, Stage, State};
use arbor_rigid::MultibodySystem;

/// Advances a state to requested times, calling a [`Reporter`] at
/// `t0 + k · report_interval` for k = 0, 1, 2, ...
///
/// Integrator steps are shortened to land exactly on each report time, so
/// reported states are integrated states, not interpolants.
#[derive(Debug)]
pub struct TimeStepper<R = NullReporter> {
    integrator: Integrator,
    reporter: R,
    start_time: f64,
    reports: u64,
    initialized: bool,
}

impl TimeStepper<NullReporter> {
    pub fn new(system: MultibodySystem, config: IntegratorConfig) -> Result<Self> {
        Self::with_reporter(system, config, NullReporter)
    }
}

impl<R: Reporter> TimeStepper<R> {
    pub fn with_reporter(
        system: MultibodySystem,
        config: IntegratorConfig,
        reporter: R,
    ) -> Result<Self> {
        Ok(Self {
            integrator: Integrator::new(system, config)?,
            reporter,
            start_time: 0.0,
            reports: 0,
            initialized: false,
        })
    }

    /// Start from `state` and report it immediately.
    pub fn initialize(&mut self, state: State) -> Result<()> {
        self.start_time = state.time();
        self.integrator.initialize(state)?;
        self.reports = 0;
        self.initialized = true;
        self.report()
    }

    /// Integrate forward to `target`, reporting at every interval boundary on
    /// the way. On [`Error::NumericalNonConvergence`] the state stays at the
    /// last accepted step.
    pub fn step_to(&mut self, target: f64) -> Result<()> {
        if !self.initialized {
            return Err(Error::InvalidParameter(
                "time stepper used before initialize".to_string(),
            ));
        }
        let now = self.integrator.time();
        if target.is_nan() || target < now {
            return Err(Error::InvalidParameter(format!(
                "cannot step back from t={now} to t={target}"
            )));
        }

        while self.integrator.time() < target {
            let next_report = self.next_report_time();
            let stop = target.min(next_report);
            self.integrator.step(stop)?;
            if self.integrator.time() >= next_report {
                self.report()?;
            }
        }
        Ok(())
    }

    /// Current (last accepted) state.
    pub fn state(&self) -> &State {
        self.integrator.state()
    }

    pub fn time(&self) -> f64 {
        self.integrator.time()
    }

    /// Realize the current state through `stage`, e.g. to query poses after
    /// stopping between report times.
    pub fn realize(&mut self, stage: Stage) -> Result<()> {
        self.integrator.realize(stage)
    }

    pub fn integrator(&self) -> &Integrator {
        &self.integrator
    }

    pub fn stats(&self) -> IntegratorStats {
        self.integrator.stats()
    }

    /// Number of reports delivered since the last `initialize`.
    pub fn report_count(&self) -> u64 {
        self.reports
    }

    pub fn reporter(&self) -> &R {
        &self.reporter
    }

    pub fn reporter_mut(&mut self) -> &mut R {
        &mut self.reporter
    }

    pub fn into_reporter(self) -> R {
        self.reporter
    }

    fn next_report_time(&self) -> f64 {
        // Multiples of the interval from the start time, so round-off does
        // not accumulate across reports.
        self.start_time + self.reports as f64 * self.integrator.config().report_interval
    }

    fn report(&mut self) -> Result<()> {
        self.integrator.realize(Stage::Velocity)?;
        self.reporter.report(self.integrator.state());
        self.reports += 1;
        Ok(())
    }
}
