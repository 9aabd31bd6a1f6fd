//! Adaptive embedded Runge-Kutta integrator over a multibody state.
//!
//! Solves `dq/dt = u`, `du/dt = udot(q, u, t)`, where each evaluation of the
//! right-hand side realizes a scratch state through Dynamics.

use crate::config::IntegratorConfig;
use crate::controller::StepController;
use crate::tableau::Tableau;
use arbor_math::DVec;
use arbor_model::{Error, Result, Stage, State};
use arbor_rigid::MultibodySystem;

/// Counters kept across a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IntegratorStats {
    pub accepted_steps: u64,
    pub rejected_steps: u64,
    /// Number of Dynamics realizations performed for derivative evaluation.
    pub derivative_evaluations: u64,
}

/// Result of one accepted step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepInfo {
    /// Time at the start of the step.
    pub start: f64,
    /// Size of the accepted step.
    pub step: f64,
    /// Normalized error estimate (1.0 means exactly at tolerance).
    pub error: f64,
}

type Derivative = (DVec, DVec);

/// Adaptive integrator owning the current (last accepted) state.
#[derive(Debug, Clone)]
pub struct Integrator {
    system: MultibodySystem,
    config: IntegratorConfig,
    tableau: &'static Tableau,
    controller: StepController,
    state: State,
    // Scratch state for derivative evaluations.
    work: State,
    // Derivative at the current state; reused across rejected attempts.
    start_derivative: Option<Derivative>,
    next_step: f64,
    stats: IntegratorStats,
}

impl Integrator {
    pub fn new(system: MultibodySystem, config: IntegratorConfig) -> Result<Self> {
        config.validate()?;
        let tableau = config.method.tableau();
        let state = system.default_state()?;
        Ok(Self {
            controller: StepController::for_order(tableau.order),
            work: state.clone(),
            state,
            next_step: config.initial_step,
            start_derivative: None,
            stats: IntegratorStats::default(),
            tableau,
            config,
            system,
        })
    }

    /// Start from `state`, which must belong to this integrator's tree.
    ///
    /// Resets step-size history and statistics.
    pub fn initialize(&mut self, mut state: State) -> Result<()> {
        self.system.realize(&mut state, Stage::Velocity)?;
        self.work = state.clone();
        self.state = state;
        self.controller.reset();
        self.next_step = self.config.initial_step.min(self.config.max_step);
        self.start_derivative = None;
        self.stats = IntegratorStats::default();

        tracing::debug!(
            time = self.state.time(),
            method = self.tableau.name,
            accuracy = self.config.accuracy,
            "integrator initialized"
        );
        Ok(())
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn time(&self) -> f64 {
        self.state.time()
    }

    pub fn system(&self) -> &MultibodySystem {
        &self.system
    }

    pub fn config(&self) -> &IntegratorConfig {
        &self.config
    }

    pub fn stats(&self) -> IntegratorStats {
        self.stats
    }

    /// Step size the controller will try next.
    pub fn next_step(&self) -> f64 {
        self.next_step
    }

    /// Realize the current state through `stage`.
    pub fn realize(&mut self, stage: Stage) -> Result<()> {
        self.system.realize(&mut self.state, stage)
    }

    /// Take one accepted step without passing `t_max`.
    ///
    /// A step that would pass `t_max` is shortened to land on it exactly.
    /// Rejected attempts are retried with smaller steps; if a step at or
    /// below the minimum size is rejected the state is left at the last
    /// accepted point and [`Error::NumericalNonConvergence`] is returned.
    pub fn step(&mut self, t_max: f64) -> Result<StepInfo> {
        let t0 = self.state.time();
        if t_max.is_nan() || t_max <= t0 {
            return Err(Error::InvalidParameter(format!(
                "step target {t_max} is not after current time {t0}"
            )));
        }

        loop {
            let planned = self.next_step.clamp(self.config.min_step, self.config.max_step);
            let remaining = t_max - t0;
            let lands = planned >= remaining;
            let h = if lands { remaining } else { planned };

            let (q1, u1, error) = self.attempt(h)?;
            let decision = self.controller.judge(h, error);

            if decision.accept {
                let t1 = if lands { t_max } else { t0 + h };
                if t1 <= t0 {
                    tracing::warn!(time = t0, step = h, "step size below time resolution");
                    return Err(Error::NumericalNonConvergence {
                        time: t0,
                        step: h,
                        error,
                    });
                }
                let next = decision.next_step.clamp(self.config.min_step, self.config.max_step);
                // A step cut short to land on t_max says nothing about the
                // natural step size; keep the larger of the two.
                self.next_step = if lands { next.max(self.next_step) } else { next };

                self.state.set_q_vector(&q1)?;
                self.state.set_u_vector(&u1)?;
                self.state.set_time(t1);
                self.start_derivative = None;
                self.stats.accepted_steps += 1;

                tracing::trace!(time = t0, step = h, error, "step accepted");
                return Ok(StepInfo {
                    start: t0,
                    step: h,
                    error,
                });
            }

            self.stats.rejected_steps += 1;
            tracing::trace!(time = t0, step = h, error, "step rejected");

            if h <= self.config.min_step {
                tracing::warn!(
                    time = t0,
                    step = h,
                    error,
                    "error above tolerance at minimum step size"
                );
                return Err(Error::NumericalNonConvergence {
                    time: t0,
                    step: h,
                    error,
                });
            }
            self.next_step = decision.next_step.max(self.config.min_step);
        }
    }

    /// One embedded RK attempt of size `h` from the current state.
    fn attempt(&mut self, h: f64) -> Result<(DVec, DVec, f64)> {
        let t0 = self.state.time();
        let q0 = self.state.q().clone();
        let u0 = self.state.u().clone();
        let tab = self.tableau;

        let first = match self.start_derivative.take() {
            Some(d) => d,
            None => self.derivative(t0, &q0, &u0)?,
        };
        let mut kq = Vec::with_capacity(tab.stages());
        let mut ku = Vec::with_capacity(tab.stages());
        kq.push(first.0);
        ku.push(first.1);

        for stage in 1..tab.stages() {
            let mut q = q0.clone();
            let mut u = u0.clone();
            for (j, &a) in tab.a[stage].iter().enumerate() {
                if a != 0.0 {
                    q.axpy(h * a, &kq[j], 1.0);
                    u.axpy(h * a, &ku[j], 1.0);
                }
            }
            let (dq, du) = self.derivative(t0 + tab.c[stage] * h, &q, &u)?;
            kq.push(dq);
            ku.push(du);
        }
        self.start_derivative = Some((kq[0].clone(), ku[0].clone()));

        let mut q1 = q0.clone();
        let mut u1 = u0.clone();
        let mut eq = DVec::zeros(q0.len());
        let mut eu = DVec::zeros(u0.len());
        for stage in 0..tab.stages() {
            q1.axpy(h * tab.b[stage], &kq[stage], 1.0);
            u1.axpy(h * tab.b[stage], &ku[stage], 1.0);
            eq.axpy(h * tab.e[stage], &kq[stage], 1.0);
            eu.axpy(h * tab.e[stage], &ku[stage], 1.0);
        }

        let error = error_norm(self.config.accuracy, &eq, &q0, &q1)
            .max(error_norm(self.config.accuracy, &eu, &u0, &u1));
        Ok((q1, u1, error))
    }

    fn derivative(&mut self, t: f64, q: &DVec, u: &DVec) -> Result<Derivative> {
        self.work.set_time(t);
        self.work.set_q_vector(q)?;
        self.work.set_u_vector(u)?;
        self.system.realize(&mut self.work, Stage::Dynamics)?;
        self.stats.derivative_evaluations += 1;
        Ok((u.clone(), self.work.udot()?.clone()))
    }
}

/// Largest error component relative to `accuracy · (1 + |y|)`.
fn error_norm(accuracy: f64, err: &DVec, y0: &DVec, y1: &DVec) -> f64 {
    err.iter()
        .zip(y0.iter().zip(y1.iter()))
        .map(|(e, (a, b))| e.abs() / (accuracy * (1.0 + a.abs().max(b.abs()))))
        .fold(0.0, f64::max)
}
