//! Step-size control for the adaptive integrator.

/// PI controller for adaptive step sizes.
///
/// Works on the normalized error norm, where 1.0 means the step exactly met
/// the requested accuracy:
/// h_new = h · safety · (1/err)^α · err_prev^β
///
/// With k = order + 1, α = 0.7/k and β = 0.4/k.
#[derive(Debug, Clone)]
pub struct StepController {
    /// Safety factor applied to every proposal.
    pub safety: f64,
    /// Proportional exponent.
    pub alpha: f64,
    /// Integral exponent.
    pub beta: f64,
    /// Largest shrink per step.
    pub min_factor: f64,
    /// Largest growth per step.
    pub max_factor: f64,
    prev_error: f64,
    rejected_last: bool,
}

/// Outcome of judging one attempted step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepDecision {
    pub accept: bool,
    /// Step size to try next (after this one, or instead of it on rejection).
    pub next_step: f64,
}

impl StepController {
    /// Controller tuned for an error estimate of the given order.
    pub fn for_order(order: u32) -> Self {
        let k = f64::from(order + 1);
        Self {
            safety: 0.9,
            alpha: 0.7 / k,
            beta: 0.4 / k,
            min_factor: 0.1,
            max_factor: 5.0,
            prev_error: 1.0,
            rejected_last: false,
        }
    }

    /// Judge a step of size `h` with normalized error `error`.
    pub fn judge(&mut self, h: f64, error: f64) -> StepDecision {
        if !error.is_finite() {
            self.rejected_last = true;
            return StepDecision {
                accept: false,
                next_step: h * self.min_factor,
            };
        }

        let accept = error <= 1.0;
        let error = error.max(1e-10);
        let p_term = error.powf(-self.alpha);
        let factor = if accept {
            let i_term = self.prev_error.powf(self.beta);
            let factor = (self.safety * p_term * i_term).clamp(self.min_factor, self.max_factor);
            // No growth right after a rejection.
            if self.rejected_last { factor.min(1.0) } else { factor }
        } else {
            (self.safety * p_term).clamp(self.min_factor, 1.0)
        };

        if accept {
            self.prev_error = error;
        }
        self.rejected_last = !accept;

        StepDecision {
            accept,
            next_step: h * factor,
        }
    }

    /// Forget error history, e.g. after the state is replaced.
    pub fn reset(&mut self) {
        self.prev_error = 1.0;
        self.rejected_last = false;
    }
}
