//! Callbacks invoked by the time stepper at each reporting instant.

use arbor_math::DVec;
use arbor_model::State;

/// Receives the state at fixed reporting intervals.
///
/// The state is realized at least through Velocity when `report` is called.
pub trait Reporter {
    fn report(&mut self, state: &State);
}

impl<R: Reporter + ?Sized> Reporter for &mut R {
    fn report(&mut self, state: &State) {
        (**self).report(state);
    }
}

impl<R: Reporter + ?Sized> Reporter for Box<R> {
    fn report(&mut self, state: &State) {
        (**self).report(state);
    }
}

/// Reporter that ignores every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn report(&mut self, _state: &State) {}
}

/// Adapter returned by [`from_fn`].
#[derive(Debug, Clone)]
pub struct FnReporter<F>(F);

impl<F: FnMut(&State)> Reporter for FnReporter<F> {
    fn report(&mut self, state: &State) {
        (self.0)(state);
    }
}

/// Wrap a closure as a [`Reporter`].
pub fn from_fn<F: FnMut(&State)>(f: F) -> FnReporter<F> {
    FnReporter(f)
}

/// One recorded point of a trajectory.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub time: f64,
    pub q: DVec,
    pub u: DVec,
}

/// Keeps a copy of time, q and u at every report.
#[derive(Debug, Clone, Default)]
pub struct TrajectoryRecorder {
    samples: Vec<Sample>,
}

impl TrajectoryRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn times(&self) -> impl Iterator<Item = f64> + '_ {
        self.samples.iter().map(|s| s.time)
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

impl Reporter for TrajectoryRecorder {
    fn report(&mut self, state: &State) {
        self.samples.push(Sample {
            time: state.time(),
            q: state.q().clone(),
            u: state.u().clone(),
        });
    }
}
