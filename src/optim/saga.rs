//! # SAGA Solver
//!
//! Stochastic average gradient "augmented" (Defazio, Bach & Lacoste-Julien,
//! NIPS 2014) for `min (1/n) Σ f_i(x) + g(x)`.
//!
//! Each step samples `i`, evaluates `∇f_i(x)` and moves along
//!
//! ```text
//! d = ∇f_i(x) − memory[i] + mean(memory)
//! x ← prox_g(x − η d, η)
//! ```
//!
//! before storing `∇f_i(x)` as the new `memory[i]`. `d` is an unbiased
//! estimate of `∇f(x)` whose variance vanishes as the memory catches up.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use ndarray::{Array1, ArrayView1};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::config::{SagaConfig, VarianceReduction};
use super::memory::GradientMemory;
use super::sampler::RandomSampler;
use super::stopping::StoppingCriterion;
use super::variance::VarianceReductionTracker;
use crate::error::{Result, SolverError};
use crate::model::GeneralizedLinear;
use crate::prox::Prox;
use crate::utils::history::{History, HistoryEntry, Recorder};

// --- Lifecycle ---

/// `Uninitialized → Ready → Running → {Converged | MaxIterReached | Diverged | Cancelled}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverState {
    /// Model or prox still missing.
    Uninitialized,
    Ready,
    Running,
    Converged,
    MaxIterReached,
    Diverged,
    Cancelled,
}

impl SolverState {
    /// States from which `solve` may start.
    pub fn can_solve(&self) -> bool {
        !matches!(self, SolverState::Uninitialized | SolverState::Running)
    }
}

/// How a solve ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    Converged,
    MaxIterReached,
    Diverged,
    Cancelled,
}

impl From<SolveStatus> for SolverState {
    fn from(status: SolveStatus) -> Self {
        match status {
            SolveStatus::Converged => SolverState::Converged,
            SolveStatus::MaxIterReached => SolverState::MaxIterReached,
            SolveStatus::Diverged => SolverState::Diverged,
            SolveStatus::Cancelled => SolverState::Cancelled,
        }
    }
}

/// Where and why a solve was halted on non-finite values.
#[derive(Debug, Clone, PartialEq)]
pub struct Divergence {
    /// 1-based epoch in which the problem appeared.
    pub epoch: usize,
    /// Step index within that epoch (equal to the epoch size when detected at the boundary).
    pub step: usize,
    pub reason: String,
}

#[derive(Debug, Clone)]
pub struct SolveReport {
    /// Phase iterate of the last completed epoch with a finite objective.
    pub solution: Array1<f64>,
    /// Objective value at `solution`.
    pub objective: f64,
    /// Completed epochs.
    pub epochs: usize,
    /// Committed steps over the whole solve.
    pub steps: usize,
    pub status: SolveStatus,
    pub divergence: Option<Divergence>,
    pub elapsed: Duration,
}

impl SolveReport {
    pub fn converged(&self) -> bool {
        self.status == SolveStatus::Converged
    }
}

/// The variance-reduced SAGA direction `fresh − cached + average`.
///
/// `cached` and `average` must be read from the memory *before* it is updated
/// with `fresh`.
pub fn variance_reduced_direction(
    fresh: ArrayView1<f64>,
    cached: ArrayView1<f64>,
    average: ArrayView1<f64>,
) -> Array1<f64> {
    let mut direction = Array1::zeros(fresh.len());
    variance_reduced_direction_into(&mut direction, fresh, cached, average);
    direction
}

/// [`variance_reduced_direction`] written into `out`.
pub fn variance_reduced_direction_into(
    out: &mut Array1<f64>,
    fresh: ArrayView1<f64>,
    cached: ArrayView1<f64>,
    average: ArrayView1<f64>,
) {
    out.assign(&fresh);
    *out -= &cached;
    *out += &average;
}

fn all_finite(x: &Array1<f64>) -> bool {
    x.iter().all(|v| v.is_finite())
}

/// Generators for the sampler and the tracker, both derived from one seed.
fn component_rngs(seed: Option<u64>) -> (StdRng, StdRng) {
    let mut master = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let sampler_rng = StdRng::seed_from_u64(master.gen());
    let tracker_rng = StdRng::seed_from_u64(master.gen());
    (sampler_rng, tracker_rng)
}

// --- Solver ---

pub struct Saga {
    config: SagaConfig,
    model: Option<Arc<dyn GeneralizedLinear>>,
    prox: Option<Arc<dyn Prox>>,
    state: SolverState,
    // Resolved against the attached model by `set_model`
    step: Option<f64>,
    epoch_size: usize,
    iterate: Array1<f64>,
    solution: Option<Array1<f64>>,
    memory: Option<GradientMemory>,
    history: History,
    n_steps: usize,
    cancel: Option<Arc<AtomicBool>>,
}

impl std::fmt::Debug for Saga {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Saga")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("step", &self.step)
            .field("epoch_size", &self.epoch_size)
            .field("n_steps", &self.n_steps)
            .finish()
    }
}

impl Saga {
    /// Creates a solver from a validated configuration.
    pub fn new(config: SagaConfig) -> Result<Self> {
        config.validate()?;
        Ok(Saga {
            step: config.step,
            config,
            model: None,
            prox: None,
            state: SolverState::Uninitialized,
            epoch_size: 0,
            iterate: Array1::zeros(0),
            solution: None,
            memory: None,
            history: History::new(),
            n_steps: 0,
            cancel: None,
        })
    }

    // --- Collaborators ---

    /// Attaches the model, resolving the epoch size and the step size against it.
    ///
    /// Fails without modifying the solver when the model cannot drive SAGA, or
    /// when no step was configured and the model has no Lipschitz estimate.
    pub fn set_model<M: GeneralizedLinear + 'static>(&mut self, model: Arc<M>) -> Result<&mut Self> {
        self.set_model_dyn(model)
    }

    pub fn set_model_dyn(&mut self, model: Arc<dyn GeneralizedLinear>) -> Result<&mut Self> {
        let n_samples = model.n_samples();
        let n_coeffs = model.n_coeffs();
        if n_samples == 0 {
            return Err(SolverError::IncompatibleModel("model has no samples".into()));
        }
        if n_coeffs == 0 {
            return Err(SolverError::IncompatibleModel("model has no coefficients".into()));
        }
        let features = model.features();
        if features.nrows() != n_samples || model.labels().len() != n_samples {
            return Err(SolverError::IncompatibleModel(format!(
                "model reports {} samples but holds {} feature rows and {} labels",
                n_samples,
                features.nrows(),
                model.labels().len()
            )));
        }
        if features.ncols() != model.n_features() {
            return Err(SolverError::IncompatibleModel(format!(
                "model reports {} features but its feature matrix has {} columns",
                model.n_features(),
                features.ncols()
            )));
        }

        let step = match self.config.step {
            Some(step) => step,
            None => match model.lipschitz_max() {
                Some(l) if l.is_finite() && l > 0.0 => 1.0 / (3.0 * l),
                _ => {
                    return Err(SolverError::Configuration(
                        "step is unset and the model provides no usable Lipschitz estimate".into(),
                    ))
                }
            },
        };

        self.epoch_size = self.config.resolved_epoch_size(n_samples);
        self.step = Some(step);
        self.iterate = Array1::zeros(n_coeffs);
        self.solution = None;
        self.memory = None;
        self.n_steps = 0;
        self.model = Some(model);
        self.refresh_state();
        debug!(
            "SAGA model attached: n_samples={}, n_coeffs={}, step={:.3e}, epoch_size={}",
            n_samples, n_coeffs, step, self.epoch_size
        );
        Ok(self)
    }

    /// Attaches the proximal operator of the regularizer.
    pub fn set_prox<P: Prox + 'static>(&mut self, prox: P) -> &mut Self {
        self.set_prox_dyn(Arc::new(prox))
    }

    pub fn set_prox_dyn(&mut self, prox: Arc<dyn Prox>) -> &mut Self {
        self.prox = Some(prox);
        self.refresh_state();
        self
    }

    /// Changes how the phase iterate is built; takes effect at the next solve.
    pub fn set_variance_reduction(&mut self, strategy: VarianceReduction) -> &mut Self {
        self.config.variance_reduction = strategy;
        self
    }

    /// Same as [`Saga::set_variance_reduction`] from `"last"`, `"avg"` or `"rand"`.
    /// An unknown name leaves the strategy unchanged.
    pub fn set_variance_reduction_str(&mut self, name: &str) -> Result<&mut Self> {
        let strategy: VarianceReduction = name.parse()?;
        Ok(self.set_variance_reduction(strategy))
    }

    /// Flag polled at every epoch boundary; raising it ends the solve.
    pub fn set_cancel_flag(&mut self, flag: Arc<AtomicBool>) -> &mut Self {
        self.cancel = Some(flag);
        self
    }

    fn refresh_state(&mut self) {
        self.state = if self.model.is_some() && self.prox.is_some() {
            SolverState::Ready
        } else {
            SolverState::Uninitialized
        };
    }

    // --- Accessors ---

    pub fn config(&self) -> &SagaConfig {
        &self.config
    }

    pub fn state(&self) -> SolverState {
        self.state
    }

    pub fn variance_reduction(&self) -> VarianceReduction {
        self.config.variance_reduction
    }

    /// Step size in use, once resolved.
    pub fn step(&self) -> Option<f64> {
        self.step
    }

    /// Steps per epoch; zero until a model is attached.
    pub fn epoch_size(&self) -> usize {
        self.epoch_size
    }

    /// Current SAGA iterate (last committed step).
    pub fn iterate(&self) -> ArrayView1<'_, f64> {
        self.iterate.view()
    }

    /// Solution of the last solve, if any.
    pub fn solution(&self) -> Option<ArrayView1<'_, f64>> {
        self.solution.as_ref().map(|s| s.view())
    }

    /// History of the last [`Saga::solve`].
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Steps committed by the last solve.
    pub fn n_steps(&self) -> usize {
        self.n_steps
    }

    /// Gradient memory left by the last solve.
    pub fn memory(&self) -> Option<&GradientMemory> {
        self.memory.as_ref()
    }

    /// `f(x) + g(x)` with the attached collaborators.
    pub fn objective(&self, coeffs: ArrayView1<f64>) -> Result<f64> {
        let (model, prox) = self.collaborators()?;
        Ok(model.loss(coeffs) + prox.value(coeffs))
    }

    fn collaborators(&self) -> Result<(Arc<dyn GeneralizedLinear>, Arc<dyn Prox>)> {
        match (&self.model, &self.prox) {
            (Some(model), Some(prox)) => Ok((Arc::clone(model), Arc::clone(prox))),
            (None, Some(_)) => Err(SolverError::UninitializedSolver("no model attached, call set_model first".into())),
            (Some(_), None) => Err(SolverError::UninitializedSolver("no prox attached, call set_prox first".into())),
            (None, None) => Err(SolverError::UninitializedSolver(
                "no model and no prox attached, call set_model and set_prox first".into(),
            )),
        }
    }

    // --- Solving ---

    /// Runs SAGA from `x0` (zeros when `None`), recording into [`Saga::history`].
    ///
    /// The previous history is kept when the call is rejected before running.
    pub fn solve(&mut self, x0: Option<ArrayView1<f64>>) -> Result<SolveReport> {
        let (model, prox, x0) = self.prepare(x0)?;
        let mut history = std::mem::take(&mut self.history);
        history.clear();
        let result = self.launch(model, prox, x0, &mut history);
        self.history = history;
        result
    }

    /// Runs SAGA from `x0`, sending history entries to `recorder`.
    pub fn solve_recorded(&mut self, x0: Option<ArrayView1<f64>>, recorder: &mut dyn Recorder) -> Result<SolveReport> {
        let (model, prox, x0) = self.prepare(x0)?;
        self.launch(model, prox, x0, recorder)
    }

    fn prepare(
        &self,
        x0: Option<ArrayView1<f64>>,
    ) -> Result<(Arc<dyn GeneralizedLinear>, Arc<dyn Prox>, Array1<f64>)> {
        let (model, prox) = self.collaborators()?;
        if !self.state.can_solve() {
            return Err(SolverError::UninitializedSolver(format!("cannot solve from state {:?}", self.state)));
        }
        let dim = model.n_coeffs();
        let x0 = match x0 {
            Some(x) if x.len() == dim => x.to_owned(),
            Some(x) => {
                return Err(SolverError::ShapeMismatch {
                    expected: vec![dim],
                    got: vec![x.len()],
                })
            }
            None => Array1::zeros(dim),
        };
        Ok((model, prox, x0))
    }

    fn launch(
        &mut self,
        model: Arc<dyn GeneralizedLinear>,
        prox: Arc<dyn Prox>,
        x0: Array1<f64>,
        recorder: &mut dyn Recorder,
    ) -> Result<SolveReport> {
        self.state = SolverState::Running;
        debug!("SAGA state -> Running");
        let result = self.run(model.as_ref(), prox.as_ref(), x0, recorder);
        self.state = match &result {
            Ok(report) => report.status.into(),
            Err(_) => SolverState::Ready,
        };
        debug!("SAGA state -> {:?}", self.state);
        result
    }

    fn run(
        &mut self,
        model: &dyn GeneralizedLinear,
        prox: &dyn Prox,
        x0: Array1<f64>,
        recorder: &mut dyn Recorder,
    ) -> Result<SolveReport> {
        let start = Instant::now();
        let n = model.n_samples();
        let dim = x0.len();
        let step = self
            .step
            .ok_or_else(|| SolverError::UninitializedSolver("step size has not been resolved".into()))?;
        let epoch_size = self.epoch_size;
        let config = self.config.clone();

        let (sampler_rng, tracker_rng) = component_rngs(config.seed);
        let mut sampler = RandomSampler::from_rng(n, config.rand_type, sampler_rng);
        let mut tracker = VarianceReductionTracker::new(config.variance_reduction, x0.view(), tracker_rng);
        let mut memory = GradientMemory::new(n, dim);
        let criterion = StoppingCriterion::new(config.tol, config.max_iter);
        let objective = |x: ArrayView1<f64>| model.loss(x) + prox.value(x);

        let mut x = x0.clone();
        // Step buffers, reused across the whole solve
        let mut direction = Array1::<f64>::zeros(dim);
        let mut x_unprox = Array1::<f64>::zeros(dim);
        let mut prev_point = x0;
        let mut prev_obj = objective(prev_point.view());
        let mut epochs = 0;
        let mut steps = 0;
        let mut status = SolveStatus::MaxIterReached;
        let mut divergence = None;

        recorder.record(HistoryEntry {
            epoch: 0,
            objective: prev_obj,
            rel_delta: 0.0,
            rel_obj: 0.0,
            iterate: prev_point.clone(),
        });
        if config.verbose {
            info!(
                "Launching the solver SAGA (step={:.3e}, epoch_size={}, rand_type={}, variance_reduction={})",
                step, epoch_size, config.rand_type, config.variance_reduction
            );
            info!("{:>8} | {:>14} | {:>10} | {:>10}", "n_iter", "obj", "rel_delta", "rel_obj");
            info!("{:>8} | {:>14.6e} | {:>10.2e} | {:>10.2e}", 0, prev_obj, 0.0, 0.0);
        }

        if !prev_obj.is_finite() {
            status = SolveStatus::Diverged;
            divergence = Some(Divergence {
                epoch: 0,
                step: 0,
                reason: format!("objective at the initial point is {}", prev_obj),
            });
        }

        'epochs: for epoch in 1..=config.max_iter {
            if status == SolveStatus::Diverged {
                break;
            }
            if self.cancel.as_ref().map_or(false, |flag| flag.load(Ordering::Relaxed)) {
                warn!("SAGA cancelled before epoch {}", epoch);
                status = SolveStatus::Cancelled;
                break;
            }

            for t in 0..epoch_size {
                let i = sampler.next_index();
                let fresh = model.grad_i(i, x.view());
                if fresh.len() != dim {
                    return Err(SolverError::IncompatibleModel(format!(
                        "grad_i returned {} coefficients, expected {}",
                        fresh.len(),
                        dim
                    )));
                }
                // The cached row and the average are read before `memory[i]` changes
                variance_reduced_direction_into(&mut direction, fresh.view(), memory.get(i), memory.average());
                x_unprox.assign(&x);
                x_unprox.scaled_add(-step, &direction);
                let x_new = prox.call(x_unprox.view(), step);

                // Nothing is committed past a non-finite value
                if !all_finite(&fresh) || !all_finite(&x_new) {
                    divergence = Some(Divergence {
                        epoch,
                        step: t,
                        reason: format!("non-finite gradient or iterate at sample {}", i),
                    });
                    status = SolveStatus::Diverged;
                    break 'epochs;
                }

                memory.update(i, fresh)?;
                x = x_new;
                tracker.on_step(x.view());
                steps += 1;
            }

            epochs = epoch;
            let point = tracker.on_epoch_end().to_owned();
            let obj = objective(point.view());
            if !obj.is_finite() {
                divergence = Some(Divergence {
                    epoch,
                    step: epoch_size,
                    reason: format!("objective at the phase iterate is {}", obj),
                });
                status = SolveStatus::Diverged;
                break;
            }

            let check = criterion.check(epoch, prev_point.view(), point.view(), prev_obj, obj);
            let last = check.should_stop();
            if epoch % config.record_every == 0 || last {
                recorder.record(HistoryEntry {
                    epoch,
                    objective: obj,
                    rel_delta: check.rel_delta,
                    rel_obj: check.rel_obj,
                    iterate: point.clone(),
                });
            }
            if config.verbose && (epoch % config.print_every == 0 || last) {
                info!(
                    "{:>8} | {:>14.6e} | {:>10.2e} | {:>10.2e}",
                    epoch, obj, check.rel_delta, check.rel_obj
                );
            }

            prev_point = point;
            prev_obj = obj;
            if check.converged {
                status = SolveStatus::Converged;
                break;
            }
        }

        if let Some(div) = &divergence {
            warn!(
                "SAGA diverged in epoch {} (step {}): {}; returning the last finite phase iterate",
                div.epoch, div.step, div.reason
            );
        }
        let elapsed = start.elapsed();
        if config.verbose {
            info!("Done solving using SAGA in {:.2e} seconds", elapsed.as_secs_f64());
        }

        self.iterate = x;
        self.solution = Some(prev_point.clone());
        self.memory = Some(memory);
        self.n_steps = steps;

        Ok(SolveReport {
            solution: prev_point,
            objective: prev_obj,
            epochs,
            steps,
            status,
            divergence,
            elapsed,
        })
    }
}
