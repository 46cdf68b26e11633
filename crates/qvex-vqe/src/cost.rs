//! Cost-function facades.
//!
//! A cost function binds together a parametric state-preparation program, a
//! builder that turns the optimizer's parameter vector into register values,
//! an observable and a backend. Everything that does not depend on the
//! parameters is prepared once at construction:
//!
//! | Facade | Precomputed |
//! |--------|-------------|
//! | [`ExactCostFunction`] | addressed program, H and H² as dense matrices |
//! | [`SamplingCostFunction`] | addressed program, commuting groups, one executable per group |
//!
//! Each call to [`CostFunction::evaluate`] then runs the backend, reduces the
//! result to an [`Estimate`], records it if a [`CallRecorder`] is attached,
//! and returns either the mean or the full estimate depending on the
//! [`ExecutionMode`].
//!
//! A facade is not meant to be shared between threads: `evaluate` takes
//! `&mut self` and the attached recorder has a single writer, so concurrent
//! calls on one instance are unsupported.

use ndarray::{Array2, ArrayView2, Axis, concatenate};
use num_complex::Complex64;
use qvex_ir::{Gate, Program, QubitIndex, QubitLabel, QubitMapping, RegisterValues};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::backend::{QuantumComputer, Wavefunction, WavefunctionSimulator};
use crate::config::{CostFunctionConfig, ExecutionMode};
use crate::error::{BackendError, VqeError, VqeResult};
use crate::estimate::{Estimate, add_shot_noise, exact_expectation, sampling_expectation};
use crate::grouping::{CommutingGroup, commuting_decomposition};
use crate::log::{CallRecorder, LogEntry};
use crate::measure::measurement_program;
use crate::pauli::{MAX_DENSE_QUBITS, PauliSum};

/// Builds register values from a parameter vector.
pub type RegisterBuilder = Box<dyn Fn(&[f64]) -> RegisterValues + Send + Sync>;

/// Result of one cost-function call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CostValue {
    /// The mean only ([`ExecutionMode::ScalarShots`]).
    Scalar(f64),
    /// Mean and standard error ([`ExecutionMode::VariableShots`]).
    Estimate(Estimate),
}

impl CostValue {
    /// The estimated expectation value.
    pub fn value(&self) -> f64 {
        match self {
            CostValue::Scalar(v) => *v,
            CostValue::Estimate(e) => e.mean,
        }
    }

    /// The standard error, if it was returned.
    pub fn stderr(&self) -> Option<f64> {
        match self {
            CostValue::Scalar(_) => None,
            CostValue::Estimate(e) => Some(e.stderr),
        }
    }
}

/// A function the optimizer can minimize.
pub trait CostFunction {
    /// Evaluate at `params`.
    ///
    /// `nshots` overrides the configured shot count for this call. In
    /// [`ExecutionMode::VariableShots`] it is required.
    fn evaluate(&mut self, params: &[f64], nshots: Option<u32>) -> VqeResult<CostValue>;

    /// The mode fixed at construction.
    fn mode(&self) -> ExecutionMode;
}

fn record(recorder: &mut Option<Box<dyn CallRecorder>>, params: &[f64], estimate: Estimate) {
    if let Some(recorder) = recorder.as_mut() {
        recorder.record(LogEntry {
            x: params.to_vec(),
            fun: estimate,
        });
    }
}

// =============================================================================
// Exact
// =============================================================================

/// Cost function evaluated exactly on a wavefunction simulator.
pub struct ExactCostFunction<S> {
    program: Program<QubitIndex>,
    make_values: RegisterBuilder,
    ham: Array2<Complex64>,
    ham_sq: Array2<Complex64>,
    sim: S,
    mode: ExecutionMode,
    noise: Option<StdRng>,
    recorder: Option<Box<dyn CallRecorder>>,
}

impl<S: WavefunctionSimulator> ExactCostFunction<S> {
    /// Build from a program and observable over `Q`, addressed through
    /// `mapping`.
    ///
    /// The observable's matrix spans every qubit of the addressed program
    /// and the observable. If the observable reaches beyond the program, the
    /// program is widened with an identity so the simulator returns a state
    /// of matching size.
    pub fn new<Q: QubitLabel>(
        program: &Program<Q>,
        make_values: impl Fn(&[f64]) -> RegisterValues + Send + Sync + 'static,
        hamiltonian: &PauliSum<Q>,
        sim: S,
        mapping: &QubitMapping<Q>,
        config: &CostFunctionConfig,
    ) -> VqeResult<Self> {
        let mode = config.resolve_mode()?;
        let mut program = program.address_qubits(mapping)?;
        let ham = hamiltonian.remap(mapping)?;

        let n_qubits = program.num_qubits().max(ham.min_qubits());
        let matrix = ham.matrix(n_qubits)?;
        if n_qubits > program.num_qubits() {
            program.gate(Gate::I, [QubitIndex(n_qubits as u32 - 1)])?;
        }
        debug!(
            n_qubits,
            num_terms = ham.num_terms(),
            "built exact cost function"
        );

        Self::assemble(program, Box::new(make_values), matrix, sim, config, mode)
    }

    /// Build from an addressed program and a precomputed dense observable.
    ///
    /// The matrix must be square with side `2^n`, where `n` is the program's
    /// register width.
    pub fn from_matrix(
        program: Program<QubitIndex>,
        make_values: impl Fn(&[f64]) -> RegisterValues + Send + Sync + 'static,
        hamiltonian: Array2<Complex64>,
        sim: S,
        config: &CostFunctionConfig,
    ) -> VqeResult<Self> {
        let mode = config.resolve_mode()?;
        Self::assemble(program, Box::new(make_values), hamiltonian, sim, config, mode)
    }

    fn assemble(
        program: Program<QubitIndex>,
        make_values: RegisterBuilder,
        hamiltonian: Array2<Complex64>,
        sim: S,
        config: &CostFunctionConfig,
        mode: ExecutionMode,
    ) -> VqeResult<Self> {
        if hamiltonian.nrows() != hamiltonian.ncols() {
            return Err(VqeError::DimensionMismatch {
                expected: hamiltonian.nrows(),
                got: hamiltonian.ncols(),
            });
        }
        let state_dim = u32::try_from(program.num_qubits())
            .ok()
            .and_then(|n| 1usize.checked_shl(n))
            .ok_or(VqeError::TooManyQubits {
                requested: program.num_qubits(),
                max: MAX_DENSE_QUBITS,
            })?;
        if hamiltonian.nrows() != state_dim {
            return Err(VqeError::DimensionMismatch {
                expected: state_dim,
                got: hamiltonian.nrows(),
            });
        }
        let ham_sq = hamiltonian.dot(&hamiltonian);
        let noise = config.noisy.then(|| match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        });

        Ok(Self {
            program,
            make_values,
            ham: hamiltonian,
            ham_sq,
            sim,
            mode,
            noise,
            recorder: None,
        })
    }

    /// Record every evaluation into `recorder`.
    pub fn with_recorder(mut self, recorder: impl CallRecorder + 'static) -> Self {
        self.recorder = Some(Box::new(recorder));
        self
    }

    /// The state prepared at `params`.
    pub fn wavefunction(&self, params: &[f64]) -> VqeResult<Wavefunction> {
        let values = (self.make_values)(params);
        Ok(self.sim.wavefunction(&self.program, &values)?)
    }

    /// The dense observable.
    pub fn hamiltonian_matrix(&self) -> &Array2<Complex64> {
        &self.ham
    }

    /// The addressed state-preparation program.
    pub fn program(&self) -> &Program<QubitIndex> {
        &self.program
    }
}

impl<S: WavefunctionSimulator> CostFunction for ExactCostFunction<S> {
    fn evaluate(&mut self, params: &[f64], nshots: Option<u32>) -> VqeResult<CostValue> {
        let nshots = self.mode.resolve_shots(nshots)?;
        let wf = self.wavefunction(params)?;

        let mut estimate = exact_expectation(wf.amplitudes().view(), &self.ham, &self.ham_sq, nshots)?;
        if let Some(rng) = self.noise.as_mut() {
            estimate = add_shot_noise(estimate, rng);
        }
        trace!(nshots, mean = estimate.mean, stderr = estimate.stderr, "exact evaluation");

        record(&mut self.recorder, params, estimate);
        Ok(self.mode.present(estimate))
    }

    fn mode(&self) -> ExecutionMode {
        self.mode
    }
}

// =============================================================================
// Sampling
// =============================================================================

/// Cost function estimated from measurement samples.
///
/// The observable is split into qubit-wise commuting groups and each group
/// gets its own measurement program, compiled once with `base_numshots`
/// trials. A call with shot count `n` runs every executable `n` times, so each
/// group sees `base_numshots × n` samples. Identity-only groups are never
/// executed.
pub struct SamplingCostFunction<B: QuantumComputer> {
    make_values: RegisterBuilder,
    hamiltonian: PauliSum<QubitIndex>,
    groups: Vec<CommutingGroup<QubitIndex>>,
    executables: Vec<Option<B::Executable>>,
    qc: B,
    mode: ExecutionMode,
    base_numshots: u32,
    recorder: Option<Box<dyn CallRecorder>>,
}

impl<B: QuantumComputer> SamplingCostFunction<B> {
    /// Build from a program and observable over `Q`, addressed through
    /// `mapping`, compiling one measurement program per commuting group.
    pub fn new<Q: QubitLabel>(
        program: &Program<Q>,
        make_values: impl Fn(&[f64]) -> RegisterValues + Send + Sync + 'static,
        hamiltonian: &PauliSum<Q>,
        qc: B,
        mapping: &QubitMapping<Q>,
        config: &CostFunctionConfig,
    ) -> VqeResult<Self> {
        let mode = config.resolve_mode()?;
        if config.base_numshots == 0 {
            return Err(VqeError::Configuration(
                "base_numshots must be positive".into(),
            ));
        }

        let prep = program.address_qubits(mapping)?;
        let hamiltonian = hamiltonian.remap(mapping)?;
        let groups = commuting_decomposition(&hamiltonian);

        let mut executables = Vec::with_capacity(groups.len());
        for (index, group) in groups.iter().enumerate() {
            let (measured, layout) = measurement_program(&prep, group, config.base_numshots)?;
            if layout.is_empty() {
                debug!(group = index, "identity-only group, not compiled");
                executables.push(None);
                continue;
            }
            debug!(
                group = index,
                terms = group.len(),
                measured_qubits = layout.len(),
                "compiling measurement program"
            );
            executables.push(Some(qc.compile(&measured)?));
        }
        debug!(
            num_terms = hamiltonian.num_terms(),
            num_groups = groups.len(),
            base_numshots = config.base_numshots,
            "built sampling cost function"
        );

        Ok(Self {
            make_values: Box::new(make_values),
            hamiltonian,
            groups,
            executables,
            qc,
            mode,
            base_numshots: config.base_numshots,
            recorder: None,
        })
    }

    /// Record every evaluation into `recorder`.
    pub fn with_recorder(mut self, recorder: impl CallRecorder + 'static) -> Self {
        self.recorder = Some(Box::new(recorder));
        self
    }

    /// The addressed observable.
    pub fn hamiltonian(&self) -> &PauliSum<QubitIndex> {
        &self.hamiltonian
    }

    /// The commuting groups, one measurement setting each.
    pub fn groups(&self) -> &[CommutingGroup<QubitIndex>] {
        &self.groups
    }

    /// Trials compiled into each executable.
    pub fn base_numshots(&self) -> u32 {
        self.base_numshots
    }

    fn run_group(
        &self,
        executable: &B::Executable,
        values: &RegisterValues,
        repetitions: u32,
    ) -> VqeResult<Array2<u8>> {
        let mut batches = Vec::with_capacity(repetitions as usize);
        for _ in 0..repetitions {
            batches.push(self.qc.run(executable, values)?);
        }
        if batches.len() == 1 {
            return Ok(batches.swap_remove(0));
        }
        let views: Vec<ArrayView2<'_, u8>> = batches.iter().map(|b| b.view()).collect();
        concatenate(Axis(0), &views).map_err(|e| {
            BackendError::Execution(format!("inconsistent batch shapes: {e}")).into()
        })
    }
}

impl<B: QuantumComputer> CostFunction for SamplingCostFunction<B> {
    fn evaluate(&mut self, params: &[f64], nshots: Option<u32>) -> VqeResult<CostValue> {
        let nshots = self.mode.resolve_shots(nshots)?;
        let values = (self.make_values)(params);

        let mut batches = Vec::with_capacity(self.executables.len());
        for (index, executable) in self.executables.iter().enumerate() {
            let batch = match executable {
                Some(exe) => self.run_group(exe, &values, nshots)?,
                None => Array2::zeros((0, 0)),
            };
            trace!(group = index, shots = batch.nrows(), "collected samples");
            batches.push(batch);
        }

        let estimate = sampling_expectation(&self.groups, &batches)?;
        trace!(nshots, mean = estimate.mean, stderr = estimate.stderr, "sampling evaluation");

        record(&mut self.recorder, params, estimate);
        Ok(self.mode.present(estimate))
    }

    fn mode(&self) -> ExecutionMode {
        self.mode
    }
}
