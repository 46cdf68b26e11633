//! Backend contracts consumed by the cost functions.
//!
//! Two kinds of backend are supported:
//!
//! | Trait | Used by | Returns |
//! |-------|---------|---------|
//! | [`WavefunctionSimulator`] | [`ExactCostFunction`](crate::ExactCostFunction) | full state vector |
//! | [`QuantumComputer`] | [`SamplingCostFunction`](crate::SamplingCostFunction) | bitstring batch |
//!
//! Both take programs that are already addressed to concrete qubit indices.
//! Backend errors are reported as [`BackendError`] and propagated unchanged.

use ndarray::{Array1, Array2};
use num_complex::Complex64;
use qvex_ir::{Program, QubitIndex, RegisterValues};

use crate::error::BackendResult;

/// A normalized state vector over `2^n` basis states.
///
/// Basis state `k` has qubit `q` in `|1⟩` iff bit `q` of `k` is set.
#[derive(Debug, Clone, PartialEq)]
pub struct Wavefunction {
    amplitudes: Array1<Complex64>,
}

impl Wavefunction {
    /// Wrap a vector of amplitudes.
    pub fn new(amplitudes: Array1<Complex64>) -> Self {
        Self { amplitudes }
    }

    /// The amplitudes.
    pub fn amplitudes(&self) -> &Array1<Complex64> {
        &self.amplitudes
    }

    /// Consume and return the amplitudes.
    pub fn into_amplitudes(self) -> Array1<Complex64> {
        self.amplitudes
    }

    /// Probability of each basis state.
    pub fn probabilities(&self) -> Array1<f64> {
        self.amplitudes.mapv(|a| a.norm_sqr())
    }

    /// Number of qubits (`log2` of the dimension).
    pub fn num_qubits(&self) -> usize {
        self.amplitudes.len().trailing_zeros() as usize
    }

    /// Dimension of the state space.
    pub fn dim(&self) -> usize {
        self.amplitudes.len()
    }
}

/// A backend that returns the exact prepared state.
pub trait WavefunctionSimulator {
    /// Run `program` with `values` bound and return the final state.
    fn wavefunction(
        &self,
        program: &Program<QubitIndex>,
        values: &RegisterValues,
    ) -> BackendResult<Wavefunction>;
}

/// A backend that samples measurement outcomes.
///
/// Programs are compiled once and run many times with different parameter
/// values.
pub trait QuantumComputer {
    /// Backend-specific compiled form of a program.
    type Executable;

    /// Compile `program`. The program's trial count and readout register
    /// fix the shape of every batch `run` returns.
    fn compile(&self, program: &Program<QubitIndex>) -> BackendResult<Self::Executable>;

    /// Execute with `values` bound.
    ///
    /// Returns one row per trial and one column per readout slot, each entry
    /// 0 or 1.
    fn run(
        &self,
        executable: &Self::Executable,
        values: &RegisterValues,
    ) -> BackendResult<Array2<u8>>;
}

impl<T: WavefunctionSimulator + ?Sized> WavefunctionSimulator for &T {
    fn wavefunction(
        &self,
        program: &Program<QubitIndex>,
        values: &RegisterValues,
    ) -> BackendResult<Wavefunction> {
        (**self).wavefunction(program, values)
    }
}

impl<T: QuantumComputer + ?Sized> QuantumComputer for &T {
    type Executable = T::Executable;

    fn compile(&self, program: &Program<QubitIndex>) -> BackendResult<Self::Executable> {
        (**self).compile(program)
    }

    fn run(
        &self,
        executable: &Self::Executable,
        values: &RegisterValues,
    ) -> BackendResult<Array2<u8>> {
        (**self).run(executable, values)
    }
}
