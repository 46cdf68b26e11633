//! The two-qubit reference problem.
//!
//! Observable:
//!
//!   H = 2.5·Z(q0) + 0.5·Z(q1) − Z(q1)·Z(q0)
//!
//! which is diagonal with eigenvalues 2, −1, 3, −4 on |00⟩, |01⟩, |10⟩, |11⟩
//! (qubit 0 is the rightmost bit). The ground state is |11⟩ at E = −4.
//!
//! Ansatz over four parameters:
//!
//! ```text
//! q0: ─RX(θ0)─●─RX(θ2)─
//! q1: ─RX(θ1)─X─RX(θ3)─
//! ```

use qvex_ir::{Program, QubitIndex, QubitMapping, QubitPlaceholder, RegisterValues};
use qvex_vqe::{PauliSum, PauliTerm, VqeResult};
use std::f64::consts::PI;

/// Name of the parameter region read by the ansatz.
pub const PARAMS_REGISTER: &str = "params";

/// Number of ansatz parameters.
pub const NUM_PARAMS: usize = 4;

/// Parameters that prepare |11⟩: RX(π) on q0, then the CNOT copies it.
pub const GROUND_STATE_PARAMS: [f64; NUM_PARAMS] = [PI, 0.0, 0.0, 0.0];

/// Ground-state energy of the reference observable.
pub const GROUND_STATE_ENERGY: f64 = -4.0;

/// Ansatz, observable and qubit mapping for the reference problem.
pub struct ReferenceProblem {
    /// Placeholder qubits `[q0, q1]`.
    pub qubits: [QubitPlaceholder; 2],
    /// Parametric ansatz over the placeholders.
    pub ansatz: Program<QubitPlaceholder>,
    /// The observable over the placeholders.
    pub hamiltonian: PauliSum<QubitPlaceholder>,
    /// `q0 → 0`, `q1 → 1`.
    pub mapping: QubitMapping<QubitPlaceholder>,
}

/// Build the reference problem on fresh placeholders.
pub fn reference_problem() -> VqeResult<ReferenceProblem> {
    let q0 = QubitPlaceholder::new();
    let q1 = QubitPlaceholder::new();

    let mut ansatz = Program::new();
    let theta = ansatz.declare_parameters(PARAMS_REGISTER, NUM_PARAMS)?;
    ansatz
        .rx(theta[0].clone(), q0)?
        .rx(theta[1].clone(), q1)?
        .cx(q0, q1)?
        .rx(theta[2].clone(), q0)?
        .rx(theta[3].clone(), q1)?;

    let zz = PauliTerm::z(q1, -1.0).product(&PauliTerm::z(q0, 1.0))?;
    let hamiltonian = PauliTerm::z(q0, 2.5) + PauliTerm::z(q1, 0.5) + zz;

    let mapping = QubitMapping::new([(q0, QubitIndex(0)), (q1, QubitIndex(1))])?;

    Ok(ReferenceProblem {
        qubits: [q0, q1],
        ansatz,
        hamiltonian,
        mapping,
    })
}

/// Bind a parameter vector to the ansatz's register.
pub fn make_values(params: &[f64]) -> RegisterValues {
    RegisterValues::new().with(PARAMS_REGISTER, params.to_vec())
}
