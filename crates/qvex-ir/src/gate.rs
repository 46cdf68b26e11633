//! Quantum gate types.

use serde::{Deserialize, Serialize};

use crate::parameter::ParameterExpression;

/// Gates understood by the qvex IR.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Gate {
    /// Identity gate.
    I,
    /// Pauli-X gate.
    X,
    /// Pauli-Y gate.
    Y,
    /// Pauli-Z gate.
    Z,
    /// Hadamard gate.
    H,
    /// S gate (sqrt(Z)).
    S,
    /// S-dagger gate.
    Sdg,
    /// Rotation around X axis.
    Rx(ParameterExpression),
    /// Rotation around Y axis.
    Ry(ParameterExpression),
    /// Rotation around Z axis.
    Rz(ParameterExpression),
    /// Controlled-X (CNOT) gate, control first.
    CX,
    /// Controlled-Z gate.
    CZ,
    /// SWAP gate.
    Swap,
}

impl Gate {
    /// Get the name of this gate.
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Gate::I => "id",
            Gate::X => "x",
            Gate::Y => "y",
            Gate::Z => "z",
            Gate::H => "h",
            Gate::S => "s",
            Gate::Sdg => "sdg",
            Gate::Rx(_) => "rx",
            Gate::Ry(_) => "ry",
            Gate::Rz(_) => "rz",
            Gate::CX => "cx",
            Gate::CZ => "cz",
            Gate::Swap => "swap",
        }
    }

    /// Number of qubits this gate acts on.
    #[inline]
    pub fn num_qubits(&self) -> usize {
        match self {
            Gate::CX | Gate::CZ | Gate::Swap => 2,
            _ => 1,
        }
    }

    /// The rotation angle, for parameterized gates.
    pub fn angle(&self) -> Option<&ParameterExpression> {
        match self {
            Gate::Rx(theta) | Gate::Ry(theta) | Gate::Rz(theta) => Some(theta),
            _ => None,
        }
    }
}
