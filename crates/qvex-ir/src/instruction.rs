//! Program instructions combining gates with operands.

use serde::{Deserialize, Serialize};

use crate::gate::Gate;

/// A slot in a classical memory region.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MemoryRef {
    /// Region name.
    pub register: String,
    /// Slot index.
    pub index: usize,
}

impl MemoryRef {
    /// Reference `register[index]`.
    pub fn new(register: impl Into<String>, index: usize) -> Self {
        Self {
            register: register.into(),
            index,
        }
    }
}

/// A single program instruction, generic over the qubit identifier type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Instruction<Q> {
    /// A gate applied to one or more qubits.
    Gate {
        /// The gate.
        gate: Gate,
        /// Operands, in gate order (control first for controlled gates).
        qubits: Vec<Q>,
    },
    /// Measure `qubit` in the computational basis into `target`.
    Measure {
        /// Measured qubit.
        qubit: Q,
        /// Classical destination.
        target: MemoryRef,
    },
}

impl<Q> Instruction<Q> {
    /// Create a gate instruction.
    pub fn gate(gate: Gate, qubits: impl IntoIterator<Item = Q>) -> Self {
        Instruction::Gate {
            gate,
            qubits: qubits.into_iter().collect(),
        }
    }

    /// Create a measurement instruction.
    pub fn measure(qubit: Q, target: MemoryRef) -> Self {
        Instruction::Measure { qubit, target }
    }

    /// Qubits touched by this instruction.
    pub fn qubits(&self) -> &[Q] {
        match self {
            Instruction::Gate { qubits, .. } => qubits,
            Instruction::Measure { qubit, .. } => std::slice::from_ref(qubit),
        }
    }

    /// Rewrite every qubit operand through `f`.
    pub fn try_map_qubits<R, E>(
        &self,
        mut f: impl FnMut(&Q) -> Result<R, E>,
    ) -> Result<Instruction<R>, E> {
        Ok(match self {
            Instruction::Gate { gate, qubits } => Instruction::Gate {
                gate: gate.clone(),
                qubits: qubits.iter().map(&mut f).collect::<Result<_, _>>()?,
            },
            Instruction::Measure { qubit, target } => Instruction::Measure {
                qubit: f(qubit)?,
                target: target.clone(),
            },
        })
    }
}
