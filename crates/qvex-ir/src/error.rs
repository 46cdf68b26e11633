//! Error types for the IR crate.

use thiserror::Error;

use crate::qubit::QubitIndex;

/// Errors that can occur in IR operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IrError {
    /// A qubit identifier has no entry in the qubit mapping.
    #[error("Qubit {qubit} is not covered by the qubit mapping")]
    UnresolvedQubit {
        /// Display form of the unresolved identifier.
        qubit: String,
    },

    /// Two distinct identifiers are mapped onto the same concrete index.
    #[error("Qubits {first} and {second} are both mapped to index {index}")]
    QubitCollision {
        /// The contested concrete index.
        index: QubitIndex,
        /// The identifier that claimed the index first.
        first: String,
        /// The identifier that collided with it.
        second: String,
    },

    /// The same identifier is mapped to two different indices.
    #[error("Qubit {qubit} is mapped to both {first} and {second}")]
    AmbiguousMapping {
        /// Display form of the identifier.
        qubit: String,
        /// First target index.
        first: QubitIndex,
        /// Second target index.
        second: QubitIndex,
    },

    /// Gate requires a different number of qubits.
    #[error("Gate '{gate_name}' requires {expected} qubits, got {got}")]
    QubitCountMismatch {
        /// Name of the gate.
        gate_name: String,
        /// Expected number of qubits.
        expected: usize,
        /// Actual number of qubits provided.
        got: usize,
    },

    /// Duplicate qubit in a multi-qubit gate.
    #[error("Duplicate qubit {qubit} in operation{}", format_gate_context(.gate_name))]
    DuplicateQubit {
        /// Display form of the duplicated qubit.
        qubit: String,
        /// Optional gate name for context.
        gate_name: Option<String>,
    },

    /// A memory region was referenced without being declared.
    #[error("Memory region '{0}' is not declared")]
    UndeclaredRegister(String),

    /// A memory region was declared twice with different shapes.
    #[error("Memory region '{0}' is already declared with a different type or size")]
    ConflictingDeclaration(String),

    /// Index past the end of a memory region.
    #[error("Index {index} is out of bounds for '{register}' of size {size}")]
    RegisterIndexOutOfBounds {
        /// Region name.
        register: String,
        /// Offending index.
        index: usize,
        /// Declared (or supplied) size.
        size: usize,
    },

    /// A parameter reference has no runtime value.
    #[error("Parameter '{0}' is unbound")]
    UnboundParameter(String),
}

/// Helper function to format optional gate context.
#[allow(clippy::ref_option)]
fn format_gate_context(gate_name: &Option<String>) -> String {
    match gate_name {
        Some(name) => format!(" (gate: {name})"),
        None => String::new(),
    }
}

/// Result type for IR operations.
pub type IrResult<T> = Result<T, IrError>;
