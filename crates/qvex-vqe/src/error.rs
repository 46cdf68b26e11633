//! Error types for the VQE crate.

use qvex_ir::IrError;
use thiserror::Error;

use crate::pauli::Pauli;

/// Errors produced while building or evaluating cost functions.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum VqeError {
    /// Invalid or incomplete configuration (e.g. no resolvable shot count).
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// An observable or program references a qubit absent from the mapping.
    #[error("Qubit {qubit} is not covered by the qubit mapping")]
    UnresolvedQubit {
        /// Display form of the unresolved identifier.
        qubit: String,
    },

    /// Two identifiers map onto the same concrete index.
    #[error("Qubits {first} and {second} are both mapped to index {index}")]
    QubitCollision {
        /// The contested index.
        index: u32,
        /// First claimant.
        first: String,
        /// Second claimant.
        second: String,
    },

    /// Terms of one commuting group require different bases on a qubit.
    #[error("Measurement conflict on qubit {qubit}: group requires both {first} and {second}")]
    MeasurementConflict {
        /// The qubit in question.
        qubit: String,
        /// Basis required by an earlier term.
        first: Pauli,
        /// Basis required by a later term.
        second: Pauli,
    },

    /// A term references a qubit outside the requested matrix width.
    #[error("Pauli term references qubit {qubit} but the matrix only spans {n_qubits} qubits")]
    QubitOutOfRange {
        /// The offending qubit index.
        qubit: u32,
        /// Requested number of qubits.
        n_qubits: usize,
    },

    /// A dense matrix over this many qubits is too large to build.
    #[error("Dense matrices are limited to {max} qubits, {requested} requested")]
    TooManyQubits {
        /// Requested register width.
        requested: usize,
        /// Largest supported width.
        max: usize,
    },

    /// A Pauli product produced an imaginary coefficient.
    #[error("Product of {lhs} and {rhs} has an imaginary coefficient")]
    ComplexCoefficient {
        /// Left factor.
        lhs: String,
        /// Right factor.
        rhs: String,
    },

    /// A measured group came back without any shots.
    #[error("No samples were collected for commuting group {group}")]
    EmptySamples {
        /// Index of the group.
        group: usize,
    },

    /// Bitstring batch width does not match the group's measured qubits.
    #[error("Commuting group {group} measures {expected} qubits, but the batch has {got} columns")]
    ShapeMismatch {
        /// Index of the group.
        group: usize,
        /// Number of measured qubits.
        expected: usize,
        /// Number of columns received.
        got: usize,
    },

    /// State vector and observable dimensions disagree.
    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch {
        /// Expected dimension.
        expected: usize,
        /// Actual dimension.
        got: usize,
    },

    /// Program construction error.
    #[error("Program error: {0}")]
    Ir(IrError),

    /// Backend failure, propagated unchanged.
    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl From<IrError> for VqeError {
    fn from(err: IrError) -> Self {
        match err {
            IrError::UnresolvedQubit { qubit } => VqeError::UnresolvedQubit { qubit },
            IrError::QubitCollision {
                index,
                first,
                second,
            } => VqeError::QubitCollision {
                index: index.0,
                first,
                second,
            },
            IrError::AmbiguousMapping { .. } => VqeError::Configuration(err.to_string()),
            other => VqeError::Ir(other),
        }
    }
}

/// Errors reported by execution backends.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BackendError {
    /// The backend cannot run this program.
    #[error("Unsupported program: {0}")]
    Unsupported(String),

    /// Execution started but failed.
    #[error("Execution failed: {0}")]
    Execution(String),

    /// The program could not be bound or evaluated.
    #[error("Program error: {0}")]
    Ir(#[from] IrError),
}

/// Result type for cost-function operations.
pub type VqeResult<T> = Result<T, VqeError>;

/// Result type for backend operations.
pub type BackendResult<T> = Result<T, BackendError>;
