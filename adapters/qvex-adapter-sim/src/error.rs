//! Simulator errors.

use qvex_ir::IrError;
use qvex_vqe::BackendError;
use thiserror::Error;

/// Errors raised by the local simulator.
#[derive(Debug, Error)]
pub enum SimError {
    /// The program needs more qubits than the simulator allows.
    #[error("Program has {requested} qubits but the simulator only supports {max}")]
    TooManyQubits {
        /// Qubits needed by the program.
        requested: usize,
        /// Simulator limit.
        max: u32,
    },

    /// A gate follows a measurement.
    #[error("Gate {gate} follows a measurement; only terminal measurements are supported")]
    MidCircuitMeasurement {
        /// Name of the offending gate.
        gate: String,
    },

    /// Measurements are not allowed in this context.
    #[error("Wavefunction simulation does not support measurements")]
    MeasurementInWavefunction,

    /// A measurement writes somewhere other than the readout register.
    #[error("Measurement target {0} is not a slot of the readout register")]
    InvalidReadout(String),

    /// A readout slot is never written.
    #[error("Readout slot {0} is never measured")]
    UnfilledReadout(usize),

    /// Parameter binding failed.
    #[error(transparent)]
    Ir(#[from] IrError),
}

/// Result type for simulator operations.
pub type SimResult<T> = Result<T, SimError>;

impl From<SimError> for BackendError {
    fn from(err: SimError) -> Self {
        match err {
            SimError::Ir(e) => BackendError::Ir(e),
            other => BackendError::Unsupported(other.to_string()),
        }
    }
}
