//! qvex VQE Cost Functions
//!
//! Cost functions for variational eigensolvers: given a parametric
//! state-preparation [`Program`](qvex_ir::Program) and an observable written
//! as a [`PauliSum`], estimate ⟨ψ(θ)|H|ψ(θ)⟩ either exactly on a wavefunction
//! simulator or from measurement samples.
//!
//! # Core Components
//!
//! - **Observables**: [`PauliTerm`] and [`PauliSum`], generic over the qubit
//!   identifier type
//! - **Grouping**: [`commuting_decomposition`] into qubit-wise commuting
//!   [`CommutingGroup`]s
//! - **Measurement**: [`measurement_program`] appends basis changes and
//!   readout for one group
//! - **Estimators**: [`exact_expectation`] and [`sampling_expectation`]
//! - **Facades**: [`ExactCostFunction`] and [`SamplingCostFunction`], both
//!   implementing [`CostFunction`]
//! - **Backends**: [`WavefunctionSimulator`] and [`QuantumComputer`]
//!
//! # Example: Grouping an Observable
//!
//! ```rust
//! use qvex_ir::QubitIndex;
//! use qvex_vqe::{commuting_decomposition, Pauli, PauliSum, PauliTerm};
//!
//! let h = PauliSum::from_terms(vec![
//!     PauliTerm::z(QubitIndex(0), 1.0),
//!     PauliTerm::x(QubitIndex(0), 0.5),
//!     PauliTerm::new(-1.0, [(QubitIndex(0), Pauli::Z), (QubitIndex(1), Pauli::Z)]),
//! ]);
//!
//! let groups = commuting_decomposition(&h);
//! assert_eq!(groups.len(), 2);
//! ```

pub mod backend;
pub mod config;
pub mod cost;
pub mod error;
pub mod estimate;
pub mod grouping;
pub mod log;
pub mod measure;
pub mod pauli;

pub use backend::{QuantumComputer, Wavefunction, WavefunctionSimulator};
pub use config::{CostFunctionConfig, DEPRECATED_FALLBACK_SHOTS, ExecutionMode};
pub use cost::{CostFunction, CostValue, ExactCostFunction, RegisterBuilder, SamplingCostFunction};
pub use error::{BackendError, BackendResult, VqeError, VqeResult};
pub use estimate::{Estimate, add_shot_noise, exact_expectation, sampling_expectation};
pub use grouping::{CommutingGroup, commuting_decomposition, qubitwise_commute};
pub use log::{CallRecorder, LogEntry, MemoryLog};
pub use measure::{MeasurementLayout, append_measurements, measurement_program};
pub use pauli::{MAX_DENSE_QUBITS, Pauli, PauliSum, PauliTerm};
