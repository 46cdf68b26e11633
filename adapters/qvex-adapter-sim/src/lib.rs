//! qvex Local Statevector Simulator
//!
//! A reference backend for qvex cost functions. It implements both backend
//! contracts from `qvex-vqe`:
//!
//! - [`WavefunctionSimulator`](qvex_vqe::WavefunctionSimulator): the exact
//!   final state of a measurement-free program
//! - [`QuantumComputer`](qvex_vqe::QuantumComputer): compile a program with
//!   terminal measurements into the readout register, then sample it
//!
//! Statevector simulation is exact but limited to ~20 qubits.
//!
//! | Qubits | Memory |
//! |--------|--------|
//! | 10 | ~16 KB |
//! | 15 | ~512 KB |
//! | 20 | ~16 MB |
//!
//! # Example
//!
//! ```rust
//! use qvex_adapter_sim::LocalSimulator;
//! use qvex_ir::{Program, QubitIndex, RegisterValues};
//! use qvex_vqe::WavefunctionSimulator;
//!
//! let mut prog = Program::new();
//! prog.x(QubitIndex(1)).unwrap();
//!
//! let sim = LocalSimulator::with_seed(0);
//! let wf = sim.wavefunction(&prog, &RegisterValues::new()).unwrap();
//! assert!((wf.probabilities()[2] - 1.0).abs() < 1e-12);
//! ```

mod error;
mod simulator;
mod statevector;

pub use error::{SimError, SimResult};
pub use simulator::{DEFAULT_MAX_QUBITS, LocalSimulator, SimExecutable};
