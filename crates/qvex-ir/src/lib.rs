//! qvex Program Intermediate Representation
//!
//! This crate provides the parametric program type that qvex cost functions
//! prepare states with, together with the qubit identifiers that make
//! deferred addressing explicit in the type system.
//!
//! # Core Components
//!
//! - **Qubits**: [`QubitPlaceholder`] for abstract qubits and [`QubitIndex`]
//!   for concrete register positions
//! - **Mappings**: [`QubitMapping`], an injective placeholder → index map
//! - **Parameters**: [`ParameterExpression`] angles that reference declared
//!   memory, bound at run time from [`RegisterValues`]
//! - **Programs**: [`Program`], an instruction list with memory declarations
//!   and a per-invocation trial count
//!
//! # Example: Addressing a Parametric Program
//!
//! ```rust
//! use qvex_ir::{Program, QubitIndex, QubitMapping, QubitPlaceholder};
//!
//! let q0 = QubitPlaceholder::new();
//! let q1 = QubitPlaceholder::new();
//!
//! let mut prog = Program::new();
//! let params = prog.declare_parameters("params", 2).unwrap();
//! prog.rx(params[0].clone(), q0).unwrap();
//! prog.cx(q0, q1).unwrap();
//! prog.rx(params[1].clone(), q1).unwrap();
//!
//! let mapping = QubitMapping::new([(q0, QubitIndex(0)), (q1, QubitIndex(1))]).unwrap();
//! let addressed = prog.address_qubits(&mapping).unwrap();
//! assert_eq!(addressed.num_qubits(), 2);
//! ```

pub mod error;
pub mod gate;
pub mod instruction;
pub mod mapping;
pub mod parameter;
pub mod program;
pub mod qubit;

pub use error::{IrError, IrResult};
pub use gate::Gate;
pub use instruction::{Instruction, MemoryRef};
pub use mapping::QubitMapping;
pub use parameter::{ParameterExpression, RegisterValues};
pub use program::{Declaration, MemoryKind, Program, READOUT_REGISTER};
pub use qubit::{QubitIndex, QubitLabel, QubitPlaceholder};
