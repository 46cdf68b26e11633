//! Parametric programs.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::error::{IrError, IrResult};
use crate::gate::Gate;
use crate::instruction::{Instruction, MemoryRef};
use crate::mapping::QubitMapping;
use crate::parameter::{ParameterExpression, RegisterValues};
use crate::qubit::{QubitIndex, QubitLabel};

/// Name of the readout region used for measurement results.
pub const READOUT_REGISTER: &str = "ro";

/// Element type of a declared memory region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemoryKind {
    /// Real-valued parameters, bound per execution.
    Real,
    /// Classical bits written by measurements.
    Bit,
}

/// A declared memory region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Declaration {
    /// Element type.
    pub kind: MemoryKind,
    /// Number of slots.
    pub size: usize,
}

/// A parametric quantum program.
///
/// `Q` is the qubit identifier type: a program over
/// [`QubitPlaceholder`](crate::QubitPlaceholder) must be addressed with
/// [`Program::address_qubits`] before any backend can run it.
///
/// The program also carries a trial count (`num_shots`): the number of times
/// a backend repeats it per invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program<Q> {
    instructions: Vec<Instruction<Q>>,
    declarations: BTreeMap<String, Declaration>,
    num_shots: u32,
}

impl<Q> Default for Program<Q> {
    fn default() -> Self {
        Self {
            instructions: vec![],
            declarations: BTreeMap::new(),
            num_shots: 1,
        }
    }
}

impl<Q: QubitLabel> Program<Q> {
    /// Create an empty program with a trial count of 1.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a real-valued parameter region and return references to its slots.
    ///
    /// Re-declaring a region with the same shape is a no-op.
    pub fn declare_parameters(
        &mut self,
        name: impl Into<String>,
        size: usize,
    ) -> IrResult<Vec<ParameterExpression>> {
        let name = name.into();
        self.declare(&name, MemoryKind::Real, size)?;
        Ok((0..size)
            .map(|i| ParameterExpression::reference(name.clone(), i))
            .collect())
    }

    /// Declare a bit region for measurement results.
    pub fn declare_readout(&mut self, name: impl Into<String>, size: usize) -> IrResult<()> {
        self.declare(&name.into(), MemoryKind::Bit, size)
    }

    fn declare(&mut self, name: &str, kind: MemoryKind, size: usize) -> IrResult<()> {
        let decl = Declaration { kind, size };
        match self.declarations.get(name) {
            Some(existing) if *existing == decl => Ok(()),
            Some(_) => Err(IrError::ConflictingDeclaration(name.to_string())),
            None => {
                self.declarations.insert(name.to_string(), decl);
                Ok(())
            }
        }
    }

    // =========================================================================
    // Gates
    // =========================================================================

    /// Append an arbitrary gate, checking arity and operand uniqueness.
    pub fn gate(&mut self, gate: Gate, qubits: impl IntoIterator<Item = Q>) -> IrResult<&mut Self> {
        let qubits: Vec<Q> = qubits.into_iter().collect();
        if qubits.len() != gate.num_qubits() {
            return Err(IrError::QubitCountMismatch {
                gate_name: gate.name().to_string(),
                expected: gate.num_qubits(),
                got: qubits.len(),
            });
        }
        let mut seen = BTreeSet::new();
        for q in &qubits {
            if !seen.insert(q) {
                return Err(IrError::DuplicateQubit {
                    qubit: q.to_string(),
                    gate_name: Some(gate.name().to_string()),
                });
            }
        }
        if let Some(theta) = gate.angle() {
            self.check_references(theta)?;
        }
        self.instructions.push(Instruction::gate(gate, qubits));
        Ok(self)
    }

    fn check_references(&self, expr: &ParameterExpression) -> IrResult<()> {
        let mut result = Ok(());
        expr.for_each_reference(&mut |register, index| {
            if result.is_err() {
                return;
            }
            result = match self.declarations.get(register) {
                Some(decl) if decl.kind == MemoryKind::Real && index < decl.size => Ok(()),
                Some(decl) if decl.kind == MemoryKind::Real => {
                    Err(IrError::RegisterIndexOutOfBounds {
                        register: register.to_string(),
                        index,
                        size: decl.size,
                    })
                }
                _ => Err(IrError::UndeclaredRegister(register.to_string())),
            };
        });
        result
    }

    /// Apply Hadamard gate.
    pub fn h(&mut self, qubit: Q) -> IrResult<&mut Self> {
        self.gate(Gate::H, [qubit])
    }

    /// Apply Pauli-X gate.
    pub fn x(&mut self, qubit: Q) -> IrResult<&mut Self> {
        self.gate(Gate::X, [qubit])
    }

    /// Apply Pauli-Y gate.
    pub fn y(&mut self, qubit: Q) -> IrResult<&mut Self> {
        self.gate(Gate::Y, [qubit])
    }

    /// Apply Pauli-Z gate.
    pub fn z(&mut self, qubit: Q) -> IrResult<&mut Self> {
        self.gate(Gate::Z, [qubit])
    }

    /// Apply S gate.
    pub fn s(&mut self, qubit: Q) -> IrResult<&mut Self> {
        self.gate(Gate::S, [qubit])
    }

    /// Apply S-dagger gate.
    pub fn sdg(&mut self, qubit: Q) -> IrResult<&mut Self> {
        self.gate(Gate::Sdg, [qubit])
    }

    /// Apply RX rotation.
    pub fn rx(&mut self, theta: impl Into<ParameterExpression>, qubit: Q) -> IrResult<&mut Self> {
        self.gate(Gate::Rx(theta.into()), [qubit])
    }

    /// Apply RY rotation.
    pub fn ry(&mut self, theta: impl Into<ParameterExpression>, qubit: Q) -> IrResult<&mut Self> {
        self.gate(Gate::Ry(theta.into()), [qubit])
    }

    /// Apply RZ rotation.
    pub fn rz(&mut self, theta: impl Into<ParameterExpression>, qubit: Q) -> IrResult<&mut Self> {
        self.gate(Gate::Rz(theta.into()), [qubit])
    }

    /// Apply CNOT.
    pub fn cx(&mut self, control: Q, target: Q) -> IrResult<&mut Self> {
        self.gate(Gate::CX, [control, target])
    }

    /// Apply CZ.
    pub fn cz(&mut self, control: Q, target: Q) -> IrResult<&mut Self> {
        self.gate(Gate::CZ, [control, target])
    }

    /// Apply SWAP.
    pub fn swap(&mut self, q1: Q, q2: Q) -> IrResult<&mut Self> {
        self.gate(Gate::Swap, [q1, q2])
    }

    /// Measure `qubit` into `register[index]`.
    ///
    /// The region must have been declared with [`Program::declare_readout`].
    pub fn measure(
        &mut self,
        qubit: Q,
        register: impl Into<String>,
        index: usize,
    ) -> IrResult<&mut Self> {
        let register = register.into();
        match self.declarations.get(&register) {
            Some(decl) if decl.kind == MemoryKind::Bit => {
                if index >= decl.size {
                    return Err(IrError::RegisterIndexOutOfBounds {
                        register,
                        index,
                        size: decl.size,
                    });
                }
            }
            _ => return Err(IrError::UndeclaredRegister(register)),
        }
        self.instructions
            .push(Instruction::measure(qubit, MemoryRef::new(register, index)));
        Ok(self)
    }

    // =========================================================================
    // Execution annotations
    // =========================================================================

    /// Set how many times a backend repeats this program per invocation.
    pub fn wrap_in_numshots_loop(&mut self, shots: u32) -> &mut Self {
        self.num_shots = shots;
        self
    }

    /// Trial count per invocation.
    pub fn num_shots(&self) -> u32 {
        self.num_shots
    }

    // =========================================================================
    // Introspection
    // =========================================================================

    /// The instruction list.
    pub fn instructions(&self) -> &[Instruction<Q>] {
        &self.instructions
    }

    /// Declared memory regions.
    pub fn declarations(&self) -> &BTreeMap<String, Declaration> {
        &self.declarations
    }

    /// Declaration of region `name`, if any.
    pub fn declaration(&self, name: &str) -> Option<&Declaration> {
        self.declarations.get(name)
    }

    /// Every qubit referenced by the program.
    pub fn qubits(&self) -> BTreeSet<Q> {
        self.instructions
            .iter()
            .flat_map(|inst| inst.qubits().iter().cloned())
            .collect()
    }

    /// `(qubit, destination)` for each measurement, in program order.
    pub fn measurements(&self) -> impl Iterator<Item = (&Q, &MemoryRef)> {
        self.instructions.iter().filter_map(|inst| match inst {
            Instruction::Measure { qubit, target } => Some((qubit, target)),
            Instruction::Gate { .. } => None,
        })
    }

    /// Check that `values` binds every parameter the program references.
    pub fn check_bindings(&self, values: &RegisterValues) -> IrResult<()> {
        self.instructions
            .iter()
            .filter_map(|inst| match inst {
                Instruction::Gate { gate, .. } => gate.angle(),
                Instruction::Measure { .. } => None,
            })
            .try_for_each(|theta| theta.evaluate(values).map(drop))
    }

    /// Substitute every qubit through `mapping`, returning an addressed program.
    ///
    /// Fails with [`IrError::UnresolvedQubit`] if any qubit is not covered.
    pub fn address_qubits(&self, mapping: &QubitMapping<Q>) -> IrResult<Program<QubitIndex>> {
        let instructions = self
            .instructions
            .iter()
            .map(|inst| inst.try_map_qubits(|q| mapping.resolve(q)))
            .collect::<IrResult<Vec<_>>>()?;
        Ok(Program {
            instructions,
            declarations: self.declarations.clone(),
            num_shots: self.num_shots,
        })
    }
}

impl Program<QubitIndex> {
    /// Register width needed to run the program: highest index plus one.
    pub fn num_qubits(&self) -> usize {
        self.qubits()
            .last()
            .map_or(0, |q| q.as_usize() + 1)
    }
}
