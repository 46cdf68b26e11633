//! Measurement programs for commuting groups.
//!
//! To estimate a group from computational-basis samples, every qubit in the
//! group's support is first rotated into the basis its terms require:
//!
//! | Basis | Rotation    |
//! |-------|-------------|
//! | X     | RY(−π/2)    |
//! | Y     | RX(π/2)     |
//! | Z     | (none)      |
//!
//! and then measured into the readout register. Readout slot `i` holds the
//! `i`-th smallest qubit of the support.

use qvex_ir::{ParameterExpression, Program, QubitIndex, READOUT_REGISTER};
use std::f64::consts::FRAC_PI_2;

use crate::error::VqeResult;
use crate::grouping::CommutingGroup;
use crate::pauli::{Pauli, PauliTerm};

/// Column order of a group's bitstring batches.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MeasurementLayout {
    qubits: Vec<QubitIndex>,
}

impl MeasurementLayout {
    /// Layout for `group`: its support in ascending order.
    pub fn for_group(group: &CommutingGroup<QubitIndex>) -> Self {
        Self {
            qubits: group.qubits().into_iter().collect(),
        }
    }

    /// Measured qubits, one per column.
    pub fn qubits(&self) -> &[QubitIndex] {
        &self.qubits
    }

    /// Column holding `qubit`'s outcomes.
    pub fn column(&self, qubit: QubitIndex) -> Option<usize> {
        self.qubits.binary_search(&qubit).ok()
    }

    /// Columns of `term`'s non-identity factors.
    ///
    /// Returns `None` if the term acts on a qubit outside the layout.
    pub fn columns_of(&self, term: &PauliTerm<QubitIndex>) -> Option<Vec<usize>> {
        term.qubits().map(|q| self.column(*q)).collect()
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.qubits.len()
    }

    /// True if nothing is measured (identity-only group).
    pub fn is_empty(&self) -> bool {
        self.qubits.is_empty()
    }
}

/// Append basis changes and readout for `group` to `program`.
///
/// Declares the readout register sized to the group's support, rotates each
/// support qubit into its measurement basis, measures it, and sets the
/// program's trial count to `trials`. Qubits outside the support are left
/// untouched.
pub fn append_measurements(
    program: &mut Program<QubitIndex>,
    group: &CommutingGroup<QubitIndex>,
    trials: u32,
) -> VqeResult<MeasurementLayout> {
    let basis = group.basis()?;
    let layout = MeasurementLayout::for_group(group);

    if !layout.is_empty() {
        program.declare_readout(READOUT_REGISTER, layout.len())?;
    }
    for (&qubit, &op) in &basis {
        match op {
            Pauli::X => {
                program.ry(ParameterExpression::constant(-FRAC_PI_2), qubit)?;
            }
            Pauli::Y => {
                program.rx(ParameterExpression::constant(FRAC_PI_2), qubit)?;
            }
            Pauli::Z | Pauli::I => {}
        }
    }
    for (slot, &qubit) in layout.qubits().iter().enumerate() {
        program.measure(qubit, READOUT_REGISTER, slot)?;
    }
    program.wrap_in_numshots_loop(trials);

    Ok(layout)
}

/// Copy `prep` and append measurements for `group`.
pub fn measurement_program(
    prep: &Program<QubitIndex>,
    group: &CommutingGroup<QubitIndex>,
    trials: u32,
) -> VqeResult<(Program<QubitIndex>, MeasurementLayout)> {
    let mut program = prep.clone();
    let layout = append_measurements(&mut program, group, trials)?;
    Ok((program, layout))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grouping::commuting_decomposition;
    use crate::pauli::PauliSum;
    use qvex_ir::{Gate, Instruction};

    fn q(i: u32) -> QubitIndex {
        QubitIndex(i)
    }

    fn prep() -> Program<QubitIndex> {
        let mut p = Program::new();
        p.h(q(0)).unwrap();
        p.cx(q(0), q(4)).unwrap();
        p
    }

    #[test]
    fn test_layout_ascending() {
        let group: CommutingGroup<_> = [
            PauliTerm::z(q(4), 1.0),
            PauliTerm::new(1.0, [(q(0), Pauli::Z), (q(4), Pauli::Z)]),
        ]
        .into_iter()
        .collect();
        let layout = MeasurementLayout::for_group(&group);
        assert_eq!(layout.qubits(), &[q(0), q(4)]);
        assert_eq!(layout.column(q(4)), Some(1));
        assert_eq!(layout.columns_of(&group.terms()[0]), Some(vec![1]));
    }

    #[test]
    fn test_basis_rotations() {
        let h = PauliSum::from_terms(vec![PauliTerm::new(
            0.5,
            [(q(0), Pauli::X), (q(2), Pauli::Y), (q(4), Pauli::Z)],
        )]);
        let groups = commuting_decomposition(&h);
        let (program, layout) = measurement_program(&prep(), &groups[0], 250).unwrap();

        assert_eq!(layout.len(), 3);
        assert_eq!(program.num_shots(), 250);
        assert_eq!(program.declaration(READOUT_REGISTER).map(|d| d.size), Some(3));

        let added = &program.instructions()[2..];
        assert!(matches!(
            &added[0],
            Instruction::Gate { gate: Gate::Ry(theta), qubits }
                if qubits == &[q(0)] && theta.as_f64() == Some(-FRAC_PI_2)
        ));
        assert!(matches!(
            &added[1],
            Instruction::Gate { gate: Gate::Rx(theta), qubits }
                if qubits == &[q(2)] && theta.as_f64() == Some(FRAC_PI_2)
        ));
        let measured: Vec<_> = program.measurements().map(|(q, m)| (*q, m.index)).collect();
        assert_eq!(measured, vec![(q(0), 0), (q(2), 1), (q(4), 2)]);
    }

    #[test]
    fn test_unrelated_qubits_untouched() {
        let groups = commuting_decomposition(&PauliSum::from_terms(vec![PauliTerm::z(q(4), 1.0)]));
        let (program, _) = measurement_program(&prep(), &groups[0], 10).unwrap();
        assert_eq!(program.instructions().len(), 3);
        assert_eq!(program.measurements().count(), 1);
        assert!(
            program
                .measurements()
                .all(|(qubit, _)| *qubit == q(4))
        );
    }

    #[test]
    fn test_identity_group_measures_nothing() {
        let groups =
            commuting_decomposition(&PauliSum::from_terms(vec![PauliTerm::<QubitIndex>::identity(2.0)]));
        let (program, layout) = measurement_program(&prep(), &groups[0], 10).unwrap();
        assert!(layout.is_empty());
        assert_eq!(program.measurements().count(), 0);
        assert!(program.declaration(READOUT_REGISTER).is_none());
    }
}
