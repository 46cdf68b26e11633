//! Tests for Pauli-sum observables.

use qvex_ir::{QubitIndex, QubitMapping, QubitPlaceholder};
use qvex_vqe::{Pauli, PauliSum, PauliTerm, VqeError};

fn reference_observable() -> (PauliSum<QubitPlaceholder>, QubitPlaceholder, QubitPlaceholder) {
    let q0 = QubitPlaceholder::new();
    let q1 = QubitPlaceholder::new();
    let zz = PauliTerm::z(q1, -1.0).product(&PauliTerm::z(q0, 1.0)).unwrap();
    let h = PauliTerm::z(q0, 2.5) + PauliTerm::z(q1, 0.5) + zz;
    (h, q0, q1)
}

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

#[test]
fn sum_keeps_first_occurrence_order() {
    let h = PauliTerm::x(QubitIndex(2), 1.0)
        + PauliTerm::z(QubitIndex(0), 1.0)
        + PauliTerm::x(QubitIndex(2), 1.0);
    assert_eq!(h.num_terms(), 2);
    assert_eq!(h.terms()[0].op(&QubitIndex(2)), Pauli::X);
    assert!((h.terms()[0].coefficient() - 2.0).abs() < 1e-15);
}

#[test]
fn later_factor_on_same_qubit_wins() {
    let t = PauliTerm::new(1.0, [(QubitIndex(0), Pauli::X), (QubitIndex(0), Pauli::Z)]);
    assert_eq!(t.weight(), 1);
    assert_eq!(t.op(&QubitIndex(0)), Pauli::Z);
}

#[test]
fn merge_requires_same_string() {
    let a = PauliTerm::z(QubitIndex(0), 1.0);
    let b = PauliTerm::z(QubitIndex(0), 2.0);
    let c = PauliTerm::z(QubitIndex(1), 2.0);
    assert_eq!(a.merge(&b).map(|t| t.coefficient()), Some(3.0));
    assert!(a.merge(&c).is_none());
}

#[test]
fn scalar_multiplication_and_negation() {
    let t = -(PauliTerm::y(QubitIndex(1), 0.5) * 4.0);
    assert!((t.coefficient() + 2.0).abs() < 1e-15);
}

#[test]
fn identity_coefficient_sums_scalars() {
    let h = PauliSum::from_terms(vec![
        PauliTerm::<QubitIndex>::identity(0.25),
        PauliTerm::z(QubitIndex(0), 1.0),
        PauliTerm::identity(0.5),
    ]);
    assert!((h.identity_coefficient() - 0.75).abs() < 1e-15);
    assert!(h.qubits().contains(&QubitIndex(0)));
    assert_eq!(h.qubits().len(), 1);
}

// ---------------------------------------------------------------------------
// Remapping
// ---------------------------------------------------------------------------

#[test]
fn remap_qubits_equal_mapping_values() {
    let (h, q0, q1) = reference_observable();
    let mapping = QubitMapping::new([(q0, QubitIndex(5)), (q1, QubitIndex(2))]).unwrap();
    let resolved = h.remap(&mapping).unwrap();
    assert_eq!(resolved.qubits(), mapping.values());
    assert_eq!(resolved.num_terms(), h.num_terms());
    assert_eq!(resolved.terms()[0].op(&QubitIndex(5)), Pauli::Z);
}

#[test]
fn remap_preserves_coefficients() {
    let (h, q0, q1) = reference_observable();
    let mapping = QubitMapping::new([(q0, QubitIndex(0)), (q1, QubitIndex(1))]).unwrap();
    let resolved = h.remap(&mapping).unwrap();
    let coeffs: Vec<f64> = resolved.iter().map(|t| t.coefficient()).collect();
    assert_eq!(coeffs, vec![2.5, 0.5, -1.0]);
}

#[test]
fn remap_missing_qubit_is_unresolved() {
    let (h, q0, _) = reference_observable();
    let mapping = QubitMapping::new([(q0, QubitIndex(0))]).unwrap();
    assert!(matches!(h.remap(&mapping), Err(VqeError::UnresolvedQubit { .. })));
}

#[test]
fn colliding_mapping_is_rejected() {
    let (_, q0, q1) = reference_observable();
    let err: VqeError = QubitMapping::new([(q0, QubitIndex(0)), (q1, QubitIndex(0))])
        .unwrap_err()
        .into();
    assert!(matches!(err, VqeError::QubitCollision { index: 0, .. }));
}

// ---------------------------------------------------------------------------
// Dense matrices
// ---------------------------------------------------------------------------

#[test]
fn reference_matrix_is_diagonal() {
    let (h, q0, q1) = reference_observable();
    let mapping = QubitMapping::new([(q0, QubitIndex(0)), (q1, QubitIndex(1))]).unwrap();
    let m = h.remap(&mapping).unwrap().matrix(2).unwrap();

    // Basis index k = b1·2 + b0; eigenvalue 2.5·z0 + 0.5·z1 − z0·z1.
    let expected = [2.5 + 0.5 - 1.0, -2.5 + 0.5 + 1.0, 2.5 - 0.5 + 1.0, -2.5 - 0.5 - 1.0];
    for (k, e) in expected.iter().enumerate() {
        assert!((m[[k, k]].re - e).abs() < 1e-12, "diagonal {k}");
    }
    let off_diagonal: f64 = m
        .indexed_iter()
        .filter(|((i, j), _)| i != j)
        .map(|(_, v)| v.norm())
        .sum();
    assert!(off_diagonal < 1e-12);
}

#[test]
fn y_matrix_is_hermitian() {
    let m = PauliSum::from_terms(vec![PauliTerm::new(
        0.3,
        [(QubitIndex(0), Pauli::Y), (QubitIndex(1), Pauli::X)],
    )])
    .matrix(2)
    .unwrap();
    for i in 0..4 {
        for j in 0..4 {
            assert!((m[[i, j]] - m[[j, i]].conj()).norm() < 1e-12);
        }
    }
}

#[test]
fn matrix_width_can_exceed_support() {
    let h = PauliSum::from_terms(vec![PauliTerm::z(QubitIndex(0), 1.0)]);
    let m = h.matrix(3).unwrap();
    assert_eq!(m.dim(), (8, 8));
    assert!((m[[4, 4]].re - 1.0).abs() < 1e-12);
    assert!((m[[5, 5]].re + 1.0).abs() < 1e-12);
}
