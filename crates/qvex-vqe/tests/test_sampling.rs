//! Tests for the sampling estimator.

use ndarray::{Array2, array};
use qvex_ir::QubitIndex;
use qvex_vqe::{
    MeasurementLayout, Pauli, PauliSum, PauliTerm, commuting_decomposition,
    sampling_expectation,
};

fn q(i: u32) -> QubitIndex {
    QubitIndex(i)
}

/// `rows` copies of the same bitstring.
fn constant_batch(bits: &[u8], rows: usize) -> Array2<u8> {
    Array2::from_shape_fn((rows, bits.len()), |(_, c)| bits[c])
}

// ---------------------------------------------------------------------------
// Deterministic outcomes
// ---------------------------------------------------------------------------

#[test]
fn deterministic_batch_has_zero_stderr() {
    let h = PauliSum::from_terms(vec![
        PauliTerm::z(q(0), 2.5),
        PauliTerm::z(q(1), 0.5),
        PauliTerm::new(-1.0, [(q(0), Pauli::Z), (q(1), Pauli::Z)]),
    ]);
    let groups = commuting_decomposition(&h);
    assert_eq!(groups.len(), 1);

    // |11⟩: every shot reads 1 on both qubits.
    let est = sampling_expectation(&groups, &[constant_batch(&[1, 1], 37)]).unwrap();
    assert!((est.mean + 4.0).abs() < 1e-12);
    assert_eq!(est.stderr, 0.0);
}

#[test]
fn zero_bits_give_positive_coefficients() {
    let h = PauliSum::from_terms(vec![PauliTerm::z(q(3), 0.7), PauliTerm::x(q(5), -0.2)]);
    let groups = commuting_decomposition(&h);
    let layout = MeasurementLayout::for_group(&groups[0]);
    assert_eq!(layout.qubits(), &[q(3), q(5)]);

    let est = sampling_expectation(&groups, &[constant_batch(&[0, 0], 10)]).unwrap();
    assert!((est.mean - 0.5).abs() < 1e-12);
    assert_eq!(est.stderr, 0.0);
}

// ---------------------------------------------------------------------------
// Variance
// ---------------------------------------------------------------------------

#[test]
fn single_term_variance_is_bernoulli() {
    // 3 of 4 shots read 0: ⟨Z⟩ = 0.5, Var = c²(1 − 0.25), stderr = sqrt(Var/4).
    let h = PauliSum::from_terms(vec![PauliTerm::z(q(0), 2.0)]);
    let groups = commuting_decomposition(&h);
    let batch = array![[0u8], [0], [0], [1]];
    let est = sampling_expectation(&groups, &[batch]).unwrap();
    assert!((est.mean - 1.0).abs() < 1e-12);
    let expected = (4.0 * 0.75 / 4.0_f64).sqrt();
    assert!((est.stderr - expected).abs() < 1e-12);
}

#[test]
fn correlated_terms_in_one_group_cancel() {
    // Z0 and −Z0Z1 on a batch where qubit 1 always reads 0: the two terms
    // are perfectly anticorrelated and their sum is identically zero.
    let h = PauliSum::from_terms(vec![
        PauliTerm::z(q(0), 1.0),
        PauliTerm::new(-1.0, [(q(0), Pauli::Z), (q(1), Pauli::Z)]),
    ]);
    let groups = commuting_decomposition(&h);
    assert_eq!(groups.len(), 1);
    let batch = array![[0u8, 0], [1, 0], [0, 0], [1, 0]];
    let est = sampling_expectation(&groups, &[batch]).unwrap();
    assert!(est.mean.abs() < 1e-12);
    assert_eq!(est.stderr, 0.0);
}

#[test]
fn groups_combine_in_quadrature() {
    let h = PauliSum::from_terms(vec![PauliTerm::z(q(0), 1.0), PauliTerm::x(q(0), 1.0)]);
    let groups = commuting_decomposition(&h);
    assert_eq!(groups.len(), 2);

    // Both groups: half 0, half 1 → mean 0, Var(y) = 1, stderr² = 1/4 each.
    let batch = array![[0u8], [1], [0], [1]];
    let est = sampling_expectation(&groups, &[batch.clone(), batch]).unwrap();
    assert!(est.mean.abs() < 1e-12);
    assert!((est.stderr - (0.5_f64).sqrt()).abs() < 1e-12);
}

#[test]
fn groups_may_have_different_shot_counts() {
    let h = PauliSum::from_terms(vec![PauliTerm::z(q(0), 1.0), PauliTerm::x(q(0), 3.0)]);
    let groups = commuting_decomposition(&h);
    let est = sampling_expectation(
        &groups,
        &[constant_batch(&[1], 5), constant_batch(&[0], 200)],
    )
    .unwrap();
    assert!((est.mean - 2.0).abs() < 1e-12);
    assert_eq!(est.stderr, 0.0);
}
