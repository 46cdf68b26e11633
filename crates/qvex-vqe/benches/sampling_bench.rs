//! Benchmarks for grouping and the sampling estimator
//!
//! Run with: cargo bench -p qvex-vqe

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use ndarray::Array2;
use qvex_ir::QubitIndex;
use qvex_vqe::{Pauli, PauliSum, PauliTerm, commuting_decomposition, sampling_expectation};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Transverse-field Ising chain: Σ Z_i Z_{i+1} + Σ X_i
fn ising_chain(n: u32) -> PauliSum<QubitIndex> {
    let mut terms = Vec::new();
    for i in 0..n - 1 {
        terms.push(PauliTerm::new(
            -1.0,
            [(QubitIndex(i), Pauli::Z), (QubitIndex(i + 1), Pauli::Z)],
        ));
    }
    for i in 0..n {
        terms.push(PauliTerm::x(QubitIndex(i), 0.5));
    }
    PauliSum::from_terms(terms)
}

/// Benchmark greedy decomposition
fn bench_decomposition(c: &mut Criterion) {
    let mut group = c.benchmark_group("commuting_decomposition");

    for n in &[4u32, 8, 16, 32] {
        let h = ising_chain(*n);
        group.bench_with_input(BenchmarkId::new("ising", n), &h, |b, h| {
            b.iter(|| commuting_decomposition(black_box(h)));
        });
    }

    group.finish();
}

/// Benchmark the bitstring reduction
fn bench_sampling_expectation(c: &mut Criterion) {
    let mut group = c.benchmark_group("sampling_expectation");
    let mut rng = StdRng::seed_from_u64(42);

    for shots in &[100usize, 1_000, 10_000] {
        let groups = commuting_decomposition(&ising_chain(8));
        let batches: Vec<Array2<u8>> = groups
            .iter()
            .map(|g| {
                let width = g.qubits().len();
                Array2::from_shape_simple_fn((*shots, width), || rng.gen_range(0..=1))
            })
            .collect();

        group.bench_with_input(BenchmarkId::new("ising8", shots), &batches, |b, batches| {
            b.iter(|| sampling_expectation(black_box(&groups), black_box(batches)).unwrap());
        });
    }

    group.finish();
}

criterion_group!(benches, bench_decomposition, bench_sampling_expectation);
criterion_main!(benches);
