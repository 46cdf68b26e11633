//! Expectation-value estimators.
//!
//! Two estimators are provided:
//!
//! - [`exact_expectation`] evaluates ⟨ψ|H|ψ⟩ directly on a state vector, with
//!   a nominal shot-noise figure derived from ⟨ψ|H²|ψ⟩.
//! - [`sampling_expectation`] reduces measured bitstrings of each commuting
//!   group to a mean and a standard error.

use ndarray::{Array2, ArrayView1, ArrayView2};
use num_complex::Complex64;
use qvex_ir::QubitIndex;
use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{VqeError, VqeResult};
use crate::grouping::CommutingGroup;
use crate::measure::MeasurementLayout;

/// An expectation value with its standard error.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Estimate {
    /// Estimated expectation value.
    pub mean: f64,
    /// Standard error of `mean`.
    pub stderr: f64,
}

impl Estimate {
    /// Create an estimate.
    pub fn new(mean: f64, stderr: f64) -> Self {
        Self { mean, stderr }
    }
}

impl fmt::Display for Estimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6} ± {:.6}", self.mean, self.stderr)
    }
}

fn quadratic_form(psi: ArrayView1<'_, Complex64>, op: &Array2<Complex64>) -> f64 {
    let op_psi = op.dot(&psi);
    psi.iter()
        .zip(op_psi.iter())
        .map(|(a, b)| a.conj() * b)
        .sum::<Complex64>()
        .re
}

/// Exact expectation of `ham` on `psi`.
///
/// The returned `stderr` is `(⟨H²⟩ − ⟨H⟩²) / √nshots`. This is a nominal
/// noise scale, not a confidence interval: the numerator is the variance
/// itself rather than its square root.
pub fn exact_expectation(
    psi: ArrayView1<'_, Complex64>,
    ham: &Array2<Complex64>,
    ham_sq: &Array2<Complex64>,
    nshots: u32,
) -> VqeResult<Estimate> {
    if nshots == 0 {
        return Err(VqeError::Configuration(
            "shot count must be positive".into(),
        ));
    }
    for op in [ham, ham_sq] {
        if op.nrows() != psi.len() || op.ncols() != psi.len() {
            return Err(VqeError::DimensionMismatch {
                expected: op.nrows(),
                got: psi.len(),
            });
        }
    }

    let mean = quadratic_form(psi, ham);
    let second_moment = quadratic_form(psi, ham_sq);
    let stderr = (second_moment - mean * mean) / f64::from(nshots).sqrt();
    Ok(Estimate { mean, stderr })
}

/// Perturb `estimate.mean` by a standard-normal draw scaled by its stderr.
pub fn add_shot_noise<R: Rng + ?Sized>(estimate: Estimate, rng: &mut R) -> Estimate {
    let z: f64 = rng.sample(StandardNormal);
    Estimate {
        mean: estimate.mean + z * estimate.stderr,
        stderr: estimate.stderr,
    }
}

/// Mean and variance-of-the-mean contributed by one group.
fn group_moments(
    index: usize,
    group: &CommutingGroup<QubitIndex>,
    batch: ArrayView2<'_, u8>,
) -> VqeResult<(f64, f64)> {
    let layout = MeasurementLayout::for_group(group);
    if layout.is_empty() {
        let constant = group.terms().iter().map(|t| t.coefficient()).sum::<f64>();
        return Ok((constant, 0.0));
    }
    if batch.ncols() != layout.len() {
        return Err(VqeError::ShapeMismatch {
            group: index,
            expected: layout.len(),
            got: batch.ncols(),
        });
    }
    if batch.nrows() == 0 {
        return Err(VqeError::EmptySamples { group: index });
    }

    let weighted: Vec<(f64, Vec<usize>)> = group
        .terms()
        .iter()
        .map(|t| {
            let cols = layout.columns_of(t).unwrap_or_default();
            (t.coefficient(), cols)
        })
        .collect();

    // Per-shot weighted parity, shifted by the first shot so that a constant
    // sequence has exactly zero spread.
    let mut shift = None;
    let mut sum = 0.0;
    let mut sum_sq = 0.0;
    for row in batch.rows() {
        let y: f64 = weighted
            .iter()
            .map(|(c, cols)| {
                let odd = cols.iter().filter(|&&col| row[col] != 0).count() % 2 == 1;
                if odd { -c } else { *c }
            })
            .sum();
        let y0 = *shift.get_or_insert(y);
        let d = y - y0;
        sum += d;
        sum_sq += d * d;
    }

    let n = batch.nrows() as f64;
    let y0 = shift.unwrap_or(0.0);
    let mean = y0 + sum / n;
    let variance = (sum_sq - sum * sum / n).max(0.0) / n;
    Ok((mean, variance / n))
}

/// Estimate Σ cᵢ⟨Pᵢ⟩ from one bitstring batch per group.
///
/// `batches[g]` holds the outcomes of `groups[g]`, with columns in
/// [`MeasurementLayout`] order and one row per shot. For each group the
/// weighted parity yₛ = Σᵢ cᵢ·pᵢ,ₛ is formed per shot, so correlations
/// between terms of one group are accounted for. Groups are independent and
/// combine in quadrature. Identity-only groups contribute their coefficient
/// sum with no variance, and their batch is not inspected.
pub fn sampling_expectation(
    groups: &[CommutingGroup<QubitIndex>],
    batches: &[Array2<u8>],
) -> VqeResult<Estimate> {
    if groups.len() != batches.len() {
        return Err(VqeError::DimensionMismatch {
            expected: groups.len(),
            got: batches.len(),
        });
    }

    let mut mean = 0.0;
    let mut variance = 0.0;
    for (index, (group, batch)) in groups.iter().zip(batches).enumerate() {
        let (m, v) = group_moments(index, group, batch.view())?;
        mean += m;
        variance += v;
    }

    Ok(Estimate {
        mean,
        stderr: variance.sqrt(),
    })
}
