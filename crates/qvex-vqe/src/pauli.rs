//! Pauli-sum observables.
//!
//! An observable is a real-weighted sum of Pauli strings:
//!
//!   H = Σ_k  c_k · P_k
//!
//! where each P_k is a tensor product of single-qubit operators from
//! {I, X, Y, Z}. Terms and sums are generic over the qubit identifier type
//! `Q`; only sums over [`QubitIndex`] can be turned into dense matrices.
//!
//! # Example
//!
//! ```rust
//! use qvex_ir::QubitPlaceholder;
//! use qvex_vqe::pauli::{PauliSum, PauliTerm};
//!
//! let q0 = QubitPlaceholder::new();
//! let q1 = QubitPlaceholder::new();
//!
//! // H = 2.5·Z₀ + 0.5·Z₁ − Z₁Z₀
//! let zz = PauliTerm::z(q1, -1.0).product(&PauliTerm::z(q0, 1.0)).unwrap();
//! let h: PauliSum<_> = PauliTerm::z(q0, 2.5) + PauliTerm::z(q1, 0.5) + zz;
//! assert_eq!(h.num_terms(), 3);
//! ```

use ndarray::{Array2, linalg::kron};
use num_complex::Complex64;
use qvex_ir::{QubitIndex, QubitLabel, QubitMapping};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Neg};

use crate::error::{VqeError, VqeResult};

/// Widest register a dense observable matrix may span.
///
/// A `2^n × 2^n` complex matrix at this width already takes 4 GiB.
pub const MAX_DENSE_QUBITS: usize = 14;

/// Side length of a dense matrix over `n_qubits`.
fn dense_dim(n_qubits: usize) -> VqeResult<usize> {
    if n_qubits > MAX_DENSE_QUBITS {
        return Err(VqeError::TooManyQubits {
            requested: n_qubits,
            max: MAX_DENSE_QUBITS,
        });
    }
    Ok(1usize << n_qubits)
}

/// Single-qubit Pauli operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Pauli {
    /// Identity.
    I,
    /// Pauli-X.
    X,
    /// Pauli-Y.
    Y,
    /// Pauli-Z.
    Z,
}

impl Pauli {
    /// Get the name of this Pauli operator.
    pub fn name(&self) -> &'static str {
        match self {
            Pauli::I => "I",
            Pauli::X => "X",
            Pauli::Y => "Y",
            Pauli::Z => "Z",
        }
    }

    /// The 2×2 matrix of this operator.
    pub fn matrix(&self) -> Array2<Complex64> {
        let o = Complex64::new(0.0, 0.0);
        let l = Complex64::new(1.0, 0.0);
        let i = Complex64::new(0.0, 1.0);
        let m = match self {
            Pauli::I => [[l, o], [o, l]],
            Pauli::X => [[o, l], [l, o]],
            Pauli::Y => [[o, -i], [i, o]],
            Pauli::Z => [[l, o], [o, -l]],
        };
        Array2::from(m.to_vec())
    }

    /// Single-qubit product `self · other` as `(phase, operator)`.
    ///
    /// The phase is one of 1, i, −1, −i.
    pub fn compose(self, other: Pauli) -> (Complex64, Pauli) {
        let one = Complex64::new(1.0, 0.0);
        let i = Complex64::new(0.0, 1.0);
        match (self, other) {
            (Pauli::I, p) | (p, Pauli::I) => (one, p),
            (Pauli::X, Pauli::X) | (Pauli::Y, Pauli::Y) | (Pauli::Z, Pauli::Z) => (one, Pauli::I),
            (Pauli::X, Pauli::Y) => (i, Pauli::Z),
            (Pauli::Y, Pauli::X) => (-i, Pauli::Z),
            (Pauli::Y, Pauli::Z) => (i, Pauli::X),
            (Pauli::Z, Pauli::Y) => (-i, Pauli::X),
            (Pauli::Z, Pauli::X) => (i, Pauli::Y),
            (Pauli::X, Pauli::Z) => (-i, Pauli::Y),
        }
    }
}

impl fmt::Display for Pauli {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A single weighted Pauli string: `coefficient · P`.
///
/// Identity factors are not stored; qubits without a factor are implicitly I.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PauliTerm<Q: Ord> {
    coefficient: f64,
    ops: BTreeMap<Q, Pauli>,
}

impl<Q: QubitLabel> PauliTerm<Q> {
    /// Create a term from `(qubit, operator)` factors.
    ///
    /// Identity factors are dropped. If a qubit is listed more than once the
    /// last factor for it wins.
    pub fn new(coefficient: f64, ops: impl IntoIterator<Item = (Q, Pauli)>) -> Self {
        let mut map = BTreeMap::new();
        for (q, op) in ops {
            if op == Pauli::I {
                map.remove(&q);
            } else {
                map.insert(q, op);
            }
        }
        Self {
            coefficient,
            ops: map,
        }
    }

    /// A single-factor term `coefficient · op(qubit)`.
    pub fn single(op: Pauli, qubit: Q, coefficient: f64) -> Self {
        Self::new(coefficient, [(qubit, op)])
    }

    /// Create an identity term (scalar).
    pub fn identity(coefficient: f64) -> Self {
        Self {
            coefficient,
            ops: BTreeMap::new(),
        }
    }

    /// Shorthand: single-qubit X term.
    pub fn x(qubit: Q, coefficient: f64) -> Self {
        Self::single(Pauli::X, qubit, coefficient)
    }

    /// Shorthand: single-qubit Y term.
    pub fn y(qubit: Q, coefficient: f64) -> Self {
        Self::single(Pauli::Y, qubit, coefficient)
    }

    /// Shorthand: single-qubit Z term.
    pub fn z(qubit: Q, coefficient: f64) -> Self {
        Self::single(Pauli::Z, qubit, coefficient)
    }

    /// Real coefficient.
    pub fn coefficient(&self) -> f64 {
        self.coefficient
    }

    /// Non-identity `(qubit, operator)` factors in qubit order.
    pub fn ops(&self) -> impl Iterator<Item = (&Q, Pauli)> {
        self.ops.iter().map(|(q, op)| (q, *op))
    }

    /// The operator acting on `qubit` (I if none).
    pub fn op(&self, qubit: &Q) -> Pauli {
        self.ops.get(qubit).copied().unwrap_or(Pauli::I)
    }

    /// Qubits acted on non-trivially, in order.
    pub fn qubits(&self) -> impl Iterator<Item = &Q> {
        self.ops.keys()
    }

    /// Number of non-identity factors.
    pub fn weight(&self) -> usize {
        self.ops.len()
    }

    /// True if there are no non-identity factors.
    pub fn is_identity(&self) -> bool {
        self.ops.is_empty()
    }

    /// True if both terms carry the same Pauli string.
    pub fn same_operator(&self, other: &Self) -> bool {
        self.ops == other.ops
    }

    /// Merge two terms on the same Pauli string by summing coefficients.
    ///
    /// Returns `None` if the strings differ.
    pub fn merge(&self, other: &Self) -> Option<Self> {
        self.same_operator(other).then(|| Self {
            coefficient: self.coefficient + other.coefficient,
            ops: self.ops.clone(),
        })
    }

    /// Operator product `self · other`.
    ///
    /// Fails with [`VqeError::ComplexCoefficient`] when the product's phase is
    /// imaginary (e.g. `X·Y = iZ`), since coefficients are real.
    pub fn product(&self, other: &Self) -> VqeResult<Self> {
        let mut phase = Complex64::new(self.coefficient * other.coefficient, 0.0);
        let mut ops = self.ops.clone();
        for (q, rhs) in &other.ops {
            let lhs = ops.remove(q).unwrap_or(Pauli::I);
            let (p, op) = lhs.compose(*rhs);
            phase *= p;
            if op != Pauli::I {
                ops.insert(q.clone(), op);
            }
        }
        if phase.im != 0.0 {
            return Err(VqeError::ComplexCoefficient {
                lhs: self.to_string(),
                rhs: other.to_string(),
            });
        }
        Ok(Self {
            coefficient: phase.re,
            ops,
        })
    }

    /// Substitute qubits through `mapping`.
    pub fn remap(&self, mapping: &QubitMapping<Q>) -> VqeResult<PauliTerm<QubitIndex>> {
        let ops = self
            .ops
            .iter()
            .map(|(q, op)| Ok((mapping.resolve(q)?, *op)))
            .collect::<VqeResult<BTreeMap<_, _>>>()?;
        Ok(PauliTerm {
            coefficient: self.coefficient,
            ops,
        })
    }
}

impl PauliTerm<QubitIndex> {
    /// Dense `2^n × 2^n` matrix, qubit 0 being the least-significant factor.
    pub fn matrix(&self, n_qubits: usize) -> VqeResult<Array2<Complex64>> {
        dense_dim(n_qubits)?;
        if let Some((q, _)) = self.ops.last_key_value() {
            if q.as_usize() >= n_qubits {
                return Err(VqeError::QubitOutOfRange {
                    qubit: q.0,
                    n_qubits,
                });
            }
        }
        let mut acc = Array2::from_elem((1, 1), Complex64::new(self.coefficient, 0.0));
        for q in (0..n_qubits).rev() {
            let op = self.op(&QubitIndex(q as u32));
            acc = kron(&acc, &op.matrix());
        }
        Ok(acc)
    }
}

impl<Q: QubitLabel> Mul<f64> for PauliTerm<Q> {
    type Output = Self;

    fn mul(mut self, rhs: f64) -> Self {
        self.coefficient *= rhs;
        self
    }
}

impl<Q: QubitLabel> Neg for PauliTerm<Q> {
    type Output = Self;

    fn neg(self) -> Self {
        self * -1.0
    }
}

impl<Q: QubitLabel> Add for PauliTerm<Q> {
    type Output = PauliSum<Q>;

    fn add(self, rhs: Self) -> PauliSum<Q> {
        let mut sum = PauliSum::from_terms(vec![self]);
        sum += rhs;
        sum
    }
}

impl<Q: QubitLabel> fmt::Display for PauliTerm<Q> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.coefficient >= 0.0 {
            write!(f, "+{:.4} ", self.coefficient)?;
        } else {
            write!(f, "{:.4} ", self.coefficient)?;
        }

        if self.ops.is_empty() {
            write!(f, "I")?;
        } else {
            for (i, (qubit, pauli)) in self.ops.iter().enumerate() {
                if i > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{pauli}[{qubit}]")?;
            }
        }
        Ok(())
    }
}

/// A sum of Pauli terms, kept in insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PauliSum<Q: Ord> {
    terms: Vec<PauliTerm<Q>>,
}

impl<Q: QubitLabel> Default for PauliSum<Q> {
    fn default() -> Self {
        Self { terms: vec![] }
    }
}

impl<Q: QubitLabel> PauliSum<Q> {
    /// Create an empty sum.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap `terms` as-is, without merging like terms.
    pub fn from_terms(terms: Vec<PauliTerm<Q>>) -> Self {
        Self { terms }
    }

    /// All terms.
    pub fn terms(&self) -> &[PauliTerm<Q>] {
        &self.terms
    }

    /// Iterate terms.
    pub fn iter(&self) -> std::slice::Iter<'_, PauliTerm<Q>> {
        self.terms.iter()
    }

    /// Number of terms.
    pub fn num_terms(&self) -> usize {
        self.terms.len()
    }

    /// True if there are no terms.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Append `term`, merging it into an existing term on the same string.
    pub fn push_merged(&mut self, term: PauliTerm<Q>) {
        match self.terms.iter_mut().find(|t| t.same_operator(&term)) {
            Some(existing) => existing.coefficient += term.coefficient,
            None => self.terms.push(term),
        }
    }

    /// Merge like terms (first-occurrence order) and drop zero coefficients.
    pub fn simplify(&self) -> Self {
        let mut out = Self::new();
        for term in &self.terms {
            out.push_merged(term.clone());
        }
        out.terms.retain(|t| t.coefficient != 0.0);
        out
    }

    /// Every qubit acted on by some term (the observable's support).
    pub fn qubits(&self) -> BTreeSet<Q> {
        self.terms
            .iter()
            .flat_map(|t| t.qubits().cloned())
            .collect()
    }

    /// Sum of the coefficients of identity terms.
    pub fn identity_coefficient(&self) -> f64 {
        self.terms
            .iter()
            .filter(|t| t.is_identity())
            .map(PauliTerm::coefficient)
            .sum()
    }

    /// Substitute qubits through `mapping`, keeping term order.
    ///
    /// Fails with [`VqeError::UnresolvedQubit`] if any qubit is not covered.
    pub fn remap(&self, mapping: &QubitMapping<Q>) -> VqeResult<PauliSum<QubitIndex>> {
        let terms = self
            .terms
            .iter()
            .map(|t| t.remap(mapping))
            .collect::<VqeResult<Vec<_>>>()?;
        Ok(PauliSum { terms })
    }
}

impl PauliSum<QubitIndex> {
    /// The minimum number of qubits required to represent this observable.
    pub fn min_qubits(&self) -> usize {
        self.qubits().last().map_or(0, |q| q.as_usize() + 1)
    }

    /// Dense `2^n × 2^n` matrix of the observable.
    ///
    /// Fails with [`VqeError::TooManyQubits`] beyond [`MAX_DENSE_QUBITS`].
    pub fn matrix(&self, n_qubits: usize) -> VqeResult<Array2<Complex64>> {
        let dim = dense_dim(n_qubits)?;
        let mut acc = Array2::zeros((dim, dim));
        for term in &self.terms {
            acc += &term.matrix(n_qubits)?;
        }
        Ok(acc)
    }
}

impl<Q: QubitLabel> AddAssign<PauliTerm<Q>> for PauliSum<Q> {
    fn add_assign(&mut self, rhs: PauliTerm<Q>) {
        self.push_merged(rhs);
    }
}

impl<Q: QubitLabel> AddAssign for PauliSum<Q> {
    fn add_assign(&mut self, rhs: Self) {
        for term in rhs.terms {
            self.push_merged(term);
        }
    }
}

impl<Q: QubitLabel> Add<PauliTerm<Q>> for PauliSum<Q> {
    type Output = Self;

    fn add(mut self, rhs: PauliTerm<Q>) -> Self {
        self += rhs;
        self
    }
}

impl<Q: QubitLabel> Add for PauliSum<Q> {
    type Output = Self;

    fn add(mut self, rhs: Self) -> Self {
        self += rhs;
        self
    }
}

impl<Q: QubitLabel> From<PauliTerm<Q>> for PauliSum<Q> {
    fn from(term: PauliTerm<Q>) -> Self {
        Self { terms: vec![term] }
    }
}

impl<Q: QubitLabel> FromIterator<PauliTerm<Q>> for PauliSum<Q> {
    fn from_iter<T: IntoIterator<Item = PauliTerm<Q>>>(iter: T) -> Self {
        Self {
            terms: iter.into_iter().collect(),
        }
    }
}

impl<'a, Q: QubitLabel> IntoIterator for &'a PauliSum<Q> {
    type Item = &'a PauliTerm<Q>;
    type IntoIter = std::slice::Iter<'a, PauliTerm<Q>>;

    fn into_iter(self) -> Self::IntoIter {
        self.terms.iter()
    }
}

impl<Q: QubitLabel> fmt::Display for PauliSum<Q> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "PauliSum ({} terms):", self.num_terms())?;
        for term in &self.terms {
            writeln!(f, "  {term}")?;
        }
        Ok(())
    }
}
