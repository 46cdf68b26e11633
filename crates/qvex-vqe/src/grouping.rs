//! Qubit-wise commuting decomposition of Pauli sums.
//!
//! Terms whose factors agree on every shared qubit can be estimated from a
//! single measurement setting. The decomposition here is greedy first-fit:
//! each term joins the earliest group it commutes with, otherwise it opens a
//! new one. The result depends only on term order.

use qvex_ir::QubitLabel;
use std::collections::{BTreeMap, BTreeSet};

use crate::error::{VqeError, VqeResult};
use crate::pauli::{Pauli, PauliSum, PauliTerm};

/// True if `a` and `b` agree on every qubit where both act non-trivially.
pub fn qubitwise_commute<Q: QubitLabel>(a: &PauliTerm<Q>, b: &PauliTerm<Q>) -> bool {
    a.ops().all(|(q, op)| {
        let other = b.op(q);
        other == Pauli::I || other == op
    })
}

/// A set of pairwise qubit-wise commuting terms, measured in one execution.
#[derive(Debug, Clone, PartialEq)]
pub struct CommutingGroup<Q: Ord> {
    terms: Vec<PauliTerm<Q>>,
}

impl<Q: QubitLabel> CommutingGroup<Q> {
    fn new(first: PauliTerm<Q>) -> Self {
        Self { terms: vec![first] }
    }

    /// Member terms, in input order.
    pub fn terms(&self) -> &[PauliTerm<Q>] {
        &self.terms
    }

    /// Number of member terms.
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// True if the group has no members.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Union of the member terms' supports.
    pub fn qubits(&self) -> BTreeSet<Q> {
        self.terms
            .iter()
            .flat_map(|t| t.qubits().cloned())
            .collect()
    }

    /// True if `term` commutes qubit-wise with every member.
    pub fn accepts(&self, term: &PauliTerm<Q>) -> bool {
        self.terms.iter().all(|t| qubitwise_commute(t, term))
    }

    /// The measurement basis for each qubit in the group's support.
    ///
    /// Fails with [`VqeError::MeasurementConflict`] if two members require
    /// different bases on the same qubit. Groups built by
    /// [`commuting_decomposition`] never do.
    pub fn basis(&self) -> VqeResult<BTreeMap<Q, Pauli>> {
        let mut basis = BTreeMap::new();
        for term in &self.terms {
            for (q, op) in term.ops() {
                match basis.get(q) {
                    Some(&existing) if existing != op => {
                        return Err(VqeError::MeasurementConflict {
                            qubit: q.to_string(),
                            first: existing,
                            second: op,
                        });
                    }
                    Some(_) => {}
                    None => {
                        basis.insert(q.clone(), op);
                    }
                }
            }
        }
        Ok(basis)
    }

    /// Sum of the member terms.
    pub fn to_sum(&self) -> PauliSum<Q> {
        PauliSum::from_terms(self.terms.clone())
    }
}

impl<Q: QubitLabel> FromIterator<PauliTerm<Q>> for CommutingGroup<Q> {
    /// Collect terms into a group without checking commutation.
    ///
    /// [`CommutingGroup::basis`] reports any conflict.
    fn from_iter<T: IntoIterator<Item = PauliTerm<Q>>>(iter: T) -> Self {
        Self {
            terms: iter.into_iter().collect(),
        }
    }
}

/// Partition `sum` into qubit-wise commuting groups, greedy first-fit.
///
/// Every term lands in exactly one group. Terms are not merged, so a sum
/// with repeated strings keeps them as separate members.
pub fn commuting_decomposition<Q: QubitLabel>(sum: &PauliSum<Q>) -> Vec<CommutingGroup<Q>> {
    let mut groups: Vec<CommutingGroup<Q>> = Vec::new();
    for term in sum {
        match groups.iter_mut().find(|g| g.accepts(term)) {
            Some(group) => group.terms.push(term.clone()),
            None => groups.push(CommutingGroup::new(term.clone())),
        }
    }
    groups
}
