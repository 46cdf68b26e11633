//! Injective qubit mappings.

use rustc_hash::FxHashMap;
use std::collections::{BTreeMap, BTreeSet};

use crate::error::{IrError, IrResult};
use crate::qubit::{QubitIndex, QubitLabel};

/// An injective map from qubit identifiers to concrete indices.
///
/// Construction rejects mappings that send two distinct identifiers to the
/// same index, so every `QubitMapping` in existence is collision-free.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QubitMapping<Q> {
    map: BTreeMap<Q, QubitIndex>,
}

impl<Q: QubitLabel> QubitMapping<Q> {
    /// Build a mapping from `(identifier, index)` pairs.
    ///
    /// Repeating an identifier with the same index is accepted; repeating it
    /// with a different index is an error, as is reusing an index.
    pub fn new(pairs: impl IntoIterator<Item = (Q, QubitIndex)>) -> IrResult<Self> {
        let mut map = BTreeMap::new();
        let mut owners: FxHashMap<QubitIndex, Q> = FxHashMap::default();

        for (qubit, index) in pairs {
            if let Some(&existing) = map.get(&qubit) {
                if existing == index {
                    continue;
                }
                return Err(IrError::AmbiguousMapping {
                    qubit: qubit.to_string(),
                    first: existing,
                    second: index,
                });
            }
            if let Some(owner) = owners.get(&index) {
                return Err(IrError::QubitCollision {
                    index,
                    first: owner.to_string(),
                    second: qubit.to_string(),
                });
            }
            owners.insert(index, qubit.clone());
            map.insert(qubit, index);
        }

        Ok(Self { map })
    }

    /// Assign indices `0, 1, 2, ...` to the given qubits in first-seen order.
    pub fn default_for(qubits: impl IntoIterator<Item = Q>) -> Self {
        let mut map = BTreeMap::new();
        let mut next = 0u32;
        for qubit in qubits {
            map.entry(qubit).or_insert_with(|| {
                let index = QubitIndex(next);
                next += 1;
                index
            });
        }
        Self { map }
    }

    /// Look up the index for `qubit`.
    pub fn get(&self, qubit: &Q) -> Option<QubitIndex> {
        self.map.get(qubit).copied()
    }

    /// Look up the index for `qubit`, failing if it is not covered.
    pub fn resolve(&self, qubit: &Q) -> IrResult<QubitIndex> {
        self.get(qubit).ok_or_else(|| IrError::UnresolvedQubit {
            qubit: qubit.to_string(),
        })
    }

    /// Check that every identifier in `qubits` is covered.
    pub fn covers<'a>(&self, qubits: impl IntoIterator<Item = &'a Q>) -> IrResult<()>
    where
        Q: 'a,
    {
        qubits.into_iter().try_for_each(|q| self.resolve(q).map(drop))
    }

    /// The set of target indices.
    pub fn values(&self) -> BTreeSet<QubitIndex> {
        self.map.values().copied().collect()
    }

    /// Iterate `(identifier, index)` pairs in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = (&Q, QubitIndex)> {
        self.map.iter().map(|(q, i)| (q, *i))
    }

    /// Number of mapped identifiers.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// True if nothing is mapped.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl QubitMapping<QubitIndex> {
    /// Map each concrete index onto itself.
    pub fn identity(qubits: impl IntoIterator<Item = QubitIndex>) -> Self {
        Self {
            map: qubits.into_iter().map(|q| (q, q)).collect(),
        }
    }
}
