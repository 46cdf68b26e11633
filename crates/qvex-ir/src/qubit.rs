//! Qubit identifiers.
//!
//! Programs and observables are generic over the identifier type. A
//! [`QubitPlaceholder`] stands for a qubit whose register position is not yet
//! known; a [`QubitIndex`] is a concrete position on a device or simulator
//! register. Addressing through a [`QubitMapping`](crate::QubitMapping) is the
//! only way to turn the former into the latter.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};

/// Bound shared by every qubit identifier type.
pub trait QubitLabel: Clone + Ord + Hash + fmt::Debug + fmt::Display {}

impl<T> QubitLabel for T where T: Clone + Ord + Hash + fmt::Debug + fmt::Display {}

/// A concrete, non-negative qubit index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct QubitIndex(pub u32);

impl QubitIndex {
    /// The index as a `usize`, for addressing amplitudes and columns.
    #[inline]
    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for QubitIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for QubitIndex {
    fn from(index: u32) -> Self {
        QubitIndex(index)
    }
}

static NEXT_PLACEHOLDER: AtomicU64 = AtomicU64::new(0);

/// An abstract qubit, resolved to a [`QubitIndex`] at addressing time.
///
/// Every call to [`QubitPlaceholder::new`] yields a fresh identifier that
/// compares unequal to all others. Ordering follows creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QubitPlaceholder(u64);

impl QubitPlaceholder {
    /// Allocate a fresh placeholder.
    pub fn new() -> Self {
        QubitPlaceholder(NEXT_PLACEHOLDER.fetch_add(1, Ordering::Relaxed))
    }

    /// Allocate `n` fresh placeholders in creation order.
    pub fn register(n: usize) -> Vec<Self> {
        (0..n).map(|_| Self::new()).collect()
    }
}

impl Default for QubitPlaceholder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for QubitPlaceholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{q{}}}", self.0)
    }
}
