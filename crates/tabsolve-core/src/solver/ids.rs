/// Equivalence key produced by a [`StateHasher`](crate::StateHasher).
/// Must be deterministic and must not depend on object identifiers.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateKey(u64);

impl StateKey {
    /// Return the internal numeric representation of this key.
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl From<u64> for StateKey {
    /// Allow for explicit conversion from u64 to StateKey.
    fn from(value: u64) -> Self {
        StateKey(value)
    }
}

/// Opaque handle to one canonical state interned in a [`CanonicalIndex`](crate::CanonicalIndex).
/// Two equivalent states canonicalize to the same handle.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateHandle(usize);

impl StateHandle {
    /// Get the arena slot of this handle
    pub fn index(&self) -> usize {
        self.0
    }
}

impl From<usize> for StateHandle {
    fn from(value: usize) -> Self {
        StateHandle(value)
    }
}
