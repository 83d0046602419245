use std::collections::HashMap;

use crate::solver::{
    arena::Arena,
    ids::{StateHandle, StateKey},
    snapshot::{BucketSnapshot, IndexSnapshot},
};

/// Strategy for turning states into tabular keys.
///
/// `key` must be deterministic and must collapse states that differ only by
/// object identifiers. `equivalent` is the collision check run after a key
/// match, so it must agree with `key`: equivalent states always share a key.
pub trait StateHasher<S> {
    /// Equivalence key of `state`.
    fn key(&self, state: &S) -> StateKey;

    /// Whether `a` and `b` are the same planning state up to identifier renaming.
    fn equivalent(&self, a: &S, b: &S) -> bool;

    /// Identifier correspondence from `from` to `to`, if the states are equivalent.
    ///
    /// Hashers that cannot recover a correspondence keep the default and return `None`.
    fn matching(&self, _from: &S, _to: &S) -> Option<HashMap<String, String>> {
        None
    }

    /// Whether keys are stable enough to index tables by.
    fn supports_tabular(&self) -> bool {
        true
    }
}

/// A state paired with its equivalence key.
#[derive(Debug, Clone, PartialEq)]
pub struct HashedState<S> {
    key: StateKey,
    state: S,
}

impl<S> HashedState<S> {
    pub fn new(key: StateKey, state: S) -> Self {
        HashedState { key, state }
    }

    pub fn key(&self) -> StateKey {
        self.key
    }

    pub fn state(&self) -> &S {
        &self.state
    }
}

/// Interns one canonical representative per equivalence class.
///
/// The first state seen for a class becomes its representative; later
/// equivalent states resolve to the same handle.
#[derive(Debug, Clone)]
pub struct CanonicalIndex<S> {
    arena: Arena<HashedState<S>>,
    buckets: HashMap<StateKey, Vec<StateHandle>>,
}

impl<S> Default for CanonicalIndex<S> {
    fn default() -> Self {
        CanonicalIndex {
            arena: Arena::new(),
            buckets: HashMap::new(),
        }
    }
}

impl<S> CanonicalIndex<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the handle of the canonical state equivalent to `state`, inserting it if needed.
    pub fn canonicalize<H>(&mut self, hasher: &H, state: S) -> StateHandle
    where
        H: StateHasher<S> + ?Sized,
    {
        let key = hasher.key(&state);
        if let Some(handle) = self.find(hasher, key, &state) {
            return handle;
        }

        let handle = self.arena.allocate(HashedState::new(key, state));
        self.buckets.entry(key).or_default().push(handle);
        handle
    }

    /// Look up the canonical handle for `state` without inserting.
    pub fn lookup<H>(&self, hasher: &H, state: &S) -> Option<StateHandle>
    where
        H: StateHasher<S> + ?Sized,
    {
        self.find(hasher, hasher.key(state), state)
    }

    fn find<H>(&self, hasher: &H, key: StateKey, state: &S) -> Option<StateHandle>
    where
        H: StateHasher<S> + ?Sized,
    {
        // Same key is necessary but not sufficient; resolve collisions structurally.
        self.buckets.get(&key)?.iter().copied().find(|handle| {
            self.arena
                .get(*handle)
                .is_some_and(|stored| hasher.equivalent(stored.state(), state))
        })
    }

    pub fn get(&self, handle: StateHandle) -> Option<&HashedState<S>> {
        self.arena.get(handle)
    }

    /// Number of distinct equivalence classes interned.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Forget every canonical state. Handles issued before the call are invalid afterwards.
    pub fn clear(&mut self) {
        self.arena.clear();
        self.buckets.clear();
    }

    /// Iterate canonical states in insertion order along with their handles.
    pub fn iter(&self) -> impl Iterator<Item = (StateHandle, &HashedState<S>)> {
        self.arena
            .iter()
            .enumerate()
            .map(|(idx, hashed)| (StateHandle::from(idx), hashed))
    }

    /// Summarize the index layout for diagnostics.
    pub fn snapshot(&self) -> IndexSnapshot {
        let mut buckets: Vec<BucketSnapshot> = self
            .buckets
            .iter()
            .map(|(key, handles)| BucketSnapshot {
                key: key.value(),
                handles: handles.iter().map(StateHandle::index).collect(),
            })
            .collect();
        buckets.sort_by_key(|bucket| bucket.key);

        let collisions = buckets
            .iter()
            .filter(|bucket| bucket.handles.len() > 1)
            .count();

        IndexSnapshot {
            schema_version: 1,
            state_count: self.arena.len(),
            collision_buckets: collisions,
            buckets,
        }
    }
}
