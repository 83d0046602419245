use std::slice::Iter;

use crate::solver::ids::StateHandle;

/// Append-only storage for canonical states, addressed by `StateHandle`.
#[derive(Debug, Clone)]
pub(crate) struct Arena<T> {
    storage: Vec<T>,
}

impl<T> Arena<T> {
    /// Create a new empty storage
    pub fn new() -> Self {
        Arena {
            storage: Vec::new(),
        }
    }

    /// Allocate a new item and return the associated handle
    pub fn allocate(&mut self, item: T) -> StateHandle {
        let handle = StateHandle::from(self.storage.len());
        self.storage.push(item);
        handle
    }

    pub fn get(&self, handle: StateHandle) -> Option<&T> {
        self.storage.get(handle.index())
    }

    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    /// Drop every item. Previously issued handles become dangling.
    pub fn clear(&mut self) {
        self.storage.clear();
    }

    pub fn iter(&self) -> Iter<'_, T> {
        self.storage.iter()
    }
}

impl<'a, T> IntoIterator for &'a Arena<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.storage.iter()
    }
}
