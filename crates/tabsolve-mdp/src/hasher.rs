use std::{
    collections::{BTreeMap, HashMap, hash_map::DefaultHasher},
    hash::{Hash, Hasher},
};

use tabsolve_core::{StateHasher, StateKey};

use crate::{ObjectInstance, OoState};

/// Hashes an [`OoState`] by the multiset of its objects' class and attributes,
/// ignoring object names and insertion order.
///
/// Attributes are plain values, never references to other objects, so two
/// states are equivalent exactly when their signatures agree.
#[derive(Debug, Clone, Copy, Default)]
pub struct NameInvariantHasher;

type Signature<'a> = (&'a str, &'a BTreeMap<String, i64>);

fn signature(object: &ObjectInstance) -> Signature<'_> {
    (object.class.as_str(), &object.attributes)
}

fn sorted_signatures(state: &OoState) -> Vec<Signature<'_>> {
    let mut signatures: Vec<_> = state.objects().iter().map(signature).collect();
    signatures.sort();
    signatures
}

/// Objects ordered by signature, ties broken by name.
fn canonical_order(state: &OoState) -> Vec<&ObjectInstance> {
    let mut objects: Vec<&ObjectInstance> = state.objects().iter().collect();
    objects.sort_by(|a, b| signature(a).cmp(&signature(b)).then_with(|| a.name.cmp(&b.name)));
    objects
}

impl StateHasher<OoState> for NameInvariantHasher {
    fn key(&self, state: &OoState) -> StateKey {
        let mut hasher = DefaultHasher::new();
        sorted_signatures(state).hash(&mut hasher);
        StateKey::from(hasher.finish())
    }

    fn equivalent(&self, a: &OoState, b: &OoState) -> bool {
        a.objects().len() == b.objects().len() && sorted_signatures(a) == sorted_signatures(b)
    }

    fn matching(&self, from: &OoState, to: &OoState) -> Option<HashMap<String, String>> {
        if !self.equivalent(from, to) {
            return None;
        }
        Some(
            canonical_order(from)
                .into_iter()
                .zip(canonical_order(to))
                .map(|(a, b)| (a.name.clone(), b.name.clone()))
                .collect(),
        )
    }
}
