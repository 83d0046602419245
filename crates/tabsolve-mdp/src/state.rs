use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use tabsolve_core::ObjectState;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// A named object with integer-valued attributes.
pub struct ObjectInstance {
    pub name: String,
    pub class: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
/// Object-oriented world state: a list of objects in insertion order.
pub struct OoState {
    objects: Vec<ObjectInstance>,
}

impl OoState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an object and return the state, for building states inline.
    pub fn with_object<I, K>(mut self, name: impl Into<String>, class: impl Into<String>, attributes: I) -> Self
    where
        I: IntoIterator<Item = (K, i64)>,
        K: Into<String>,
    {
        self.objects.push(ObjectInstance {
            name: name.into(),
            class: class.into(),
            attributes: attributes
                .into_iter()
                .map(|(key, value)| (key.into(), value))
                .collect(),
        });
        self
    }

    pub fn objects(&self) -> &[ObjectInstance] {
        &self.objects
    }

    pub fn object(&self, name: &str) -> Option<&ObjectInstance> {
        self.objects.iter().find(|object| object.name == name)
    }

    pub fn attribute(&self, object: &str, attribute: &str) -> Option<i64> {
        self.object(object)?.attributes.get(attribute).copied()
    }

    /// Copy of this state with one attribute changed. Unknown objects leave the state as-is.
    pub fn with_attribute(&self, object: &str, attribute: &str, value: i64) -> Self {
        let mut next = self.clone();
        if let Some(target) = next.objects.iter_mut().find(|o| o.name == object) {
            target.attributes.insert(attribute.to_string(), value);
        }
        next
    }

    /// Copy of this state with object names rewritten through `renaming`.
    /// Names missing from `renaming` are kept.
    pub fn renamed(&self, renaming: &HashMap<String, String>) -> Self {
        OoState {
            objects: self
                .objects
                .iter()
                .map(|object| ObjectInstance {
                    name: renaming
                        .get(&object.name)
                        .cloned()
                        .unwrap_or_else(|| object.name.clone()),
                    ..object.clone()
                })
                .collect(),
        }
    }
}

impl ObjectState for OoState {
    fn objects_of_class(&self, class: &str) -> Vec<String> {
        self.objects
            .iter()
            .filter(|object| object.class == class)
            .map(|object| object.name.clone())
            .collect()
    }
}
