use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tabsolve_core::ParamType;

use crate::{MdpError, OoState};

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Serializable domain schema: object classes and action templates.
pub struct DomainSpec {
    /// Schema version for future compatibility checks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
    pub name: String,
    #[serde(default)]
    pub classes: Vec<ClassSpec>,
    #[serde(default)]
    pub actions: Vec<ActionSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// An object class and the attributes every instance carries.
pub struct ClassSpec {
    pub id: String,
    #[serde(default)]
    pub attributes: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// An action template and its parameter slots.
pub struct ActionSpec {
    pub id: String,
    #[serde(default)]
    pub params: Vec<ParamSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
/// One parameter slot: `{ class: door }` or `{ values: [N, S, E, W] }`.
pub enum ParamSpec {
    Class { class: String },
    Values { values: Vec<String> },
}

impl From<&ParamSpec> for ParamType {
    fn from(spec: &ParamSpec) -> Self {
        match spec {
            ParamSpec::Class { class } => ParamType::object(class.clone()),
            ParamSpec::Values { values } => ParamType::values(values.iter().cloned()),
        }
    }
}

impl ActionSpec {
    pub fn param_types(&self) -> Vec<ParamType> {
        self.params.iter().map(ParamType::from).collect()
    }
}

impl DomainSpec {
    pub fn class(&self, id: &str) -> Option<&ClassSpec> {
        self.classes.iter().find(|class| class.id == id)
    }

    pub fn action(&self, id: &str) -> Option<&ActionSpec> {
        self.actions.iter().find(|action| action.id == id)
    }

    /// Validate ids and parameter references.
    pub fn validate(&self) -> Result<(), MdpError> {
        if self.name.trim().is_empty() {
            return Err(MdpError::MissingName);
        }

        let mut class_ids = HashSet::with_capacity(self.classes.len());
        for class in &self.classes {
            if !class_ids.insert(class.id.as_str()) {
                return Err(MdpError::DuplicateClass {
                    id: class.id.clone(),
                });
            }
            let mut attributes = HashSet::with_capacity(class.attributes.len());
            for attribute in &class.attributes {
                if !attributes.insert(attribute.as_str()) {
                    return Err(MdpError::DuplicateAttribute {
                        class: class.id.clone(),
                        attribute: attribute.clone(),
                    });
                }
            }
        }

        let mut action_ids = HashSet::with_capacity(self.actions.len());
        for action in &self.actions {
            if !action_ids.insert(action.id.as_str()) {
                return Err(MdpError::DuplicateAction {
                    id: action.id.clone(),
                });
            }

            for (index, param) in action.params.iter().enumerate() {
                match param {
                    ParamSpec::Class { class } if !class_ids.contains(class.as_str()) => {
                        return Err(MdpError::UnknownParamClass {
                            action: action.id.clone(),
                            index,
                            class: class.clone(),
                        });
                    }
                    ParamSpec::Values { values } if values.is_empty() => {
                        return Err(MdpError::EmptyParamValues {
                            action: action.id.clone(),
                            index,
                        });
                    }
                    _ => {}
                }
            }
        }

        Ok(())
    }

    /// Check that a state only uses declared classes, with exactly their attributes.
    pub fn validate_state(&self, state: &OoState) -> Result<(), MdpError> {
        let mut names = HashSet::with_capacity(state.objects().len());
        for object in state.objects() {
            if !names.insert(object.name.as_str()) {
                return Err(MdpError::DuplicateObject {
                    object: object.name.clone(),
                });
            }

            let class = self
                .class(&object.class)
                .ok_or_else(|| MdpError::UnknownObjectClass {
                    object: object.name.clone(),
                    class: object.class.clone(),
                })?;

            let matches = object.attributes.len() == class.attributes.len()
                && class
                    .attributes
                    .iter()
                    .all(|attribute| object.attributes.contains_key(attribute));
            if !matches {
                return Err(MdpError::AttributeMismatch {
                    object: object.name.clone(),
                    class: class.id.clone(),
                    expected: class.attributes.clone(),
                });
            }
        }
        Ok(())
    }
}
