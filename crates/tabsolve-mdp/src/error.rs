use thiserror::Error;

#[derive(Debug, Error)]
/// Error type for domain loading, validation, building and metrics export.
pub enum MdpError {
    #[error("failed to read or write file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("domain name must not be empty")]
    MissingName,

    #[error("duplicate object class '{id}'")]
    DuplicateClass { id: String },

    #[error("duplicate attribute '{attribute}' in class '{class}'")]
    DuplicateAttribute { class: String, attribute: String },

    #[error("duplicate action id '{id}'")]
    DuplicateAction { id: String },

    #[error("action '{action}' parameter {index} references unknown class '{class}'")]
    UnknownParamClass {
        action: String,
        index: usize,
        class: String,
    },

    #[error("action '{action}' parameter {index} has no values")]
    EmptyParamValues { action: String, index: usize },

    #[error("object '{object}' has undeclared class '{class}'")]
    UnknownObjectClass { object: String, class: String },

    #[error("duplicate object name '{object}'")]
    DuplicateObject { object: String },

    #[error("object '{object}' of class '{class}' must define exactly attributes {expected:?}")]
    AttributeMismatch {
        object: String,
        class: String,
        expected: Vec<String>,
    },

    #[error("builder referenced unknown action '{action}'")]
    BuilderUnknownAction { action: String },

    #[error("action '{action}' has no transition attached")]
    MissingTransition { action: String },
}
