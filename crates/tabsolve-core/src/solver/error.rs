use thiserror::Error;

/// Error type for solver initialization, grounding and option execution.
///
/// Duplicate action registration and repeated reward decoration are not errors;
/// both are absorbed silently by [`SolverState`](crate::SolverState).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolverError {
    /// The solver was configured with something tabular solving cannot use,
    /// such as an unstable hasher or a discount factor outside `[0, 1]`.
    #[error("invalid solver configuration: {reason}")]
    Configuration { reason: String },

    /// A grounded action references bindings that do not exist where it is used.
    #[error("invalid grounded action '{action}': {reason}")]
    InvalidAction { action: String, reason: String },

    /// A lifecycle operation the concrete algorithm did not implement.
    #[error("operation '{operation}' is not supported by this solver")]
    UnsupportedOperation { operation: &'static str },
}

impl SolverError {
    pub(crate) fn configuration(reason: impl Into<String>) -> Self {
        SolverError::Configuration {
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_action(action: impl Into<String>, reason: impl Into<String>) -> Self {
        SolverError::InvalidAction {
            action: action.into(),
            reason: reason.into(),
        }
    }
}
