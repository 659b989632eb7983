use crate::value::ValueKind;

/// A schema parameter that violates its contract.
///
/// Raised eagerly by builders and by [`Validator::load`](crate::Validator::load);
/// never raised while validating data.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContractError {
    #[error("{class}.{param} must be {expected}, got {actual}")]
    Type {
        class: &'static str,
        param: String,
        expected: &'static str,
        actual: ValueKind,
    },

    #[error("{class}.{param} must not be negative, got {actual}")]
    Negative {
        class: &'static str,
        param: String,
        actual: i64,
    },

    #[error("{class}.{param} must not be empty")]
    Empty { class: &'static str, param: String },

    #[error("{class}.{param} is invalid: {reason}")]
    Invalid {
        class: &'static str,
        param: String,
        reason: String,
    },

    #[error("{class} has no parameter {param:?}")]
    Unknown { class: &'static str, param: String },

    #[error("{class}.{param} is required")]
    Required { class: &'static str, param: String },
}

impl ContractError {
    pub(crate) fn invalid(
        class: &'static str,
        param: impl Into<String>,
        reason: impl ToString,
    ) -> Self {
        ContractError::Invalid {
            class,
            param: param.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn empty(class: &'static str, param: impl Into<String>) -> Self {
        ContractError::Empty {
            class,
            param: param.into(),
        }
    }
}
