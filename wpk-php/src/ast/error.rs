use thiserror::Error;

/// Rejected arguments to an AST constructor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AstError {
    #[error("{what} must not be empty")]
    Empty { what: &'static str },

    #[error("'{value}' is not a valid PHP {what}")]
    InvalidIdentifier { what: &'static str, value: String },

    #[error("cannot assign to a {node_type} expression")]
    InvalidAssignTarget { node_type: String },
}

impl AstError {
    pub(crate) fn invalid(what: &'static str, value: impl Into<String>) -> Self {
        AstError::InvalidIdentifier {
            what,
            value: value.into(),
        }
    }
}
