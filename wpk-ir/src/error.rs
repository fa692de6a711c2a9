use miette::Diagnostic;
use thiserror::Error;

/// Result type for IR construction.
pub type Result<T> = std::result::Result<T, IrError>;

/// Structural failures raised while building the IR.
///
/// These abort the generation run before anything is written.
#[derive(Debug, Error, Diagnostic)]
pub enum IrError {
    #[error("resource '{resource}' has an invalid {field}: {message}")]
    #[diagnostic(
        code(wpk::ir::developer),
        help("fix the resource declaration in the kernel config and run the generator again")
    )]
    Developer {
        resource: String,
        field: String,
        message: String,
    },

    #[error("{message}")]
    #[diagnostic(code(wpk::ir::validation))]
    Validation { message: String },

    #[error("failed to serialise the IR")]
    #[diagnostic(code(wpk::ir::serialize))]
    Serialize(#[from] serde_json::Error),
}

impl IrError {
    pub fn developer(
        resource: impl Into<String>,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        IrError::Developer {
            resource: resource.into(),
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        IrError::Validation {
            message: message.into(),
        }
    }
}
