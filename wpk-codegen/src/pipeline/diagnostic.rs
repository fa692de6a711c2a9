//! Pipeline diagnostics.
//!
//! Diagnostics describe non-fatal pipeline conditions. They never abort a
//! run; they are collected into the run result and forwarded to the
//! reporter as warnings.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use super::HelperKind;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Diagnostic {
    /// Two helpers of the same kind registered the same key.
    Conflict {
        key: String,
        kind: HelperKind,
        /// Labels of the first and the rejected registration.
        helpers: Vec<String>,
        message: String,
    },
    /// A helper depends on a key that never runs before it.
    MissingDependency {
        key: String,
        kind: HelperKind,
        dependency: String,
        message: String,
    },
    /// A helper ran but nothing depends on or requested it.
    UnusedHelper {
        key: String,
        kind: HelperKind,
        #[serde(rename = "dependsOn")]
        depends_on: Vec<String>,
        message: String,
    },
}

impl Diagnostic {
    pub fn conflict(key: &str, kind: HelperKind, first: &str, second: &str) -> Self {
        Diagnostic::Conflict {
            key: key.to_string(),
            kind,
            helpers: vec![first.to_string(), second.to_string()],
            message: format!(
                "{kind} helper \"{key}\" is already registered by {first}; the registration from {second} was ignored."
            ),
        }
    }

    pub fn missing_dependency(key: &str, kind: HelperKind, dependency: &str) -> Self {
        Diagnostic::MissingDependency {
            key: key.to_string(),
            kind,
            dependency: dependency.to_string(),
            message: format!(
                "{kind} helper \"{key}\" depends on \"{dependency}\", which is not registered; the helper was skipped."
            ),
        }
    }

    pub fn dependency_cycle(key: &str, kind: HelperKind, dependency: &str) -> Self {
        Diagnostic::MissingDependency {
            key: key.to_string(),
            kind,
            dependency: dependency.to_string(),
            message: format!(
                "{kind} helper \"{key}\" depends on \"{dependency}\", which is part of a dependency cycle; the helper was skipped."
            ),
        }
    }

    pub fn unused_helper(key: &str, kind: HelperKind, depends_on: &[String]) -> Self {
        Diagnostic::UnusedHelper {
            key: key.to_string(),
            kind,
            depends_on: depends_on.to_vec(),
            message: format!(
                "{kind} helper \"{key}\" ran but no helper depends on it and it was not requested."
            ),
        }
    }

    /// Discriminator of the serialised form.
    pub fn code(&self) -> &'static str {
        match self {
            Diagnostic::Conflict { .. } => "conflict",
            Diagnostic::MissingDependency { .. } => "missing-dependency",
            Diagnostic::UnusedHelper { .. } => "unused-helper",
        }
    }

    pub fn key(&self) -> &str {
        match self {
            Diagnostic::Conflict { key, .. }
            | Diagnostic::MissingDependency { key, .. }
            | Diagnostic::UnusedHelper { key, .. } => key,
        }
    }

    pub fn kind(&self) -> HelperKind {
        match self {
            Diagnostic::Conflict { kind, .. }
            | Diagnostic::MissingDependency { kind, .. }
            | Diagnostic::UnusedHelper { kind, .. } => *kind,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Diagnostic::Conflict { message, .. }
            | Diagnostic::MissingDependency { message, .. }
            | Diagnostic::UnusedHelper { message, .. } => message,
        }
    }

    /// Structured context for the reporter.
    pub fn context(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code(), self.message())
    }
}
