//! Core utilities and collaborator traits for the WPKernel PHP generator.
//!
//! This crate provides the naming helpers, the generated-file abstraction and
//! the [`Reporter`]/[`FileSystem`] collaborators shared by every other crate
//! in the workspace.

mod file;
mod namespace;
mod reporter;
mod utils;

// File operations
#[cfg(any(test, feature = "testing"))]
pub use file::MemoryFileSystem;
pub use file::{
    DiskFileSystem, File, FileRules, FileSystem, GeneratedFile, Overwrite, WriteResult,
};
// Namespaces
pub use namespace::{
    DEFAULT_PHP_NAMESPACE, RESERVED_NAMESPACES, php_namespace, sanitize_namespace,
};
// Reporting
#[cfg(any(test, feature = "testing"))]
pub use reporter::{MemoryReporter, ReportEntry};
pub use reporter::{LogReporter, Reporter};
// String utilities
pub use utils::{to_camel_case, to_pascal_case, to_snake_case, to_title_case, to_underscore_slug};
