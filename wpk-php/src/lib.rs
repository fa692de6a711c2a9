//! PHP generation for the WPKernel generator.
//!
//! The [`ast`] module holds a tagged-union PHP syntax tree with validated
//! constructors; [`macros`] builds the recurring statement groups of a
//! resource handler (identity guards, status validation, meta and taxonomy
//! sync, cache priming, capability checks, `WP_Query` construction) out of
//! it. [`routes`] composes per-route handler bodies by storage mode and
//! [`controller`] assembles them into one REST controller class per
//! resource. [`printer`] turns the tree into WordPress-styled PHP text.
//!
//! [`helpers`] exposes all of this as pipeline builder helpers:
//!
//! ```ignore
//! let mut ctx = GenerationContext::new(Box::new(LogReporter::default()));
//! let result = php_pipeline().run(&mut ctx, &loaded, &RunOptions::default())?;
//! write_generated_files(&result.files, ctx.reporter(), &DiskFileSystem, root)?;
//! ```

pub mod ast;
pub mod controller;
pub mod files;
pub mod helpers;
pub mod macros;
pub mod metadata;
pub mod printer;
pub mod routes;

#[cfg(test)]
mod test_support;

pub use ast::{AstError, PhpFile, Stmt};
pub use controller::{ResourceController, build_resource_controller};
pub use files::{MANIFEST_FILE, read_manifest_hash};
pub use helpers::{PHP_BUILDERS, compose_controllers, php_pipeline, register_php_builders};
pub use metadata::{
    CacheInvalidationPlan, CapabilityHelperMetadata, CapabilityWarningMetadata, MutationMetadataKeys,
    ResourceControllerMetadata, WP_POST_MUTATION_KEYS,
};
pub use printer::Printer;
pub use routes::{
    RouteKind, build_create_route_statements, build_delete_route_statements,
    build_update_route_statements,
};
