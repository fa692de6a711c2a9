//! Core operations.
//!
//! This module contains the business logic for wpk commands,
//! separated from CLI argument parsing and output rendering.

pub mod check;
pub mod generate;
pub mod ir;

pub use check::check;
pub use generate::{GenerateOptions, generate};
pub use ir::ir_json;

use wpkernel_codegen::pipeline::Diagnostic;
use wpkernel_ir::Ir;

use crate::reports::ResourceSummary;

fn resource_summaries(ir: &Ir) -> Vec<ResourceSummary> {
    ir.resources
        .iter()
        .map(|resource| ResourceSummary {
            name: resource.name.clone(),
            storage: resource.storage.as_ref().map(|storage| storage.mode().to_string()),
            routes: resource.routes.len(),
        })
        .collect()
}

fn describe_diagnostics(diagnostics: &[Diagnostic]) -> Vec<String> {
    diagnostics
        .iter()
        .map(|diagnostic| format!("{}: {}", diagnostic.code(), diagnostic.message()))
        .collect()
}
