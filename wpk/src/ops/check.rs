//! Check operation - config validation.

use std::path::Path;

use eyre::{Context, Result};
use wpkernel_codegen::pipeline::{GenerationContext, RunOptions};
use wpkernel_config::LoadedConfig;
use wpkernel_core::LogReporter;
use wpkernel_php::php_pipeline;

use super::{describe_diagnostics, resource_summaries};
use crate::reports::CheckReport;

/// Execute the check operation.
///
/// Runs the whole pipeline, including the PHP builders, without writing.
pub fn check(loaded: &LoadedConfig, config_path: &Path) -> Result<CheckReport> {
    let mut ctx = GenerationContext::new(Box::new(LogReporter::default()));
    let result = php_pipeline()
        .run(&mut ctx, loaded, &RunOptions::default())
        .wrap_err("Validation failed")?;

    Ok(CheckReport {
        config_path: config_path.to_path_buf(),
        namespace: result.ir.php.namespace.clone(),
        resources: resource_summaries(&result.ir),
        warning_count: loaded.warnings.len() + result.ir.warnings().count(),
        diagnostics: describe_diagnostics(&result.diagnostics),
    })
}
