//! Generate operation - PHP generation from the kernel config.

use std::path::Path;

use eyre::{Context, Result};
use wpkernel_codegen::{
    generation::write_generated_files,
    pipeline::{GenerationContext, RunOptions},
};
use wpkernel_config::LoadedConfig;
use wpkernel_core::{FileSystem, LogReporter};
use wpkernel_php::{MANIFEST_FILE, php_pipeline, read_manifest_hash};

use super::{describe_diagnostics, resource_summaries};
use crate::reports::{GenerateReport, GenerationResult, PreviewFile};

/// Options for the generate operation.
pub struct GenerateOptions<'a> {
    /// Plugin root the generated paths are relative to.
    pub output_dir: &'a Path,
    /// Whether to preview without writing files.
    pub dry_run: bool,
    /// Write even when the manifest records the current IR hash.
    pub force: bool,
}

/// Execute the generate operation.
///
/// Runs the full pipeline, then writes every queued file through `fs`
/// unless the previous manifest already records the same IR hash.
pub fn generate(
    loaded: &LoadedConfig,
    fs: &dyn FileSystem,
    opts: GenerateOptions,
) -> Result<GenerateReport> {
    let mut ctx = GenerationContext::new(Box::new(LogReporter::default()));
    let result = php_pipeline()
        .run(&mut ctx, loaded, &RunOptions::default())
        .wrap_err("Generation failed")?;

    let ir_hash = result.ir.content_hash().to_string();
    let manifest = opts
        .output_dir
        .join(&result.ir.php.output_dir)
        .join(MANIFEST_FILE);

    let generation = if opts.dry_run {
        GenerationResult::Preview(
            result
                .files
                .iter()
                .map(|file| PreviewFile {
                    path: file.path().display().to_string(),
                    content: file.content().to_string(),
                })
                .collect(),
        )
    } else {
        let previous = fs
            .read_file(&manifest)
            .wrap_err_with(|| format!("failed to read {}", manifest.display()))?
            .as_deref()
            .and_then(read_manifest_hash);

        if !opts.force && previous.as_deref() == Some(ir_hash.as_str()) {
            ctx.reporter().info(
                "Generated files are up to date.",
                Some(&serde_json::json!({ "irHash": ir_hash })),
            );
            GenerationResult::UpToDate { manifest }
        } else {
            let summary = write_generated_files(&result.files, ctx.reporter(), fs, opts.output_dir)
                .wrap_err("Failed to write generated files")?;
            GenerationResult::Written {
                root: opts.output_dir.to_path_buf(),
                written: summary.written,
                skipped: summary.skipped,
            }
        }
    };

    Ok(GenerateReport {
        namespace: result.ir.php.namespace.clone(),
        ir_hash,
        resources: resource_summaries(&result.ir),
        diagnostics: describe_diagnostics(&result.diagnostics),
        result: generation,
    })
}

#[cfg(test)]
mod tests {
    use wpkernel_config::{ConfigFormat, load_str};
    use wpkernel_core::MemoryFileSystem;

    use super::*;

    const CONFIG: &str = r#"
        version = 1
        namespace = "acme-jobs"

        [resources.job]
        name = "job"
        storage = { mode = "wp-post" }
        routes.list = { path = "/acme/v1/jobs", method = "GET" }
        routes.get = { path = "/acme/v1/jobs/:id", method = "GET" }
    "#;

    fn loaded() -> LoadedConfig {
        load_str(CONFIG, ConfigFormat::Toml, "wpk.config.toml").unwrap()
    }

    fn options(dry_run: bool, force: bool) -> GenerateOptions<'static> {
        GenerateOptions {
            output_dir: Path::new("/plugin"),
            dry_run,
            force,
        }
    }

    #[test]
    fn test_second_run_is_up_to_date() {
        let fs = MemoryFileSystem::new();
        let loaded = loaded();

        let first = generate(&loaded, &fs, options(false, false)).unwrap();
        let GenerationResult::Written { written, .. } = &first.result else {
            panic!("expected files to be written");
        };
        assert!(!written.is_empty());
        assert!(fs.get("/plugin/.generated/php/wpk-manifest.json").is_some());

        let second = generate(&loaded, &fs, options(false, false)).unwrap();
        assert!(matches!(second.result, GenerationResult::UpToDate { .. }));
        assert_eq!(first.ir_hash, second.ir_hash);

        let forced = generate(&loaded, &fs, options(false, true)).unwrap();
        assert!(matches!(forced.result, GenerationResult::Written { .. }));
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let fs = MemoryFileSystem::new();
        let report = generate(&loaded(), &fs, options(true, false)).unwrap();

        let GenerationResult::Preview(files) = &report.result else {
            panic!("expected a preview");
        };
        assert!(files.iter().any(|file| file.path.ends_with("JobController.php")));
        assert!(fs.files().is_empty());
        assert_eq!(report.resources[0].storage.as_deref(), Some("wp-post"));
    }
}
