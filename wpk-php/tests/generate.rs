use std::path::Path;

use wpkernel_codegen::{
    generation::write_generated_files,
    pipeline::{GenerationContext, PipelineRunResult, RunOptions},
};
use wpkernel_config::{ConfigFormat, load_str};
use wpkernel_core::{DiskFileSystem, MemoryFileSystem, MemoryReporter};
use wpkernel_php::{MANIFEST_FILE, PHP_BUILDERS, php_pipeline, read_manifest_hash};

const CONFIG: &str = r#"
version = 1
namespace = "acme-jobs"

[resources.job]
name = "job"
schema = "auto"
identity = { type = "number", param = "id" }
storage = { mode = "wp-post", postType = "acme_job", statuses = ["draft", "publish"], meta = { department = { type = "string" } }, taxonomies = { location = { taxonomy = "acme_location" } } }

[resources.job.routes]
list = { path = "/acme/v1/jobs", method = "GET" }
get = { path = "/acme/v1/jobs/:id", method = "GET" }
create = { path = "/acme/v1/jobs", method = "POST", capability = "job.create" }
update = { path = "/acme/v1/jobs/:id", method = "PUT", capability = "job.update" }
remove = { path = "/acme/v1/jobs/:id", method = "DELETE", capability = "job.delete" }

[capabilities]
"job.create" = "edit_posts"
"job.update" = { capability = "edit_post", appliesTo = "object" }
"job.delete" = { capability = "delete_post", appliesTo = "object" }
"#;

fn generate(config: &str) -> (PipelineRunResult, MemoryReporter) {
    let loaded = load_str(config, ConfigFormat::Toml, "wpk.config.toml").unwrap();
    let reporter = MemoryReporter::new();
    let mut ctx = GenerationContext::new(Box::new(reporter.clone()));
    let result = php_pipeline()
        .run(&mut ctx, &loaded, &RunOptions::default())
        .unwrap();
    (result, reporter)
}

fn method_body<'a>(source: &'a str, name: &str) -> &'a str {
    let start = source
        .find(&format!("public function {name}("))
        .unwrap_or_else(|| panic!("{name} not found"));
    let rest = &source[start..];
    let end = rest.find("\n\t}\n").unwrap_or(rest.len());
    &rest[..end]
}

/// Trimmed, non-blank lines of a method body, header excluded.
fn statements(body: &str) -> Vec<&str> {
    body.lines()
        .skip(1)
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}

#[test]
fn test_post_resource_end_to_end() {
    let (result, _) = generate(CONFIG);
    assert!(result.diagnostics.is_empty());

    let fs = MemoryFileSystem::new();
    let reporter = MemoryReporter::new();
    let summary = write_generated_files(&result.files, &reporter, &fs, Path::new("/plugin")).unwrap();
    assert_eq!(summary.written.len(), 5 + 1);

    let controller = fs
        .get("/plugin/.generated/php/Rest/JobController.php")
        .unwrap();
    assert!(controller.starts_with("<?php\n/**\n * Generated by wpk. Do not edit.\n */\n"));
    assert!(controller.contains("namespace Acme\\Jobs\\Rest;\n"));

    for field in ["postType", "cacheKeys", "queryParams", "appliesTo"] {
        assert!(!controller.contains(field), "controller mentions {field}");
    }

    let get = statements(method_body(&controller, "handle_get"));
    assert_eq!(get[0], "$id = $request->get_param( 'id' );");
    assert_eq!(get[1], "if ( null === $id ) {");

    let list = statements(method_body(&controller, "handle_list"));
    assert_eq!(list[0], "$page = max( 1, (int) $request->get_param( 'page' ) );");

    let create = method_body(&controller, "handle_create");
    assert_eq!(create.matches("// @wp-kernel").count(), 9);
    let status = create.find("resource.wpPost.mutation.status").unwrap();
    let meta = create.find("resource.wpPost.mutation.meta").unwrap();
    let taxonomies = create.find("resource.wpPost.mutation.taxonomies").unwrap();
    let cache = create.find("resource.wpPost.mutation.cache ").unwrap();
    assert!(status < meta && meta < taxonomies && taxonomies < cache);

    let update = method_body(&controller, "handle_update");
    assert_eq!(update.matches("// @wp-kernel").count(), 9);
    assert!(update.find("wpk_job_invalid_identifier").unwrap() < update.find("// @wp-kernel").unwrap());

    let remove = method_body(&controller, "handle_remove");
    assert_eq!(remove.matches("// @wp-kernel").count(), 0);
    assert!(remove.contains("wp_delete_post( $post->ID, true )"));

    assert!(method_body(&controller, "handle_list").contains("new WP_Query( $query_args )"));
    assert!(fs.formatted().iter().all(|path| path.extension().is_some_and(|ext| ext == "php")));
}

#[test]
fn test_generation_is_deterministic() {
    let (first, _) = generate(CONFIG);
    let (second, _) = generate(CONFIG);

    assert_eq!(first.ir.content_hash(), second.ir.content_hash());
    assert_eq!(first.files, second.files);
}

#[test]
fn test_builder_order() {
    let (result, _) = generate(CONFIG);
    let builders: Vec<&str> = result
        .steps
        .iter()
        .map(|step| step.key.as_str())
        .filter(|key| PHP_BUILDERS.contains(key))
        .collect();

    insta::assert_debug_snapshot!(builders, @r#"
    [
        "php.base-controller",
        "php.policy",
        "php.controllers",
        "php.index",
        "php.plugin-loader",
        "php.manifest",
    ]
    "#);
}

#[test]
fn test_written_manifest_matches_ir() {
    let dir = tempfile::tempdir().unwrap();
    let (result, _) = generate(CONFIG);
    let reporter = MemoryReporter::new();

    write_generated_files(&result.files, &reporter, &DiskFileSystem, dir.path()).unwrap();

    let manifest_path = dir.path().join(".generated/php").join(MANIFEST_FILE);
    let manifest = std::fs::read_to_string(manifest_path).unwrap();
    assert_eq!(
        read_manifest_hash(&manifest).as_deref(),
        Some(result.ir.content_hash())
    );
    assert!(dir.path().join(".generated/php/plugin.php").is_file());
    assert!(dir.path().join(".generated/php/Policy/Policy.php").is_file());
}
