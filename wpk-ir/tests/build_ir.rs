use std::fs;

use serde_json::json;
use wpkernel_config::{ConfigFormat, LoadedConfig, load, parse_str};
use wpkernel_ir::{
    CapabilitySource, IrError, IrStorage, SchemaProvenance, build_ir, canonical_json,
    hash_canonical, to_canonical_json,
};

const JOBS: &str = r#"
version = 1
namespace = "acme-jobs"

[resources.job]
name = "job"
schema = "auto"
identity = { type = "number", param = "id" }
storage = { mode = "wp-post", postType = "acme_job", statuses = ["draft", "publish"], meta = { department = { type = "string" }, tags = { type = "string", single = false } }, taxonomies = { location = { taxonomy = "acme_location", hierarchical = true } } }
cacheKeys = { list = ["job", "list"] }

[resources.job.routes]
list = { path = "/acme/v1/jobs", method = "GET" }
get = { path = "/acme/v1/jobs/:id", method = "GET" }
create = { path = "/acme/v1/jobs", method = "POST", capability = "job.create" }
update = { path = "/acme/v1/jobs/:id", method = "PUT", capability = "job.update" }
remove = { path = "/acme/v1/jobs/:id", method = "DELETE", capability = "job.delete" }

[resources.department]
name = "department"
storage = { mode = "wp-taxonomy", taxonomy = "acme_department" }
routes.list = { path = "/acme/v1/departments", method = "GET" }

[capabilities]
"job.create" = "edit_posts"
"job.update" = { capability = "edit_post", appliesTo = "object" }
"#;

// Same config, every table and key declared in a different order.
const JOBS_REORDERED: &str = r#"
namespace = "acme-jobs"
version = 1

[capabilities]
"job.update" = { appliesTo = "object", capability = "edit_post" }
"job.create" = "edit_posts"

[resources.department]
routes.list = { method = "GET", path = "/acme/v1/departments" }
storage = { taxonomy = "acme_department", mode = "wp-taxonomy" }
name = "department"

[resources.job]
cacheKeys = { list = ["job", "list"] }
storage = { taxonomies = { location = { hierarchical = true, taxonomy = "acme_location" } }, meta = { tags = { single = false, type = "string" }, department = { type = "string" } }, statuses = ["draft", "publish"], postType = "acme_job", mode = "wp-post" }
identity = { param = "id", type = "number" }
schema = "auto"
name = "job"

[resources.job.routes]
remove = { method = "DELETE", path = "/acme/v1/jobs/:id", capability = "job.delete" }
update = { capability = "job.update", path = "/acme/v1/jobs/:id", method = "PUT" }
create = { path = "/acme/v1/jobs", capability = "job.create", method = "POST" }
get = { path = "/acme/v1/jobs/:id", method = "GET" }
list = { method = "GET", path = "/acme/v1/jobs" }
"#;

fn loaded(src: &str) -> LoadedConfig {
    let parsed = parse_str(src, ConfigFormat::Toml, "wpk.config.toml").unwrap();
    LoadedConfig::new(parsed.config, "wpk.config.toml").with_warnings(parsed.warnings)
}

#[test]
fn test_reordered_config_hashes_identically() {
    let first = build_ir(&loaded(JOBS)).unwrap();
    let second = build_ir(&loaded(JOBS_REORDERED)).unwrap();

    assert_eq!(first.content_hash(), second.content_hash());
    assert_eq!(
        to_canonical_json(&first).unwrap(),
        to_canonical_json(&second).unwrap()
    );
}

#[test]
fn test_content_hash_changes_with_content() {
    let first = build_ir(&loaded(JOBS)).unwrap();
    let changed = build_ir(&loaded(&JOBS.replace("edit_posts", "publish_posts"))).unwrap();

    assert_ne!(first.content_hash(), changed.content_hash());
}

#[test]
fn test_content_hash_is_hash_of_canonical_form() {
    let ir = build_ir(&loaded(JOBS)).unwrap();
    let value = serde_json::to_value(&ir).unwrap();

    assert_eq!(ir.content_hash(), hash_canonical(&value));
    assert_eq!(canonical_json(&value), to_canonical_json(&ir).unwrap());
}

#[test]
fn test_jobs_ir() {
    let ir = build_ir(&loaded(JOBS)).unwrap();

    assert_eq!(ir.meta.sanitized_namespace, "acme-jobs");
    assert_eq!(ir.php.namespace, "Acme\\Jobs");
    assert_eq!(ir.php.output_dir, ".generated/php");

    let names: Vec<_> = ir.resources.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["department", "job"]);

    let job = ir.resource("job").unwrap();
    assert_eq!(job.routes.len(), 5);
    assert_eq!(
        job.cache_keys.list.segments,
        vec![
            wpkernel_config::CacheSegment::text("job"),
            wpkernel_config::CacheSegment::text("list")
        ]
    );
    assert!(job.cache_keys.remove.is_some());
    let post = job.wp_post().unwrap();
    assert_eq!(post.post_type, "acme_job");
    assert!(!post.meta["tags"].single);
    assert!(post.taxonomies["location"].hierarchical);

    let department = ir.resource("department").unwrap();
    assert!(matches!(department.storage, Some(IrStorage::WpTaxonomy { .. })));
    assert_eq!(department.schema_key, "auto:department");

    let schema = ir.schema("auto:job").unwrap();
    assert_eq!(schema.provenance, SchemaProvenance::Auto);
    assert_eq!(
        schema.schema["properties"]["tags"],
        json!({ "type": "array", "items": { "type": "string" } })
    );

    let map = &ir.capability_map;
    assert_eq!(map.missing, vec!["job.delete"]);
    assert_eq!(
        map.definition("job.delete").unwrap().source,
        CapabilitySource::Fallback
    );
    assert_eq!(map.definition("job.update").unwrap().binding.as_deref(), Some("id"));
}

#[test]
fn test_manual_schema_loaded_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("schemas")).unwrap();
    fs::write(
        dir.path().join("schemas/book.json"),
        r#"{ "type": "object", "title": "Book" }"#,
    )
    .unwrap();
    fs::write(
        dir.path().join("wpk.config.toml"),
        r#"
version = 1
namespace = "acme"

[schemas.book]
path = "schemas/book.json"

[resources.book]
name = "book"
schema = "book"
routes.list = { path = "/acme/v1/books", method = "GET" }
"#,
    )
    .unwrap();

    let loaded = load(dir.path().join("wpk.config.toml")).unwrap();
    let ir = build_ir(&loaded).unwrap();

    let schema = ir.schema("book").unwrap();
    assert_eq!(schema.provenance, SchemaProvenance::Manual);
    assert_eq!(schema.source_path, "schemas/book.json");
    assert_eq!(
        schema.hash,
        hash_canonical(&json!({ "title": "Book", "type": "object" }))
    );
    assert_eq!(ir.resource("book").unwrap().schema_provenance, SchemaProvenance::Manual);
}

#[test]
fn test_duplicate_route_across_resources_is_a_developer_error() {
    let src = r#"
version = 1
namespace = "acme"

[resources.book]
name = "book"
storage = { mode = "transient" }
routes.list = { path = "/acme/v1/books", method = "GET" }

[resources.novel]
name = "novel"
storage = { mode = "transient" }
routes.list = { path = "acme/v1/books/", method = "GET" }
"#;
    let err = build_ir(&loaded(src)).unwrap_err();

    match err {
        IrError::Developer {
            resource, field, ..
        } => {
            assert_eq!(resource, "novel");
            assert_eq!(field, "routes.list");
        }
        other => panic!("expected developer error, got {other:?}"),
    }
}
