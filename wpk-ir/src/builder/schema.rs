//! Schema resolution and synthesis.

use std::collections::BTreeMap;

use serde_json::{Map, Value, json};
use wpkernel_config::{LoadedConfig, MetaType, ResourceConfig, SchemaRef, StorageConfig};

use crate::{
    IrError, IrSchema, Result, SchemaOrigin, SchemaProvenance, canonical::hash_canonical,
};

/// JSON Schema dialect of synthesised schemas.
pub const SCHEMA_DIALECT: &str = "https://json-schema.org/draft/2020-12/schema";
/// Base URL of synthesised schema ids.
pub const SCHEMA_REGISTRY_BASE_URL: &str = "https://schemas.wpkernel.dev";

/// Collects schemas while resources are resolved.
#[derive(Debug, Default)]
pub struct SchemaAccumulator {
    schemas: BTreeMap<String, IrSchema>,
}

impl SchemaAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, schema: IrSchema) {
        self.schemas.insert(schema.key.clone(), schema);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.schemas.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&IrSchema> {
        self.schemas.get(key)
    }

    /// Schemas sorted by key.
    pub fn into_schemas(self) -> Vec<IrSchema> {
        self.schemas.into_values().collect()
    }
}

impl From<Vec<IrSchema>> for SchemaAccumulator {
    fn from(schemas: Vec<IrSchema>) -> Self {
        Self {
            schemas: schemas
                .into_iter()
                .map(|schema| (schema.key.clone(), schema))
                .collect(),
        }
    }
}

/// Hash every declared schema document.
pub fn build_schemas(loaded: &LoadedConfig) -> Result<SchemaAccumulator> {
    let mut accumulator = SchemaAccumulator::new();

    for (key, declared) in &loaded.config.schemas {
        let document = loaded.schemas.get(key).ok_or_else(|| {
            IrError::validation(format!(
                "schema '{key}' ({}) was declared but never loaded",
                declared.path
            ))
        })?;

        accumulator.insert(IrSchema {
            key: key.clone(),
            source_path: declared.path.replace('\\', "/"),
            hash: hash_canonical(&document.document),
            schema: document.document.clone(),
            provenance: SchemaProvenance::Manual,
            generated_from: None,
        });
    }

    Ok(accumulator)
}

/// Schema a resource resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaAssignment {
    pub key: String,
    pub provenance: SchemaProvenance,
}

/// Resolve the schema of a resource, synthesising one for `auto`.
///
/// A resource without a schema reference falls back to `auto` when it has
/// storage; otherwise there is nothing to synthesise from and it fails.
pub fn resolve_resource_schema(
    resource_key: &str,
    resource: &ResourceConfig,
    sanitized_namespace: &str,
    accumulator: &mut SchemaAccumulator,
) -> Result<SchemaAssignment> {
    let reference = match (&resource.schema, &resource.storage) {
        (Some(reference), _) => reference.clone(),
        (None, Some(_)) => SchemaRef::Auto,
        (None, None) => {
            return Err(IrError::developer(
                &resource.name,
                "schema",
                format!(
                    "resource \"{resource_key}\" must declare a schema reference or use 'auto'"
                ),
            ));
        }
    };

    match reference {
        SchemaRef::Key(key) => {
            if !accumulator.contains(&key) {
                return Err(IrError::developer(
                    &resource.name,
                    "schema",
                    format!("schema '{key}' is not declared"),
                ));
            }
            Ok(SchemaAssignment {
                key,
                provenance: SchemaProvenance::Manual,
            })
        }
        SchemaRef::Auto => {
            let key = format!("auto:{resource_key}");
            let schema = synthesize_schema(resource, sanitized_namespace);
            accumulator.insert(IrSchema {
                key: key.clone(),
                source_path: format!("[storage:{resource_key}]"),
                hash: hash_canonical(&schema),
                schema,
                provenance: SchemaProvenance::Auto,
                generated_from: Some(SchemaOrigin {
                    kind: "storage".to_string(),
                    resource: resource_key.to_string(),
                }),
            });
            Ok(SchemaAssignment {
                key,
                provenance: SchemaProvenance::Auto,
            })
        }
    }
}

/// Synthesise a JSON Schema from the resource's storage.
///
/// Only wp-post meta contributes properties; other storage modes produce an
/// empty object schema.
pub fn synthesize_schema(resource: &ResourceConfig, sanitized_namespace: &str) -> Value {
    let mut properties = Map::new();
    if let Some(StorageConfig::WpPost(post)) = &resource.storage {
        for (key, field) in &post.meta {
            let property = if field.is_single() {
                meta_property(field.kind)
            } else {
                json!({ "type": "array", "items": meta_property(field.kind) })
            };
            properties.insert(key.clone(), property);
        }
    }

    json!({
        "$schema": SCHEMA_DIALECT,
        "$id": format!(
            "{SCHEMA_REGISTRY_BASE_URL}/{sanitized_namespace}/{}.json",
            resource.name
        ),
        "title": format!("{} Resource", wpkernel_core::to_title_case(&resource.name)),
        "type": "object",
        "additionalProperties": false,
        "properties": properties,
    })
}

fn meta_property(kind: MetaType) -> Value {
    json!({ "type": kind.as_str() })
}

#[cfg(test)]
mod tests {
    use wpkernel_config::KernelConfig;

    use super::*;

    fn config(src: &str) -> KernelConfig {
        src.parse().unwrap()
    }

    #[test]
    fn test_synthesize_schema_from_meta() {
        let config = config(
            r#"
            version = 1
            namespace = "acme"

            [resources.job]
            name = "job"
            routes.list = { path = "/acme/v1/jobs", method = "GET" }
            storage = { mode = "wp-post", meta = { salary = { type = "integer" }, tags = { type = "string", single = false } } }
            "#,
        );
        let schema = synthesize_schema(&config.resources["job"], "acme");

        assert_eq!(schema["$id"], "https://schemas.wpkernel.dev/acme/job.json");
        assert_eq!(schema["title"], "Job Resource");
        assert_eq!(schema["additionalProperties"], false);
        assert_eq!(schema["properties"]["salary"], json!({ "type": "integer" }));
        assert_eq!(
            schema["properties"]["tags"],
            json!({ "type": "array", "items": { "type": "string" } })
        );
    }

    #[test]
    fn test_resource_without_schema_or_storage_fails() {
        let config = config(
            r#"
            version = 1
            namespace = "acme"

            [resources.job]
            name = "job"
            routes.list = { path = "/acme/v1/jobs", method = "GET" }
            "#,
        );
        let err = resolve_resource_schema(
            "job",
            &config.resources["job"],
            "acme",
            &mut SchemaAccumulator::new(),
        )
        .unwrap_err();
        assert!(matches!(err, IrError::Developer { ref field, .. } if field == "schema"));
    }

    #[test]
    fn test_storage_defaults_to_auto_schema() {
        let config = config(
            r#"
            version = 1
            namespace = "acme"

            [resources.job]
            name = "job"
            routes.list = { path = "/acme/v1/jobs", method = "GET" }
            storage = { mode = "transient" }
            "#,
        );
        let mut accumulator = SchemaAccumulator::new();
        let assignment =
            resolve_resource_schema("job", &config.resources["job"], "acme", &mut accumulator)
                .unwrap();

        assert_eq!(assignment.key, "auto:job");
        assert_eq!(assignment.provenance, SchemaProvenance::Auto);
        let schemas = accumulator.into_schemas();
        assert_eq!(schemas[0].source_path, "[storage:job]");
        assert_eq!(
            schemas[0].generated_from,
            Some(SchemaOrigin {
                kind: "storage".into(),
                resource: "job".into()
            })
        );
    }
}
