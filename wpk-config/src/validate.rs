//! Structural validation of a parsed kernel config.
//!
//! Everything checked here is fatal and runs before any IR is built. Issues
//! that do not block generation come back as [`ConfigWarning`]s.

use std::collections::HashSet;

use serde::Serialize;
use wpkernel_core::{sanitize_namespace, to_snake_case};

use crate::{
    CapabilityDescriptor, KernelConfig, QueryParamType, ResourceConfig, Result, SchemaRef,
    StorageConfig, error::SourceContext,
};

/// A non-fatal validation finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigWarning {
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
}

impl ConfigWarning {
    fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            resource: None,
        }
    }

    fn for_resource(code: &'static str, message: impl Into<String>, resource: &str) -> Self {
        Self {
            code,
            message: message.into(),
            resource: Some(resource.to_string()),
        }
    }
}

/// Validate a parsed config, returning its warnings.
pub fn validate(config: &KernelConfig, source: &SourceContext) -> Result<Vec<ConfigWarning>> {
    let mut warnings = Vec::new();

    match config.version {
        Some(KernelConfig::CURRENT_VERSION) => {}
        Some(version) => {
            return Err(source.validation_error_at_key(
                format!(
                    "unsupported config version {version}; expected {}",
                    KernelConfig::CURRENT_VERSION
                ),
                "version",
            ));
        }
        None => warnings.push(ConfigWarning::new(
            "config.version.missing",
            format!(
                "Config does not declare a version; assuming version {}.",
                KernelConfig::CURRENT_VERSION
            ),
        )),
    }

    match sanitize_namespace(&config.namespace) {
        None => {
            return Err(source.validation_error_at_key(
                format!(
                    "invalid namespace '{}': use 3-50 lowercase letters, digits or dashes, \
                     starting with a letter and not a reserved word",
                    config.namespace
                ),
                &config.namespace,
            ));
        }
        Some(sanitized) if sanitized != config.namespace => {
            warnings.push(ConfigWarning::new(
                "namespace.sanitized",
                format!(
                    "Namespace '{}' was sanitised to '{sanitized}'.",
                    config.namespace
                ),
            ));
        }
        Some(_) => {}
    }

    let mut names = HashSet::new();
    for (key, resource) in &config.resources {
        validate_resource(key, resource, config, source, &mut warnings)?;

        if !names.insert(resource.name.as_str()) {
            return Err(source.validation_error_at_key(
                format!("duplicate resource name '{}'", resource.name),
                key,
            ));
        }
    }

    if let Some(capabilities) = &config.capabilities {
        for (key, descriptor) in capabilities {
            validate_capability(key, descriptor, source)?;
        }
    }

    Ok(warnings)
}

fn validate_resource(
    key: &str,
    resource: &ResourceConfig,
    config: &KernelConfig,
    source: &SourceContext,
    warnings: &mut Vec<ConfigWarning>,
) -> Result<()> {
    let name = resource.name.trim();
    if name.is_empty() {
        return Err(source.validation_error_at_key(
            format!("resource '{key}' must have a non-empty name"),
            key,
        ));
    }

    if resource.routes.is_empty() {
        return Err(source.validation_error_at_key(
            format!("resource '{name}' must define at least one route"),
            key,
        ));
    }

    let mut seen = HashSet::new();
    for (operation, route) in resource.routes.iter() {
        let path = route.path.trim();
        if path.is_empty() {
            return Err(source.validation_error_at_key(
                format!("{operation} route of resource '{name}' has an empty path"),
                key,
            ));
        }

        if !seen.insert((route.method, path)) {
            return Err(source.validation_error_at_key(
                format!(
                    "resource '{name}' declares {} {path} more than once",
                    route.method
                ),
                key,
            ));
        }

        if (operation.is_write() || route.method.is_write()) && route.capability.is_none() {
            warnings.push(ConfigWarning::for_resource(
                "route.capability.missing",
                format!(
                    "Write route {} {path} of resource '{name}' has no capability.",
                    route.method
                ),
                name,
            ));
        }
    }

    if let Some(identity) = &resource.identity {
        let param = identity.param();
        if !identity.allowed_params().contains(&param) {
            return Err(source.validation_error_at_key(
                format!(
                    "identity param '{param}' of resource '{name}' is not valid for {} identities; \
                     expected one of: {}",
                    identity.type_name(),
                    identity.allowed_params().join(", ")
                ),
                key,
            ));
        }

        let appears = resource
            .routes
            .iter()
            .any(|(_, route)| route.placeholders().contains(&param));
        if !appears {
            return Err(source.validation_error_at_key(
                format!(
                    "identity param ':{param}' of resource '{name}' does not appear in any route path"
                ),
                key,
            ));
        }

        for (operation, route) in resource.routes.iter() {
            if operation.is_item_level() && !route.placeholders().contains(&param) {
                return Err(source.validation_error_at_key(
                    format!(
                        "{operation} route {} of resource '{name}' must contain ':{param}'",
                        route.path
                    ),
                    key,
                ));
            }
        }
    }

    if let Some(SchemaRef::Key(schema)) = &resource.schema {
        if !config.schemas.contains_key(schema) {
            return Err(source.unknown_schema_error(name, schema.as_str()));
        }
    }

    if let Some(storage) = &resource.storage {
        validate_storage(name, key, storage, source)?;
    }

    if let Some(query_params) = &resource.query_params {
        for (param, query) in query_params {
            let empty = query.values.as_ref().is_none_or(|values| values.is_empty());
            if query.kind == QueryParamType::Enum && empty {
                return Err(source.validation_error_at_key(
                    format!("enum query param '{param}' of resource '{name}' declares no values"),
                    param,
                ));
            }
        }
    }

    if let Some(capabilities) = &resource.capabilities {
        for (capability_key, descriptor) in capabilities {
            validate_capability(capability_key, descriptor, source)?;
        }
    }

    Ok(())
}

fn validate_storage(
    name: &str,
    key: &str,
    storage: &StorageConfig,
    source: &SourceContext,
) -> Result<()> {
    match storage {
        StorageConfig::Transient => Ok(()),
        StorageConfig::WpOption { option } if option.trim().is_empty() => {
            Err(source.validation_error_at_key(
                format!("wp-option storage of resource '{name}' needs an option name"),
                key,
            ))
        }
        StorageConfig::WpTaxonomy { taxonomy, .. } if taxonomy.trim().is_empty() => {
            Err(source.validation_error_at_key(
                format!("wp-taxonomy storage of resource '{name}' needs a taxonomy"),
                key,
            ))
        }
        StorageConfig::WpOption { .. } | StorageConfig::WpTaxonomy { .. } => Ok(()),
        StorageConfig::WpPost(post) => {
            if post.statuses.iter().any(|status| status.trim().is_empty()) {
                return Err(source.validation_error_at_key(
                    format!("wp-post storage of resource '{name}' declares an empty status"),
                    key,
                ));
            }
            if post.meta.keys().any(|meta| meta.trim().is_empty()) {
                return Err(source.validation_error_at_key(
                    format!("wp-post storage of resource '{name}' declares an empty meta key"),
                    key,
                ));
            }
            let fields = post
                .meta
                .keys()
                .map(|meta| ("meta key", meta))
                .chain(post.taxonomies.keys().map(|taxonomy| ("taxonomy", taxonomy)));
            for (what, field) in fields {
                if !php_safe_key(field) {
                    return Err(source.validation_error_at_key(
                        format!(
                            "{what} '{field}' of resource '{name}' does not form a PHP variable name; start it with a letter"
                        ),
                        field,
                    ));
                }
            }
            for (taxonomy_key, taxonomy) in &post.taxonomies {
                if taxonomy.taxonomy.trim().is_empty() {
                    return Err(source.validation_error_at_key(
                        format!(
                            "taxonomy '{taxonomy_key}' of resource '{name}' needs a taxonomy name"
                        ),
                        taxonomy_key,
                    ));
                }
            }
            Ok(())
        }
    }
}

/// Meta and taxonomy keys become `${snake}_meta` / `${snake}_terms`.
fn php_safe_key(key: &str) -> bool {
    let snake = to_snake_case(key);
    let mut chars = snake.chars();
    match chars.next() {
        Some(first) if first == '_' || first.is_ascii_alphabetic() => {
            chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
        }
        _ => false,
    }
}

fn validate_capability(
    key: &str,
    descriptor: &CapabilityDescriptor,
    source: &SourceContext,
) -> Result<()> {
    if descriptor.capability().trim().is_empty() {
        return Err(source.validation_error_at_key(
            format!("capability '{key}' must name a WordPress capability"),
            key,
        ));
    }
    Ok(())
}
