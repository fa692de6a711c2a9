use std::collections::BTreeMap;

use serde_json::json;
use wpkernel_config::{LoadedConfig, ResourceConfig, StorageConfig};

use super::{
    cache_keys::derive_cache_keys,
    identity::{IdentityResolution, resolve_identity},
    routes::{RouteRegistry, build_routes},
    schema::{SchemaAccumulator, resolve_resource_schema},
    storage::{PostTypeRegistry, check_storage_identity, resolve_storage},
};
use crate::{
    IrMeta, IrQueryParam, IrResource, IrWarning, Result, canonical::hash_serialize,
    types::sort_warnings,
};

/// Resolve every resource of the config.
///
/// Resources are processed in name order so route ownership and post type
/// collisions do not depend on declaration order. Auto schemas are added to
/// `schemas` as they are synthesised.
pub fn build_resources(
    loaded: &LoadedConfig,
    meta: &IrMeta,
    schemas: &mut SchemaAccumulator,
) -> Result<Vec<IrResource>> {
    let mut declared: Vec<(&String, &ResourceConfig)> = loaded.config.resources.iter().collect();
    declared.sort_by(|(a_key, a), (b_key, b)| a.name.cmp(&b.name).then_with(|| a_key.cmp(b_key)));

    let mut routes_seen = RouteRegistry::new();
    let mut post_types = PostTypeRegistry::new();
    let mut resources = Vec::with_capacity(declared.len());

    for (key, resource) in declared {
        resources.push(build_resource(
            key,
            resource,
            meta,
            schemas,
            &mut routes_seen,
            &mut post_types,
        )?);
    }

    resources.sort_by(|a, b| {
        a.name
            .cmp(&b.name)
            .then_with(|| a.schema_key.cmp(&b.schema_key))
    });
    Ok(resources)
}

fn build_resource(
    key: &str,
    resource: &ResourceConfig,
    meta: &IrMeta,
    schemas: &mut SchemaAccumulator,
    routes_seen: &mut RouteRegistry,
    post_types: &mut PostTypeRegistry,
) -> Result<IrResource> {
    let name = resource.name.as_str();
    let mut warnings: Vec<IrWarning> = Vec::new();

    let routes = build_routes(name, &resource.routes, routes_seen)?;

    // wp-option resources hold one value and have nothing to infer from.
    let IdentityResolution { identity, warning } = match &resource.storage {
        Some(StorageConfig::WpOption { .. }) if resource.identity.is_none() => {
            IdentityResolution {
                identity: None,
                warning: None,
            }
        }
        _ => resolve_identity(name, resource.identity.as_ref(), &routes),
    };
    warnings.extend(warning);

    check_storage_identity(
        name,
        resource.storage.as_ref(),
        resource.identity.as_ref(),
        identity.as_ref(),
        &routes,
    )?;

    let storage = resolve_storage(name, resource.storage.as_ref(), &meta.sanitized_namespace);
    warnings.extend(post_types.record(name, &storage));
    warnings.extend(storage.warnings.iter().cloned());

    let schema = resolve_resource_schema(key, resource, &meta.sanitized_namespace, schemas)?;
    let cache_keys = derive_cache_keys(name, resource.cache_keys.as_ref(), &resource.routes);

    let query_params = resource.query_params.as_ref().map(|params| {
        params
            .iter()
            .map(|(param, config)| {
                (
                    param.clone(),
                    IrQueryParam {
                        kind: config.kind,
                        optional: config.optional,
                        values: config.values.clone(),
                        description: config.description.clone(),
                    },
                )
            })
            .collect::<BTreeMap<_, _>>()
    });

    sort_warnings(&mut warnings);

    let hash = hash_serialize(&json!({
        "name": name,
        "schemaKey": schema.key,
        "schemaProvenance": schema.provenance,
        "routes": routes
            .iter()
            .map(|route| json!({
                "method": route.method,
                "path": route.path,
                "capability": route.capability,
            }))
            .collect::<Vec<_>>(),
        "cacheKeys": cache_keys,
        "identity": identity,
        "storage": storage.storage,
        "queryParams": query_params,
    }))?;

    Ok(IrResource {
        name: name.to_string(),
        schema_key: schema.key,
        schema_provenance: schema.provenance,
        routes,
        cache_keys,
        identity,
        storage: storage.storage,
        query_params,
        hash,
        warnings,
    })
}
