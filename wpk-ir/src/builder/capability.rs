//! Capability map resolution.
//!
//! Routes reference capability keys; the config maps those keys onto
//! WordPress capabilities either globally (`[capabilities]`) or per resource.
//! Referenced keys without a definition fall back to `manage_options`.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::json;
use wpkernel_config::{AppliesTo, CapabilityDescriptor, LoadedConfig};

use crate::{
    CapabilitySource, IrCapabilityDefinition, IrCapabilityFallback, IrCapabilityMap, IrError,
    IrResource, IrWarning, Result, builder::meta::display_path, types::sort_warnings,
};

/// Capability applied to keys nothing defines.
pub const FALLBACK_CAPABILITY: &str = "manage_options";

/// Source path recorded when only resource-scoped descriptors exist.
const INLINE_SOURCE: &str = "inline";

struct MapEntry<'a> {
    descriptor: &'a CapabilityDescriptor,
    declared_by: Option<&'a str>,
}

/// Resolve the capability map against the capability keys routes reference.
pub fn build_capability_map(
    loaded: &LoadedConfig,
    resources: &[IrResource],
) -> Result<IrCapabilityMap> {
    let fallback = IrCapabilityFallback {
        capability: FALLBACK_CAPABILITY.to_string(),
        applies_to: AppliesTo::Resource,
    };

    let references = collect_references(resources);
    let (entries, source_path) = merge_entries(loaded)?;

    let mut warnings = Vec::new();

    if entries.is_empty() {
        let missing: Vec<String> = references.keys().cloned().collect();
        if !missing.is_empty() {
            warnings.push(IrWarning::new(
                "capability-map.missing",
                format!(
                    "Capability map not found. Falling back to \"{FALLBACK_CAPABILITY}\" for referenced capabilities."
                ),
                Some(json!({ "capabilities": missing })),
            ));
        }
        return Ok(IrCapabilityMap {
            source_path: None,
            definitions: fallback_definitions(&missing),
            fallback,
            missing,
            unused: Vec::new(),
            warnings,
        });
    }

    let mut definitions = Vec::new();
    for (key, entry) in &entries {
        let applies_to = entry.descriptor.applies_to();
        let binding = entry
            .descriptor
            .binding()
            .map(str::trim)
            .filter(|binding| !binding.is_empty())
            .map(str::to_string)
            .or_else(|| derive_binding(key, applies_to, &references, resources));

        if applies_to == AppliesTo::Object && binding.is_none() {
            warnings.push(IrWarning::new(
                "capability-map.binding.missing",
                format!(
                    "Capability \"{key}\" targets an object but no request parameter could be inferred. The helper will default to \"id\"."
                ),
                Some(json!({ "capability": key })),
            ));
        }

        definitions.push(IrCapabilityDefinition {
            key: key.clone(),
            capability: entry.descriptor.capability().trim().to_string(),
            applies_to,
            binding,
            source: CapabilitySource::Map,
        });
    }

    let missing: Vec<String> = references
        .keys()
        .filter(|key| !entries.contains_key(*key))
        .cloned()
        .collect();
    let unused: Vec<String> = entries
        .keys()
        .filter(|key| !references.contains_key(*key))
        .cloned()
        .collect();

    if !missing.is_empty() {
        warnings.push(IrWarning::new(
            "capability-map.entries.missing",
            "Capabilities referenced by routes are missing from the capability map.",
            Some(json!({
                "capabilities": missing,
                "referencedBy": missing
                    .iter()
                    .map(|key| (key.clone(), json!(references[key])))
                    .collect::<serde_json::Map<_, _>>(),
            })),
        ));
    }
    if !unused.is_empty() {
        warnings.push(IrWarning::new(
            "capability-map.entries.unused",
            "Capability map defines capabilities that are not referenced by any route.",
            Some(json!({ "capabilities": unused })),
        ));
    }

    definitions.extend(fallback_definitions(&missing));
    definitions.sort_by(|a, b| a.key.cmp(&b.key));
    sort_warnings(&mut warnings);

    Ok(IrCapabilityMap {
        source_path,
        fallback,
        definitions,
        missing,
        unused,
        warnings,
    })
}

/// Capability keys referenced by routes, with the resources referencing them.
fn collect_references(resources: &[IrResource]) -> BTreeMap<String, BTreeSet<String>> {
    let mut references: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for resource in resources {
        for key in resource.capability_keys() {
            references
                .entry(key.to_string())
                .or_default()
                .insert(resource.name.clone());
        }
    }
    references
}

/// Merge the global map with resource-scoped descriptors.
fn merge_entries(
    loaded: &LoadedConfig,
) -> Result<(BTreeMap<String, MapEntry<'_>>, Option<String>)> {
    let config = &loaded.config;
    let mut entries: BTreeMap<String, MapEntry<'_>> = BTreeMap::new();
    let mut source_path = None;

    if let Some(global) = &config.capabilities {
        source_path = Some(display_path(&loaded.source_path));
        for (key, descriptor) in global {
            entries.insert(
                key.clone(),
                MapEntry {
                    descriptor,
                    declared_by: None,
                },
            );
        }
    }

    for resource in config.resources.values() {
        let Some(inline) = &resource.capabilities else {
            continue;
        };
        for (key, descriptor) in inline {
            if let Some(existing) = entries.get(key) {
                if existing.descriptor != descriptor {
                    let owner = existing
                        .declared_by
                        .map(|name| format!("resource '{name}'"))
                        .unwrap_or_else(|| "the capability map".to_string());
                    return Err(IrError::developer(
                        &resource.name,
                        format!("capabilities.{key}"),
                        format!("conflicts with the definition declared by {owner}"),
                    ));
                }
                continue;
            }
            entries.insert(
                key.clone(),
                MapEntry {
                    descriptor,
                    declared_by: Some(resource.name.as_str()),
                },
            );
        }
        source_path.get_or_insert_with(|| INLINE_SOURCE.to_string());
    }

    Ok((entries, source_path))
}

/// Bind an object-scoped capability to the identity param shared by every
/// resource referencing it.
fn derive_binding(
    key: &str,
    applies_to: AppliesTo,
    references: &BTreeMap<String, BTreeSet<String>>,
    resources: &[IrResource],
) -> Option<String> {
    if applies_to != AppliesTo::Object {
        return None;
    }

    let referencing = references.get(key)?;
    let params: BTreeSet<&str> = resources
        .iter()
        .filter(|resource| referencing.contains(&resource.name))
        .filter_map(|resource| resource.identity.as_ref().map(|identity| identity.param()))
        .collect();

    if params.len() == 1 {
        params.into_iter().next().map(str::to_string)
    } else {
        None
    }
}

fn fallback_definitions(keys: &[String]) -> Vec<IrCapabilityDefinition> {
    keys.iter()
        .map(|key| IrCapabilityDefinition {
            key: key.clone(),
            capability: FALLBACK_CAPABILITY.to_string(),
            applies_to: AppliesTo::Resource,
            binding: None,
            source: CapabilitySource::Fallback,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use wpkernel_config::KernelConfig;

    use super::*;
    use crate::build_ir;

    fn build(src: &str) -> Result<IrCapabilityMap> {
        let config: KernelConfig = src.parse().unwrap();
        let loaded = LoadedConfig::new(config, "wpk.config.toml");
        build_ir(&loaded).map(|ir| ir.capability_map)
    }

    const ROUTES: &str = r#"
        version = 1
        namespace = "acme"

        [resources.book]
        name = "book"
        identity = { type = "number" }
        storage = { mode = "transient" }
        routes.get = { path = "/acme/v1/books/:id", method = "GET" }
        routes.update = { path = "/acme/v1/books/:id", method = "PUT", capability = "book.update" }
        routes.create = { path = "/acme/v1/books", method = "POST", capability = "book.create" }
    "#;

    #[test]
    fn test_missing_map_falls_back() {
        let map = build(ROUTES).unwrap();

        assert_eq!(map.source_path, None);
        assert_eq!(map.missing, vec!["book.create", "book.update"]);
        assert_eq!(map.warnings.len(), 1);
        assert_eq!(map.warnings[0].code, "capability-map.missing");
        assert!(
            map.definitions
                .iter()
                .all(|definition| definition.source == CapabilitySource::Fallback
                    && definition.capability == FALLBACK_CAPABILITY)
        );
    }

    #[test]
    fn test_object_binding_is_derived_from_identity() {
        let src = format!(
            "{ROUTES}\n[capabilities]\n\"book.create\" = \"edit_posts\"\n\"book.update\" = {{ capability = \"edit_post\", appliesTo = \"object\" }}\n\"book.archive\" = \"delete_posts\"\n"
        );
        let map = build(&src).unwrap();

        let update = map.definition("book.update").unwrap();
        assert_eq!(update.applies_to, AppliesTo::Object);
        assert_eq!(update.binding.as_deref(), Some("id"));
        assert_eq!(map.unused, vec!["book.archive"]);
        assert!(map.missing.is_empty());
        assert_eq!(map.source_path.as_deref(), Some("wpk.config.toml"));

        let keys: Vec<_> = map.definitions.iter().map(|d| d.key.as_str()).collect();
        assert_eq!(keys, vec!["book.archive", "book.create", "book.update"]);
        let codes: Vec<_> = map.warnings.iter().map(|w| w.code.as_str()).collect();
        assert_eq!(codes, vec!["capability-map.entries.unused"]);
    }

    #[test]
    fn test_unbound_object_capability_warns() {
        let src = format!(
            "{ROUTES}\n[capabilities]\n\"book.create\" = \"edit_posts\"\n\"book.archive\" = {{ capability = \"delete_post\", appliesTo = \"object\" }}\n"
        );
        let map = build(&src).unwrap();

        let codes: Vec<_> = map.warnings.iter().map(|w| w.code.as_str()).collect();
        assert_eq!(
            codes,
            vec![
                "capability-map.binding.missing",
                "capability-map.entries.missing",
                "capability-map.entries.unused",
            ]
        );
        assert_eq!(map.missing, vec!["book.update"]);
        assert_eq!(map.definition("book.archive").unwrap().binding, None);
        assert_eq!(
            map.definition("book.update").unwrap().source,
            CapabilitySource::Fallback
        );
    }

    #[test]
    fn test_conflicting_inline_descriptor_fails() {
        let src = format!(
            "{ROUTES}capabilities = {{ \"book.create\" = \"publish_posts\" }}\n\n[capabilities]\n\"book.create\" = \"edit_posts\"\n"
        );
        let err = build(&src).unwrap_err();
        assert!(
            matches!(err, IrError::Developer { ref field, .. } if field == "capabilities.book.create")
        );
    }
}
