//! Controller and capability metadata recorded alongside the generated PHP.
//!
//! Metadata values are built from clones of the IR; nothing here borrows
//! from or mutates the IR it was derived from.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;
use wpkernel_config::{AppliesTo, CacheSegment, HttpMethod};
use wpkernel_ir::{CapabilitySource, IrCapabilityMap, IrResource, IrWarning};

use crate::routes::{RouteKind, classify_routes};

/// Tag keys for the `// @wp-kernel` markers of wp-post mutation routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationMetadataKeys {
    pub channel_tag: &'static str,
    pub status_validation: &'static str,
    pub sync_meta: &'static str,
    pub sync_taxonomies: &'static str,
    pub cache_priming: &'static str,
    pub cache_segment: &'static str,
}

pub const WP_POST_MUTATION_KEYS: MutationMetadataKeys = MutationMetadataKeys {
    channel_tag: "resource.wpPost.mutation",
    status_validation: "resource.wpPost.mutation.status",
    sync_meta: "resource.wpPost.mutation.meta",
    sync_taxonomies: "resource.wpPost.mutation.taxonomies",
    cache_priming: "resource.wpPost.mutation.cache",
    cache_segment: "resource.wpPost.mutation.cacheSegment",
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheOperation {
    Read,
    Prime,
    Invalidate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheEvent {
    pub scope: RouteKind,
    pub operation: CacheOperation,
    pub segments: Vec<CacheSegment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Cache reads, primes and invalidations performed by a controller.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheInvalidationPlan {
    pub events: Vec<CacheEvent>,
}

impl CacheInvalidationPlan {
    /// Record an event; an identical event is only kept once.
    pub fn record(&mut self, event: CacheEvent) {
        if !self.events.contains(&event) {
            self.events.push(event);
        }
    }

    pub fn by_operation(&self, operation: CacheOperation) -> impl Iterator<Item = &CacheEvent> {
        self.events
            .iter()
            .filter(move |event| event.operation == operation)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdentityMetadata {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub param: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteMetadata {
    pub method: HttpMethod,
    pub path: String,
    pub kind: RouteKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_segments: Option<Vec<CacheSegment>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<BTreeMap<String, String>>,
}

/// What a generated resource controller does, route by route.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceControllerMetadata {
    pub kind: &'static str,
    pub name: String,
    pub identity: Option<IdentityMetadata>,
    pub routes: Vec<RouteMetadata>,
    pub cache: CacheInvalidationPlan,
}

impl ResourceControllerMetadata {
    pub const KIND: &'static str = "resource-controller";

    /// Describe the controller generated for `resource`.
    ///
    /// wp-post resources tag their mutating routes with the mutation channel.
    pub fn for_resource(resource: &IrResource) -> Self {
        let identity_param = resource.identity.as_ref().map(|identity| identity.param());
        let kinds = classify_routes(&resource.routes, identity_param);
        let channel = resource
            .wp_post()
            .map(|_| WP_POST_MUTATION_KEYS.channel_tag);

        let routes = resource
            .routes
            .iter()
            .zip(kinds)
            .map(|(route, kind)| RouteMetadata {
                method: route.method,
                path: route.path.clone(),
                kind,
                cache_segments: cache_segments(resource, kind),
                tags: channel.zip(kind.mutation()).map(|(channel, mutation)| {
                    BTreeMap::from([(channel.to_string(), mutation.to_string())])
                }),
            })
            .collect();

        Self {
            kind: Self::KIND,
            name: resource.name.clone(),
            identity: resource.identity.as_ref().map(|identity| IdentityMetadata {
                kind: if identity.is_numeric() { "number" } else { "string" },
                param: identity.param().to_string(),
            }),
            routes,
            cache: CacheInvalidationPlan::default(),
        }
    }

    pub fn route(&self, kind: RouteKind) -> Option<&RouteMetadata> {
        self.routes.iter().find(|route| route.kind == kind)
    }

    /// Cache segments recorded for the first route of `kind`.
    pub fn segments_for(&self, kind: RouteKind) -> Vec<CacheSegment> {
        self.route(kind)
            .and_then(|route| route.cache_segments.clone())
            .unwrap_or_default()
    }

    pub fn record_cache_event(
        &mut self,
        scope: RouteKind,
        operation: CacheOperation,
        segments: Vec<CacheSegment>,
        description: Option<String>,
    ) {
        self.cache.record(CacheEvent {
            scope,
            operation,
            segments,
            description,
        });
    }
}

fn cache_segments(resource: &IrResource, kind: RouteKind) -> Option<Vec<CacheSegment>> {
    let key = match kind {
        RouteKind::List => Some(&resource.cache_keys.list),
        RouteKind::Get => Some(&resource.cache_keys.get),
        RouteKind::Create => resource.cache_keys.create.as_ref(),
        RouteKind::Update => resource.cache_keys.update.as_ref(),
        RouteKind::Remove => resource.cache_keys.remove.as_ref(),
        RouteKind::Custom => return None,
    };
    Some(key.map(|key| key.segments.clone()).unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityFallbackMetadata {
    pub capability: String,
    pub applies_to: AppliesTo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityDefinitionMetadata {
    pub key: String,
    pub capability: String,
    pub applies_to: AppliesTo,
    pub binding: Option<String>,
    pub source: CapabilitySource,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CapabilityWarningMetadata {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
}

impl From<&IrWarning> for CapabilityWarningMetadata {
    fn from(warning: &IrWarning) -> Self {
        Self {
            code: warning.code.clone(),
            message: warning.message.clone(),
            context: warning.context.clone(),
        }
    }
}

/// Projection of the capability map consumed by the policy helper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityHelperMetadata {
    pub kind: &'static str,
    pub source_path: Option<String>,
    pub fallback: CapabilityFallbackMetadata,
    pub definitions: Vec<CapabilityDefinitionMetadata>,
    pub missing: Vec<String>,
    pub unused: Vec<String>,
    pub warnings: Vec<CapabilityWarningMetadata>,
}

impl CapabilityHelperMetadata {
    pub const KIND: &'static str = "capability-helper";

    pub fn from_map(map: &IrCapabilityMap) -> Self {
        Self {
            kind: Self::KIND,
            source_path: map.source_path.clone(),
            fallback: CapabilityFallbackMetadata {
                capability: map.fallback.capability.clone(),
                applies_to: map.fallback.applies_to,
            },
            definitions: map
                .definitions
                .iter()
                .map(|definition| CapabilityDefinitionMetadata {
                    key: definition.key.clone(),
                    capability: definition.capability.clone(),
                    applies_to: definition.applies_to,
                    binding: definition.binding.clone(),
                    source: definition.source,
                })
                .collect(),
            missing: map.missing.clone(),
            unused: map.unused.clone(),
            warnings: map.warnings.iter().map(CapabilityWarningMetadata::from).collect(),
        }
    }

    pub fn definition(&self, key: &str) -> Option<&CapabilityDefinitionMetadata> {
        self.definitions.iter().find(|definition| definition.key == key)
    }
}

#[cfg(test)]
mod tests {
    use wpkernel_config::RouteOperation;

    use serde_json::json;

    use super::*;
    use crate::test_support::jobs_ir as ir;

    #[test]
    fn test_controller_metadata_tags_mutations() {
        let ir = ir();
        let metadata = ResourceControllerMetadata::for_resource(ir.resource("job").unwrap());

        assert_eq!(metadata.kind, "resource-controller");
        assert_eq!(metadata.identity.as_ref().unwrap().param, "id");

        let remove = metadata.route(RouteKind::Remove).unwrap();
        assert_eq!(
            remove.tags.as_ref().unwrap().get("resource.wpPost.mutation"),
            Some(&"delete".to_string())
        );
        assert!(metadata.route(RouteKind::List).unwrap().tags.is_none());
        assert_eq!(
            metadata.segments_for(RouteKind::Get),
            vec![
                CacheSegment::text("job"),
                CacheSegment::text("get"),
                CacheSegment::text("{id}"),
            ]
        );
        assert!(
            ir.resource("job")
                .unwrap()
                .cache_keys
                .for_operation(RouteOperation::Create)
                .is_some()
        );
    }

    #[test]
    fn test_cache_events_are_deduplicated() {
        let ir = ir();
        let mut metadata = ResourceControllerMetadata::for_resource(ir.resource("job").unwrap());
        let segments = metadata.segments_for(RouteKind::List);

        metadata.record_cache_event(RouteKind::List, CacheOperation::Read, segments.clone(), None);
        metadata.record_cache_event(RouteKind::List, CacheOperation::Read, segments, None);

        assert_eq!(metadata.cache.events.len(), 1);
        assert_eq!(metadata.cache.by_operation(CacheOperation::Read).count(), 1);
    }

    #[test]
    fn test_capability_metadata_is_a_detached_copy() {
        let mut ir = ir();
        ir.capability_map.warnings.push(IrWarning::new(
            "capability-map.binding.missing",
            "Capability \"job.publish\" has no binding.",
            Some(json!({ "details": { "scope": "object" } })),
        ));
        let metadata = CapabilityHelperMetadata::from_map(&ir.capability_map);

        let source = ir.capability_map.warnings.last_mut().unwrap();
        source.context.as_mut().unwrap()["details"]["scope"] = json!("resource");
        source.message.clear();

        let copied = metadata.warnings.last().unwrap();
        assert_eq!(copied.code, "capability-map.binding.missing");
        assert_eq!(copied.message, "Capability \"job.publish\" has no binding.");
        assert_eq!(copied.context.as_ref().unwrap()["details"]["scope"], "object");
        assert_eq!(metadata.warnings.len(), ir.capability_map.warnings.len());
    }

    #[test]
    fn test_capability_warnings_are_serialised() {
        let ir = ir();
        let metadata = CapabilityHelperMetadata::from_map(&ir.capability_map);
        let value = serde_json::to_value(&metadata).unwrap();

        let warnings = value["warnings"].as_array().unwrap();
        assert_eq!(warnings.len(), ir.capability_map.warnings.len());
        for (warning, source) in warnings.iter().zip(&ir.capability_map.warnings) {
            assert_eq!(warning["code"], source.code.as_str());
        }
    }

    #[test]
    fn test_capability_metadata_projection() {
        let ir = ir();
        let metadata = CapabilityHelperMetadata::from_map(&ir.capability_map);

        assert_eq!(metadata.kind, "capability-helper");
        assert_eq!(metadata.definition("job.create").unwrap().capability, "edit_posts");
        assert_eq!(
            metadata.definition("job.update").unwrap().binding.as_deref(),
            Some("id")
        );
        assert_eq!(metadata.missing, vec!["job.delete"]);
    }
}
