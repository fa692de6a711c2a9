//! Storage resolution: post type inference, collision tracking and
//! storage/identity compatibility.

use std::collections::{BTreeMap, HashMap};

use serde_json::json;
use wpkernel_config::{IdentityConfig, StorageConfig};

use crate::{
    IrError, IrIdentity, IrMetaField, IrRoute, IrStorage, IrTaxonomy, IrWarning,
    IrWpPostStorage, Result,
};

/// WordPress limits post type names to 20 characters.
pub const MAX_POST_TYPE_LENGTH: usize = 20;

/// Outcome of storage resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct StorageResolution {
    pub storage: Option<IrStorage>,
    pub warnings: Vec<IrWarning>,
    /// Post type that was inferred rather than declared.
    pub inferred_post_type: Option<String>,
}

/// Resolve a resource's storage for the IR.
pub fn resolve_storage(
    resource: &str,
    storage: Option<&StorageConfig>,
    sanitized_namespace: &str,
) -> StorageResolution {
    let Some(storage) = storage else {
        return StorageResolution {
            storage: None,
            warnings: Vec::new(),
            inferred_post_type: None,
        };
    };

    match storage {
        StorageConfig::Transient => resolved(IrStorage::Transient),
        StorageConfig::WpOption { option } => resolved(IrStorage::WpOption {
            option: option.trim().to_string(),
        }),
        StorageConfig::WpTaxonomy {
            taxonomy,
            hierarchical,
        } => resolved(IrStorage::WpTaxonomy {
            taxonomy: taxonomy.trim().to_string(),
            hierarchical: *hierarchical,
        }),
        StorageConfig::WpPost(post) => {
            let mut warnings = Vec::new();
            let (post_type, inferred_post_type) = match &post.post_type {
                Some(post_type) => (post_type.clone(), None),
                None => {
                    let (post_type, warning) = infer_post_type(resource, sanitized_namespace);
                    warnings.extend(warning);
                    (post_type.clone(), Some(post_type))
                }
            };

            let meta: BTreeMap<String, IrMetaField> = post
                .meta
                .iter()
                .map(|(key, field)| {
                    (
                        key.clone(),
                        IrMetaField {
                            kind: field.kind,
                            single: field.is_single(),
                        },
                    )
                })
                .collect();

            let taxonomies: BTreeMap<String, IrTaxonomy> = post
                .taxonomies
                .iter()
                .map(|(key, taxonomy)| {
                    (
                        key.clone(),
                        IrTaxonomy {
                            taxonomy: taxonomy.taxonomy.clone(),
                            hierarchical: taxonomy.hierarchical,
                            register: taxonomy.register.unwrap_or(false),
                        },
                    )
                })
                .collect();

            StorageResolution {
                storage: Some(IrStorage::WpPost(IrWpPostStorage {
                    post_type,
                    statuses: post.statuses.clone(),
                    supports: post.supports.clone(),
                    meta,
                    taxonomies,
                })),
                warnings,
                inferred_post_type,
            }
        }
    }
}

fn resolved(storage: IrStorage) -> StorageResolution {
    StorageResolution {
        storage: Some(storage),
        warnings: Vec::new(),
        inferred_post_type: None,
    }
}

/// Derive a post type from the namespace and resource name.
///
/// Both parts are lowercased with non-alphanumeric runs collapsed into `_`,
/// joined with `_` and truncated to [`MAX_POST_TYPE_LENGTH`] characters.
pub fn infer_post_type(resource: &str, sanitized_namespace: &str) -> (String, Option<IrWarning>) {
    let namespace_slug = wpkernel_core::to_underscore_slug(sanitized_namespace);
    let resource_slug = wpkernel_core::to_underscore_slug(resource);

    let combined = [namespace_slug.as_str(), resource_slug.as_str()]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("_");
    let combined = if combined.is_empty() {
        "wpk_resource".to_string()
    } else {
        combined
    };

    if combined.len() <= MAX_POST_TYPE_LENGTH {
        return (combined, None);
    }

    let trimmed: String = combined.chars().take(MAX_POST_TYPE_LENGTH).collect();
    let warning = IrWarning::new(
        "storage.wpPost.postType.truncated",
        format!(
            "Derived post type \"{combined}\" for resource \"{resource}\" exceeds {MAX_POST_TYPE_LENGTH} characters; truncated to \"{trimmed}\"."
        ),
        Some(json!({ "resource": resource, "postType": trimmed })),
    );
    (trimmed, Some(warning))
}

/// Tracks post types across resources to flag collisions.
#[derive(Debug, Default)]
pub struct PostTypeRegistry {
    owners: HashMap<String, String>,
}

impl PostTypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the post type of `resource`, returning a warning when another
    /// resource already uses it.
    pub fn record(&mut self, resource: &str, resolution: &StorageResolution) -> Option<IrWarning> {
        let Some(IrStorage::WpPost(post)) = &resolution.storage else {
            return None;
        };
        let candidate = &post.post_type;

        match self.owners.get(candidate) {
            Some(existing) if existing != resource => {
                let label = if resolution.inferred_post_type.is_some() {
                    "Inferred post type"
                } else {
                    "Post type"
                };
                Some(IrWarning::new(
                    "storage.wpPost.postType.collision",
                    format!(
                        "{label} \"{candidate}\" for resource \"{resource}\" collides with resource \"{existing}\"."
                    ),
                    Some(json!({
                        "resource": resource,
                        "postType": candidate,
                        "existing": existing,
                    })),
                ))
            }
            Some(_) => None,
            None => {
                self.owners.insert(candidate.clone(), resource.to_string());
                None
            }
        }
    }
}

/// Reject storage/identity combinations the generated controllers cannot
/// serve.
pub fn check_storage_identity(
    resource: &str,
    storage: Option<&StorageConfig>,
    provided: Option<&IdentityConfig>,
    identity: Option<&IrIdentity>,
    routes: &[IrRoute],
) -> Result<()> {
    match storage {
        Some(StorageConfig::WpOption { .. }) => {
            if provided.is_some() {
                return Err(IrError::developer(
                    resource,
                    "identity",
                    "wp-option storage holds a single value and cannot declare an identity",
                ));
            }
            if let Some(route) = routes.iter().find(|route| !route.placeholders().is_empty()) {
                return Err(IrError::developer(
                    resource,
                    "routes",
                    format!(
                        "wp-option storage holds a single value; route {} {} must not address an item",
                        route.method, route.path
                    ),
                ));
            }
            Ok(())
        }
        Some(StorageConfig::WpTaxonomy { .. }) => match identity {
            Some(IrIdentity::Number { param }) if param != "id" => Err(IrError::developer(
                resource,
                "identity.param",
                format!("wp-taxonomy terms are addressed by numeric 'id', not '{param}'"),
            )),
            Some(IrIdentity::String { param }) if param != "slug" => Err(IrError::developer(
                resource,
                "identity.param",
                format!("wp-taxonomy terms are addressed by 'slug' strings, not '{param}'"),
            )),
            _ => Ok(()),
        },
        _ => Ok(()),
    }
}
