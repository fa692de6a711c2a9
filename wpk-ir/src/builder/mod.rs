//! IR construction.
//!
//! [`build_ir`] runs every step in order. The steps are also exposed
//! individually so pipeline fragments can fill an [`IrDraft`](crate::IrDraft)
//! piece by piece.

mod cache_keys;
mod capability;
mod identity;
pub(crate) mod meta;
mod php;
mod resource;
mod routes;
mod schema;
mod storage;

pub use cache_keys::{default_cache_key, derive_cache_keys};
pub use capability::{FALLBACK_CAPABILITY, build_capability_map};
pub use identity::{IdentityResolution, pick_route_placeholder, resolve_identity};
pub use meta::build_meta;
pub use php::{PHP_AUTOLOAD_DIR, PHP_OUTPUT_DIR, build_php_project};
pub use resource::build_resources;
pub use routes::{RESERVED_ROUTE_PREFIXES, RouteRegistry, build_routes, normalise_route_path};
pub use schema::{
    SCHEMA_DIALECT, SCHEMA_REGISTRY_BASE_URL, SchemaAccumulator, SchemaAssignment, build_schemas,
    resolve_resource_schema, synthesize_schema,
};
pub use storage::{
    MAX_POST_TYPE_LENGTH, PostTypeRegistry, StorageResolution, check_storage_identity,
    infer_post_type, resolve_storage,
};

use wpkernel_config::LoadedConfig;

use crate::{Ir, IrDraft, Result};

/// Build the finalised IR of a loaded config.
pub fn build_ir(loaded: &LoadedConfig) -> Result<Ir> {
    let meta = build_meta(loaded)?;
    let mut schemas = build_schemas(loaded)?;
    let resources = build_resources(loaded, &meta, &mut schemas)?;
    let capability_map = build_capability_map(loaded, &resources)?;
    let php = build_php_project(&meta);

    IrDraft {
        meta: Some(meta),
        schemas: Some(schemas.into_schemas()),
        resources: Some(resources),
        capability_map: Some(capability_map),
        php: Some(php),
    }
    .finalize()
}
