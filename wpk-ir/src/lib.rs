// Miette's derive macro generates code that triggers these warnings
#![allow(unused_assignments)]

//! Intermediate representation of a kernel config.
//!
//! The IR is the canonical, order-independent projection of a
//! [`LoadedConfig`](wpkernel_config::LoadedConfig): routes are normalised,
//! identities and storage resolved, schemas hashed or synthesised and the
//! capability map reconciled with the capability keys routes reference.
//! Two configs that differ only in key order produce IRs with the same
//! [`Ir::content_hash`].

mod builder;
mod canonical;
mod draft;
mod error;
mod types;

pub use builder::*;
pub use canonical::{canonical_json, hash_canonical, hash_serialize, to_canonical_json};
pub use draft::IrDraft;
pub use error::{IrError, Result};
pub use types::{
    CacheKeySource, CapabilitySource, Ir, IrCacheKey, IrCacheKeys, IrCapabilityDefinition,
    IrCapabilityFallback, IrCapabilityMap, IrIdentity, IrMeta, IrMetaField, IrPhpProject,
    IrQueryParam, IrResource, IrRoute, IrSchema, IrStorage, IrTaxonomy, IrWarning,
    IrWpPostStorage, SchemaOrigin, SchemaProvenance,
};
