// Miette's derive macro generates code that triggers these warnings
#![allow(unused_assignments)]

//! Kernel config model, parsing and validation.
//!
//! A kernel config declares the plugin namespace, JSON schemas, REST
//! resources and the capability map. [`load`] reads a `.toml` or `.json`
//! file, validates it and loads every declared schema document.

mod config;
mod error;
mod load;
mod parse;
mod resource;
mod validate;

pub use config::{AppliesTo, CapabilityDescriptor, KernelConfig, SchemaConfig};
pub use error::{Error, Result, SourceContext};
pub use load::{LoadedConfig, LoadedSchema, load, load_str};
pub use parse::{ConfigFormat, ParsedConfig, parse_file, parse_str};
pub use resource::{
    CacheKeysConfig, CacheSegment, HttpMethod, IdentityConfig, MetaFieldConfig, MetaType,
    PostSupport, QueryParamConfig, QueryParamType, ResourceConfig, RouteConfig, RouteOperation,
    RouteSet, SchemaRef, StorageConfig, TaxonomyConfig, WpPostStorageConfig, path_placeholders,
};
pub use validate::{ConfigWarning, validate};
