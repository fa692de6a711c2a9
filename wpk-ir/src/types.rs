//! IR data types.
//!
//! Every collection is either a sorted `Vec` or a `BTreeMap`, so the IR never
//! depends on the key order of the config it was built from. Optional values
//! serialise as explicit `null`s.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;
use wpkernel_config::{
    AppliesTo, CacheSegment, HttpMethod, MetaType, PostSupport, QueryParamType, RouteOperation,
};

/// The finalised intermediate representation of a kernel config.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Ir {
    pub meta: IrMeta,
    pub schemas: Vec<IrSchema>,
    pub resources: Vec<IrResource>,
    pub capability_map: IrCapabilityMap,
    pub php: IrPhpProject,
    #[serde(skip)]
    pub(crate) hash: String,
}

impl Ir {
    /// SHA-256 of the canonical JSON form.
    pub fn content_hash(&self) -> &str {
        &self.hash
    }

    pub fn resource(&self, name: &str) -> Option<&IrResource> {
        self.resources.iter().find(|resource| resource.name == name)
    }

    pub fn schema(&self, key: &str) -> Option<&IrSchema> {
        self.schemas.iter().find(|schema| schema.key == key)
    }

    /// Every warning in the IR: resource warnings first, then capability map
    /// warnings.
    pub fn warnings(&self) -> impl Iterator<Item = &IrWarning> {
        self.resources
            .iter()
            .flat_map(|resource| resource.warnings.iter())
            .chain(self.capability_map.warnings.iter())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IrMeta {
    pub version: u32,
    pub namespace: String,
    pub sanitized_namespace: String,
    pub source_path: String,
    pub origin: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaProvenance {
    Manual,
    Auto,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaOrigin {
    #[serde(rename = "type")]
    pub kind: String,
    pub resource: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IrSchema {
    pub key: String,
    pub source_path: String,
    pub hash: String,
    pub schema: Value,
    pub provenance: SchemaProvenance,
    pub generated_from: Option<SchemaOrigin>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IrResource {
    pub name: String,
    pub schema_key: String,
    pub schema_provenance: SchemaProvenance,
    pub routes: Vec<IrRoute>,
    pub cache_keys: IrCacheKeys,
    pub identity: Option<IrIdentity>,
    pub storage: Option<IrStorage>,
    pub query_params: Option<BTreeMap<String, IrQueryParam>>,
    pub hash: String,
    pub warnings: Vec<IrWarning>,
}

impl IrResource {
    pub fn wp_post(&self) -> Option<&IrWpPostStorage> {
        match &self.storage {
            Some(IrStorage::WpPost(post)) => Some(post),
            _ => None,
        }
    }

    /// Capability keys referenced by the resource's routes, deduplicated.
    pub fn capability_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self
            .routes
            .iter()
            .filter_map(|route| route.capability.as_deref())
            .collect();
        keys.sort_unstable();
        keys.dedup();
        keys
    }
}

/// A normalised route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IrRoute {
    pub method: HttpMethod,
    pub path: String,
    pub capability: Option<String>,
    pub hash: String,
}

impl IrRoute {
    /// Placeholder names (`:id`) in the path.
    pub fn placeholders(&self) -> Vec<&str> {
        wpkernel_config::path_placeholders(&self.path)
    }

    pub fn uses_param(&self, param: &str) -> bool {
        self.placeholders().contains(&param)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheKeySource {
    Default,
    Config,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IrCacheKey {
    pub segments: Vec<CacheSegment>,
    pub source: CacheKeySource,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IrCacheKeys {
    pub list: IrCacheKey,
    pub get: IrCacheKey,
    pub create: Option<IrCacheKey>,
    pub update: Option<IrCacheKey>,
    pub remove: Option<IrCacheKey>,
}

impl IrCacheKeys {
    pub fn for_operation(&self, operation: RouteOperation) -> Option<&IrCacheKey> {
        match operation {
            RouteOperation::List => Some(&self.list),
            RouteOperation::Get => Some(&self.get),
            RouteOperation::Create => self.create.as_ref(),
            RouteOperation::Update => self.update.as_ref(),
            RouteOperation::Remove => self.remove.as_ref(),
        }
    }
}

/// A resolved identity; the param is always filled in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum IrIdentity {
    Number { param: String },
    String { param: String },
}

impl IrIdentity {
    pub fn param(&self) -> &str {
        match self {
            IrIdentity::Number { param } | IrIdentity::String { param } => param,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, IrIdentity::Number { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode")]
pub enum IrStorage {
    #[serde(rename = "transient")]
    Transient,
    #[serde(rename = "wp-option")]
    WpOption { option: String },
    #[serde(rename = "wp-taxonomy")]
    WpTaxonomy { taxonomy: String, hierarchical: bool },
    #[serde(rename = "wp-post")]
    WpPost(IrWpPostStorage),
}

impl IrStorage {
    pub fn mode(&self) -> &'static str {
        match self {
            IrStorage::Transient => "transient",
            IrStorage::WpOption { .. } => "wp-option",
            IrStorage::WpTaxonomy { .. } => "wp-taxonomy",
            IrStorage::WpPost(_) => "wp-post",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IrWpPostStorage {
    pub post_type: String,
    pub statuses: Vec<String>,
    pub supports: Vec<PostSupport>,
    pub meta: BTreeMap<String, IrMetaField>,
    pub taxonomies: BTreeMap<String, IrTaxonomy>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IrMetaField {
    #[serde(rename = "type")]
    pub kind: MetaType,
    pub single: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IrTaxonomy {
    pub taxonomy: String,
    pub hierarchical: bool,
    pub register: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IrQueryParam {
    #[serde(rename = "type")]
    pub kind: QueryParamType,
    pub optional: bool,
    #[serde(rename = "enum")]
    pub values: Option<Vec<String>>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CapabilitySource {
    Map,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IrCapabilityFallback {
    pub capability: String,
    pub applies_to: AppliesTo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IrCapabilityDefinition {
    pub key: String,
    pub capability: String,
    pub applies_to: AppliesTo,
    pub binding: Option<String>,
    pub source: CapabilitySource,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IrCapabilityMap {
    pub source_path: Option<String>,
    pub fallback: IrCapabilityFallback,
    pub definitions: Vec<IrCapabilityDefinition>,
    pub missing: Vec<String>,
    pub unused: Vec<String>,
    pub warnings: Vec<IrWarning>,
}

impl IrCapabilityMap {
    pub fn definition(&self, key: &str) -> Option<&IrCapabilityDefinition> {
        self.definitions.iter().find(|definition| definition.key == key)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IrPhpProject {
    pub namespace: String,
    pub autoload: String,
    pub output_dir: String,
}

/// A non-fatal finding recorded in the IR.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IrWarning {
    pub code: String,
    pub message: String,
    pub context: Option<Value>,
}

impl IrWarning {
    pub fn new(code: impl Into<String>, message: impl Into<String>, context: Option<Value>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context,
        }
    }
}

/// Sort warnings by code, then message.
pub(crate) fn sort_warnings(warnings: &mut [IrWarning]) {
    warnings.sort_by(|a, b| a.code.cmp(&b.code).then_with(|| a.message.cmp(&b.message)));
}
