//! Resource declarations: routes, identity, storage, cache keys and query
//! parameters.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::CapabilityDescriptor;

/// A REST resource declared under `[resources.<key>]`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ResourceConfig {
    /// Stable resource name, unique across the config.
    pub name: String,

    /// Route declarations keyed by operation.
    #[serde(default)]
    pub routes: RouteSet,

    /// Primary key descriptor.
    #[serde(default)]
    pub identity: Option<IdentityConfig>,

    /// Persistence backend.
    #[serde(default)]
    pub storage: Option<StorageConfig>,

    /// `"auto"` or the key of a declared schema.
    #[serde(default)]
    pub schema: Option<SchemaRef>,

    /// Cache key overrides.
    #[serde(default)]
    pub cache_keys: Option<CacheKeysConfig>,

    /// Query parameters accepted by the list route.
    #[serde(default)]
    pub query_params: Option<IndexMap<String, QueryParamConfig>>,

    /// Capability descriptors scoped to this resource.
    #[serde(default)]
    pub capabilities: Option<IndexMap<String, CapabilityDescriptor>>,
}

/// Lifecycle operation of a resource route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RouteOperation {
    List,
    Get,
    Create,
    Update,
    Remove,
}

impl RouteOperation {
    pub const ALL: [RouteOperation; 5] = [
        RouteOperation::List,
        RouteOperation::Get,
        RouteOperation::Create,
        RouteOperation::Update,
        RouteOperation::Remove,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RouteOperation::List => "list",
            RouteOperation::Get => "get",
            RouteOperation::Create => "create",
            RouteOperation::Update => "update",
            RouteOperation::Remove => "remove",
        }
    }

    /// Whether the operation addresses a single existing item.
    pub fn is_item_level(&self) -> bool {
        matches!(
            self,
            RouteOperation::Get | RouteOperation::Update | RouteOperation::Remove
        )
    }

    /// Whether the operation writes data.
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            RouteOperation::Create | RouteOperation::Update | RouteOperation::Remove
        )
    }
}

impl fmt::Display for RouteOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Routes keyed by operation.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouteSet {
    #[serde(default)]
    pub list: Option<RouteConfig>,
    #[serde(default)]
    pub get: Option<RouteConfig>,
    #[serde(default)]
    pub create: Option<RouteConfig>,
    #[serde(default)]
    pub update: Option<RouteConfig>,
    #[serde(default)]
    pub remove: Option<RouteConfig>,
}

impl RouteSet {
    pub fn get(&self, operation: RouteOperation) -> Option<&RouteConfig> {
        match operation {
            RouteOperation::List => self.list.as_ref(),
            RouteOperation::Get => self.get.as_ref(),
            RouteOperation::Create => self.create.as_ref(),
            RouteOperation::Update => self.update.as_ref(),
            RouteOperation::Remove => self.remove.as_ref(),
        }
    }

    /// Declared routes in operation order.
    pub fn iter(&self) -> impl Iterator<Item = (RouteOperation, &RouteConfig)> {
        RouteOperation::ALL
            .into_iter()
            .filter_map(|operation| self.get(operation).map(|route| (operation, route)))
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}

/// A single route declaration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouteConfig {
    pub path: String,
    pub method: HttpMethod,
    /// Capability key guarding the route.
    #[serde(default)]
    pub capability: Option<String>,
}

impl RouteConfig {
    /// Placeholder names (`:id`) appearing in the path.
    pub fn placeholders(&self) -> Vec<&str> {
        path_placeholders(&self.path)
    }
}

/// Extract `:name` placeholders from a route path, in order of appearance.
pub fn path_placeholders(path: &str) -> Vec<&str> {
    let mut placeholders = Vec::new();
    let bytes = path.as_bytes();
    let mut index = 0;
    while index < bytes.len() {
        if bytes[index] == b':' {
            let start = index + 1;
            let mut end = start;
            while end < bytes.len() && (bytes[end].is_ascii_alphanumeric() || bytes[end] == b'_') {
                end += 1;
            }
            if end > start {
                placeholders.push(&path[start..end]);
            }
            index = end.max(start);
        } else {
            index += 1;
        }
    }
    placeholders
}

/// HTTP methods accepted on routes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// Whether the method writes data.
    pub fn is_write(&self) -> bool {
        !matches!(self, HttpMethod::Get)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Primary key descriptor.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum IdentityConfig {
    /// Numeric identity; the param may only be `id`.
    Number {
        #[serde(default)]
        param: Option<String>,
    },
    /// String identity; the param is `id`, `slug` or `uuid`.
    String {
        #[serde(default)]
        param: Option<String>,
    },
}

impl IdentityConfig {
    pub const NUMBER_PARAMS: &'static [&'static str] = &["id"];
    pub const STRING_PARAMS: &'static [&'static str] = &["id", "slug", "uuid"];

    pub fn type_name(&self) -> &'static str {
        match self {
            IdentityConfig::Number { .. } => "number",
            IdentityConfig::String { .. } => "string",
        }
    }

    /// The declared param, or the default for the identity type.
    pub fn param(&self) -> &str {
        match self {
            IdentityConfig::Number { param } => param.as_deref().unwrap_or("id"),
            IdentityConfig::String { param } => param.as_deref().unwrap_or("slug"),
        }
    }

    pub fn allowed_params(&self) -> &'static [&'static str] {
        match self {
            IdentityConfig::Number { .. } => Self::NUMBER_PARAMS,
            IdentityConfig::String { .. } => Self::STRING_PARAMS,
        }
    }
}

/// Persistence backend, tagged by `mode`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "mode")]
pub enum StorageConfig {
    #[serde(rename = "transient")]
    Transient,
    #[serde(rename = "wp-option")]
    WpOption { option: String },
    #[serde(rename = "wp-taxonomy")]
    WpTaxonomy {
        taxonomy: String,
        #[serde(default)]
        hierarchical: bool,
    },
    #[serde(rename = "wp-post")]
    WpPost(WpPostStorageConfig),
}

impl StorageConfig {
    pub fn mode(&self) -> &'static str {
        match self {
            StorageConfig::Transient => "transient",
            StorageConfig::WpOption { .. } => "wp-option",
            StorageConfig::WpTaxonomy { .. } => "wp-taxonomy",
            StorageConfig::WpPost(_) => "wp-post",
        }
    }
}

/// Post-type backed storage.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WpPostStorageConfig {
    /// Explicit post type; inferred from the namespace when absent.
    #[serde(default)]
    pub post_type: Option<String>,
    #[serde(default)]
    pub statuses: Vec<String>,
    #[serde(default)]
    pub supports: Vec<PostSupport>,
    #[serde(default)]
    pub meta: IndexMap<String, MetaFieldConfig>,
    #[serde(default)]
    pub taxonomies: IndexMap<String, TaxonomyConfig>,
}

/// Post features a post type may declare support for.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum PostSupport {
    Title,
    Editor,
    Excerpt,
    CustomFields,
}

impl PostSupport {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostSupport::Title => "title",
            PostSupport::Editor => "editor",
            PostSupport::Excerpt => "excerpt",
            PostSupport::CustomFields => "custom-fields",
        }
    }
}

/// A registered post meta key.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetaFieldConfig {
    #[serde(rename = "type")]
    pub kind: MetaType,
    #[serde(default)]
    pub single: Option<bool>,
}

impl MetaFieldConfig {
    /// Meta keys are single-valued unless `single = false`.
    pub fn is_single(&self) -> bool {
        self.single != Some(false)
    }
}

/// JSON type of a meta value.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum MetaType {
    String,
    Integer,
    Number,
    Boolean,
    Array,
    Object,
}

impl MetaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetaType::String => "string",
            MetaType::Integer => "integer",
            MetaType::Number => "number",
            MetaType::Boolean => "boolean",
            MetaType::Array => "array",
            MetaType::Object => "object",
        }
    }
}

/// A taxonomy attached to the post type.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaxonomyConfig {
    pub taxonomy: String,
    #[serde(default)]
    pub hierarchical: bool,
    #[serde(default)]
    pub register: Option<bool>,
}

/// Schema reference: `"auto"` or a declared schema key.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum SchemaRef {
    Auto,
    Key(String),
}

impl From<String> for SchemaRef {
    fn from(value: String) -> Self {
        if value == "auto" {
            SchemaRef::Auto
        } else {
            SchemaRef::Key(value)
        }
    }
}

/// A JSON scalar segment of a cache key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CacheSegment {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl CacheSegment {
    /// Token standing for the identity value.
    pub const IDENTITY_TOKEN: &'static str = "{id}";

    pub fn text(value: impl Into<String>) -> Self {
        CacheSegment::Text(value.into())
    }
}

impl fmt::Display for CacheSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheSegment::Bool(value) => write!(f, "{value}"),
            CacheSegment::Int(value) => write!(f, "{value}"),
            CacheSegment::Float(value) => write!(f, "{value}"),
            CacheSegment::Text(value) => f.write_str(value),
        }
    }
}

/// Cache key overrides per operation.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CacheKeysConfig {
    #[serde(default)]
    pub list: Option<Vec<CacheSegment>>,
    #[serde(default)]
    pub get: Option<Vec<CacheSegment>>,
    #[serde(default)]
    pub create: Option<Vec<CacheSegment>>,
    #[serde(default)]
    pub update: Option<Vec<CacheSegment>>,
    #[serde(default)]
    pub remove: Option<Vec<CacheSegment>>,
}

impl CacheKeysConfig {
    pub fn get(&self, operation: RouteOperation) -> Option<&[CacheSegment]> {
        match operation {
            RouteOperation::List => self.list.as_deref(),
            RouteOperation::Get => self.get.as_deref(),
            RouteOperation::Create => self.create.as_deref(),
            RouteOperation::Update => self.update.as_deref(),
            RouteOperation::Remove => self.remove.as_deref(),
        }
    }
}

/// A query parameter accepted by the list route.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QueryParamConfig {
    #[serde(rename = "type")]
    pub kind: QueryParamType,
    #[serde(default)]
    pub optional: bool,
    #[serde(default, rename = "enum")]
    pub values: Option<Vec<String>>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum QueryParamType {
    String,
    Enum,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_placeholders() {
        assert_eq!(path_placeholders("/acme/v1/books/:id"), vec!["id"]);
        assert_eq!(
            path_placeholders("/acme/v1/:author_id/books/:slug"),
            vec!["author_id", "slug"]
        );
        assert!(path_placeholders("/acme/v1/books").is_empty());
        assert!(path_placeholders("/acme/v1/:/books").is_empty());
    }

    #[test]
    fn test_identity_default_params() {
        assert_eq!(IdentityConfig::Number { param: None }.param(), "id");
        assert_eq!(IdentityConfig::String { param: None }.param(), "slug");
        assert_eq!(
            IdentityConfig::String {
                param: Some("uuid".into())
            }
            .param(),
            "uuid"
        );
    }

    #[test]
    fn test_storage_modes_deserialize() {
        let storage: StorageConfig = toml::from_str(
            r#"
            mode = "wp-post"
            postType = "acme_book"
            statuses = ["draft", "publish"]
            supports = ["title", "custom-fields"]

            [meta.isbn]
            type = "string"

            [meta.tags]
            type = "string"
            single = false

            [taxonomies.genre]
            taxonomy = "acme_genre"
            hierarchical = true
            "#,
        )
        .unwrap();

        let StorageConfig::WpPost(post) = storage else {
            panic!("expected wp-post storage");
        };
        assert_eq!(post.post_type.as_deref(), Some("acme_book"));
        assert_eq!(post.supports, vec![PostSupport::Title, PostSupport::CustomFields]);
        assert!(post.meta["isbn"].is_single());
        assert!(!post.meta["tags"].is_single());
        assert!(post.taxonomies["genre"].hierarchical);

        let option: StorageConfig = toml::from_str("mode = \"wp-option\"\noption = \"acme_settings\"").unwrap();
        assert_eq!(
            option,
            StorageConfig::WpOption {
                option: "acme_settings".into()
            }
        );

        let transient: StorageConfig = serde_json::from_str(r#"{ "mode": "transient" }"#).unwrap();
        assert_eq!(transient, StorageConfig::Transient);
    }

    #[test]
    fn test_schema_ref_from_string() {
        let auto: SchemaRef = serde_json::from_str("\"auto\"").unwrap();
        let key: SchemaRef = serde_json::from_str("\"book\"").unwrap();
        assert_eq!(auto, SchemaRef::Auto);
        assert_eq!(key, SchemaRef::Key("book".into()));
    }

    #[test]
    fn test_cache_segments_deserialize_scalars() {
        let keys: CacheKeysConfig =
            serde_json::from_str(r#"{ "get": ["book", "get", "{id}", 2, true] }"#).unwrap();
        assert_eq!(
            keys.get(RouteOperation::Get).unwrap(),
            &[
                CacheSegment::text("book"),
                CacheSegment::text("get"),
                CacheSegment::text("{id}"),
                CacheSegment::Int(2),
                CacheSegment::Bool(true),
            ]
        );
        assert!(keys.get(RouteOperation::List).is_none());
    }

    #[test]
    fn test_route_set_iterates_in_operation_order() {
        let routes: RouteSet = toml::from_str(
            r#"
            remove = { path = "/acme/v1/books/:id", method = "DELETE" }
            list = { path = "/acme/v1/books", method = "GET" }
            "#,
        )
        .unwrap();

        let operations: Vec<_> = routes.iter().map(|(op, _)| op).collect();
        assert_eq!(operations, vec![RouteOperation::List, RouteOperation::Remove]);
    }
}
