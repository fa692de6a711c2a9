use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::ResourceConfig;

/// Root of a kernel config file (`wpk.config.toml` / `wpk.config.json`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct KernelConfig {
    /// Config format version; only `1` is supported.
    #[serde(default)]
    pub version: Option<u32>,

    /// Plugin namespace slug (e.g. `acme-demo`).
    pub namespace: String,

    /// JSON Schema files keyed by schema key.
    #[serde(default)]
    pub schemas: IndexMap<String, SchemaConfig>,

    /// Resources keyed by config key.
    #[serde(default)]
    pub resources: IndexMap<String, ResourceConfig>,

    /// Global capability map.
    #[serde(default)]
    pub capabilities: Option<IndexMap<String, CapabilityDescriptor>>,
}

impl KernelConfig {
    pub const CURRENT_VERSION: u32 = 1;

    /// The declared version, defaulting to the current one.
    pub fn version(&self) -> u32 {
        self.version.unwrap_or(Self::CURRENT_VERSION)
    }
}

/// A JSON Schema file declared under `[schemas.<key>]`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaConfig {
    /// Path to the schema, relative to the config file.
    pub path: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// What a capability check is evaluated against.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum AppliesTo {
    /// Checked once for the resource as a whole.
    #[default]
    Resource,
    /// Checked against a specific object id.
    Object,
}

impl AppliesTo {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppliesTo::Resource => "resource",
            AppliesTo::Object => "object",
        }
    }
}

/// A capability map entry.
///
/// Either a bare WordPress capability (`"edit_posts"`), or a detailed
/// descriptor with an explicit target and object binding.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum CapabilityDescriptor {
    Simple(String),
    Detailed {
        capability: String,
        #[serde(default, rename = "appliesTo")]
        applies_to: AppliesTo,
        #[serde(default)]
        binding: Option<String>,
    },
}

impl CapabilityDescriptor {
    pub fn capability(&self) -> &str {
        match self {
            CapabilityDescriptor::Simple(capability) => capability,
            CapabilityDescriptor::Detailed { capability, .. } => capability,
        }
    }

    pub fn applies_to(&self) -> AppliesTo {
        match self {
            CapabilityDescriptor::Simple(_) => AppliesTo::Resource,
            CapabilityDescriptor::Detailed { applies_to, .. } => *applies_to,
        }
    }

    pub fn binding(&self) -> Option<&str> {
        match self {
            CapabilityDescriptor::Simple(_) => None,
            CapabilityDescriptor::Detailed { binding, .. } => binding.as_deref(),
        }
    }
}
