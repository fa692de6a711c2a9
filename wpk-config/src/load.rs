use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde_json::Value;

use crate::{ConfigFormat, ConfigWarning, Error, KernelConfig, Result, parse_file, parse_str};

/// A schema document read from disk.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedSchema {
    /// Resolved path of the schema file.
    pub path: PathBuf,
    /// Parsed JSON document.
    pub document: Value,
}

/// A validated config with every declared schema file loaded.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: KernelConfig,
    /// Path of the config file.
    pub source_path: PathBuf,
    /// File name of the config (e.g. `wpk.config.toml`).
    pub origin: String,
    pub schemas: IndexMap<String, LoadedSchema>,
    pub warnings: Vec<ConfigWarning>,
}

impl LoadedConfig {
    /// Wrap an already validated config without touching the disk.
    pub fn new(config: KernelConfig, source_path: impl Into<PathBuf>) -> Self {
        let source_path = source_path.into();
        let origin = source_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            config,
            source_path,
            origin,
            schemas: IndexMap::new(),
            warnings: Vec::new(),
        }
    }

    /// Attach a loaded schema document.
    pub fn with_schema(
        mut self,
        key: impl Into<String>,
        path: impl Into<PathBuf>,
        document: Value,
    ) -> Self {
        self.schemas.insert(
            key.into(),
            LoadedSchema {
                path: path.into(),
                document,
            },
        );
        self
    }

    pub fn with_warnings(mut self, warnings: Vec<ConfigWarning>) -> Self {
        self.warnings = warnings;
        self
    }

    /// Directory the config lives in; schema paths resolve against it.
    pub fn base_dir(&self) -> &Path {
        self.source_path.parent().unwrap_or(Path::new(""))
    }
}

/// Load, validate and resolve a config file.
pub fn load(path: impl AsRef<Path>) -> Result<LoadedConfig> {
    let path = path.as_ref();
    let parsed = parse_file(path)?;
    let loaded = LoadedConfig::new(parsed.config, path).with_warnings(parsed.warnings);
    load_schemas(loaded)
}

/// Load config content as if it lived at `path`.
pub fn load_str(content: &str, format: ConfigFormat, path: impl AsRef<Path>) -> Result<LoadedConfig> {
    let path = path.as_ref();
    let parsed = parse_str(content, format, &path.display().to_string())?;
    let loaded = LoadedConfig::new(parsed.config, path).with_warnings(parsed.warnings);
    load_schemas(loaded)
}

fn load_schemas(mut loaded: LoadedConfig) -> Result<LoadedConfig> {
    let base = loaded.base_dir().to_path_buf();
    let declared: Vec<(String, String)> = loaded
        .config
        .schemas
        .iter()
        .map(|(key, schema)| (key.clone(), schema.path.clone()))
        .collect();

    for (key, relative) in declared {
        let path = base.join(&relative);
        let document = read_schema(&path)?;
        loaded = loaded.with_schema(key, path, document);
    }

    Ok(loaded)
}

fn read_schema(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Box::new(Error::SchemaFile {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    })?;
    let document: Value = serde_json::from_str(&content).map_err(|e| {
        Box::new(Error::SchemaFile {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    })?;
    if !document.is_object() {
        return Err(Box::new(Error::SchemaFile {
            path: path.to_path_buf(),
            message: "expected a JSON object".to_string(),
        }));
    }
    Ok(document)
}
