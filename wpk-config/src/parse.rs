//! Config parsing from files and strings.

use std::{path::Path, str::FromStr};

use crate::{
    ConfigWarning, Error, KernelConfig, Result, error::SourceContext, validate::validate,
};

/// Serialisation format of a kernel config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Json,
}

impl ConfigFormat {
    /// Detect the format from the file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "toml" => Some(ConfigFormat::Toml),
            "json" => Some(ConfigFormat::Json),
            _ => None,
        }
    }
}

/// A parsed and validated config together with its validation warnings.
#[derive(Debug, Clone)]
pub struct ParsedConfig {
    pub config: KernelConfig,
    pub warnings: Vec<ConfigWarning>,
}

impl FromStr for KernelConfig {
    type Err = Box<Error>;

    fn from_str(s: &str) -> Result<Self> {
        parse_str(s, ConfigFormat::Toml, "wpk.config.toml").map(|parsed| parsed.config)
    }
}

/// Parse and validate config content with the given filename for error reporting.
pub fn parse_str(content: &str, format: ConfigFormat, filename: &str) -> Result<ParsedConfig> {
    let source = SourceContext::new(content, filename);
    let config: KernelConfig = match format {
        ConfigFormat::Toml => toml::from_str(content).map_err(|e| source.parse_error(e))?,
        ConfigFormat::Json => serde_json::from_str(content).map_err(|e| source.json_error(e))?,
    };
    let warnings = validate(&config, &source)?;
    Ok(ParsedConfig { config, warnings })
}

/// Parse and validate a config file, detecting the format from its extension.
pub fn parse_file(path: impl AsRef<Path>) -> Result<ParsedConfig> {
    let path = path.as_ref();
    let format = ConfigFormat::from_path(path).ok_or_else(|| {
        Box::new(Error::UnsupportedFormat {
            path: path.to_path_buf(),
        })
    })?;
    let content = std::fs::read_to_string(path).map_err(|e| {
        Box::new(Error::Io {
            path: path.to_path_buf(),
            source: e,
        })
    })?;
    parse_str(&content, format, &path.display().to_string())
}
