use wpkernel_config::LoadedConfig;
use wpkernel_core::sanitize_namespace;

use crate::{IrError, IrMeta, Result};

/// Build the IR metadata block.
pub fn build_meta(loaded: &LoadedConfig) -> Result<IrMeta> {
    let config = &loaded.config;
    let sanitized = sanitize_namespace(&config.namespace).ok_or_else(|| {
        IrError::validation(format!(
            "namespace '{}' cannot be sanitised into a valid plugin namespace",
            config.namespace
        ))
    })?;

    Ok(IrMeta {
        version: config.version(),
        namespace: config.namespace.clone(),
        sanitized_namespace: sanitized,
        source_path: display_path(&loaded.source_path),
        origin: loaded.origin.clone(),
    })
}

/// Render a path with forward slashes so the IR is platform independent.
pub(crate) fn display_path(path: &std::path::Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
