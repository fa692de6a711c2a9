//! IR operation - print the intermediate representation.

use eyre::Result;
use wpkernel_config::LoadedConfig;
use wpkernel_ir::build_ir;

/// Build the IR of `loaded` and serialise it as JSON.
pub fn ir_json(loaded: &LoadedConfig, pretty: bool) -> Result<String> {
    let ir = build_ir(loaded)?;
    let json = if pretty {
        serde_json::to_string_pretty(&ir)?
    } else {
        serde_json::to_string(&ir)?
    };
    Ok(json)
}
