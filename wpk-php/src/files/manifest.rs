use std::path::PathBuf;

use serde::Serialize;
use serde_json::Value;
use wpkernel_core::GeneratedFile;
use wpkernel_ir::Ir;

use super::output_path;
use crate::metadata::{CapabilityHelperMetadata, ResourceControllerMetadata};

pub const MANIFEST_FILE: &str = "wpk-manifest.json";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ManifestBody<'a> {
    ir_hash: &'a str,
    namespace: &'a str,
    autoload: &'a str,
    output_dir: &'a str,
    controllers: &'a [ResourceControllerMetadata],
    capabilities: &'a CapabilityHelperMetadata,
    files: &'a [String],
}

/// `wpk-manifest.json`: the IR hash the PHP was generated from, plus the
/// controller and capability metadata.
#[derive(Debug, Clone)]
pub struct Manifest {
    output_dir: String,
    contents: String,
}

impl Manifest {
    /// `files` are the generated paths relative to the output directory.
    pub fn new(
        ir: &Ir,
        controllers: &[ResourceControllerMetadata],
        capabilities: &CapabilityHelperMetadata,
        files: &[String],
    ) -> serde_json::Result<Self> {
        let body = ManifestBody {
            ir_hash: ir.content_hash(),
            namespace: &ir.php.namespace,
            autoload: &ir.php.autoload,
            output_dir: &ir.php.output_dir,
            controllers,
            capabilities,
            files,
        };
        let mut contents = serde_json::to_string_pretty(&body)?;
        contents.push('\n');

        Ok(Self {
            output_dir: ir.php.output_dir.clone(),
            contents,
        })
    }
}

impl GeneratedFile for Manifest {
    fn path(&self) -> PathBuf {
        output_path(&self.output_dir, MANIFEST_FILE)
    }

    fn render(&self) -> String {
        self.contents.clone()
    }
}

/// The `irHash` recorded in a previously written manifest.
pub fn read_manifest_hash(contents: &str) -> Option<String> {
    let value: Value = serde_json::from_str(contents).ok()?;
    value.get("irHash")?.as_str().map(str::to_string)
}
