//! Generate command report data structures.

use std::path::PathBuf;

use super::{
    ResourceSummary,
    output::{Output, Report},
};

/// Report data from PHP generation.
#[derive(Debug)]
pub struct GenerateReport {
    pub namespace: String,
    pub ir_hash: String,
    pub resources: Vec<ResourceSummary>,
    /// Pipeline diagnostics as `code: message`.
    pub diagnostics: Vec<String>,
    pub result: GenerationResult,
}

/// What happened to the generated files.
#[derive(Debug)]
pub enum GenerationResult {
    /// Files were written below `root`.
    Written {
        root: PathBuf,
        written: Vec<PathBuf>,
        skipped: Vec<PathBuf>,
    },
    /// The manifest already records the current IR hash.
    UpToDate { manifest: PathBuf },
    /// Dry-run preview.
    Preview(Vec<PreviewFile>),
}

/// A file in preview mode.
#[derive(Debug)]
pub struct PreviewFile {
    pub path: String,
    pub content: String,
}

impl Report for GenerateReport {
    fn render(&self, out: &mut dyn Output) {
        for diagnostic in &self.diagnostics {
            out.warning(diagnostic);
        }

        match &self.result {
            GenerationResult::Preview(files) => {
                for file in files {
                    out.divider(&file.path);
                    out.preformatted(&file.content);
                }
                out.divider("Summary");
                out.preformatted(&format!("{} files would be generated", files.len()));
            }
            GenerationResult::UpToDate { manifest } => {
                out.preformatted(&format!(
                    "Up to date: {} already records IR {}",
                    manifest.display(),
                    short_hash(&self.ir_hash)
                ));
            }
            GenerationResult::Written {
                root,
                written,
                skipped,
            } => {
                out.key_value("Namespace", &self.namespace);
                out.key_value("IR", short_hash(&self.ir_hash));
                out.section(&format!("Resources ({})", self.resources.len()));
                for resource in &self.resources {
                    out.list_item(&resource.describe());
                }
                out.newline();

                out.section(&format!("Generated in {}", root.display()));
                for path in written {
                    out.added_item(&path.display().to_string());
                }
                if !skipped.is_empty() {
                    out.key_value("Skipped", &skipped.len().to_string());
                }
            }
        }
    }
}

fn short_hash(hash: &str) -> &str {
    hash.get(..12).unwrap_or(hash)
}
