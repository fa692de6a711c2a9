//! Check command report data structures.

use std::path::PathBuf;

use super::output::{Output, Report};

/// One resource line of a report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceSummary {
    pub name: String,
    /// Storage mode, `None` when the resource declares no storage.
    pub storage: Option<String>,
    pub routes: usize,
}

impl ResourceSummary {
    pub fn describe(&self) -> String {
        format!(
            "{} ({}, {} route{})",
            self.name,
            self.storage.as_deref().unwrap_or("no storage"),
            self.routes,
            if self.routes == 1 { "" } else { "s" }
        )
    }
}

/// Report data from config validation.
#[derive(Debug)]
pub struct CheckReport {
    /// Path to the config file.
    pub config_path: PathBuf,
    /// PHP namespace the config resolves to.
    pub namespace: String,
    pub resources: Vec<ResourceSummary>,
    /// Number of IR warnings, already logged while building.
    pub warning_count: usize,
    /// Pipeline diagnostics as `code: message`.
    pub diagnostics: Vec<String>,
}

impl Report for CheckReport {
    fn render(&self, out: &mut dyn Output) {
        for diagnostic in &self.diagnostics {
            out.warning(diagnostic);
        }
        if !self.diagnostics.is_empty() {
            out.newline();
        }

        out.preformatted(&format!("✓ {} is valid", self.config_path.display()));
        out.newline();
        out.key_value("Namespace", &self.namespace);
        out.section(&format!("Resources ({})", self.resources.len()));
        for resource in &self.resources {
            out.list_item(&resource.describe());
        }

        if self.warning_count > 0 {
            out.newline();
            out.preformatted(&format!(
                "{} warning{} reported",
                self.warning_count,
                if self.warning_count == 1 { "" } else { "s" }
            ));
        }
    }
}
