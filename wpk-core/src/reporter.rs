//! Reporting collaborator.
//!
//! Pipelines and writers never log directly. They receive a [`Reporter`] and
//! forward warnings, progress and debugging output through it.

use log::Level;
use serde_json::Value;

/// Structured sink for generation messages.
pub trait Reporter: Send + Sync {
    /// Record a message at `level` with optional structured context.
    fn log(&self, level: Level, message: &str, context: Option<&Value>);

    /// Create a reporter scoped below this one.
    fn child(&self, namespace: &str) -> Box<dyn Reporter>;

    fn error(&self, message: &str, context: Option<&Value>) {
        self.log(Level::Error, message, context);
    }

    fn warn(&self, message: &str, context: Option<&Value>) {
        self.log(Level::Warn, message, context);
    }

    fn info(&self, message: &str, context: Option<&Value>) {
        self.log(Level::Info, message, context);
    }

    fn debug(&self, message: &str, context: Option<&Value>) {
        self.log(Level::Debug, message, context);
    }
}

fn join_namespace(parent: &str, child: &str) -> String {
    if parent.is_empty() {
        child.to_string()
    } else {
        format!("{parent}.{child}")
    }
}

/// [`Reporter`] that forwards to the `log` facade, using the namespace as the
/// log target.
#[derive(Debug, Clone)]
pub struct LogReporter {
    namespace: String,
}

impl LogReporter {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }
}

impl Default for LogReporter {
    fn default() -> Self {
        Self::new("wpk")
    }
}

impl Reporter for LogReporter {
    fn log(&self, level: Level, message: &str, context: Option<&Value>) {
        match context {
            Some(context) => {
                log::log!(target: self.namespace.as_str(), level, "{message} {context}")
            }
            None => log::log!(target: self.namespace.as_str(), level, "{message}"),
        }
    }

    fn child(&self, namespace: &str) -> Box<dyn Reporter> {
        Box::new(LogReporter::new(join_namespace(&self.namespace, namespace)))
    }
}

#[cfg(any(test, feature = "testing"))]
pub use memory::{MemoryReporter, ReportEntry};

#[cfg(any(test, feature = "testing"))]
mod memory {
    use std::sync::{Arc, Mutex, PoisonError};

    use log::Level;
    use serde_json::Value;

    use super::{Reporter, join_namespace};

    /// A message captured by [`MemoryReporter`].
    #[derive(Debug, Clone, PartialEq)]
    pub struct ReportEntry {
        pub namespace: String,
        pub level: Level,
        pub message: String,
        pub context: Option<Value>,
    }

    /// Recording [`Reporter`]; children share the parent's entry list.
    #[derive(Debug, Clone, Default)]
    pub struct MemoryReporter {
        namespace: String,
        entries: Arc<Mutex<Vec<ReportEntry>>>,
    }

    impl MemoryReporter {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn entries(&self) -> Vec<ReportEntry> {
            self.entries
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        }

        pub fn at_level(&self, level: Level) -> Vec<ReportEntry> {
            self.entries()
                .into_iter()
                .filter(|entry| entry.level == level)
                .collect()
        }

        pub fn warnings(&self) -> Vec<ReportEntry> {
            self.at_level(Level::Warn)
        }
    }

    impl Reporter for MemoryReporter {
        fn log(&self, level: Level, message: &str, context: Option<&Value>) {
            self.entries
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(ReportEntry {
                    namespace: self.namespace.clone(),
                    level,
                    message: message.to_string(),
                    context: context.cloned(),
                });
        }

        fn child(&self, namespace: &str) -> Box<dyn Reporter> {
            Box::new(MemoryReporter {
                namespace: join_namespace(&self.namespace, namespace),
                entries: Arc::clone(&self.entries),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_child_namespaces_are_dotted() {
        assert_eq!(join_namespace("", "wpk"), "wpk");
        assert_eq!(join_namespace("wpk", "pipeline"), "wpk.pipeline");
    }

    #[test]
    fn test_memory_reporter_children_share_entries() {
        let reporter = MemoryReporter::new();
        let child = reporter.child("pipeline");

        reporter.info("starting", None);
        child.warn("conflict", Some(&json!({ "key": "ir.meta.core" })));

        let entries = reporter.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].namespace, "pipeline");
        assert_eq!(entries[1].level, Level::Warn);
        assert_eq!(
            entries[1].context.as_ref().and_then(|c| c.get("key")),
            Some(&json!("ir.meta.core"))
        );
        assert_eq!(reporter.warnings().len(), 1);
    }
}
