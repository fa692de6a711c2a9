//! Helper trait and descriptors.

use std::fmt;

use eyre::Result;
use serde::Serialize;
use wpkernel_config::LoadedConfig;
use wpkernel_ir::{Ir, IrDraft};

use super::GenerationContext;
use crate::generation::BuilderOutput;

/// Stage a helper runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HelperKind {
    /// Builds a piece of the IR from the loaded config.
    Fragment,
    /// Produces output files from the finalised IR.
    Builder,
}

impl HelperKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            HelperKind::Fragment => "fragment",
            HelperKind::Builder => "builder",
        }
    }
}

impl fmt::Display for HelperKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity and scheduling information of a helper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HelperDescriptor {
    /// Unique key within the helper's kind.
    pub key: String,
    pub kind: HelperKind,
    /// Keys that must run first.
    pub depends_on: Vec<String>,
    /// Higher priorities run first among ready helpers.
    pub priority: i32,
    /// Where the helper was registered from, for diagnostics.
    pub origin: Option<String>,
    /// Terminal helpers are expected to have no dependants.
    pub terminal: bool,
}

impl HelperDescriptor {
    pub fn new(key: impl Into<String>, kind: HelperKind) -> Self {
        Self {
            key: key.into(),
            kind,
            depends_on: Vec::new(),
            priority: 0,
            origin: None,
            terminal: false,
        }
    }

    pub fn fragment(key: impl Into<String>) -> Self {
        Self::new(key, HelperKind::Fragment)
    }

    pub fn builder(key: impl Into<String>) -> Self {
        Self::new(key, HelperKind::Builder)
    }

    pub fn depends_on<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.depends_on.extend(keys.into_iter().map(Into::into));
        self
    }

    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    pub fn terminal(mut self) -> Self {
        self.terminal = true;
        self
    }

    /// Origin when known, otherwise the key.
    pub fn label(&self) -> &str {
        self.origin.as_deref().unwrap_or(&self.key)
    }
}

/// A named, dependency-aware unit of pipeline work.
pub trait Helper<I: ?Sized, O: ?Sized>: Send + Sync {
    fn descriptor(&self) -> &HelperDescriptor;

    /// Run the helper.
    ///
    /// # Errors
    ///
    /// Errors are structural and abort the whole run before anything is
    /// written. Recoverable findings go through the context's reporter.
    fn apply(&self, ctx: &mut GenerationContext, input: &I, output: &mut O) -> Result<()>;
}

/// Input of fragment helpers.
pub type FragmentInput = LoadedConfig;
/// Input of builder helpers.
pub type BuilderInput = Ir;

/// Helper that contributes to the IR draft.
pub trait FragmentHelper: Helper<FragmentInput, IrDraft> {}
impl<T: Helper<FragmentInput, IrDraft>> FragmentHelper for T {}

/// Helper that queues output files.
pub trait BuilderHelper: Helper<BuilderInput, BuilderOutput> {}
impl<T: Helper<BuilderInput, BuilderOutput>> BuilderHelper for T {}

/// A helper registered with a pipeline.
pub enum RegisteredHelper {
    Fragment(Box<dyn FragmentHelper>),
    Builder(Box<dyn BuilderHelper>),
}

impl RegisteredHelper {
    pub fn descriptor(&self) -> &HelperDescriptor {
        match self {
            RegisteredHelper::Fragment(helper) => helper.descriptor(),
            RegisteredHelper::Builder(helper) => helper.descriptor(),
        }
    }

    pub fn kind(&self) -> HelperKind {
        match self {
            RegisteredHelper::Fragment(_) => HelperKind::Fragment,
            RegisteredHelper::Builder(_) => HelperKind::Builder,
        }
    }
}

impl fmt::Debug for RegisteredHelper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple(self.kind().as_str())
            .field(&self.descriptor().key)
            .finish()
    }
}
