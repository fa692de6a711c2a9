//! Pipeline orchestrator.

use std::collections::HashSet;

use eyre::{Result, WrapErr};
use serde::Serialize;
use serde_json::json;
use wpkernel_core::File;
use wpkernel_ir::{Ir, IrDraft};

use super::{
    BuilderHelper, Diagnostic, FragmentHelper, GenerationContext, GenerationEvent,
    HelperDescriptor, HelperKind, RegisteredHelper, fragments, scheduler,
};
use crate::generation::BuilderOutput;

/// Options of a single run.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Helper keys the caller consumes directly; they never count as unused.
    pub requested: Vec<String>,
}

impl RunOptions {
    pub fn requesting<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            requested: keys.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Executed,
    Skipped,
}

/// One helper's outcome, in execution order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineStep {
    pub key: String,
    pub kind: HelperKind,
    pub status: StepStatus,
}

/// Result of a successful run.
#[derive(Debug)]
pub struct PipelineRunResult {
    pub ir: Ir,
    /// Files queued by builders, not yet written.
    pub files: Vec<File>,
    pub diagnostics: Vec<Diagnostic>,
    pub steps: Vec<PipelineStep>,
}

/// Registry and runner of fragment and builder helpers.
///
/// Fragments run first and fill an [`IrDraft`], which is finalised into the
/// [`Ir`] builders read from. Within each stage helpers are ordered by their
/// dependencies.
///
/// # Example
///
/// ```ignore
/// let mut pipeline = Pipeline::with_core_fragments();
/// pipeline.use_builder(ControllerBuilder::new());
///
/// let mut ctx = GenerationContext::new(Box::new(LogReporter::default()));
/// let result = pipeline.run(&mut ctx, &loaded, &RunOptions::default())?;
/// ```
#[derive(Debug, Default)]
pub struct Pipeline {
    fragments: Vec<RegisteredHelper>,
    builders: Vec<RegisteredHelper>,
    conflicts: Vec<Diagnostic>,
}

impl Pipeline {
    /// Create an empty pipeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a pipeline with the fragments that build the complete IR.
    pub fn with_core_fragments() -> Self {
        let mut pipeline = Self::new();
        fragments::register_core_fragments(&mut pipeline);
        pipeline
    }

    /// Register a helper. A key already registered for the same kind is
    /// rejected with a `conflict` diagnostic; the first registration wins.
    pub fn register(&mut self, helper: RegisteredHelper) -> &mut Self {
        let kind = helper.kind();
        let slot = match kind {
            HelperKind::Fragment => &mut self.fragments,
            HelperKind::Builder => &mut self.builders,
        };

        let descriptor = helper.descriptor();
        if let Some(existing) = slot
            .iter()
            .find(|registered| registered.descriptor().key == descriptor.key)
        {
            self.conflicts.push(Diagnostic::conflict(
                &descriptor.key,
                kind,
                existing.descriptor().label(),
                descriptor.label(),
            ));
            return self;
        }

        slot.push(helper);
        self
    }

    pub fn use_fragment(&mut self, helper: impl FragmentHelper + 'static) -> &mut Self {
        self.register(RegisteredHelper::Fragment(Box::new(helper)))
    }

    pub fn use_builder(&mut self, helper: impl BuilderHelper + 'static) -> &mut Self {
        self.register(RegisteredHelper::Builder(Box::new(helper)))
    }

    /// Descriptors of every registered helper, fragments first.
    pub fn descriptors(&self) -> impl Iterator<Item = &HelperDescriptor> {
        self.fragments
            .iter()
            .chain(self.builders.iter())
            .map(RegisteredHelper::descriptor)
    }

    /// Run every stage against a loaded config.
    ///
    /// # Errors
    ///
    /// Returns the first helper error, or the IR finalisation error. Nothing
    /// is written by the pipeline itself; the caller writes `files` after a
    /// successful run.
    pub fn run(
        &self,
        ctx: &mut GenerationContext,
        loaded: &wpkernel_config::LoadedConfig,
        options: &RunOptions,
    ) -> Result<PipelineRunResult> {
        let mut diagnostics = self.conflicts.clone();
        let mut steps = Vec::new();

        ctx.set_phase(Some(HelperKind::Fragment));
        let mut draft = IrDraft::new();
        let (fragment_done, fragment_skipped) = self.run_stage(
            ctx,
            &self.fragments,
            &HashSet::new(),
            &HashSet::new(),
            &mut diagnostics,
            &mut steps,
            |helper, ctx| match helper {
                RegisteredHelper::Fragment(helper) => helper.apply(ctx, loaded, &mut draft),
                RegisteredHelper::Builder(_) => Ok(()),
            },
        )?;

        let ir = draft.finalize().wrap_err("failed to finalise the IR")?;

        ctx.set_phase(Some(HelperKind::Builder));
        let mut output = BuilderOutput::new();
        let (builder_done, _) = self.run_stage(
            ctx,
            &self.builders,
            &fragment_done,
            &fragment_skipped,
            &mut diagnostics,
            &mut steps,
            |helper, ctx| match helper {
                RegisteredHelper::Builder(helper) => helper.apply(ctx, &ir, &mut output),
                RegisteredHelper::Fragment(_) => Ok(()),
            },
        )?;
        ctx.set_phase(None);

        diagnostics.extend(self.unused_helpers(&fragment_done, &builder_done, options));

        for diagnostic in &diagnostics {
            ctx.reporter()
                .warn(diagnostic.message(), Some(&diagnostic.context()));
        }

        Ok(PipelineRunResult {
            ir,
            files: output.into_files(),
            diagnostics,
            steps,
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn run_stage<F>(
        &self,
        ctx: &mut GenerationContext,
        helpers: &[RegisteredHelper],
        available: &HashSet<String>,
        upstream_skipped: &HashSet<String>,
        diagnostics: &mut Vec<Diagnostic>,
        steps: &mut Vec<PipelineStep>,
        mut apply: F,
    ) -> Result<(HashSet<String>, HashSet<String>)>
    where
        F: FnMut(&RegisteredHelper, &mut GenerationContext) -> Result<()>,
    {
        let descriptors: Vec<&HelperDescriptor> =
            helpers.iter().map(RegisteredHelper::descriptor).collect();
        let plan = scheduler::schedule(&descriptors, available, upstream_skipped);
        diagnostics.extend(plan.diagnostics);

        let mut done = HashSet::new();
        for index in plan.order {
            let helper = &helpers[index];
            let descriptor = helper.descriptor();
            log::debug!("running {} helper {}", descriptor.kind, descriptor.key);

            apply(helper, ctx).wrap_err_with(|| {
                format!("{} helper \"{}\" failed", descriptor.kind, descriptor.key)
            })?;

            ctx.record(GenerationEvent {
                name: "helper.completed".to_string(),
                helper: Some(descriptor.key.clone()),
                payload: Some(json!({ "kind": descriptor.kind })),
            });
            steps.push(PipelineStep {
                key: descriptor.key.clone(),
                kind: helper.kind(),
                status: StepStatus::Executed,
            });
            done.insert(descriptor.key.clone());
        }

        let mut skipped = HashSet::new();
        for index in plan.skipped {
            let descriptor = helpers[index].descriptor();
            steps.push(PipelineStep {
                key: descriptor.key.clone(),
                kind: helpers[index].kind(),
                status: StepStatus::Skipped,
            });
            skipped.insert(descriptor.key.clone());
        }

        Ok((done, skipped))
    }

    /// Executed helpers that nothing depends on, that are not terminal and
    /// that the caller did not request.
    fn unused_helpers(
        &self,
        fragment_done: &HashSet<String>,
        builder_done: &HashSet<String>,
        options: &RunOptions,
    ) -> Vec<Diagnostic> {
        let consumed: HashSet<&str> = self
            .descriptors()
            .flat_map(|descriptor| descriptor.depends_on.iter().map(String::as_str))
            .collect();

        self.fragments
            .iter()
            .filter(|helper| fragment_done.contains(&helper.descriptor().key))
            .chain(
                self.builders
                    .iter()
                    .filter(|helper| builder_done.contains(&helper.descriptor().key)),
            )
            .map(RegisteredHelper::descriptor)
            .filter(|descriptor| {
                !descriptor.terminal
                    && !consumed.contains(descriptor.key.as_str())
                    && !options.requested.contains(&descriptor.key)
            })
            .map(|descriptor| {
                Diagnostic::unused_helper(&descriptor.key, descriptor.kind, &descriptor.depends_on)
            })
            .collect()
    }
}
