//! Helper pipeline.
//!
//! A [`Pipeline`] holds fragment and builder helpers. A run schedules each
//! stage topologically, runs fragments against the loaded config to build
//! the IR, then runs builders against the IR to queue output files.
//! Registration conflicts, missing dependencies and unused helpers become
//! [`Diagnostic`]s instead of errors.

mod context;
mod diagnostic;
pub mod fragments;
mod helper;
mod runner;
mod scheduler;

pub use context::{GenerationContext, GenerationEvent};
pub use diagnostic::Diagnostic;
pub use helper::{
    BuilderHelper, BuilderInput, FragmentHelper, FragmentInput, Helper, HelperDescriptor,
    HelperKind, RegisteredHelper,
};
pub use runner::{Pipeline, PipelineRunResult, PipelineStep, RunOptions, StepStatus};
