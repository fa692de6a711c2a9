//! Helper pipeline and code generation utilities for the WPKernel PHP
//! generator.
//!
//! # Module Organization
//!
//! - [`builder`] - Language-agnostic text building blocks (CodeBuilder, CodeFragment, etc.)
//! - [`pipeline`] - Helper registration, scheduling, diagnostics and the built-in IR fragments
//! - [`generation`] - Queued output and `write_generated_files`

pub mod builder;
pub mod generation;
pub mod pipeline;
