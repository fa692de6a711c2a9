//! Generated output: the builder output queue and the file writer.

mod output;
mod writer;

pub use output::BuilderOutput;
pub use writer::{WriteSummary, write_generated_files};
