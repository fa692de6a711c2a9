use std::path::Path;

use eyre::{Result, bail};
use wpkernel_codegen::{
    generation::{BuilderOutput, write_generated_files},
    pipeline::{
        BuilderInput, Diagnostic, FragmentInput, GenerationContext, Helper, HelperDescriptor,
        Pipeline, RunOptions, StepStatus, fragments::RESOURCES_FRAGMENT,
    },
};
use wpkernel_config::LoadedConfig;
use wpkernel_core::{File, MemoryFileSystem, MemoryReporter};
use wpkernel_ir::IrDraft;

const CONFIG: &str = r#"
version = 1
namespace = "acme"

[resources.job]
name = "job"
identity = { type = "number" }
storage = { mode = "wp-post" }
routes.list = { path = "/acme/v1/jobs", method = "GET" }
routes.get = { path = "/acme/v1/jobs/:id", method = "GET" }
"#;

fn loaded() -> LoadedConfig {
    LoadedConfig::new(CONFIG.parse().unwrap(), "wpk.config.toml")
}

struct Manifest {
    descriptor: HelperDescriptor,
    fail: bool,
}

impl Manifest {
    fn new(descriptor: HelperDescriptor) -> Self {
        Self {
            descriptor,
            fail: false,
        }
    }
}

impl Helper<BuilderInput, BuilderOutput> for Manifest {
    fn descriptor(&self) -> &HelperDescriptor {
        &self.descriptor
    }

    fn apply(
        &self,
        _ctx: &mut GenerationContext,
        ir: &BuilderInput,
        output: &mut BuilderOutput,
    ) -> Result<()> {
        if self.fail {
            bail!("manifest could not be rendered");
        }
        let names: Vec<_> = ir.resources.iter().map(|r| r.name.as_str()).collect();
        output.queue(File::new(
            format!("{}.txt", self.descriptor.key),
            format!("{}\n", names.join(",")),
        ));
        Ok(())
    }
}

struct NoopFragment(HelperDescriptor);

impl Helper<FragmentInput, IrDraft> for NoopFragment {
    fn descriptor(&self) -> &HelperDescriptor {
        &self.0
    }

    fn apply(
        &self,
        _ctx: &mut GenerationContext,
        _input: &FragmentInput,
        _draft: &mut IrDraft,
    ) -> Result<()> {
        Ok(())
    }
}

fn context(reporter: &MemoryReporter) -> GenerationContext {
    GenerationContext::new(Box::new(reporter.clone()))
}

#[test]
fn test_each_diagnostic_is_reported_once() {
    let reporter = MemoryReporter::new();
    let mut pipeline = Pipeline::with_core_fragments();
    pipeline
        .use_builder(Manifest::new(
            HelperDescriptor::builder("manifest")
                .depends_on([RESOURCES_FRAGMENT])
                .origin("first")
                .terminal(),
        ))
        .use_builder(Manifest::new(
            HelperDescriptor::builder("manifest").origin("second").terminal(),
        ))
        .use_builder(Manifest::new(
            HelperDescriptor::builder("orphan").depends_on(["php.nowhere"]),
        ))
        .use_fragment(NoopFragment(HelperDescriptor::fragment("ir.extra")));

    let result = pipeline
        .run(&mut context(&reporter), &loaded(), &RunOptions::default())
        .unwrap();

    let codes: Vec<_> = result.diagnostics.iter().map(Diagnostic::code).collect();
    assert_eq!(codes.iter().filter(|c| **c == "conflict").count(), 1);
    assert_eq!(codes.iter().filter(|c| **c == "missing-dependency").count(), 1);
    assert_eq!(codes.iter().filter(|c| **c == "unused-helper").count(), 1);

    let unused = result
        .diagnostics
        .iter()
        .find(|d| d.code() == "unused-helper")
        .unwrap();
    assert_eq!(unused.key(), "ir.extra");

    // The first registration wins.
    assert_eq!(result.files.len(), 1);
    assert_eq!(result.files[0].content(), "job\n");

    let orphan = result.steps.iter().find(|step| step.key == "orphan").unwrap();
    assert_eq!(orphan.status, StepStatus::Skipped);

    assert_eq!(reporter.warnings().len(), result.diagnostics.len());
}

#[test]
fn test_requested_helpers_are_not_unused() {
    let reporter = MemoryReporter::new();
    let mut pipeline = Pipeline::with_core_fragments();
    pipeline.use_builder(Manifest::new(HelperDescriptor::builder("manifest")));

    let result = pipeline
        .run(
            &mut context(&reporter),
            &loaded(),
            &RunOptions::requesting(["manifest"]),
        )
        .unwrap();

    assert!(result.diagnostics.is_empty());
}

#[test]
fn test_helper_errors_abort_before_writing() {
    let reporter = MemoryReporter::new();
    let mut pipeline = Pipeline::with_core_fragments();
    pipeline.use_builder(Manifest {
        descriptor: HelperDescriptor::builder("manifest").terminal(),
        fail: true,
    });

    let err = pipeline
        .run(&mut context(&reporter), &loaded(), &RunOptions::default())
        .unwrap_err();

    assert_eq!(err.to_string(), "builder helper \"manifest\" failed");
}

#[test]
fn test_missing_core_fragment_fails_finalisation() {
    let reporter = MemoryReporter::new();
    let mut pipeline = Pipeline::new();
    pipeline.use_fragment(NoopFragment(HelperDescriptor::fragment("ir.extra").terminal()));

    let err = pipeline
        .run(&mut context(&reporter), &loaded(), &RunOptions::default())
        .unwrap_err();

    assert_eq!(err.to_string(), "failed to finalise the IR");
}

#[test]
fn test_queued_files_are_written_after_the_run() {
    let reporter = MemoryReporter::new();
    let mut pipeline = Pipeline::with_core_fragments();
    pipeline.use_builder(Manifest::new(
        HelperDescriptor::builder("resources").terminal(),
    ));
    let result = pipeline
        .run(&mut context(&reporter), &loaded(), &RunOptions::default())
        .unwrap();

    let fs = MemoryFileSystem::new();
    let summary =
        write_generated_files(&result.files, &reporter, &fs, Path::new(".generated")).unwrap();

    assert_eq!(summary.written.len(), 1);
    assert_eq!(fs.get(".generated/resources.txt").as_deref(), Some("job\n"));
}
