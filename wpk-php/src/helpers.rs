//! Builder helpers that queue the generated PHP.
//!
//! | key                   | queues                          |
//! |-----------------------|---------------------------------|
//! | `php.base-controller` | `Rest/BaseController.php`       |
//! | `php.policy`          | `Policy/Policy.php`             |
//! | `php.controllers`     | `Rest/{Pascal}Controller.php`   |
//! | `php.index`           | `index.php`                     |
//! | `php.plugin-loader`   | `plugin.php`                    |
//! | `php.manifest`        | `wpk-manifest.json`             |
//!
//! Only the manifest is terminal; it lists every file queued before it.

use eyre::{Result, WrapErr};
use serde_json::json;
use wpkernel_codegen::generation::BuilderOutput;
use wpkernel_codegen::pipeline::{BuilderInput, GenerationContext, Helper, HelperDescriptor, Pipeline};
use wpkernel_core::GeneratedFile;
use wpkernel_ir::Ir;

use crate::controller::{ResourceController, build_resource_controller, controller_class_name, rest_namespace};
use crate::files::{
    BASE_CONTROLLER_PATH, BaseControllerPhp, ControllerPhp, IndexPhp, Manifest, POLICY_PATH,
    PluginLoaderPhp, PolicyPhp, controller_relative_path,
};
use crate::metadata::CapabilityHelperMetadata;

pub const BASE_CONTROLLER_BUILDER: &str = "php.base-controller";
pub const POLICY_BUILDER: &str = "php.policy";
pub const CONTROLLERS_BUILDER: &str = "php.controllers";
pub const INDEX_BUILDER: &str = "php.index";
pub const PLUGIN_LOADER_BUILDER: &str = "php.plugin-loader";
pub const MANIFEST_BUILDER: &str = "php.manifest";

/// Keys of every PHP builder, in registration order.
pub const PHP_BUILDERS: [&str; 6] = [
    BASE_CONTROLLER_BUILDER,
    POLICY_BUILDER,
    CONTROLLERS_BUILDER,
    INDEX_BUILDER,
    PLUGIN_LOADER_BUILDER,
    MANIFEST_BUILDER,
];

const ORIGIN: &str = "wpkernel-php";

/// Register the PHP builders on `pipeline`.
pub fn register_php_builders(pipeline: &mut Pipeline) {
    pipeline
        .use_builder(BaseControllerBuilder::new())
        .use_builder(PolicyBuilder::new())
        .use_builder(ControllersBuilder::new())
        .use_builder(IndexBuilder::new())
        .use_builder(PluginLoaderBuilder::new())
        .use_builder(ManifestBuilder::new());
}

/// The core fragments followed by the PHP builders.
pub fn php_pipeline() -> Pipeline {
    let mut pipeline = Pipeline::with_core_fragments();
    register_php_builders(&mut pipeline);
    pipeline
}

/// Compose the controller of every resource, in IR order.
pub fn compose_controllers(ir: &Ir) -> Result<Vec<ResourceController>> {
    ir.resources
        .iter()
        .map(|resource| {
            build_resource_controller(ir, resource)
                .wrap_err_with(|| format!("failed to compose the \"{}\" controller", resource.name))
        })
        .collect()
}

fn policy_namespace(ir: &Ir) -> String {
    format!("{}\\Policy", ir.php.namespace)
}

macro_rules! builder {
    ($name:ident) => {
        pub struct $name {
            descriptor: HelperDescriptor,
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }
    };
}

builder!(BaseControllerBuilder);

impl BaseControllerBuilder {
    pub fn new() -> Self {
        Self {
            descriptor: HelperDescriptor::builder(BASE_CONTROLLER_BUILDER)
                .priority(10)
                .origin(ORIGIN),
        }
    }
}

impl Helper<BuilderInput, BuilderOutput> for BaseControllerBuilder {
    fn descriptor(&self) -> &HelperDescriptor {
        &self.descriptor
    }

    fn apply(
        &self,
        ctx: &mut GenerationContext,
        ir: &BuilderInput,
        output: &mut BuilderOutput,
    ) -> Result<()> {
        let file = BaseControllerPhp::new(&rest_namespace(ir), ir.php.output_dir.as_str())?;
        ctx.reporter()
            .child("php")
            .debug("Queued base controller", Some(&json!({ "path": file.path() })));
        output.queue_generated(&file);
        Ok(())
    }
}

builder!(PolicyBuilder);

impl PolicyBuilder {
    pub fn new() -> Self {
        Self {
            descriptor: HelperDescriptor::builder(POLICY_BUILDER)
                .priority(10)
                .origin(ORIGIN),
        }
    }
}

impl Helper<BuilderInput, BuilderOutput> for PolicyBuilder {
    fn descriptor(&self) -> &HelperDescriptor {
        &self.descriptor
    }

    fn apply(
        &self,
        ctx: &mut GenerationContext,
        ir: &BuilderInput,
        output: &mut BuilderOutput,
    ) -> Result<()> {
        let metadata = CapabilityHelperMetadata::from_map(&ir.capability_map);
        let reporter = ctx.reporter().child("php.policy");
        for key in &metadata.missing {
            reporter.debug(
                "Capability falls back to the default policy",
                Some(&json!({ "capability": key, "fallback": metadata.fallback.capability })),
            );
        }

        let file = PolicyPhp::new(&policy_namespace(ir), &metadata, ir.php.output_dir.as_str())?;
        output.queue_generated(&file);
        Ok(())
    }
}

builder!(ControllersBuilder);

impl ControllersBuilder {
    pub fn new() -> Self {
        Self {
            descriptor: HelperDescriptor::builder(CONTROLLERS_BUILDER)
                .depends_on([BASE_CONTROLLER_BUILDER, POLICY_BUILDER])
                .origin(ORIGIN),
        }
    }
}

impl Helper<BuilderInput, BuilderOutput> for ControllersBuilder {
    fn descriptor(&self) -> &HelperDescriptor {
        &self.descriptor
    }

    fn apply(
        &self,
        ctx: &mut GenerationContext,
        ir: &BuilderInput,
        output: &mut BuilderOutput,
    ) -> Result<()> {
        let reporter = ctx.reporter().child("php");
        for controller in compose_controllers(ir)? {
            let file = ControllerPhp::new(&controller, &ir.php.output_dir);
            reporter.info(
                &format!("Generated {}", controller.class_name),
                Some(&json!({
                    "resource": controller.metadata.name,
                    "routes": controller.metadata.routes.len(),
                    "path": file.path(),
                })),
            );
            output.queue_generated(&file);
        }
        Ok(())
    }
}

builder!(IndexBuilder);

impl IndexBuilder {
    pub fn new() -> Self {
        Self {
            descriptor: HelperDescriptor::builder(INDEX_BUILDER)
                .depends_on([CONTROLLERS_BUILDER])
                .origin(ORIGIN),
        }
    }
}

impl Helper<BuilderInput, BuilderOutput> for IndexBuilder {
    fn descriptor(&self) -> &HelperDescriptor {
        &self.descriptor
    }

    fn apply(
        &self,
        _ctx: &mut GenerationContext,
        ir: &BuilderInput,
        output: &mut BuilderOutput,
    ) -> Result<()> {
        let rest = rest_namespace(ir);
        let mut entries = vec![
            (
                format!("{rest}\\BaseController"),
                BASE_CONTROLLER_PATH.to_string(),
            ),
            (
                format!("{}\\Policy", policy_namespace(ir)),
                POLICY_PATH.to_string(),
            ),
        ];
        for resource in &ir.resources {
            let class_name = controller_class_name(resource);
            entries.push((
                format!("{rest}\\{class_name}"),
                controller_relative_path(&class_name),
            ));
        }

        output.queue_generated(&IndexPhp::new(entries, ir.php.output_dir.as_str())?);
        Ok(())
    }
}

builder!(PluginLoaderBuilder);

impl PluginLoaderBuilder {
    pub fn new() -> Self {
        Self {
            descriptor: HelperDescriptor::builder(PLUGIN_LOADER_BUILDER)
                .depends_on([INDEX_BUILDER])
                .origin(ORIGIN),
        }
    }
}

impl Helper<BuilderInput, BuilderOutput> for PluginLoaderBuilder {
    fn descriptor(&self) -> &HelperDescriptor {
        &self.descriptor
    }

    fn apply(
        &self,
        _ctx: &mut GenerationContext,
        ir: &BuilderInput,
        output: &mut BuilderOutput,
    ) -> Result<()> {
        let controllers: Vec<String> = ir
            .resources
            .iter()
            .map(|resource| format!("Rest\\{}", controller_class_name(resource)))
            .collect();
        let file = PluginLoaderPhp::new(&ir.php.namespace, &controllers, ir.php.output_dir.as_str())?;
        output.queue_generated(&file);
        Ok(())
    }
}

builder!(ManifestBuilder);

impl ManifestBuilder {
    pub fn new() -> Self {
        Self {
            descriptor: HelperDescriptor::builder(MANIFEST_BUILDER)
                .depends_on([CONTROLLERS_BUILDER, PLUGIN_LOADER_BUILDER])
                .priority(-100)
                .origin(ORIGIN)
                .terminal(),
        }
    }
}

impl Helper<BuilderInput, BuilderOutput> for ManifestBuilder {
    fn descriptor(&self) -> &HelperDescriptor {
        &self.descriptor
    }

    fn apply(
        &self,
        ctx: &mut GenerationContext,
        ir: &BuilderInput,
        output: &mut BuilderOutput,
    ) -> Result<()> {
        let controllers: Vec<_> = compose_controllers(ir)?
            .into_iter()
            .map(|controller| controller.metadata)
            .collect();
        let capabilities = CapabilityHelperMetadata::from_map(&ir.capability_map);

        let mut files: Vec<String> = output
            .files()
            .iter()
            .map(|file| {
                let path = file.path();
                path.strip_prefix(&ir.php.output_dir)
                    .unwrap_or(path)
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect();
        files.sort();

        let manifest = Manifest::new(ir, &controllers, &capabilities, &files)
            .wrap_err("failed to serialise the generation manifest")?;
        ctx.reporter().child("php").debug(
            "Queued manifest",
            Some(&json!({ "irHash": ir.content_hash(), "files": files.len() })),
        );
        output.queue_generated(&manifest);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use wpkernel_codegen::pipeline::RunOptions;
    use wpkernel_core::MemoryReporter;

    use super::*;
    use crate::files::read_manifest_hash;
    use crate::test_support::{JOBS, loaded};

    #[test]
    fn test_php_pipeline_runs_without_diagnostics() {
        let loaded = loaded(JOBS);
        let mut ctx = GenerationContext::new(Box::new(MemoryReporter::new()));

        let result = php_pipeline()
            .run(&mut ctx, &loaded, &RunOptions::default())
            .unwrap();

        assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
        let builders: Vec<_> = result
            .steps
            .iter()
            .filter(|step| PHP_BUILDERS.contains(&step.key.as_str()))
            .map(|step| step.key.as_str())
            .collect();
        assert_eq!(builders.len(), PHP_BUILDERS.len());
        assert_eq!(builders.last(), Some(&MANIFEST_BUILDER));
        // 4 controllers, base controller, policy, index, plugin, manifest
        assert_eq!(result.files.len(), 9);
    }

    #[test]
    fn test_manifest_lists_files_and_hash() {
        let loaded = loaded(JOBS);
        let mut ctx = GenerationContext::new(Box::new(MemoryReporter::new()));
        let result = php_pipeline()
            .run(&mut ctx, &loaded, &RunOptions::default())
            .unwrap();

        let manifest = result
            .files
            .iter()
            .find(|file| file.path().ends_with("wpk-manifest.json"))
            .unwrap();
        assert_eq!(
            read_manifest_hash(manifest.content()).as_deref(),
            Some(result.ir.content_hash())
        );

        let value: serde_json::Value = serde_json::from_str(manifest.content()).unwrap();
        let files: Vec<_> = value["files"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|file| file.as_str())
            .collect();
        assert!(files.contains(&"Rest/JobController.php"));
        assert!(files.contains(&"plugin.php"));
        assert!(!files.contains(&"wpk-manifest.json"));
    }

    #[test]
    fn test_index_maps_every_class() {
        let loaded = loaded(JOBS);
        let mut ctx = GenerationContext::new(Box::new(MemoryReporter::new()));
        let result = php_pipeline()
            .run(&mut ctx, &loaded, &RunOptions::default())
            .unwrap();

        let index = result
            .files
            .iter()
            .find(|file| file.path().ends_with("index.php"))
            .unwrap();
        let namespace = result.ir.php.namespace.replace('\\', "\\\\");
        assert!(index.content().contains(&format!(
            "'{namespace}\\\\Rest\\\\DraftController' => __DIR__ . '/Rest/DraftController.php',"
        )));
        assert!(index.content().contains(&format!(
            "'{namespace}\\\\Policy\\\\Policy' => __DIR__ . '/Policy/Policy.php',"
        )));
    }
}
