//! Built-in fragments that assemble the IR.
//!
//! Each fragment fills one slot of the [`IrDraft`] using the piecewise
//! builders of `wpkernel-ir`, and forwards the warnings it produces to the
//! context reporter. `ir.validation.core` is terminal: it checks the
//! assembled draft and nothing depends on it.

use eyre::{Result, bail, eyre};
use serde_json::{Value, json};
use wpkernel_ir::{
    IrDraft, IrWarning, SchemaAccumulator, build_capability_map, build_meta, build_php_project,
    build_resources, build_schemas,
};

use super::{FragmentInput, GenerationContext, Helper, HelperDescriptor, Pipeline};

pub const META_FRAGMENT: &str = "ir.meta.core";
pub const SCHEMAS_FRAGMENT: &str = "ir.schemas.core";
pub const RESOURCES_FRAGMENT: &str = "ir.resources.core";
pub const CAPABILITY_MAP_FRAGMENT: &str = "ir.capability-map.core";
pub const PHP_PROJECT_FRAGMENT: &str = "ir.php.core";
pub const VALIDATION_FRAGMENT: &str = "ir.validation.core";

/// Keys of every fragment needed for a complete IR.
pub const CORE_FRAGMENTS: [&str; 6] = [
    META_FRAGMENT,
    SCHEMAS_FRAGMENT,
    RESOURCES_FRAGMENT,
    CAPABILITY_MAP_FRAGMENT,
    PHP_PROJECT_FRAGMENT,
    VALIDATION_FRAGMENT,
];

const ORIGIN: &str = "wpkernel-codegen";

pub(crate) fn register_core_fragments(pipeline: &mut Pipeline) {
    pipeline
        .use_fragment(MetaFragment::new())
        .use_fragment(SchemasFragment::new())
        .use_fragment(ResourcesFragment::new())
        .use_fragment(CapabilityMapFragment::new())
        .use_fragment(PhpProjectFragment::new())
        .use_fragment(ValidationFragment::new());
}

fn report_warnings(ctx: &GenerationContext, scope: &str, warnings: &[IrWarning]) {
    let reporter = ctx.reporter().child(scope);
    for warning in warnings {
        let context = json!({
            "code": warning.code,
            "context": warning.context.clone().unwrap_or(Value::Null),
        });
        reporter.warn(&warning.message, Some(&context));
    }
}

macro_rules! fragment {
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

fragment!(MetaFragment);

impl MetaFragment {
    pub fn new() -> Self {
        Self {
            descriptor: HelperDescriptor::fragment(META_FRAGMENT)
                .priority(100)
                .origin(ORIGIN),
        }
    }
}

impl Helper<FragmentInput, IrDraft> for MetaFragment {
    fn descriptor(&self) -> &HelperDescriptor {
        &self.descriptor
    }

    fn apply(
        &self,
        ctx: &mut GenerationContext,
        input: &FragmentInput,
        draft: &mut IrDraft,
    ) -> Result<()> {
        let reporter = ctx.reporter().child("config");
        for warning in &input.warnings {
            reporter.warn(
                &warning.message,
                Some(&json!({ "code": warning.code, "resource": warning.resource })),
            );
        }
        draft.meta = Some(build_meta(input)?);
        Ok(())
    }
}

fragment!(SchemasFragment);

impl SchemasFragment {
    pub fn new() -> Self {
        Self {
            descriptor: HelperDescriptor::fragment(SCHEMAS_FRAGMENT)
                .depends_on([META_FRAGMENT])
                .origin(ORIGIN),
        }
    }
}

impl Helper<FragmentInput, IrDraft> for SchemasFragment {
    fn descriptor(&self) -> &HelperDescriptor {
        &self.descriptor
    }

    fn apply(
        &self,
        _ctx: &mut GenerationContext,
        input: &FragmentInput,
        draft: &mut IrDraft,
    ) -> Result<()> {
        draft.schemas = Some(build_schemas(input)?.into_schemas());
        Ok(())
    }
}

fragment!(ResourcesFragment);

impl ResourcesFragment {
    pub fn new() -> Self {
        Self {
            descriptor: HelperDescriptor::fragment(RESOURCES_FRAGMENT)
                .depends_on([META_FRAGMENT, SCHEMAS_FRAGMENT])
                .origin(ORIGIN),
        }
    }
}

impl Helper<FragmentInput, IrDraft> for ResourcesFragment {
    fn descriptor(&self) -> &HelperDescriptor {
        &self.descriptor
    }

    fn apply(
        &self,
        ctx: &mut GenerationContext,
        input: &FragmentInput,
        draft: &mut IrDraft,
    ) -> Result<()> {
        let meta = draft
            .meta
            .as_ref()
            .ok_or_else(|| eyre!("IR meta must be built before resources"))?;
        let mut schemas = SchemaAccumulator::from(draft.schemas.take().unwrap_or_default());

        let resources = build_resources(input, meta, &mut schemas)?;
        for resource in &resources {
            ctx.register_resource(resource.name.clone());
            report_warnings(ctx, &format!("resource.{}", resource.name), &resource.warnings);
        }

        draft.schemas = Some(schemas.into_schemas());
        draft.resources = Some(resources);
        Ok(())
    }
}

fragment!(CapabilityMapFragment);

impl CapabilityMapFragment {
    pub fn new() -> Self {
        Self {
            descriptor: HelperDescriptor::fragment(CAPABILITY_MAP_FRAGMENT)
                .depends_on([RESOURCES_FRAGMENT])
                .origin(ORIGIN),
        }
    }
}

impl Helper<FragmentInput, IrDraft> for CapabilityMapFragment {
    fn descriptor(&self) -> &HelperDescriptor {
        &self.descriptor
    }

    fn apply(
        &self,
        ctx: &mut GenerationContext,
        input: &FragmentInput,
        draft: &mut IrDraft,
    ) -> Result<()> {
        let resources = draft
            .resources
            .as_deref()
            .ok_or_else(|| eyre!("IR resources must be built before the capability map"))?;
        let map = build_capability_map(input, resources)?;
        report_warnings(ctx, "capability-map", &map.warnings);
        draft.capability_map = Some(map);
        Ok(())
    }
}

fragment!(PhpProjectFragment);

impl PhpProjectFragment {
    pub fn new() -> Self {
        Self {
            descriptor: HelperDescriptor::fragment(PHP_PROJECT_FRAGMENT)
                .depends_on([META_FRAGMENT])
                .origin(ORIGIN),
        }
    }
}

impl Helper<FragmentInput, IrDraft> for PhpProjectFragment {
    fn descriptor(&self) -> &HelperDescriptor {
        &self.descriptor
    }

    fn apply(
        &self,
        _ctx: &mut GenerationContext,
        _input: &FragmentInput,
        draft: &mut IrDraft,
    ) -> Result<()> {
        let meta = draft
            .meta
            .as_ref()
            .ok_or_else(|| eyre!("IR meta must be built before the PHP project"))?;
        draft.php = Some(build_php_project(meta));
        Ok(())
    }
}

fragment!(ValidationFragment);

impl ValidationFragment {
    pub fn new() -> Self {
        Self {
            descriptor: HelperDescriptor::fragment(VALIDATION_FRAGMENT)
                .depends_on([
                    META_FRAGMENT,
                    SCHEMAS_FRAGMENT,
                    RESOURCES_FRAGMENT,
                    CAPABILITY_MAP_FRAGMENT,
                    PHP_PROJECT_FRAGMENT,
                ])
                .priority(-100)
                .origin(ORIGIN)
                .terminal(),
        }
    }
}

impl Helper<FragmentInput, IrDraft> for ValidationFragment {
    fn descriptor(&self) -> &HelperDescriptor {
        &self.descriptor
    }

    fn apply(
        &self,
        _ctx: &mut GenerationContext,
        _input: &FragmentInput,
        draft: &mut IrDraft,
    ) -> Result<()> {
        let (Some(schemas), Some(resources)) = (&draft.schemas, &draft.resources) else {
            bail!("IR draft is incomplete after the core fragments ran");
        };

        for resource in resources {
            if !schemas.iter().any(|schema| schema.key == resource.schema_key) {
                bail!(
                    "resource \"{}\" references schema \"{}\", which is not part of the IR",
                    resource.name,
                    resource.schema_key
                );
            }
        }
        Ok(())
    }
}
