use crate::{
    Ir, IrCapabilityMap, IrError, IrMeta, IrPhpProject, IrResource, IrSchema, Result,
    canonical::hash_serialize,
};

/// An IR under construction.
///
/// Each builder step fills one slot; [`IrDraft::finalize`] checks that
/// every slot is filled, restores the canonical ordering and computes the
/// content hash.
#[derive(Debug, Clone, Default)]
pub struct IrDraft {
    pub meta: Option<IrMeta>,
    pub schemas: Option<Vec<IrSchema>>,
    pub resources: Option<Vec<IrResource>>,
    pub capability_map: Option<IrCapabilityMap>,
    pub php: Option<IrPhpProject>,
}

impl IrDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn finalize(self) -> Result<Ir> {
        let mut schemas = self.schemas.ok_or_else(|| missing("schemas"))?;
        let mut resources = self.resources.ok_or_else(|| missing("resources"))?;
        schemas.sort_by(|a, b| a.key.cmp(&b.key));
        resources.sort_by(|a, b| {
            a.name
                .cmp(&b.name)
                .then_with(|| a.schema_key.cmp(&b.schema_key))
        });

        let mut ir = Ir {
            meta: self.meta.ok_or_else(|| missing("meta"))?,
            schemas,
            resources,
            capability_map: self.capability_map.ok_or_else(|| missing("capability map"))?,
            php: self.php.ok_or_else(|| missing("php project"))?,
            hash: String::new(),
        };
        ir.hash = hash_serialize(&ir)?;
        Ok(ir)
    }
}

fn missing(part: &str) -> IrError {
    IrError::validation(format!("IR draft is missing its {part}"))
}
