use std::path::PathBuf;

use wpkernel_core::GeneratedFile;

use super::{POLICY_PATH, output_path};
use crate::ast::build::{self, Result};
use crate::ast::{BinaryOp, Class, Expr, PhpFile, Stmt, Visibility};
use crate::controller::GENERATED_HEADER;
use crate::macros::not_null;
use crate::metadata::{CapabilityDefinitionMetadata, CapabilityHelperMetadata};
use crate::printer::Printer;

/// `Policy/Policy.php`: capability checks behind `Policy::enforce()`.
pub struct PolicyPhp {
    file: PhpFile,
    output_dir: String,
}

fn definition(capability: &str, applies_to: &str, binding: Option<&str>) -> Expr {
    build::array(vec![
        build::keyed("capability", build::string(capability)),
        build::keyed("appliesTo", build::string(applies_to)),
        build::keyed("binding", binding.map_or_else(build::null, build::string)),
    ])
}

fn capabilities(definitions: &[CapabilityDefinitionMetadata]) -> Expr {
    build::array(
        definitions
            .iter()
            .map(|entry| {
                build::keyed(
                    entry.key.as_str(),
                    definition(
                        &entry.capability,
                        entry.applies_to.as_str(),
                        entry.binding.as_deref(),
                    ),
                )
            })
            .collect(),
    )
}

fn enforce_method() -> Result<crate::ast::ClassMethod> {
    let definition = build::variable("definition")?;
    let capability = build::variable("capability")?;
    let binding = build::variable("binding")?;
    let allowed = build::variable("allowed")?;
    let field = |key: &str| build::dim(definition.clone(), build::string(key));

    Ok(build::method("enforce")?
        .static_()
        .doc(build::doc([
            "Check the capability mapped to `$key` for the current user.",
            "",
            "@param string          $key     Capability key.",
            "@param WP_REST_Request $request Request being authorised.",
            "@return true|WP_Error",
        ]))
        .param(build::typed_param("string", "key")?)
        .param(build::typed_param("WP_REST_Request", "request")?)
        .body(vec![
            build::assign_stmt(
                "definition",
                build::binary(
                    BinaryOp::Coalesce,
                    build::dim(
                        build::class_const("self", "CAPABILITIES")?,
                        build::variable("key")?,
                    ),
                    build::class_const("self", "FALLBACK")?,
                ),
            )?,
            build::assign_stmt("capability", field("capability"))?,
            build::assign_stmt(
                "binding",
                build::binary(BinaryOp::Coalesce, field("binding"), build::null()),
            )?,
            Stmt::blank(),
            build::if_else(
                build::binary(
                    BinaryOp::BooleanAnd,
                    build::binary(
                        BinaryOp::Identical,
                        build::string("object"),
                        field("appliesTo"),
                    ),
                    not_null(binding.clone()),
                ),
                vec![build::assign_stmt(
                    "allowed",
                    build::func_call(
                        "current_user_can",
                        vec![
                            capability.clone(),
                            build::method_call(
                                build::variable("request")?,
                                "get_param",
                                vec![binding],
                            )?,
                        ],
                    )?,
                )?],
                vec![build::assign_stmt(
                    "allowed",
                    build::func_call("current_user_can", vec![capability])?,
                )?],
            ),
            Stmt::blank(),
            build::if_(allowed, vec![build::ret(build::bool(true))]),
            Stmt::blank(),
            build::ret(build::new(
                "WP_Error",
                vec![
                    build::string("wpk_forbidden"),
                    build::string("You are not allowed to perform this action."),
                    build::array(vec![
                        build::keyed(
                            "status",
                            build::func_call("rest_authorization_required_code", vec![])?,
                        ),
                        build::keyed("capability", build::variable("key")?),
                    ]),
                ],
            )?),
        ]))
}

fn policy_class(metadata: &CapabilityHelperMetadata) -> Result<Class> {
    let mut capabilities_const = build::constant_decl("CAPABILITIES", capabilities(&metadata.definitions))?;
    capabilities_const.visibility = Visibility::Private;
    let mut fallback_const = build::constant_decl(
        "FALLBACK",
        definition(
            &metadata.fallback.capability,
            metadata.fallback.applies_to.as_str(),
            None,
        ),
    )?;
    fallback_const.visibility = Visibility::Private;

    Ok(build::class("Policy")?
        .final_()
        .doc(build::doc(["Capability checks for the generated REST controllers."]))
        .constant(capabilities_const)
        .constant(fallback_const)
        .method(enforce_method()?))
}

impl PolicyPhp {
    pub fn new(
        namespace: &str,
        metadata: &CapabilityHelperMetadata,
        output_dir: impl Into<String>,
    ) -> Result<Self> {
        let file = PhpFile::new()
            .doc(build::doc([GENERATED_HEADER]))
            .strict_types()
            .namespace(build::name(namespace)?)
            .uses(build::name("WP_Error")?)
            .uses(build::name("WP_REST_Request")?)
            .stmt(Stmt::Class(policy_class(metadata)?));
        Ok(Self {
            file,
            output_dir: output_dir.into(),
        })
    }
}

impl GeneratedFile for PolicyPhp {
    fn path(&self) -> PathBuf {
        output_path(&self.output_dir, POLICY_PATH)
    }

    fn render(&self) -> String {
        Printer::new().print_file(&self.file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::jobs_ir;

    #[test]
    fn test_policy_maps_capabilities() {
        let ir = jobs_ir();
        let metadata = CapabilityHelperMetadata::from_map(&ir.capability_map);
        let policy = PolicyPhp::new("Acme\\Jobs\\Policy", &metadata, ".generated/php").unwrap();
        let rendered = policy.render();

        assert_eq!(policy.path(), PathBuf::from(".generated/php/Policy/Policy.php"));
        assert!(rendered.contains("final class Policy {"));
        assert!(rendered.contains("\tprivate const CAPABILITIES = array(\n"));
        assert!(rendered.contains("\t\t'job.create' => array(\n\t\t\t'capability' => 'edit_posts',\n"));
        assert!(rendered.contains("\t\t\t'binding' => 'id',\n"));
        assert!(rendered.contains("$definition = self::CAPABILITIES[ $key ] ?? self::FALLBACK;"));
        assert!(rendered.contains("public static function enforce( string $key, WP_REST_Request $request ) {"));
        assert!(rendered.contains("'capability' => 'manage_options',"));
    }
}
