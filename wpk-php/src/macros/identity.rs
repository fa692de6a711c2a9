use wpkernel_ir::IrIdentity;

use super::{error_code, request_param, return_wp_error};
use crate::ast::build::{self, Result};
use crate::ast::{BinaryOp, CastKind, Stmt};

/// `${param} = $request->get_param( '{param}' );`
pub fn read_identity(identity: &IrIdentity) -> Result<Stmt> {
    let param = identity.param();
    build::assign_stmt(param, request_param(param)?)
}

/// Validate the identity variable read by [`read_identity`].
///
/// Numeric identities must be present and positive after an `(int)` cast;
/// string identities must be non-blank and are trimmed.
pub fn identity_guard(identity: &IrIdentity, pascal: &str, resource: &str) -> Result<Vec<Stmt>> {
    let param = identity.param();
    let var = build::variable(param)?;
    let missing = return_wp_error(
        &error_code(resource, "missing_identifier"),
        &format!("Missing identifier for {pascal}."),
        400,
    )?;

    if identity.is_numeric() {
        let invalid = return_wp_error(
            &error_code(resource, "invalid_identifier"),
            &format!("Invalid identifier for {pascal}."),
            400,
        )?;
        return Ok(vec![
            build::if_(
                build::binary(BinaryOp::Identical, build::null(), var.clone()),
                vec![missing],
            ),
            build::assign_stmt(param, build::cast(CastKind::Int, var.clone()))?,
            build::if_(
                build::binary(BinaryOp::SmallerOrEqual, var, build::int(0)),
                vec![invalid],
            ),
        ]);
    }

    let blank = build::binary(
        BinaryOp::Identical,
        build::string(""),
        build::func_call("trim", vec![var.clone()])?,
    );
    Ok(vec![
        build::if_(
            build::binary(
                BinaryOp::BooleanOr,
                build::not(build::func_call("is_string", vec![var.clone()])?),
                blank,
            ),
            vec![missing],
        ),
        build::assign_stmt(
            param,
            build::func_call("trim", vec![build::cast(CastKind::String, var)])?,
        )?,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::printer::Printer;

    #[test]
    fn test_numeric_identity_guard() {
        let identity = IrIdentity::Number { param: "id".into() };
        let stmts = identity_guard(&identity, "Job", "job").unwrap();
        let printed = Printer::new().print_stmts(&stmts);

        assert_eq!(
            printed,
            "if ( null === $id ) {\n\treturn new WP_Error( 'wpk_job_missing_identifier', 'Missing identifier for Job.', array( 'status' => 400 ) );\n}\n$id = (int) $id;\nif ( $id <= 0 ) {\n\treturn new WP_Error( 'wpk_job_invalid_identifier', 'Invalid identifier for Job.', array( 'status' => 400 ) );\n}\n"
        );
    }

    #[test]
    fn test_string_identity_guard() {
        let identity = IrIdentity::String {
            param: "slug".into(),
        };
        let stmts = identity_guard(&identity, "Draft", "draft").unwrap();
        let printed = Printer::new().print_stmts(&stmts);

        assert!(printed.starts_with("if ( ! is_string( $slug ) || '' === trim( $slug ) ) {\n"));
        assert!(printed.ends_with("$slug = trim( (string) $slug );\n"));
        assert_eq!(
            Printer::new().print_stmt(&read_identity(&identity).unwrap()),
            "$slug = $request->get_param( 'slug' );\n"
        );
    }
}
