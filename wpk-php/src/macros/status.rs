use super::{error_code, marker, not_null, request_param, return_wp_error};
use crate::ast::build::{self, Result};
use crate::ast::{BinaryOp, ClassMethod, Expr, Stmt};
use crate::metadata::MutationMetadataKeys;

/// Statuses accepted when a post type declares none.
pub const DEFAULT_POST_STATUSES: &[&str] = &["draft", "pending", "private", "publish", "future"];

/// How the normalised status reaches the post data array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTarget {
    /// Always assign; creates fall back to the default status.
    Always,
    /// Assign only when the request carries a status.
    WhenPresent,
}

/// Read, validate and normalise the `status` request param into
/// `$post_data['post_status']`.
pub fn status_validation(
    keys: &MutationMetadataKeys,
    pascal: &str,
    resource: &str,
    statuses: &[String],
    target: StatusTarget,
) -> Result<Vec<Stmt>> {
    let status = build::variable("status")?;
    let mut stmts = vec![
        marker(keys.channel_tag, "status-validation"),
        marker(keys.status_validation, "normalise"),
        build::assign_stmt("status", request_param("status")?)?,
    ];

    if !statuses.is_empty() {
        let outside = build::not(build::func_call(
            "in_array",
            vec![
                status.clone(),
                build::string_list(statuses.iter().map(String::as_str)),
                build::bool(true),
            ],
        )?);
        stmts.push(build::if_(
            build::binary(BinaryOp::BooleanAnd, not_null(status.clone()), outside),
            vec![return_wp_error(
                &error_code(resource, "invalid_status"),
                &format!("Invalid status for {pascal}."),
                400,
            )?],
        ));
    }

    let assign = build::expr_stmt(build::assign(
        build::dim(build::variable("post_data")?, build::string("post_status")),
        build::this_call(&format!("normalise{pascal}Status"), vec![status.clone()])?,
    )?);
    stmts.push(match target {
        StatusTarget::Always => assign,
        StatusTarget::WhenPresent => build::if_(not_null(status), vec![assign]),
    });
    Ok(stmts)
}

/// `normalise{P}Status( $status )`: the sanitised status when allowed,
/// otherwise the first allowed status.
pub fn normalise_status_method(pascal: &str, statuses: &[String]) -> Result<ClassMethod> {
    let allowed: Vec<&str> = if statuses.is_empty() {
        DEFAULT_POST_STATUSES.to_vec()
    } else {
        statuses.iter().map(String::as_str).collect()
    };
    let fallback = allowed.first().copied().unwrap_or("draft");

    let status = build::variable("status")?;
    let allowed_var = build::variable("allowed")?;
    let sanitised: Expr = build::ternary(
        build::func_call("is_string", vec![status.clone()])?,
        build::func_call("sanitize_key", vec![status.clone()])?,
        build::string(""),
    );

    Ok(build::method(&format!("normalise{pascal}Status"))?
        .private()
        .param(build::param("status")?)
        .returns("string")
        .body(vec![
            build::assign_stmt("allowed", build::string_list(allowed.iter().copied()))?,
            build::assign_stmt("status", sanitised)?,
            Stmt::blank(),
            build::if_(
                build::func_call(
                    "in_array",
                    vec![status.clone(), allowed_var, build::bool(true)],
                )?,
                vec![build::ret(status)],
            ),
            Stmt::blank(),
            build::ret(build::string(fallback)),
        ]))
}
