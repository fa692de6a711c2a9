//! Statement macros shared by the route composers.
//!
//! Each macro expands to a short run of statements, usually preceded by
//! `// @wp-kernel` metadata markers so the generated controller can be
//! audited for what it does without parsing the PHP.

mod cache;
mod capability;
mod identity;
mod query;
mod status;
mod sync;

pub use cache::{CachePriming, cache_priming};
pub use capability::capability_guard;
pub use identity::{identity_guard, read_identity};
pub use query::{execute_query, meta_query_clauses, pagination, query_args, taxonomy_query_clauses};
pub use status::{DEFAULT_POST_STATUSES, StatusTarget, normalise_status_method, status_validation};
pub use sync::{sync_meta, sync_meta_method, sync_taxonomies, sync_taxonomies_method};

use wpkernel_core::to_snake_case;

use crate::ast::build::{self, Result};
use crate::ast::{BinaryOp, Expr, Stmt};

pub const MARKER_PREFIX: &str = "// @wp-kernel";

/// `// @wp-kernel {key} {value}`
pub fn marker(key: &str, value: &str) -> Stmt {
    build::comment(format!("{MARKER_PREFIX} {key} {value}"))
}

/// Count the marker statements in `stmts`, including nested blocks.
pub fn count_markers(stmts: &[Stmt]) -> usize {
    stmts
        .iter()
        .map(|stmt| match stmt {
            Stmt::If {
                stmts, else_stmts, ..
            } => count_markers(stmts) + else_stmts.as_deref().map_or(0, count_markers),
            Stmt::Foreach { stmts, .. } | Stmt::Function { stmts, .. } => count_markers(stmts),
            other => usize::from(other.is_marker()),
        })
        .sum()
}

/// `wpk_{resource}_{suffix}`
pub fn error_code(resource: &str, suffix: &str) -> String {
    format!("wpk_{}_{}", to_snake_case(resource), suffix)
}

/// `new WP_Error( 'code', 'message', array( 'status' => status ) )`
pub fn wp_error(code: &str, message: &str, status: i64) -> Result<Expr> {
    build::new(
        "WP_Error",
        vec![
            build::string(code),
            build::string(message),
            build::array(vec![build::keyed("status", build::int(status))]),
        ],
    )
}

pub fn return_wp_error(code: &str, message: &str, status: i64) -> Result<Stmt> {
    Ok(build::ret(wp_error(code, message, status)?))
}

/// `$request->get_param( 'name' )`
pub fn request_param(name: &str) -> Result<Expr> {
    build::method_call(build::variable("request")?, "get_param", vec![build::string(name)])
}

/// `$request`
pub fn request() -> Result<Expr> {
    build::variable("request")
}

/// `if ( is_wp_error( $var ) ) { return $var; }`
pub fn return_if_wp_error(var: &str) -> Result<Stmt> {
    let value = build::variable(var)?;
    Ok(build::if_(
        build::func_call("is_wp_error", vec![value.clone()])?,
        vec![build::ret(value)],
    ))
}

/// `if ( ! $var instanceof WP_Post ) { ... }`
pub fn unless_post(var: Expr, stmts: Vec<Stmt>) -> Result<Stmt> {
    Ok(build::if_(
        build::not(build::instance_of(var, "WP_Post")?),
        stmts,
    ))
}

/// `null !== expr`
pub fn not_null(expr: Expr) -> Expr {
    build::binary(BinaryOp::NotIdentical, build::null(), expr)
}
