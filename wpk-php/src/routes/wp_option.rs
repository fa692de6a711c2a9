use super::{RouteContext, StorageAccess};
use crate::ast::build::{self, Result};
use crate::ast::{ClassMethod, Stmt};
use crate::macros::request_param;
use crate::metadata::{CacheOperation, ResourceControllerMetadata};

/// Handler body for a route over a single `wp_options` entry.
pub fn wp_option_route_statements(
    ctx: &RouteContext<'_>,
    host: &mut ResourceControllerMetadata,
) -> Result<Option<Vec<Stmt>>> {
    let option = build::variable("option")?;
    let value = build::variable("value")?;
    let current = build::func_call("get_option", vec![option.clone()])?;

    let mut stmts = vec![build::assign_stmt(
        "option",
        build::this_call(&format!("get{}OptionName", ctx.pascal), vec![])?,
    )?];

    let operation = match StorageAccess::of(ctx.route.method) {
        StorageAccess::Read => {
            stmts.push(Stmt::blank());
            stmts.push(build::ret(build::array(vec![
                build::keyed("option", option),
                build::keyed("value", current),
            ])));
            CacheOperation::Read
        }
        StorageAccess::Write => {
            stmts.push(build::assign_stmt("value", request_param("value")?)?);
            stmts.push(Stmt::blank());
            stmts.push(build::expr_stmt(build::func_call(
                "update_option",
                vec![option.clone(), value],
            )?));
            stmts.push(Stmt::blank());
            stmts.push(build::ret(build::array(vec![
                build::keyed("option", option),
                build::keyed("value", current),
            ])));
            CacheOperation::Prime
        }
        StorageAccess::Delete => {
            stmts.push(build::assign_stmt(
                "deleted",
                build::func_call("delete_option", vec![option.clone()])?,
            )?);
            stmts.push(Stmt::blank());
            stmts.push(build::ret(build::array(vec![
                build::keyed("deleted", build::variable("deleted")?),
                build::keyed("option", option),
            ])));
            CacheOperation::Invalidate
        }
    };

    let segments = host.segments_for(ctx.kind);
    host.record_cache_event(ctx.kind, operation, segments, None);
    Ok(Some(stmts))
}

pub fn wp_option_helper_methods(pascal: &str, option: &str) -> Result<Vec<ClassMethod>> {
    Ok(vec![
        build::method(&format!("get{pascal}OptionName"))?
            .private()
            .returns("string")
            .body(vec![build::ret(build::string(option))]),
    ])
}
