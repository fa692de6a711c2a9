use wpkernel_ir::IrIdentity;

use super::{RouteContext, StorageAccess};
use crate::ast::build::{self, Result};
use crate::ast::{BinaryOp, CastKind, ClassMethod, Expr, Stmt};
use crate::macros::{error_code, identity_guard, read_identity, request_param, return_wp_error};
use crate::metadata::{CacheOperation, ResourceControllerMetadata};

fn key_call(pascal: &str, identity: Option<&IrIdentity>) -> Result<Expr> {
    let args = match identity {
        Some(identity) => vec![build::variable(identity.param())?],
        None => Vec::new(),
    };
    build::this_call(&format!("get{pascal}TransientKey"), args)
}

/// The identity pair echoed back in responses, when the resource has one.
fn identity_item(identity: Option<&IrIdentity>) -> Result<Vec<crate::ast::ArrayItem>> {
    match identity {
        Some(identity) => Ok(vec![build::keyed(
            identity.param(),
            build::variable(identity.param())?,
        )]),
        None => Ok(Vec::new()),
    }
}

/// Handler body for a transient-backed route, or `None` when the route
/// cannot address a single transient.
pub fn transient_route_statements(
    ctx: &RouteContext<'_>,
    host: &mut ResourceControllerMetadata,
) -> Result<Option<Vec<Stmt>>> {
    let RouteContext {
        resource,
        pascal,
        route,
        kind,
    } = *ctx;
    let identity = resource.identity.as_ref();
    if identity.is_some_and(|identity| !route.uses_param(identity.param())) {
        return Ok(None);
    }

    let mut stmts = Vec::new();
    if let Some(identity) = identity {
        stmts.push(read_identity(identity)?);
        stmts.extend(identity_guard(identity, pascal, &resource.name)?);
        stmts.push(Stmt::blank());
    }

    let key = key_call(pascal, identity)?;
    let value = build::variable("value")?;
    let operation = match StorageAccess::of(route.method) {
        StorageAccess::Read => {
            stmts.push(build::assign_stmt(
                "value",
                build::func_call("get_transient", vec![key])?,
            )?);
            stmts.push(build::if_(
                build::binary(BinaryOp::Identical, build::bool(false), value.clone()),
                vec![return_wp_error(
                    &error_code(&resource.name, "not_found"),
                    &format!("{pascal} not found."),
                    404,
                )?],
            ));
            stmts.push(Stmt::blank());

            let mut items = identity_item(identity)?;
            items.push(build::keyed("value", value));
            stmts.push(build::ret(build::array(items)));
            CacheOperation::Read
        }
        StorageAccess::Write => {
            stmts.push(build::assign_stmt("value", request_param("value")?)?);
            stmts.push(build::assign_stmt(
                "expiration",
                build::func_call(
                    "max",
                    vec![
                        build::int(0),
                        build::cast(CastKind::Int, request_param("expiration")?),
                    ],
                )?,
            )?);
            stmts.push(build::assign_stmt(
                "stored",
                build::func_call(
                    "set_transient",
                    vec![key, value.clone(), build::variable("expiration")?],
                )?,
            )?);
            stmts.push(build::if_(
                build::binary(
                    BinaryOp::Identical,
                    build::bool(false),
                    build::variable("stored")?,
                ),
                vec![return_wp_error(
                    &error_code(&resource.name, "store_failed"),
                    &format!("Unable to store {pascal}."),
                    500,
                )?],
            ));
            stmts.push(Stmt::blank());

            let mut items = identity_item(identity)?;
            items.push(build::keyed("value", value));
            stmts.push(build::ret(build::array(items)));
            CacheOperation::Prime
        }
        StorageAccess::Delete => {
            stmts.push(build::assign_stmt(
                "deleted",
                build::func_call("delete_transient", vec![key])?,
            )?);
            stmts.push(Stmt::blank());

            let mut items = vec![build::keyed("deleted", build::variable("deleted")?)];
            items.extend(identity_item(identity)?);
            stmts.push(build::ret(build::array(items)));
            CacheOperation::Invalidate
        }
    };

    let segments = host.segments_for(kind);
    host.record_cache_event(kind, operation, segments, None);
    Ok(Some(stmts))
}

/// `get{P}TransientKey( $param )`: the prefixed transient name.
pub fn transient_helper_methods(
    pascal: &str,
    identity: Option<&IrIdentity>,
    key_prefix: &str,
) -> Result<Vec<ClassMethod>> {
    let mut method = build::method(&format!("get{pascal}TransientKey"))?
        .private()
        .returns("string");

    let key = match identity {
        Some(identity) => {
            let param = identity.param();
            let ty = if identity.is_numeric() { "int" } else { "string" };
            method = method.param(build::typed_param(ty, param)?);
            build::binary(
                BinaryOp::Concat,
                build::string(format!("{key_prefix}_")),
                build::cast(CastKind::String, build::variable(param)?),
            )
        }
        None => build::string(key_prefix),
    };

    Ok(vec![method.body(vec![build::ret(key)])])
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::printer::Printer;
    use crate::routes::{RouteKind, classify_routes};
    use crate::test_support::{jobs_ir, resource};

    #[test]
    fn test_transient_handlers() {
        let ir = jobs_ir();
        let draft = resource(&ir, "draft");
        let kinds = classify_routes(&draft.routes, Some("slug"));
        let mut host = ResourceControllerMetadata::for_resource(&draft);
        let printer = Printer::new();

        let printed: BTreeMap<RouteKind, String> = draft
            .routes
            .iter()
            .zip(kinds)
            .map(|(route, kind)| {
                let ctx = RouteContext {
                    resource: &draft,
                    pascal: "Draft",
                    route,
                    kind,
                };
                let stmts = transient_route_statements(&ctx, &mut host).unwrap().unwrap();
                (kind, printer.print_stmts(&stmts))
            })
            .collect();

        assert_eq!(printed.len(), 3);
        assert!(printed[&RouteKind::Get].contains("$value = get_transient( $this->getDraftTransientKey( $slug ) );"));
        assert!(printed[&RouteKind::Update].contains("set_transient( $this->getDraftTransientKey( $slug ), $value, $expiration );"));
        assert!(printed[&RouteKind::Remove].contains("$deleted = delete_transient( $this->getDraftTransientKey( $slug ) );"));
        assert!(printed.values().all(|body| body.contains("trim( (string) $slug )")));
        assert_eq!(host.cache.events.len(), 3);
    }

    #[test]
    fn test_transient_key_helper() {
        let identity = IrIdentity::String {
            param: "slug".into(),
        };
        let methods = transient_helper_methods("Draft", Some(&identity), "acme_jobs_draft").unwrap();
        let class = build::class("DraftController").unwrap().methods(methods);

        assert!(Printer::new().print_class(&class).contains(
            "private function getDraftTransientKey( string $slug ): string {\n\t\treturn 'acme_jobs_draft_' . (string) $slug;\n\t}"
        ));
    }
}
