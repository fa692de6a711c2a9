use wpkernel_config::HttpMethod;

use super::{RouteContext, RouteKind};
use crate::ast::build::{self, Result};
use crate::ast::{BinaryOp, CastKind, ClassMethod, Expr, Stmt};
use crate::macros::{
    self, error_code, identity_guard, read_identity, return_if_wp_error, return_wp_error,
};
use crate::metadata::{CacheOperation, ResourceControllerMetadata};

fn taxonomy_call(pascal: &str) -> Result<Expr> {
    build::this_call(&format!("get{pascal}Taxonomy"), vec![])
}

fn prepare_call(pascal: &str, term: Expr) -> Result<Expr> {
    build::this_call(&format!("prepare{pascal}TermResponse"), vec![term])
}

fn list_statements(pascal: &str) -> Result<Vec<Stmt>> {
    let page = build::variable("page")?;
    let per_page = build::variable("per_page")?;
    let term = build::variable("term")?;

    let mut stmts = macros::pagination()?;
    stmts.push(Stmt::blank());
    stmts.push(build::assign_stmt(
        "terms",
        build::func_call(
            "get_terms",
            vec![build::array(vec![
                build::keyed("taxonomy", taxonomy_call(pascal)?),
                build::keyed("hide_empty", build::bool(false)),
                build::keyed("number", per_page.clone()),
                build::keyed(
                    "offset",
                    build::binary(
                        BinaryOp::Mul,
                        build::binary(BinaryOp::Minus, page.clone(), build::int(1)),
                        per_page,
                    ),
                ),
            ])],
        )?,
    )?);
    stmts.push(return_if_wp_error("terms")?);
    stmts.push(Stmt::blank());
    stmts.push(build::assign_stmt("items", build::array(vec![]))?);
    stmts.push(build::foreach(
        build::variable("terms")?,
        None,
        term.clone(),
        vec![build::expr_stmt(build::assign(
            build::append(build::variable("items")?),
            prepare_call(pascal, term)?,
        )?)],
    ));
    stmts.push(Stmt::blank());
    stmts.push(build::ret(build::array(vec![
        build::keyed("items", build::variable("items")?),
        build::keyed(
            "total",
            build::cast(
                CastKind::Int,
                build::func_call(
                    "wp_count_terms",
                    vec![build::array(vec![
                        build::keyed("taxonomy", taxonomy_call(pascal)?),
                        build::keyed("hide_empty", build::bool(false)),
                    ])],
                )?,
            ),
        ),
        build::keyed("page", page),
    ])));
    Ok(stmts)
}

/// Handler body for a taxonomy-backed route: `list` pages through the
/// terms and `get` loads one by id or slug. A static `GET` route outside
/// the canonical collection path also lists.
pub fn wp_taxonomy_route_statements(
    ctx: &RouteContext<'_>,
    host: &mut ResourceControllerMetadata,
) -> Result<Option<Vec<Stmt>>> {
    let RouteContext {
        resource,
        pascal,
        route,
        kind,
    } = *ctx;
    let listing = kind == RouteKind::List
        || (kind == RouteKind::Custom
            && route.method == HttpMethod::Get
            && route.placeholders().is_empty());

    let stmts = match (kind, resource.identity.as_ref()) {
        _ if listing => list_statements(pascal)?,
        (RouteKind::Get, Some(identity)) => {
            let var = build::variable(identity.param())?;
            let lookup = if identity.is_numeric() {
                build::func_call("get_term", vec![var, taxonomy_call(pascal)?])?
            } else {
                build::func_call(
                    "get_term_by",
                    vec![build::string("slug"), var, taxonomy_call(pascal)?],
                )?
            };

            let mut stmts = vec![read_identity(identity)?];
            stmts.extend(identity_guard(identity, pascal, &resource.name)?);
            stmts.push(Stmt::blank());
            stmts.push(build::assign_stmt("term", lookup)?);
            stmts.push(build::if_(
                build::not(build::instance_of(build::variable("term")?, "WP_Term")?),
                vec![return_wp_error(
                    &error_code(&resource.name, "not_found"),
                    &format!("{pascal} not found."),
                    404,
                )?],
            ));
            stmts.push(Stmt::blank());
            stmts.push(build::ret(prepare_call(pascal, build::variable("term")?)?));
            stmts
        }
        _ => return Ok(None),
    };

    let segments = host.segments_for(kind);
    host.record_cache_event(kind, CacheOperation::Read, segments, None);
    Ok(Some(stmts))
}

pub fn wp_taxonomy_helper_methods(pascal: &str, taxonomy: &str) -> Result<Vec<ClassMethod>> {
    let term = build::variable("term")?;
    let field = |name: &str| build::property(term.clone(), name);

    Ok(vec![
        build::method(&format!("get{pascal}Taxonomy"))?
            .private()
            .returns("string")
            .body(vec![build::ret(build::string(taxonomy))]),
        build::method(&format!("prepare{pascal}TermResponse"))?
            .private()
            .param(build::typed_param("WP_Term", "term")?)
            .returns("array")
            .body(vec![build::ret(build::array(vec![
                build::keyed("id", build::cast(CastKind::Int, field("term_id")?)),
                build::keyed("name", field("name")?),
                build::keyed("slug", field("slug")?),
                build::keyed("description", field("description")?),
                build::keyed("parent", build::cast(CastKind::Int, field("parent")?)),
                build::keyed("count", build::cast(CastKind::Int, field("count")?)),
            ]))]),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::printer::Printer;
    use crate::test_support::{jobs_ir, resource};

    #[test]
    fn test_taxonomy_list() {
        let ir = jobs_ir();
        let department = resource(&ir, "department");
        let mut host = ResourceControllerMetadata::for_resource(&department);
        let ctx = RouteContext {
            resource: &department,
            pascal: "Department",
            route: &department.routes[0],
            kind: RouteKind::Custom,
        };

        let stmts = wp_taxonomy_route_statements(&ctx, &mut host).unwrap().unwrap();
        let printed = Printer::new().print_stmts(&stmts);

        assert!(printed.contains("$terms = get_terms( array(\n\t'taxonomy' => $this->getDepartmentTaxonomy(),\n"));
        assert!(printed.contains("\t'offset' => ( $page - 1 ) * $per_page,\n) );\n"));
        assert!(printed.contains("$items[] = $this->prepareDepartmentTermResponse( $term );"));
        assert_eq!(host.cache.events.len(), 1);
    }

    #[test]
    fn test_taxonomy_mutations_fall_through() {
        let ir = jobs_ir();
        let department = resource(&ir, "department");
        let mut host = ResourceControllerMetadata::for_resource(&department);
        let ctx = RouteContext {
            resource: &department,
            pascal: "Department",
            route: &department.routes[0],
            kind: RouteKind::Create,
        };

        assert!(wp_taxonomy_route_statements(&ctx, &mut host).unwrap().is_none());
    }
}
