use std::collections::BTreeMap;

use wpkernel_config::MetaType;
use wpkernel_core::to_snake_case;
use wpkernel_ir::{IrMetaField, IrTaxonomy};

use super::{not_null, request_param};
use crate::ast::build::{self, Result};
use crate::ast::{BinaryOp, CastKind, Expr, Stmt};
use crate::metadata::{CacheOperation, ResourceControllerMetadata};
use crate::routes::RouteKind;

pub const DEFAULT_PER_PAGE: i64 = 10;
pub const MAX_PER_PAGE: i64 = 100;

/// Normalise `page` and `per_page` from the request.
pub fn pagination() -> Result<Vec<Stmt>> {
    let per_page = build::variable("per_page")?;
    Ok(vec![
        build::assign_stmt(
            "page",
            build::func_call(
                "max",
                vec![
                    build::int(1),
                    build::cast(CastKind::Int, request_param("page")?),
                ],
            )?,
        )?,
        build::assign_stmt(
            "per_page",
            build::cast(CastKind::Int, request_param("per_page")?),
        )?,
        build::if_(
            build::binary(BinaryOp::SmallerOrEqual, per_page.clone(), build::int(0)),
            vec![build::assign_stmt("per_page", build::int(DEFAULT_PER_PAGE))?],
        ),
        build::if_(
            build::binary(BinaryOp::Greater, per_page, build::int(MAX_PER_PAGE)),
            vec![build::assign_stmt("per_page", build::int(MAX_PER_PAGE))?],
        ),
    ])
}

/// `$query_args = array( ... );` for a paged id query over the post type.
pub fn query_args(pascal: &str, statuses: &[String]) -> Result<Stmt> {
    let post_status = if statuses.is_empty() {
        build::string("any")
    } else {
        build::string_list(statuses.iter().map(String::as_str))
    };
    build::assign_stmt(
        "query_args",
        build::array(vec![
            build::keyed(
                "post_type",
                build::this_call(&format!("get{pascal}PostType"), vec![])?,
            ),
            build::keyed("post_status", post_status),
            build::keyed("fields", build::string("ids")),
            build::keyed("paged", build::variable("page")?),
            build::keyed("posts_per_page", build::variable("per_page")?),
        ]),
    )
}

/// `$query_args['{clause}'][] = array( ... );`
fn push_clause(clause: &str, value: Expr) -> Result<Stmt> {
    Ok(build::expr_stmt(build::assign(
        build::append(build::dim(
            build::variable("query_args")?,
            build::string(clause),
        )),
        value,
    )?))
}

fn scalar_sanitiser(kind: MetaType, value: Expr) -> Result<Option<Expr>> {
    Ok(Some(match kind {
        MetaType::String => build::func_call(
            "sanitize_text_field",
            vec![build::cast(CastKind::String, value)],
        )?,
        MetaType::Integer => build::cast(CastKind::Int, value),
        MetaType::Number => build::cast(CastKind::Float, value),
        MetaType::Boolean => build::func_call("rest_sanitize_boolean", vec![value])?,
        MetaType::Array | MetaType::Object => return Ok(None),
    }))
}

fn list_sanitiser(kind: MetaType) -> &'static str {
    match kind {
        MetaType::Integer => "intval",
        MetaType::Number => "floatval",
        MetaType::Boolean => "rest_sanitize_boolean",
        _ => "sanitize_text_field",
    }
}

/// Meta query clauses for every queryable meta key in the request.
///
/// Single-valued keys compare with `=`, multi-valued keys with `IN`.
/// Structured (array and object) single values are not queryable.
pub fn meta_query_clauses(meta: &BTreeMap<String, IrMetaField>) -> Result<Vec<Stmt>> {
    let mut stmts = Vec::new();

    for (key, field) in meta {
        let var_name = format!("{}_meta", to_snake_case(key));
        let var = build::variable(&var_name)?;

        let body = if field.single {
            let Some(value) = scalar_sanitiser(field.kind, var.clone())? else {
                continue;
            };
            vec![push_clause(
                "meta_query",
                build::array(vec![
                    build::keyed("key", build::string(key.as_str())),
                    build::keyed("value", value),
                    build::keyed("compare", build::string("=")),
                ]),
            )?]
        } else {
            let mut values = build::func_call(
                "array_map",
                vec![
                    build::string(list_sanitiser(field.kind)),
                    build::cast(CastKind::Array, var.clone()),
                ],
            )?;
            if field.kind == MetaType::String {
                let item = build::variable("value")?;
                values = build::func_call(
                    "array_filter",
                    vec![
                        values,
                        build::static_arrow_fn(
                            vec![build::param("value")?],
                            build::binary(BinaryOp::NotIdentical, build::string(""), item),
                        ),
                    ],
                )?;
            }
            vec![
                build::assign_stmt(&var_name, build::func_call("array_values", vec![values])?)?,
                build::if_(
                    build::binary(
                        BinaryOp::Greater,
                        build::func_call("count", vec![var.clone()])?,
                        build::int(0),
                    ),
                    vec![push_clause(
                        "meta_query",
                        build::array(vec![
                            build::keyed("key", build::string(key.as_str())),
                            build::keyed("value", var.clone()),
                            build::keyed("compare", build::string("IN")),
                        ]),
                    )?],
                ),
            ]
        };

        stmts.push(build::assign_stmt(&var_name, request_param(key)?)?);
        stmts.push(build::if_(not_null(var), body));
        stmts.push(Stmt::blank());
    }

    Ok(stmts)
}

/// Taxonomy query clauses matching requested term ids.
pub fn taxonomy_query_clauses(taxonomies: &BTreeMap<String, IrTaxonomy>) -> Result<Vec<Stmt>> {
    let mut stmts = Vec::new();

    for (key, taxonomy) in taxonomies {
        let var_name = format!("{}_terms", to_snake_case(key));
        let var = build::variable(&var_name)?;

        stmts.push(build::assign_stmt(&var_name, request_param(key)?)?);
        stmts.push(build::if_(
            not_null(var.clone()),
            vec![
                build::assign_stmt(
                    &var_name,
                    build::func_call(
                        "array_values",
                        vec![build::func_call(
                            "array_filter",
                            vec![build::func_call(
                                "array_map",
                                vec![
                                    build::string("intval"),
                                    build::cast(CastKind::Array, var.clone()),
                                ],
                            )?],
                        )?],
                    )?,
                )?,
                build::if_(
                    build::binary(
                        BinaryOp::Greater,
                        build::func_call("count", vec![var.clone()])?,
                        build::int(0),
                    ),
                    vec![push_clause(
                        "tax_query",
                        build::array(vec![
                            build::keyed("taxonomy", build::string(taxonomy.taxonomy.as_str())),
                            build::keyed("field", build::string("term_id")),
                            build::keyed("terms", var),
                        ]),
                    )?],
                ),
            ],
        ));
        stmts.push(Stmt::blank());
    }

    Ok(stmts)
}

/// `$query = new WP_Query( $query_args );`, recording a `read` of the list
/// cache segments.
pub fn execute_query(host: &mut ResourceControllerMetadata) -> Result<Stmt> {
    let stmt = build::assign_stmt(
        "query",
        build::new("WP_Query", vec![build::variable("query_args")?])?,
    )?;
    let segments = host.segments_for(RouteKind::List);
    host.record_cache_event(
        RouteKind::List,
        CacheOperation::Read,
        segments,
        Some(format!("Query {} collection", host.name)),
    );
    Ok(stmt)
}
