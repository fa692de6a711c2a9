use std::collections::BTreeMap;

use wpkernel_config::MetaType;
use wpkernel_core::to_snake_case;
use wpkernel_ir::{IrMetaField, IrTaxonomy};

use super::{marker, not_null, request, request_param, return_if_wp_error};
use crate::ast::build::{self, Result};
use crate::ast::{CastKind, ClassMethod, Expr, Stmt};
use crate::metadata::MutationMetadataKeys;

/// `$this->sync{P}Meta( {post_id}, $request );` behind its markers.
pub fn sync_meta(keys: &MutationMetadataKeys, pascal: &str, post_id: Expr) -> Result<Vec<Stmt>> {
    Ok(vec![
        marker(keys.channel_tag, "sync-meta"),
        marker(keys.sync_meta, "update"),
        build::expr_stmt(build::this_call(
            &format!("sync{pascal}Meta"),
            vec![post_id, request()?],
        )?),
    ])
}

/// `$taxonomy_result = $this->sync{P}Taxonomies( ... );` behind its markers,
/// returning early on a `WP_Error`.
pub fn sync_taxonomies(
    keys: &MutationMetadataKeys,
    pascal: &str,
    post_id: Expr,
) -> Result<Vec<Stmt>> {
    Ok(vec![
        marker(keys.channel_tag, "sync-taxonomies"),
        marker(keys.sync_taxonomies, "update"),
        build::assign_stmt(
            "taxonomy_result",
            build::this_call(
                &format!("sync{pascal}Taxonomies"),
                vec![post_id, request()?],
            )?,
        )?,
        return_if_wp_error("taxonomy_result")?,
    ])
}

fn sanitise_meta(kind: MetaType, value: Expr) -> Result<Expr> {
    Ok(match kind {
        MetaType::String => build::func_call(
            "sanitize_text_field",
            vec![build::cast(CastKind::String, value)],
        )?,
        MetaType::Integer => build::cast(CastKind::Int, value),
        MetaType::Number => build::cast(CastKind::Float, value),
        MetaType::Boolean => build::func_call("rest_sanitize_boolean", vec![value])?,
        MetaType::Array | MetaType::Object => value,
    })
}

fn sync_params() -> Result<Vec<crate::ast::Param>> {
    Ok(vec![
        build::typed_param("int", "post_id")?,
        build::typed_param("WP_REST_Request", "request")?,
    ])
}

/// `sync{P}Meta`: write every declared meta key present in the request.
pub fn sync_meta_method(pascal: &str, meta: &BTreeMap<String, IrMetaField>) -> Result<ClassMethod> {
    let post_id = build::variable("post_id")?;
    let mut stmts = Vec::new();

    for (key, field) in meta {
        let slug = to_snake_case(key);
        let var_name = format!("{slug}_meta");
        let var = build::variable(&var_name)?;

        let write = if field.single {
            vec![build::expr_stmt(build::func_call(
                "update_post_meta",
                vec![
                    post_id.clone(),
                    build::string(key.as_str()),
                    sanitise_meta(field.kind, var.clone())?,
                ],
            )?)]
        } else {
            let value = build::variable(&format!("{slug}_value"))?;
            vec![
                build::expr_stmt(build::func_call(
                    "delete_post_meta",
                    vec![post_id.clone(), build::string(key.as_str())],
                )?),
                build::foreach(
                    build::cast(CastKind::Array, var.clone()),
                    None,
                    value.clone(),
                    vec![build::expr_stmt(build::func_call(
                        "add_post_meta",
                        vec![
                            post_id.clone(),
                            build::string(key.as_str()),
                            sanitise_meta(field.kind, value)?,
                        ],
                    )?)],
                ),
            ]
        };

        if !stmts.is_empty() {
            stmts.push(Stmt::blank());
        }
        stmts.push(build::assign_stmt(&var_name, request_param(key)?)?);
        stmts.push(build::if_(not_null(var), write));
    }

    let mut method = build::method(&format!("sync{pascal}Meta"))?
        .private()
        .returns("void")
        .body(stmts);
    for param in sync_params()? {
        method = method.param(param);
    }
    Ok(method)
}

/// `sync{P}Taxonomies`: assign the requested term ids for every declared
/// taxonomy, returning the first `WP_Error` or `true`.
pub fn sync_taxonomies_method(
    pascal: &str,
    taxonomies: &BTreeMap<String, IrTaxonomy>,
) -> Result<ClassMethod> {
    let post_id = build::variable("post_id")?;
    let mut stmts = Vec::new();

    for (key, taxonomy) in taxonomies {
        let slug = to_snake_case(key);
        let terms_name = format!("{slug}_terms");
        let result_name = format!("{slug}_result");
        let terms = build::variable(&terms_name)?;

        stmts.push(build::assign_stmt(&terms_name, request_param(key)?)?);
        stmts.push(build::if_(
            not_null(terms.clone()),
            vec![
                build::assign_stmt(
                    &terms_name,
                    build::func_call(
                        "array_filter",
                        vec![build::func_call(
                            "array_map",
                            vec![
                                build::string("intval"),
                                build::cast(CastKind::Array, terms.clone()),
                            ],
                        )?],
                    )?,
                )?,
                build::assign_stmt(
                    &result_name,
                    build::func_call(
                        "wp_set_object_terms",
                        vec![
                            post_id.clone(),
                            terms,
                            build::string(taxonomy.taxonomy.as_str()),
                            build::bool(false),
                        ],
                    )?,
                )?,
                return_if_wp_error(&result_name)?,
            ],
        ));
        stmts.push(Stmt::blank());
    }
    stmts.push(build::ret(build::bool(true)));

    let mut method = build::method(&format!("sync{pascal}Taxonomies"))?.private();
    for param in sync_params()? {
        method = method.param(param);
    }
    Ok(method.body(stmts))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::WP_POST_MUTATION_KEYS;
    use crate::printer::Printer;
    use crate::test_support::{jobs_ir, resource};

    fn print_method(method: ClassMethod) -> String {
        Printer::new().print_class(&build::class("X").unwrap().method(method))
    }

    #[test]
    fn test_taxonomy_sync_returns_early_on_error() {
        let stmts = sync_taxonomies(
            &WP_POST_MUTATION_KEYS,
            "Job",
            build::variable("post_id").unwrap(),
        )
        .unwrap();
        let printed = Printer::new().print_stmts(&stmts);

        assert_eq!(
            printed,
            "// @wp-kernel resource.wpPost.mutation sync-taxonomies\n// @wp-kernel resource.wpPost.mutation.taxonomies update\n$taxonomy_result = $this->syncJobTaxonomies( $post_id, $request );\nif ( is_wp_error( $taxonomy_result ) ) {\n\treturn $taxonomy_result;\n}\n"
        );
    }

    #[test]
    fn test_meta_method_sanitises_by_type() {
        let ir = jobs_ir();
        let job = resource(&ir, "job");
        let storage = job.wp_post().unwrap();
        let printed = print_method(sync_meta_method("Job", &storage.meta).unwrap());

        assert!(printed.contains(
            "private function syncJobMeta( int $post_id, WP_REST_Request $request ): void {"
        ));
        assert!(printed.contains(
            "update_post_meta( $post_id, 'department', sanitize_text_field( (string) $department_meta ) );"
        ));
        assert!(printed.contains("delete_post_meta( $post_id, 'tags' );"));
        assert!(printed.contains("foreach ( (array) $tags_meta as $tags_value ) {"));
    }

    #[test]
    fn test_taxonomy_method_uses_term_ids() {
        let ir = jobs_ir();
        let job = resource(&ir, "job");
        let storage = job.wp_post().unwrap();
        let printed = print_method(sync_taxonomies_method("Job", &storage.taxonomies).unwrap());

        assert!(printed.contains(
            "$location_terms = array_filter( array_map( 'intval', (array) $location_terms ) );"
        ));
        assert!(printed.contains(
            "$location_result = wp_set_object_terms( $post_id, $location_terms, 'acme_location', false );"
        ));
        assert!(printed.contains("return true;"));
    }
}
