//! Handlers and helpers for resources stored as a custom post type.
//!
//! The mutation composers return `None` when the resource is not backed by
//! wp-post storage; other storage modes have their own handlers.

use wpkernel_config::PostSupport;
use wpkernel_ir::{IrIdentity, IrResource, IrWpPostStorage};

use super::RouteKind;
use crate::ast::build::{self, Result};
use crate::ast::{BinaryOp, CastKind, ClassMethod, Expr, Stmt};
use crate::macros::{
    self, CachePriming, StatusTarget, error_code, identity_guard, not_null, read_identity,
    request, request_param, return_if_wp_error, return_wp_error, unless_post,
};
use crate::metadata::{CacheOperation, MutationMetadataKeys, ResourceControllerMetadata};

type Composed = Result<Option<Vec<Stmt>>>;

fn post_type_call(pascal: &str) -> Result<Expr> {
    build::this_call(&format!("get{pascal}PostType"), vec![])
}

fn prepare_response(pascal: &str, post: Expr) -> Result<Expr> {
    build::this_call(&format!("prepare{pascal}Response"), vec![post, request()?])
}

/// `$post_data['{field}'] = sanitize( $value );` for each supported post field.
fn post_fields(storage: &IrWpPostStorage) -> Result<Vec<Stmt>> {
    let mut stmts = Vec::new();
    for support in &storage.supports {
        let (param, field, sanitiser) = match support {
            PostSupport::Title => ("title", "post_title", "sanitize_text_field"),
            PostSupport::Editor => ("content", "post_content", "wp_kses_post"),
            PostSupport::Excerpt => ("excerpt", "post_excerpt", "sanitize_textarea_field"),
            PostSupport::CustomFields => continue,
        };
        let var = build::variable(param)?;
        stmts.push(build::assign_stmt(param, request_param(param)?)?);
        stmts.push(build::if_(
            not_null(var.clone()),
            vec![build::expr_stmt(build::assign(
                build::dim(build::variable("post_data")?, build::string(field)),
                build::func_call(sanitiser, vec![build::cast(CastKind::String, var)])?,
            )?)],
        ));
    }
    Ok(stmts)
}

/// Read and validate the identity, then resolve the post or return a 404.
fn resolve_post(resource: &IrResource, pascal: &str, identity: &IrIdentity) -> Result<Vec<Stmt>> {
    let mut stmts = vec![read_identity(identity)?];
    stmts.extend(identity_guard(identity, pascal, &resource.name)?);
    stmts.push(Stmt::blank());
    stmts.push(build::assign_stmt(
        "post",
        build::this_call(
            &format!("resolve{pascal}Post"),
            vec![build::variable(identity.param())?],
        )?,
    )?);
    stmts.push(unless_post(
        build::variable("post")?,
        vec![return_wp_error(
            &error_code(&resource.name, "not_found"),
            &format!("{pascal} not found."),
            404,
        )?],
    )?);
    stmts.push(Stmt::blank());
    Ok(stmts)
}

/// Paged `WP_Query` over the post type, filtered by meta and taxonomy
/// params.
pub fn build_list_route_statements(
    resource: &IrResource,
    pascal: &str,
    host: &mut ResourceControllerMetadata,
) -> Composed {
    let Some(storage) = resource.wp_post() else {
        return Ok(None);
    };
    let post = build::variable("post")?;
    let query = build::variable("query")?;

    let mut stmts = macros::pagination()?;
    stmts.push(Stmt::blank());
    stmts.push(macros::query_args(pascal, &storage.statuses)?);
    stmts.push(Stmt::blank());
    stmts.extend(macros::meta_query_clauses(&storage.meta)?);
    stmts.extend(macros::taxonomy_query_clauses(&storage.taxonomies)?);
    stmts.push(macros::execute_query(host)?);
    stmts.push(build::assign_stmt("items", build::array(vec![]))?);
    stmts.push(Stmt::blank());
    stmts.push(build::foreach(
        build::property(query.clone(), "posts")?,
        None,
        build::variable("post_id")?,
        vec![
            build::assign_stmt(
                "post",
                build::func_call("get_post", vec![build::variable("post_id")?])?,
            )?,
            unless_post(post.clone(), vec![Stmt::Continue])?,
            Stmt::blank(),
            build::expr_stmt(build::assign(
                build::append(build::variable("items")?),
                prepare_response(pascal, post)?,
            )?),
        ],
    ));
    stmts.push(Stmt::blank());
    stmts.push(build::ret(build::array(vec![
        build::keyed("items", build::variable("items")?),
        build::keyed(
            "total",
            build::cast(CastKind::Int, build::property(query.clone(), "found_posts")?),
        ),
        build::keyed(
            "pages",
            build::cast(CastKind::Int, build::property(query, "max_num_pages")?),
        ),
    ])));
    Ok(Some(stmts))
}

pub fn build_get_route_statements(
    resource: &IrResource,
    pascal: &str,
    identity: &IrIdentity,
    host: &mut ResourceControllerMetadata,
) -> Composed {
    if resource.wp_post().is_none() {
        return Ok(None);
    }

    let mut stmts = resolve_post(resource, pascal, identity)?;
    stmts.push(build::ret(prepare_response(pascal, build::variable("post")?)?));

    let segments = host.segments_for(RouteKind::Get);
    host.record_cache_event(
        RouteKind::Get,
        CacheOperation::Read,
        segments,
        Some(format!("Read {} item", resource.name)),
    );
    Ok(Some(stmts))
}

/// Insert a post, validate its status, sync meta and taxonomies and return
/// the reloaded post.
pub fn build_create_route_statements(
    resource: &IrResource,
    pascal: &str,
    keys: &MutationMetadataKeys,
    host: &mut ResourceControllerMetadata,
) -> Composed {
    let Some(storage) = resource.wp_post() else {
        return Ok(None);
    };
    let post_id = build::variable("post_id")?;

    let mut stmts = vec![
        build::assign_stmt("post_type", post_type_call(pascal)?)?,
        Stmt::blank(),
        build::assign_stmt(
            "post_data",
            build::array(vec![build::keyed("post_type", build::variable("post_type")?)]),
        )?,
    ];
    stmts.extend(post_fields(storage)?);
    stmts.extend(macros::status_validation(
        keys,
        pascal,
        &resource.name,
        &storage.statuses,
        StatusTarget::Always,
    )?);
    stmts.push(Stmt::blank());
    stmts.push(build::assign_stmt(
        "post_id",
        build::func_call(
            "wp_insert_post",
            vec![build::variable("post_data")?, build::bool(true)],
        )?,
    )?);
    stmts.push(return_if_wp_error("post_id")?);
    stmts.push(Stmt::blank());
    stmts.extend(macros::sync_meta(keys, pascal, post_id.clone())?);
    stmts.extend(macros::sync_taxonomies(keys, pascal, post_id.clone())?);
    stmts.push(Stmt::blank());
    stmts.extend(macros::cache_priming(
        CachePriming {
            keys,
            pascal,
            resource: &resource.name,
            post_id,
            post_var: "post",
            verb: "created",
            scope: RouteKind::Create,
        },
        host,
    )?);
    Ok(Some(stmts))
}

/// Update an existing post; the status is only touched when requested.
pub fn build_update_route_statements(
    resource: &IrResource,
    pascal: &str,
    keys: &MutationMetadataKeys,
    identity: &IrIdentity,
    host: &mut ResourceControllerMetadata,
) -> Composed {
    let Some(storage) = resource.wp_post() else {
        return Ok(None);
    };
    let post_id = build::property(build::variable("post")?, "ID")?;

    let mut stmts = resolve_post(resource, pascal, identity)?;
    stmts.push(build::assign_stmt(
        "post_data",
        build::array(vec![
            build::keyed("ID", post_id.clone()),
            build::keyed("post_type", post_type_call(pascal)?),
        ]),
    )?);
    stmts.extend(post_fields(storage)?);
    stmts.extend(macros::status_validation(
        keys,
        pascal,
        &resource.name,
        &storage.statuses,
        StatusTarget::WhenPresent,
    )?);
    stmts.push(Stmt::blank());
    stmts.push(build::assign_stmt(
        "result",
        build::func_call(
            "wp_update_post",
            vec![build::variable("post_data")?, build::bool(true)],
        )?,
    )?);
    stmts.push(return_if_wp_error("result")?);
    stmts.push(Stmt::blank());
    stmts.extend(macros::sync_meta(keys, pascal, post_id.clone())?);
    stmts.extend(macros::sync_taxonomies(keys, pascal, post_id.clone())?);
    stmts.push(Stmt::blank());
    stmts.extend(macros::cache_priming(
        CachePriming {
            keys,
            pascal,
            resource: &resource.name,
            post_id,
            post_var: "updated",
            verb: "updated",
            scope: RouteKind::Update,
        },
        host,
    )?);
    Ok(Some(stmts))
}

/// Force-delete a post and return its last prepared state.
pub fn build_delete_route_statements(
    resource: &IrResource,
    pascal: &str,
    _keys: &MutationMetadataKeys,
    identity: &IrIdentity,
    host: &mut ResourceControllerMetadata,
) -> Composed {
    if resource.wp_post().is_none() {
        return Ok(None);
    }
    let post = build::variable("post")?;
    let post_id = build::property(post.clone(), "ID")?;

    let mut stmts = resolve_post(resource, pascal, identity)?;
    stmts.push(build::assign_stmt(
        "previous",
        prepare_response(pascal, post)?,
    )?);
    stmts.push(build::assign_stmt(
        "deleted",
        build::func_call("wp_delete_post", vec![post_id.clone(), build::bool(true)])?,
    )?);
    stmts.push(build::if_(
        build::binary(
            BinaryOp::Identical,
            build::bool(false),
            build::variable("deleted")?,
        ),
        vec![return_wp_error(
            &error_code(&resource.name, "delete_failed"),
            &format!("Unable to delete {pascal}."),
            500,
        )?],
    ));
    stmts.push(Stmt::blank());
    stmts.push(build::ret(build::array(vec![
        build::keyed("deleted", build::bool(true)),
        build::keyed("id", build::cast(CastKind::Int, post_id)),
        build::keyed("previous", build::variable("previous")?),
    ])));

    for scope in [RouteKind::Remove, RouteKind::List] {
        let segments = host.segments_for(scope);
        host.record_cache_event(
            scope,
            CacheOperation::Invalidate,
            segments,
            Some(format!("Invalidate {} {scope} cache after delete", resource.name)),
        );
    }
    Ok(Some(stmts))
}

fn post_type_method(pascal: &str, storage: &IrWpPostStorage) -> Result<ClassMethod> {
    Ok(build::method(&format!("get{pascal}PostType"))?
        .private()
        .returns("string")
        .body(vec![build::ret(build::string(storage.post_type.as_str()))]))
}

fn resolve_method(pascal: &str, identity: Option<&IrIdentity>) -> Result<ClassMethod> {
    let post = build::variable("post")?;
    let (param, lookup) = match identity {
        Some(identity) if !identity.is_numeric() => {
            let param = identity.param();
            let lookup = vec![
                build::assign_stmt(
                    "posts",
                    build::func_call(
                        "get_posts",
                        vec![build::array(vec![
                            build::keyed("name", build::variable(param)?),
                            build::keyed("post_type", post_type_call(pascal)?),
                            build::keyed("post_status", build::string("any")),
                            build::keyed("numberposts", build::int(1)),
                        ])],
                    )?,
                )?,
                build::assign_stmt(
                    "post",
                    build::binary(
                        BinaryOp::Coalesce,
                        build::dim(build::variable("posts")?, build::int(0)),
                        build::null(),
                    ),
                )?,
            ];
            (build::typed_param("string", param)?, lookup)
        }
        _ => {
            let param = identity.map_or("id", IrIdentity::param);
            let lookup = vec![build::assign_stmt(
                "post",
                build::func_call("get_post", vec![build::variable(param)?])?,
            )?];
            (build::typed_param("int", param)?, lookup)
        }
    };

    let mut stmts = lookup;
    stmts.push(unless_post(post.clone(), vec![build::ret(build::null())])?);
    stmts.push(build::if_(
        build::binary(
            BinaryOp::NotIdentical,
            post_type_call(pascal)?,
            build::property(post.clone(), "post_type")?,
        ),
        vec![build::ret(build::null())],
    ));
    stmts.push(Stmt::blank());
    stmts.push(build::ret(post));

    Ok(build::method(&format!("resolve{pascal}Post"))?
        .private()
        .param(param)
        .returns("?WP_Post")
        .body(stmts))
}

fn prepare_method(pascal: &str, storage: &IrWpPostStorage) -> Result<ClassMethod> {
    let post = build::variable("post")?;
    let post_id = build::property(post.clone(), "ID")?;
    let data = build::variable("data")?;

    let mut fields = vec![
        build::keyed("id", build::cast(CastKind::Int, post_id.clone())),
        build::keyed("status", build::property(post.clone(), "post_status")?),
        build::keyed("slug", build::property(post.clone(), "post_name")?),
    ];
    for support in &storage.supports {
        match support {
            PostSupport::Title => fields.push(build::keyed(
                "title",
                build::func_call("get_the_title", vec![post.clone()])?,
            )),
            PostSupport::Editor => fields.push(build::keyed(
                "content",
                build::property(post.clone(), "post_content")?,
            )),
            PostSupport::Excerpt => fields.push(build::keyed(
                "excerpt",
                build::property(post.clone(), "post_excerpt")?,
            )),
            PostSupport::CustomFields => {}
        }
    }

    let mut stmts = vec![build::assign_stmt("data", build::array(fields))?];
    if !storage.meta.is_empty() || !storage.taxonomies.is_empty() {
        stmts.push(Stmt::blank());
    }
    for (key, field) in &storage.meta {
        stmts.push(build::expr_stmt(build::assign(
            build::dim(data.clone(), build::string(key.as_str())),
            build::func_call(
                "get_post_meta",
                vec![
                    post_id.clone(),
                    build::string(key.as_str()),
                    build::bool(field.single),
                ],
            )?,
        )?));
    }
    for (key, taxonomy) in &storage.taxonomies {
        stmts.push(build::expr_stmt(build::assign(
            build::dim(data.clone(), build::string(key.as_str())),
            build::func_call(
                "wp_get_object_terms",
                vec![
                    post_id.clone(),
                    build::string(taxonomy.taxonomy.as_str()),
                    build::array(vec![build::keyed("fields", build::string("ids"))]),
                ],
            )?,
        )?));
    }
    stmts.push(Stmt::blank());
    stmts.push(build::ret(data));

    Ok(build::method(&format!("prepare{pascal}Response"))?
        .private()
        .param(build::typed_param("WP_Post", "post")?)
        .param(build::typed_param("WP_REST_Request", "request")?)
        .returns("array")
        .body(stmts))
}

/// Private helpers the wp-post handlers call into.
pub fn wp_post_helper_methods(resource: &IrResource, pascal: &str) -> Result<Vec<ClassMethod>> {
    let Some(storage) = resource.wp_post() else {
        return Ok(Vec::new());
    };
    Ok(vec![
        post_type_method(pascal, storage)?,
        resolve_method(pascal, resource.identity.as_ref())?,
        prepare_method(pascal, storage)?,
        macros::normalise_status_method(pascal, &storage.statuses)?,
        macros::sync_meta_method(pascal, &storage.meta)?,
        macros::sync_taxonomies_method(pascal, &storage.taxonomies)?,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::macros::count_markers;
    use crate::metadata::WP_POST_MUTATION_KEYS;
    use crate::printer::Printer;
    use crate::test_support::{jobs_ir, resource};

    fn job() -> (IrResource, ResourceControllerMetadata) {
        let ir = jobs_ir();
        let job = resource(&ir, "job");
        let host = ResourceControllerMetadata::for_resource(&job);
        (job, host)
    }

    fn marker_lines(stmts: &[Stmt]) -> Vec<String> {
        Printer::new()
            .print_stmts(stmts)
            .lines()
            .filter(|line| line.trim_start().starts_with(macros::MARKER_PREFIX))
            .map(|line| line.trim().to_string())
            .collect()
    }

    #[test]
    fn test_create_carries_nine_markers_in_order() {
        let (job, mut host) = job();
        let stmts = build_create_route_statements(&job, "Job", &WP_POST_MUTATION_KEYS, &mut host)
            .unwrap()
            .unwrap();

        assert_eq!(count_markers(&stmts), 9);
        assert_eq!(
            marker_lines(&stmts),
            vec![
                "// @wp-kernel resource.wpPost.mutation status-validation",
                "// @wp-kernel resource.wpPost.mutation.status normalise",
                "// @wp-kernel resource.wpPost.mutation sync-meta",
                "// @wp-kernel resource.wpPost.mutation.meta update",
                "// @wp-kernel resource.wpPost.mutation sync-taxonomies",
                "// @wp-kernel resource.wpPost.mutation.taxonomies update",
                "// @wp-kernel resource.wpPost.mutation cache-priming",
                "// @wp-kernel resource.wpPost.mutation.cache prime",
                "// @wp-kernel resource.wpPost.mutation.cacheSegment prime",
            ]
        );

        let printed = Printer::new().print_stmts(&stmts);
        assert!(printed.starts_with("$post_type = $this->getJobPostType();\n\n"));
        assert!(printed.contains("$post_id = wp_insert_post( $post_data, true );\n"));
        assert_eq!(host.cache.by_operation(CacheOperation::Prime).count(), 1);
    }

    #[test]
    fn test_update_guards_identity_before_markers() {
        let (job, mut host) = job();
        let identity = job.identity.clone().unwrap();
        let stmts = build_update_route_statements(
            &job,
            "Job",
            &WP_POST_MUTATION_KEYS,
            &identity,
            &mut host,
        )
        .unwrap()
        .unwrap();

        assert_eq!(count_markers(&stmts), 9);
        let printed = Printer::new().print_stmts(&stmts);
        let guard = printed.find("if ( $id <= 0 )").unwrap();
        let first_marker = printed.find("// @wp-kernel").unwrap();
        assert!(guard < first_marker);
        assert!(printed.contains("$updated = get_post( $post->ID );"));
        assert!(printed.contains("'Unable to load updated Job.'"));
    }

    #[test]
    fn test_delete_has_no_markers() {
        let (job, mut host) = job();
        let identity = job.identity.clone().unwrap();
        let stmts = build_delete_route_statements(
            &job,
            "Job",
            &WP_POST_MUTATION_KEYS,
            &identity,
            &mut host,
        )
        .unwrap()
        .unwrap();

        assert_eq!(count_markers(&stmts), 0);
        let printed = Printer::new().print_stmts(&stmts);
        assert!(printed.contains("if ( false === $deleted ) {"));
        assert!(printed.contains("'wpk_job_delete_failed'"));
        assert_eq!(host.cache.by_operation(CacheOperation::Invalidate).count(), 2);
    }

    #[test]
    fn test_mutations_are_not_applicable_to_other_storage() {
        let ir = jobs_ir();
        let draft = resource(&ir, "draft");
        let identity = draft.identity.clone().unwrap();
        let mut host = ResourceControllerMetadata::for_resource(&draft);
        let keys = &WP_POST_MUTATION_KEYS;

        assert!(
            build_delete_route_statements(&draft, "Draft", keys, &identity, &mut host)
                .unwrap()
                .is_none()
        );
        assert!(
            build_create_route_statements(&draft, "Draft", keys, &mut host)
                .unwrap()
                .is_none()
        );
        assert!(
            build_update_route_statements(&draft, "Draft", keys, &identity, &mut host)
                .unwrap()
                .is_none()
        );
        assert!(build_list_route_statements(&draft, "Draft", &mut host).unwrap().is_none());
        assert!(host.cache.events.is_empty());
    }

    #[test]
    fn test_list_returns_paged_items() {
        let (job, mut host) = job();
        let stmts = build_list_route_statements(&job, "Job", &mut host)
            .unwrap()
            .unwrap();
        let printed = Printer::new().print_stmts(&stmts);

        assert!(printed.contains("foreach ( $query->posts as $post_id ) {\n"));
        assert!(printed.contains("\t$items[] = $this->prepareJobResponse( $post, $request );\n"));
        assert!(printed.contains("\t'total' => (int) $query->found_posts,\n"));
        assert_eq!(host.cache.by_operation(CacheOperation::Read).count(), 1);
    }

    #[test]
    fn test_helper_methods() {
        let (job, _) = job();
        let methods = wp_post_helper_methods(&job, "Job").unwrap();
        let names: Vec<&str> = methods.iter().map(|method| method.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "getJobPostType",
                "resolveJobPost",
                "prepareJobResponse",
                "normaliseJobStatus",
                "syncJobMeta",
                "syncJobTaxonomies",
            ]
        );

        let class = build::class("JobController").unwrap().methods(methods);
        let printed = Printer::new().print_class(&class);
        assert!(printed.contains("private function resolveJobPost( int $id ): ?WP_Post {"));
        assert!(printed.contains("$data['tags'] = get_post_meta( $post->ID, 'tags', false );"));
        assert!(printed.contains("return 'acme_job';"));
    }
}
