use super::{error_code, marker, request, return_wp_error, unless_post};
use crate::ast::build::{self, Result};
use crate::ast::{Expr, Stmt};
use crate::metadata::{CacheOperation, MutationMetadataKeys, ResourceControllerMetadata};
use crate::routes::RouteKind;

/// Arguments of [`cache_priming`].
#[derive(Debug, Clone)]
pub struct CachePriming<'a> {
    pub keys: &'a MutationMetadataKeys,
    pub pascal: &'a str,
    pub resource: &'a str,
    /// Expression holding the id of the written post.
    pub post_id: Expr,
    /// Variable the reloaded post is bound to.
    pub post_var: &'a str,
    /// `created` or `updated`, used in the failure message.
    pub verb: &'a str,
    pub scope: RouteKind,
}

/// Reload the written post and return its prepared response.
///
/// Records a `prime` event for the route's cache segments in `host`.
pub fn cache_priming(
    priming: CachePriming<'_>,
    host: &mut ResourceControllerMetadata,
) -> Result<Vec<Stmt>> {
    let CachePriming {
        keys,
        pascal,
        resource,
        post_id,
        post_var,
        verb,
        scope,
    } = priming;
    let post = build::variable(post_var)?;

    let stmts = vec![
        marker(keys.channel_tag, "cache-priming"),
        marker(keys.cache_priming, "prime"),
        marker(keys.cache_segment, "prime"),
        build::assign_stmt(post_var, build::func_call("get_post", vec![post_id])?)?,
        unless_post(
            post.clone(),
            vec![return_wp_error(
                &error_code(resource, "load_failed"),
                &format!("Unable to load {verb} {pascal}."),
                500,
            )?],
        )?,
        Stmt::blank(),
        build::ret(build::this_call(
            &format!("prepare{pascal}Response"),
            vec![post, request()?],
        )?),
    ];

    let segments = host.segments_for(scope);
    host.record_cache_event(
        scope,
        CacheOperation::Prime,
        segments,
        Some(format!("Prime {resource} cache after {scope}")),
    );
    Ok(stmts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::macros::count_markers;
    use crate::metadata::WP_POST_MUTATION_KEYS;
    use crate::printer::Printer;
    use crate::test_support::{jobs_ir, resource};

    #[test]
    fn test_priming_records_event() {
        let ir = jobs_ir();
        let job = resource(&ir, "job");
        let mut host = ResourceControllerMetadata::for_resource(&job);

        let stmts = cache_priming(
            CachePriming {
                keys: &WP_POST_MUTATION_KEYS,
                pascal: "Job",
                resource: "job",
                post_id: build::variable("post_id").unwrap(),
                post_var: "post",
                verb: "created",
                scope: RouteKind::Create,
            },
            &mut host,
        )
        .unwrap();

        assert_eq!(count_markers(&stmts), 3);
        let printed = Printer::new().print_stmts(&stmts);
        assert!(printed.contains("$post = get_post( $post_id );\nif ( ! $post instanceof WP_Post ) {\n"));
        assert!(printed.contains("'Unable to load created Job.'"));
        assert!(printed.ends_with("return $this->prepareJobResponse( $post, $request );\n"));

        let events: Vec<_> = host.cache.by_operation(CacheOperation::Prime).collect();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].scope, RouteKind::Create);
        assert_eq!(events[0].segments, host.segments_for(RouteKind::Create));
    }
}
