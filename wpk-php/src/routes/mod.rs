//! Route handler composition.
//!
//! Each route of a resource is classified into a [`RouteKind`] and its
//! handler body is composed by the storage mode's composer. Routes no
//! composer supports get a `501 Not Implemented` stub.

mod kind;
mod transient;
mod wp_option;
mod wp_post;
mod wp_taxonomy;

pub use kind::{RouteKind, canonical_base_paths, classify_routes, determine_route_kind};
pub use transient::{transient_helper_methods, transient_route_statements};
pub use wp_option::{wp_option_helper_methods, wp_option_route_statements};
pub use wp_post::{
    build_create_route_statements, build_delete_route_statements, build_get_route_statements,
    build_list_route_statements, build_update_route_statements, wp_post_helper_methods,
};
pub use wp_taxonomy::{wp_taxonomy_helper_methods, wp_taxonomy_route_statements};

use wpkernel_config::HttpMethod;
use wpkernel_ir::{IrResource, IrRoute, IrStorage};

use crate::ast::build::{self, Result};
use crate::ast::{ClassMethod, Stmt};
use crate::metadata::{MutationMetadataKeys, ResourceControllerMetadata};

/// The route a handler body is composed for.
#[derive(Debug, Clone, Copy)]
pub struct RouteContext<'a> {
    pub resource: &'a IrResource,
    pub pascal: &'a str,
    pub route: &'a IrRoute,
    pub kind: RouteKind,
}

/// What a route does to single-value storage, by HTTP method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StorageAccess {
    Read,
    Write,
    Delete,
}

impl StorageAccess {
    pub(crate) fn of(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => StorageAccess::Read,
            HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch => StorageAccess::Write,
            HttpMethod::Delete => StorageAccess::Delete,
        }
    }
}

/// `// TODO` plus `return new WP_Error( 501, 'Not Implemented' );`
pub fn not_implemented(route: &IrRoute) -> Result<Vec<Stmt>> {
    Ok(vec![
        build::comment(format!(
            "// TODO: Implement handler for [{}] {}.",
            route.method, route.path
        )),
        build::ret(build::new(
            "WP_Error",
            vec![build::int(501), build::string("Not Implemented")],
        )?),
    ])
}

fn wp_post_statements(
    ctx: &RouteContext<'_>,
    keys: &MutationMetadataKeys,
    host: &mut ResourceControllerMetadata,
) -> Result<Option<Vec<Stmt>>> {
    let RouteContext {
        resource,
        pascal,
        kind,
        ..
    } = *ctx;
    let identity = resource.identity.as_ref();

    match (kind, identity) {
        (RouteKind::List, _) => build_list_route_statements(resource, pascal, host),
        (RouteKind::Create, _) => build_create_route_statements(resource, pascal, keys, host),
        (RouteKind::Get, Some(identity)) => {
            build_get_route_statements(resource, pascal, identity, host)
        }
        (RouteKind::Update, Some(identity)) => {
            build_update_route_statements(resource, pascal, keys, identity, host)
        }
        (RouteKind::Remove, Some(identity)) => {
            build_delete_route_statements(resource, pascal, keys, identity, host)
        }
        _ => Ok(None),
    }
}

/// Compose the handler body for one route, falling back to a stub.
pub fn build_route_statements(
    ctx: &RouteContext<'_>,
    keys: &MutationMetadataKeys,
    host: &mut ResourceControllerMetadata,
) -> Result<Vec<Stmt>> {
    let composed = match &ctx.resource.storage {
        Some(IrStorage::WpPost(_)) => wp_post_statements(ctx, keys, host)?,
        Some(IrStorage::Transient) => transient_route_statements(ctx, host)?,
        Some(IrStorage::WpOption { .. }) => wp_option_route_statements(ctx, host)?,
        Some(IrStorage::WpTaxonomy { .. }) => wp_taxonomy_route_statements(ctx, host)?,
        None => None,
    };

    match composed {
        Some(stmts) => Ok(stmts),
        None => not_implemented(ctx.route),
    }
}

/// Private helper methods the storage mode's handlers call.
pub fn storage_helper_methods(
    resource: &IrResource,
    pascal: &str,
    key_prefix: &str,
) -> Result<Vec<ClassMethod>> {
    match &resource.storage {
        Some(IrStorage::WpPost(_)) => wp_post_helper_methods(resource, pascal),
        Some(IrStorage::Transient) => {
            transient_helper_methods(pascal, resource.identity.as_ref(), key_prefix)
        }
        Some(IrStorage::WpOption { option }) => wp_option_helper_methods(pascal, option),
        Some(IrStorage::WpTaxonomy { taxonomy, .. }) => {
            wp_taxonomy_helper_methods(pascal, taxonomy)
        }
        None => Ok(Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::printer::Printer;
    use crate::test_support::{jobs_ir, resource};

    #[test]
    fn test_unsupported_routes_get_a_stub() {
        let ir = jobs_ir();
        let job = resource(&ir, "job");
        let route = IrRoute {
            method: HttpMethod::Post,
            path: "/acme/v1/jobs/:id/publish".into(),
            capability: None,
            hash: String::new(),
        };
        let mut host = ResourceControllerMetadata::for_resource(&job);
        let ctx = RouteContext {
            resource: &job,
            pascal: "Job",
            route: &route,
            kind: RouteKind::Custom,
        };

        let stmts =
            build_route_statements(&ctx, &crate::metadata::WP_POST_MUTATION_KEYS, &mut host)
                .unwrap();
        assert_eq!(
            Printer::new().print_stmts(&stmts),
            "// TODO: Implement handler for [POST] /acme/v1/jobs/:id/publish.\nreturn new WP_Error( 501, 'Not Implemented' );\n"
        );
    }
}
