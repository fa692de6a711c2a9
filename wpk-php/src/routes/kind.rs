//! Route classification.
//!
//! A route's kind comes from its method and its position relative to the
//! resource's canonical base path: `GET`/`POST` on the base path are
//! `list`/`create`; `GET`/`PUT`/`PATCH`/`DELETE` on `{base}/:{identity}` are
//! `get`/`update`/`remove`. Everything else is `custom`.

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;
use wpkernel_config::HttpMethod;
use wpkernel_ir::IrRoute;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteKind {
    List,
    Get,
    Create,
    Update,
    Remove,
    Custom,
}

impl RouteKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteKind::List => "list",
            RouteKind::Get => "get",
            RouteKind::Create => "create",
            RouteKind::Update => "update",
            RouteKind::Remove => "remove",
            RouteKind::Custom => "custom",
        }
    }

    /// Whether the handler addresses a single item by identity.
    pub fn uses_identity(&self) -> bool {
        matches!(self, RouteKind::Get | RouteKind::Update | RouteKind::Remove)
    }

    /// The mutation tag value, for mutating kinds.
    pub fn mutation(&self) -> Option<&'static str> {
        match self {
            RouteKind::Create => Some("create"),
            RouteKind::Update => Some("update"),
            RouteKind::Remove => Some("delete"),
            _ => None,
        }
    }
}

impl fmt::Display for RouteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|segment| !segment.is_empty()).collect()
}

fn join(segments: &[&str]) -> String {
    format!("/{}", segments.join("/"))
}

/// Base path of an `{base}/:{identity}` route whose base is static.
fn identity_base_path(path: &str, identity_param: &str) -> Option<String> {
    let segments = segments(path);
    let (last, base) = segments.split_last()?;
    if last.strip_prefix(':') != Some(identity_param) {
        return None;
    }
    if base.iter().any(|segment| segment.starts_with(':')) {
        return None;
    }
    Some(join(base))
}

/// Collect the resource's canonical collection paths.
///
/// The bases of identity routes win; without any, the shortest static
/// paths are used when they have at most one segment.
pub fn canonical_base_paths(routes: &[IrRoute], identity_param: Option<&str>) -> BTreeSet<String> {
    if let Some(param) = identity_param {
        let bases: BTreeSet<String> = routes
            .iter()
            .filter_map(|route| identity_base_path(&route.path, param))
            .collect();
        if !bases.is_empty() {
            return bases;
        }
    }

    let statics: Vec<(&str, usize)> = routes
        .iter()
        .filter(|route| !route.path.contains(':'))
        .map(|route| (route.path.as_str(), segments(&route.path).len()))
        .collect();
    let Some(minimal) = statics.iter().map(|(_, count)| *count).min() else {
        return BTreeSet::new();
    };
    if minimal > 1 {
        return BTreeSet::new();
    }

    statics
        .into_iter()
        .filter(|(_, count)| *count == minimal)
        .map(|(path, _)| path.to_string())
        .collect()
}

/// Classify `route` against the canonical base paths.
pub fn determine_route_kind(
    route: &IrRoute,
    identity_param: Option<&str>,
    canonical: &BTreeSet<String>,
) -> RouteKind {
    let identity_base = identity_param.and_then(|param| identity_base_path(&route.path, param));
    if identity_base.is_some_and(|base| canonical.contains(&base)) {
        return match route.method {
            HttpMethod::Get => RouteKind::Get,
            HttpMethod::Put | HttpMethod::Patch => RouteKind::Update,
            HttpMethod::Delete => RouteKind::Remove,
            HttpMethod::Post => RouteKind::Custom,
        };
    }

    if !canonical.contains(&route.path) {
        return RouteKind::Custom;
    }
    match route.method {
        HttpMethod::Get => RouteKind::List,
        HttpMethod::Post => RouteKind::Create,
        _ => RouteKind::Custom,
    }
}

/// Classify every route of a resource, in route order.
pub fn classify_routes(routes: &[IrRoute], identity_param: Option<&str>) -> Vec<RouteKind> {
    let canonical = canonical_base_paths(routes, identity_param);
    routes
        .iter()
        .map(|route| determine_route_kind(route, identity_param, &canonical))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(method: HttpMethod, path: &str) -> IrRoute {
        IrRoute {
            method,
            path: path.to_string(),
            capability: None,
            hash: String::new(),
        }
    }

    #[test]
    fn test_classifies_crud_routes() {
        let routes = [
            route(HttpMethod::Get, "/acme/v1/jobs"),
            route(HttpMethod::Get, "/acme/v1/jobs/:id"),
            route(HttpMethod::Post, "/acme/v1/jobs"),
            route(HttpMethod::Patch, "/acme/v1/jobs/:id"),
            route(HttpMethod::Delete, "/acme/v1/jobs/:id"),
            route(HttpMethod::Post, "/acme/v1/jobs/:id/publish"),
        ];

        assert_eq!(
            classify_routes(&routes, Some("id")),
            vec![
                RouteKind::List,
                RouteKind::Get,
                RouteKind::Create,
                RouteKind::Update,
                RouteKind::Remove,
                RouteKind::Custom,
            ]
        );
    }

    #[test]
    fn test_static_routes_without_identity() {
        let routes = [
            route(HttpMethod::Get, "/settings"),
            route(HttpMethod::Put, "/settings"),
        ];
        let canonical = canonical_base_paths(&routes, None);
        assert_eq!(canonical.into_iter().collect::<Vec<_>>(), vec!["/settings"]);
        assert_eq!(
            classify_routes(&routes, None),
            vec![RouteKind::List, RouteKind::Custom]
        );
    }

    #[test]
    fn test_deep_static_routes_are_custom_without_identity() {
        let routes = [route(HttpMethod::Get, "/acme/v1/settings")];
        assert!(canonical_base_paths(&routes, None).is_empty());
        assert_eq!(classify_routes(&routes, None), vec![RouteKind::Custom]);
    }

    #[test]
    fn test_mutation_tags() {
        assert_eq!(RouteKind::Remove.mutation(), Some("delete"));
        assert_eq!(RouteKind::List.mutation(), None);
        assert!(RouteKind::Update.uses_identity());
        assert!(!RouteKind::Create.uses_identity());
    }
}
