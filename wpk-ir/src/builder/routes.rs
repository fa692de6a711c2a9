//! Route normalisation.

use std::collections::HashMap;

use serde_json::json;
use wpkernel_config::{HttpMethod, RouteOperation, RouteSet};

use crate::{IrError, IrRoute, Result, canonical::hash_canonical};

/// Path prefixes owned by WordPress core.
pub const RESERVED_ROUTE_PREFIXES: &[&str] = &["/wp/v2", "/wp-json", "/oembed/1.0", "/wp-site-health"];

/// Tracks `METHOD path` pairs across every resource of a config.
#[derive(Debug, Default)]
pub struct RouteRegistry {
    seen: HashMap<(HttpMethod, String), String>,
}

impl RouteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn claim(&mut self, resource: &str, operation: RouteOperation, route: &IrRoute) -> Result<()> {
        let key = (route.method, route.path.clone());
        if let Some(owner) = self.seen.get(&key) {
            return Err(IrError::developer(
                resource,
                format!("routes.{operation}"),
                format!(
                    "{} {} is already declared by resource '{owner}'",
                    route.method, route.path
                ),
            ));
        }
        self.seen.insert(key, resource.to_string());
        Ok(())
    }
}

/// Normalise a route path.
///
/// Trims whitespace, forces a leading slash, collapses repeated slashes and
/// strips trailing ones. Absolute URLs, parent-directory segments and
/// WordPress core prefixes are rejected.
pub fn normalise_route_path(path: &str) -> std::result::Result<String, String> {
    let trimmed = path.trim();
    if trimmed.is_empty() {
        return Err("route path must not be empty".to_string());
    }

    let lower = trimmed.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        return Err(format!("route path '{trimmed}' must be relative, not an absolute URL"));
    }

    let segments: Vec<&str> = trimmed.split('/').filter(|s| !s.is_empty()).collect();
    if segments.contains(&"..") {
        return Err(format!("route path '{trimmed}' must not contain '../' segments"));
    }

    let normalised = format!("/{}", segments.join("/"));

    for prefix in RESERVED_ROUTE_PREFIXES {
        let reserved = normalised == *prefix
            || normalised
                .strip_prefix(prefix)
                .is_some_and(|rest| rest.starts_with('/'));
        if reserved {
            return Err(format!(
                "route path '{normalised}' uses the reserved WordPress prefix '{prefix}'"
            ));
        }
    }

    Ok(normalised)
}

/// Normalise every route of a resource, sorted by method then path.
pub fn build_routes(
    resource: &str,
    routes: &RouteSet,
    registry: &mut RouteRegistry,
) -> Result<Vec<IrRoute>> {
    let mut normalised = Vec::new();

    for (operation, route) in routes.iter() {
        let path = normalise_route_path(&route.path).map_err(|message| {
            IrError::developer(resource, format!("routes.{operation}.path"), message)
        })?;

        let capability = route
            .capability
            .as_deref()
            .map(str::trim)
            .filter(|capability| !capability.is_empty())
            .map(str::to_string);

        let hash = hash_canonical(&json!({
            "method": route.method,
            "path": path,
            "capability": capability,
        }));

        let ir_route = IrRoute {
            method: route.method,
            path,
            capability,
            hash,
        };
        registry.claim(resource, operation, &ir_route)?;
        normalised.push(ir_route);
    }

    normalised.sort_by(|a, b| {
        a.method
            .as_str()
            .cmp(b.method.as_str())
            .then_with(|| a.path.cmp(&b.path))
    });

    Ok(normalised)
}
