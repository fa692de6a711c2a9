//! Per-resource REST controller classes.

use std::collections::BTreeMap;

use wpkernel_core::{to_pascal_case, to_snake_case, to_underscore_slug};
use wpkernel_ir::{Ir, IrIdentity, IrResource, IrStorage};

use crate::ast::build::{self, Result};
use crate::ast::{ArrayItem, ClassMethod, DocComment, Expr, PhpFile};
use crate::metadata::{ResourceControllerMetadata, WP_POST_MUTATION_KEYS};
use crate::routes::{RouteContext, RouteKind, build_route_statements, storage_helper_methods};

/// Docblock placed at the top of every generated PHP file.
pub const GENERATED_HEADER: &str = "Generated by wpk. Do not edit.";

/// A composed controller and what it was composed from.
#[derive(Debug, Clone)]
pub struct ResourceController {
    pub class_name: String,
    pub namespace: String,
    pub file: PhpFile,
    pub metadata: ResourceControllerMetadata,
}

/// `{Php\Namespace}\Rest`
pub fn rest_namespace(ir: &Ir) -> String {
    format!("{}\\Rest", ir.php.namespace)
}

/// Split a kernel route path into a REST namespace and a WordPress route
/// pattern: `/acme/v1/jobs/:id` becomes `acme/v1` and `/jobs/(?P<id>\d+)`.
pub fn rest_route(path: &str, identity: Option<&IrIdentity>) -> (String, String) {
    let segments: Vec<&str> = path.split('/').filter(|segment| !segment.is_empty()).collect();
    let split = if segments.len() > 2 { 2 } else { segments.len().min(1) };
    let (namespace, rest) = segments.split_at(split);

    let route = rest
        .iter()
        .map(|segment| match segment.strip_prefix(':') {
            Some(param) => {
                let numeric = identity
                    .is_some_and(|identity| identity.param() == param && identity.is_numeric());
                let pattern = if numeric { "\\d+" } else { "[^/]+" };
                format!("(?P<{param}>{pattern})")
            }
            None => segment.to_string(),
        })
        .collect::<Vec<_>>()
        .join("/");

    (namespace.join("/"), format!("/{route}"))
}

fn returning(name: &str, returns: &str, value: Expr) -> Result<ClassMethod> {
    Ok(build::method(name)?.returns(returns).body(vec![build::ret(value)]))
}

fn rest_args(resource: &IrResource) -> Vec<ArrayItem> {
    let mut args = Vec::new();
    if let Some(identity) = &resource.identity {
        let ty = if identity.is_numeric() { "integer" } else { "string" };
        args.push(build::keyed(
            identity.param(),
            build::array(vec![build::keyed("type", build::string(ty))]),
        ));
    }

    for (name, param) in resource.query_params.iter().flatten() {
        let mut schema = vec![
            build::keyed("type", build::string("string")),
            build::keyed("required", build::bool(!param.optional)),
        ];
        if let Some(values) = &param.values {
            schema.push(build::keyed(
                "enum",
                build::string_list(values.iter().map(String::as_str)),
            ));
        }
        if let Some(description) = &param.description {
            schema.push(build::keyed("description", build::string(description.as_str())));
        }
        args.push(build::keyed(name.as_str(), build::array(schema)));
    }
    args
}

/// Name handlers `handle_{kind}`, suffixing repeats with their ordinal.
fn handler_names(kinds: &[RouteKind]) -> Vec<String> {
    let mut seen: BTreeMap<RouteKind, usize> = BTreeMap::new();
    kinds
        .iter()
        .map(|kind| {
            let count = seen.entry(*kind).or_default();
            *count += 1;
            if *count == 1 {
                format!("handle_{kind}")
            } else {
                format!("handle_{kind}_{count}")
            }
        })
        .collect()
}

fn uses(ir: &Ir, resource: &IrResource) -> Result<Vec<crate::ast::Name>> {
    let mut names = vec![
        format!("{}\\Policy\\Policy", ir.php.namespace),
        "WP_Error".to_string(),
        "WP_REST_Request".to_string(),
    ];
    match &resource.storage {
        Some(IrStorage::WpPost(_)) => {
            names.push("WP_Post".to_string());
            names.push("WP_Query".to_string());
        }
        Some(IrStorage::WpTaxonomy { .. }) => names.push("WP_Term".to_string()),
        _ => {}
    }
    names.sort();
    names.iter().map(|name| build::name(name)).collect()
}

/// `{Pascal}Controller`
pub fn controller_class_name(resource: &IrResource) -> String {
    format!("{}Controller", to_pascal_case(&resource.name))
}

/// Compose `{Pascal}Controller` for `resource`.
pub fn build_resource_controller(ir: &Ir, resource: &IrResource) -> Result<ResourceController> {
    let pascal = to_pascal_case(&resource.name);
    let class_name = controller_class_name(resource);
    let key_prefix = format!(
        "{}_{}",
        to_underscore_slug(&ir.meta.sanitized_namespace),
        to_snake_case(&resource.name)
    );
    let mut metadata = ResourceControllerMetadata::for_resource(resource);
    let identity = resource.identity.as_ref();

    let kinds: Vec<RouteKind> = metadata.routes.iter().map(|route| route.kind).collect();
    let names = handler_names(&kinds);

    let mut routes = Vec::new();
    let mut handlers = Vec::new();
    for ((route, kind), name) in resource.routes.iter().zip(kinds).zip(&names) {
        let (namespace, pattern) = rest_route(&route.path, identity);
        routes.push(build::item(build::array(vec![
            build::keyed("namespace", build::string(namespace)),
            build::keyed("route", build::string(pattern)),
            build::keyed("methods", build::string(route.method.as_str())),
            build::keyed("callback", build::string(name.as_str())),
        ])));

        let mut doc = vec![
            format!("Handle [{}] {}.", route.method, route.path),
            String::new(),
            format!("@wp-kernel route-kind {kind}"),
        ];
        let tags = metadata
            .routes
            .iter()
            .find(|meta| meta.method == route.method && meta.path == route.path)
            .and_then(|meta| meta.tags.clone())
            .unwrap_or_default();
        for (tag, value) in tags {
            doc.push(format!("@wp-kernel {tag} {value}"));
        }
        doc.push("@param WP_REST_Request $request Request instance.".to_string());
        doc.push("@return mixed".to_string());

        let mut stmts = Vec::new();
        if let Some(capability) = &route.capability {
            stmts.extend(crate::macros::capability_guard(capability)?);
            stmts.push(crate::ast::Stmt::blank());
        }
        let ctx = RouteContext {
            resource,
            pascal: &pascal,
            route,
            kind,
        };
        stmts.extend(build_route_statements(&ctx, &WP_POST_MUTATION_KEYS, &mut metadata)?);

        handlers.push(
            build::method(name)?
                .doc(DocComment::new(doc))
                .param(build::typed_param("WP_REST_Request", "request")?)
                .body(stmts),
        );
    }

    let class = build::class(&class_name)?
        .final_()
        .extends(build::name("BaseController")?)
        .doc(build::doc([format!(
            "REST controller for the `{}` resource.",
            resource.name
        )]))
        .method(returning(
            "get_resource_name",
            "string",
            build::string(resource.name.as_str()),
        )?)
        .method(returning(
            "get_schema_key",
            "string",
            build::string(resource.schema_key.as_str()),
        )?)
        .method(returning("get_rest_args", "array", build::array(rest_args(resource)))?)
        .method(returning("get_routes", "array", build::array(routes))?)
        .methods(handlers)
        .methods(storage_helper_methods(resource, &pascal, &key_prefix)?);

    let namespace = rest_namespace(ir);
    let mut file = PhpFile::new()
        .doc(build::doc([GENERATED_HEADER]))
        .strict_types()
        .namespace(build::name(&namespace)?);
    for name in uses(ir, resource)? {
        file = file.uses(name);
    }

    Ok(ResourceController {
        class_name,
        namespace,
        file: file.stmt(crate::ast::Stmt::Class(class)),
        metadata,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::macros::count_markers;
    use crate::printer::Printer;
    use crate::test_support::jobs_ir;

    #[test]
    fn test_rest_route_patterns() {
        let numeric = IrIdentity::Number { param: "id".into() };
        assert_eq!(
            rest_route("/acme/v1/jobs/:id", Some(&numeric)),
            ("acme/v1".to_string(), "/jobs/(?P<id>\\d+)".to_string())
        );
        assert_eq!(
            rest_route("/acme/v1/drafts/:slug", None),
            ("acme/v1".to_string(), "/drafts/(?P<slug>[^/]+)".to_string())
        );
        assert_eq!(
            rest_route("/settings", None),
            ("settings".to_string(), "/".to_string())
        );
    }

    #[test]
    fn test_handler_names_are_unique() {
        assert_eq!(
            handler_names(&[RouteKind::List, RouteKind::Custom, RouteKind::Custom]),
            vec!["handle_list", "handle_custom", "handle_custom_2"]
        );
    }

    #[test]
    fn test_job_controller() {
        let ir = jobs_ir();
        let controller = build_resource_controller(&ir, ir.resource("job").unwrap()).unwrap();
        assert_eq!(controller.class_name, "JobController");

        let crate::ast::Stmt::Class(class) = &controller.file.stmts[0] else {
            panic!("expected a class statement");
        };
        assert!(class.is_final);
        let create = class.find_method("handle_create").unwrap();
        assert_eq!(count_markers(&create.stmts), 9);
        assert_eq!(count_markers(&class.find_method("handle_remove").unwrap().stmts), 0);
        assert!(class.find_method("syncJobMeta").is_some());

        let printed = Printer::new().print_file(&controller.file);
        assert!(printed.contains("final class JobController extends BaseController {"));
        assert!(printed.contains("\t * @wp-kernel resource.wpPost.mutation create\n"));
        assert!(printed.contains("$permission = Policy::enforce( 'job.create', $request );"));
        assert!(printed.contains("use WP_Query;\n"));
        assert!(printed.contains("'route' => '/jobs/(?P<id>\\\\d+)',"));
    }

    #[test]
    fn test_resources_without_support_get_stubs() {
        let ir = jobs_ir();
        let controller = build_resource_controller(&ir, ir.resource("settings").unwrap()).unwrap();
        let printed = Printer::new().print_file(&controller.file);

        assert!(printed.contains("private function getSettingsOptionName(): string {"));
        assert!(printed.contains("$permission = Policy::enforce( 'settings.manage', $request );"));
        assert!(!printed.contains("Not Implemented"));
    }
}
