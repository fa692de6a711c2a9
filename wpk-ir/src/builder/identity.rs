use serde_json::json;
use wpkernel_config::IdentityConfig;

use crate::{IrIdentity, IrRoute, IrWarning};

/// Placeholders that map onto a default identity, in priority order.
const PLACEHOLDER_PRIORITY: &[&str] = &["id", "slug", "uuid"];

/// Outcome of identity resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct IdentityResolution {
    pub identity: Option<IrIdentity>,
    pub warning: Option<IrWarning>,
}

/// Resolve a resource identity, inferring it from route placeholders when the
/// config does not declare one.
pub fn resolve_identity(
    resource: &str,
    provided: Option<&IdentityConfig>,
    routes: &[IrRoute],
) -> IdentityResolution {
    if let Some(provided) = provided {
        let param = provided.param().to_string();
        let identity = match provided {
            IdentityConfig::Number { .. } => IrIdentity::Number { param },
            IdentityConfig::String { .. } => IrIdentity::String { param },
        };
        return IdentityResolution {
            identity: Some(identity),
            warning: None,
        };
    }

    let Some(placeholder) = pick_route_placeholder(routes) else {
        return IdentityResolution {
            identity: None,
            warning: Some(IrWarning::new(
                "identity.inference.missing",
                format!(
                    "Unable to infer identity for resource \"{resource}\". Define resource.identity explicitly."
                ),
                Some(json!({ "resource": resource })),
            )),
        };
    };

    let Some(identity) = identity_from_placeholder(&placeholder) else {
        return IdentityResolution {
            identity: None,
            warning: Some(IrWarning::new(
                "identity.inference.unsupported",
                format!(
                    "Resource \"{resource}\" routes reference :{placeholder} but no default identity mapping exists."
                ),
                Some(json!({ "resource": resource, "placeholder": placeholder })),
            )),
        };
    };

    let kind = if identity.is_numeric() { "number" } else { "string" };
    let message = format!(
        "Resource \"{resource}\" missing identity; inferred {kind} parameter \"{}\" from routes.",
        identity.param()
    );
    IdentityResolution {
        identity: Some(identity),
        warning: Some(IrWarning::new(
            "identity.inference.applied",
            message,
            Some(json!({ "resource": resource, "placeholder": placeholder })),
        )),
    }
}

/// Pick the placeholder an identity should be inferred from.
///
/// Prefers `id`, then `slug`, then `uuid`; otherwise the first placeholder
/// seen in route order.
pub fn pick_route_placeholder(routes: &[IrRoute]) -> Option<String> {
    let mut seen: Vec<String> = Vec::new();
    for route in routes {
        for placeholder in route.placeholders() {
            let token = placeholder.to_ascii_lowercase();
            if !seen.contains(&token) {
                seen.push(token);
            }
        }
    }

    PLACEHOLDER_PRIORITY
        .iter()
        .find(|candidate| seen.iter().any(|token| token == *candidate))
        .map(|candidate| candidate.to_string())
        .or_else(|| seen.into_iter().next())
}

fn identity_from_placeholder(placeholder: &str) -> Option<IrIdentity> {
    match placeholder {
        "id" => Some(IrIdentity::Number {
            param: "id".to_string(),
        }),
        "slug" | "uuid" => Some(IrIdentity::String {
            param: placeholder.to_string(),
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use wpkernel_config::HttpMethod;

    use super::*;

    fn route(path: &str) -> IrRoute {
        IrRoute {
            method: HttpMethod::Get,
            path: path.to_string(),
            capability: None,
            hash: String::new(),
        }
    }

    #[test]
    fn test_explicit_identity_gets_default_param() {
        let resolved = resolve_identity(
            "book",
            Some(&IdentityConfig::String { param: None }),
            &[route("/acme/v1/books/:slug")],
        );
        assert_eq!(
            resolved.identity,
            Some(IrIdentity::String {
                param: "slug".into()
            })
        );
        assert!(resolved.warning.is_none());
    }

    #[test]
    fn test_inference_prefers_id_over_slug() {
        let routes = [route("/acme/v1/books/:slug"), route("/acme/v1/books/:id")];
        let resolved = resolve_identity("book", None, &routes);

        assert_eq!(
            resolved.identity,
            Some(IrIdentity::Number { param: "id".into() })
        );
        let warning = resolved.warning.unwrap();
        assert_eq!(warning.code, "identity.inference.applied");
        assert!(warning.message.contains("inferred number parameter \"id\""));
    }

    #[test]
    fn test_inference_missing_without_placeholders() {
        let resolved = resolve_identity("book", None, &[route("/acme/v1/books")]);
        assert!(resolved.identity.is_none());
        assert_eq!(resolved.warning.unwrap().code, "identity.inference.missing");
    }

    #[test]
    fn test_inference_unsupported_placeholder() {
        let resolved = resolve_identity("book", None, &[route("/acme/v1/books/:isbn")]);
        assert!(resolved.identity.is_none());
        let warning = resolved.warning.unwrap();
        assert_eq!(warning.code, "identity.inference.unsupported");
        assert_eq!(
            warning.context,
            Some(json!({ "resource": "book", "placeholder": "isbn" }))
        );
    }
}
