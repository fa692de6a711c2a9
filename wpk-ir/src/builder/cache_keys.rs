use wpkernel_config::{CacheKeysConfig, CacheSegment, RouteOperation, RouteSet};

use crate::{CacheKeySource, IrCacheKey, IrCacheKeys};

/// Default cache key of an operation: `[name, operation, token]`.
///
/// Collection-level operations use `{}` (the empty query), item-level ones
/// the identity token.
pub fn default_cache_key(name: &str, operation: RouteOperation) -> Vec<CacheSegment> {
    let token = if operation.is_item_level() {
        CacheSegment::IDENTITY_TOKEN
    } else {
        "{}"
    };
    vec![
        CacheSegment::text(name),
        CacheSegment::text(operation.as_str()),
        CacheSegment::text(token),
    ]
}

/// Derive cache keys, letting config segments override the defaults.
///
/// `list` and `get` keys always exist; mutation keys exist when the resource
/// declares the route or the config provides segments for it.
pub fn derive_cache_keys(
    name: &str,
    config: Option<&CacheKeysConfig>,
    routes: &RouteSet,
) -> IrCacheKeys {
    let resolve = |operation: RouteOperation| -> IrCacheKey {
        match config.and_then(|keys| keys.get(operation)) {
            Some(segments) => IrCacheKey {
                segments: segments.to_vec(),
                source: CacheKeySource::Config,
            },
            None => IrCacheKey {
                segments: default_cache_key(name, operation),
                source: CacheKeySource::Default,
            },
        }
    };
    let optional = |operation: RouteOperation| -> Option<IrCacheKey> {
        let configured = config.and_then(|keys| keys.get(operation)).is_some();
        (configured || routes.get(operation).is_some()).then(|| resolve(operation))
    };

    IrCacheKeys {
        list: resolve(RouteOperation::List),
        get: resolve(RouteOperation::Get),
        create: optional(RouteOperation::Create),
        update: optional(RouteOperation::Update),
        remove: optional(RouteOperation::Remove),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_cache_keys() {
        let routes: RouteSet = toml::from_str(
            r#"
            list = { path = "/acme/v1/books", method = "GET" }
            remove = { path = "/acme/v1/books/:id", method = "DELETE" }
            "#,
        )
        .unwrap();

        let keys = derive_cache_keys("book", None, &routes);

        assert_eq!(
            keys.list.segments,
            vec![
                CacheSegment::text("book"),
                CacheSegment::text("list"),
                CacheSegment::text("{}")
            ]
        );
        assert_eq!(keys.get.segments[2], CacheSegment::text("{id}"));
        assert_eq!(keys.get.source, CacheKeySource::Default);
        assert!(keys.create.is_none());
        assert!(keys.update.is_none());
        assert_eq!(keys.remove.unwrap().segments[1], CacheSegment::text("remove"));
    }

    #[test]
    fn test_config_segments_override_defaults() {
        let config: CacheKeysConfig =
            serde_json::from_str(r#"{ "get": ["books", "item", "{id}"], "create": ["books"] }"#)
                .unwrap();

        let keys = derive_cache_keys("book", Some(&config), &RouteSet::default());

        assert_eq!(keys.get.source, CacheKeySource::Config);
        assert_eq!(keys.get.segments[0], CacheSegment::text("books"));
        let create = keys.create.unwrap();
        assert_eq!(create.source, CacheKeySource::Config);
        assert_eq!(create.segments, vec![CacheSegment::text("books")]);
    }
}
