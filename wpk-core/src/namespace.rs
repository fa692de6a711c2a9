//! Plugin namespace handling.
//!
//! A kernel namespace is a lowercase kebab-case slug (e.g. `acme-demo`). It
//! doubles as the REST namespace prefix and as the seed for the generated PHP
//! namespace.

/// Words that cannot be used as a namespace on their own.
pub const RESERVED_NAMESPACES: &[&str] = &[
    "wp",
    "wordpress",
    "admin",
    "core",
    "system",
    "api",
    "rest",
    "ajax",
    "js",
    "css",
    "html",
    "http",
    "https",
    "www",
];

/// Namespace used when a slug yields no PHP segments.
pub const DEFAULT_PHP_NAMESPACE: &str = "WPKernel";

/// Sanitise a namespace into a lowercase kebab-case slug.
///
/// Returns `None` when the result is empty, reserved, does not start with a
/// letter, or falls outside 3..=50 characters.
pub fn sanitize_namespace(namespace: &str) -> Option<String> {
    let mut slug = String::with_capacity(namespace.len());
    for c in namespace.trim().to_lowercase().chars() {
        match c {
            'a'..='z' | '0'..='9' => slug.push(c),
            '-' | '_' | ' ' | '\t' | '\n' => {
                if !slug.ends_with('-') {
                    slug.push('-');
                }
            }
            _ => {}
        }
    }

    let slug = slug.trim_matches('-').to_string();

    if slug.is_empty() || RESERVED_NAMESPACES.contains(&slug.as_str()) {
        return None;
    }

    if !slug.starts_with(|c: char| c.is_ascii_lowercase()) {
        return None;
    }

    if !(3..=50).contains(&slug.len()) {
        return None;
    }

    Some(slug)
}

/// Convert a kebab-case namespace into a PHP namespace.
///
/// Segments are capitalised and joined with `\`. The segment `wp` is spelled
/// `WP`, and an adjacent `wp` + `kernel` pair collapses into `WPKernel`.
///
/// ```
/// use wpkernel_core::php_namespace;
///
/// assert_eq!(php_namespace("wp-kernel-cli-sample"), "WPKernel\\Cli\\Sample");
/// assert_eq!(php_namespace("acme-demo"), "Acme\\Demo");
/// ```
pub fn php_namespace(namespace: &str) -> String {
    let segments: Vec<&str> = namespace.split('-').filter(|s| !s.is_empty()).collect();

    let mut converted: Vec<String> = Vec::with_capacity(segments.len());
    let mut index = 0;
    while index < segments.len() {
        let segment = segments[index];
        let next = segments.get(index + 1);

        if segment.eq_ignore_ascii_case("wp") && next.is_some_and(|n| n.eq_ignore_ascii_case("kernel"))
        {
            converted.push(DEFAULT_PHP_NAMESPACE.to_string());
            index += 2;
            continue;
        }

        if segment.eq_ignore_ascii_case("wp") {
            converted.push("WP".to_string());
        } else {
            let mut chars = segment.chars();
            if let Some(first) = chars.next() {
                converted.push(first.to_uppercase().chain(chars).collect());
            }
        }
        index += 1;
    }

    if converted.is_empty() {
        return DEFAULT_PHP_NAMESPACE.to_string();
    }

    converted.join("\\")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_namespace() {
        assert_eq!(sanitize_namespace("acme-demo").as_deref(), Some("acme-demo"));
        assert_eq!(
            sanitize_namespace("  Acme_Demo  Plugin ").as_deref(),
            Some("acme-demo-plugin")
        );
        assert_eq!(sanitize_namespace("my--app!").as_deref(), Some("my-app"));
    }

    #[test]
    fn test_sanitize_namespace_rejects() {
        assert_eq!(sanitize_namespace(""), None);
        assert_eq!(sanitize_namespace("WP"), None);
        assert_eq!(sanitize_namespace("rest"), None);
        assert_eq!(sanitize_namespace("1plugin"), None);
        assert_eq!(sanitize_namespace("ab"), None);
        assert_eq!(sanitize_namespace(&"a".repeat(51)), None);
    }

    #[test]
    fn test_php_namespace() {
        assert_eq!(php_namespace("wp-kernel-cli-sample"), "WPKernel\\Cli\\Sample");
        assert_eq!(php_namespace("acme-demo"), "Acme\\Demo");
        assert_eq!(php_namespace("wp-tools"), "WP\\Tools");
        assert_eq!(php_namespace("kernel-wp"), "Kernel\\WP");
        assert_eq!(php_namespace("showcase"), "Showcase");
        assert_eq!(php_namespace(""), "WPKernel");
    }
}
