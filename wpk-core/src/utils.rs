//! Shared utility functions for code generation.

/// Convert a string to PascalCase (e.g., "job-posting" -> "JobPosting")
///
/// Every run of non-alphanumeric characters separates words. The remainder of
/// each word keeps its original casing, so "jobPosting" becomes "JobPosting".
pub fn to_pascal_case(s: &str) -> String {
    s.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                None => String::new(),
                Some(c) => c.to_uppercase().chain(chars).collect(),
            }
        })
        .collect()
}

/// Convert a string to camelCase (e.g., "job-posting" -> "jobPosting")
pub fn to_camel_case(s: &str) -> String {
    let pascal = to_pascal_case(s);
    let mut chars = pascal.chars();
    match chars.next() {
        None => String::new(),
        Some(c) => c.to_lowercase().chain(chars).collect(),
    }
}

/// Convert a string to snake_case (e.g., "SomeValue" -> "some_value")
///
/// Runs of non-alphanumeric characters collapse into a single underscore, a
/// lowercase letter or digit followed by an uppercase letter starts a new word,
/// and leading/trailing separators are dropped.
pub fn to_snake_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut prev: Option<char> = None;

    for c in s.chars() {
        if !c.is_ascii_alphanumeric() {
            if !result.is_empty() && !result.ends_with('_') {
                result.push('_');
            }
            prev = None;
            continue;
        }

        let starts_word = c.is_ascii_uppercase()
            && prev.is_some_and(|p| p.is_ascii_lowercase() || p.is_ascii_digit());
        if starts_word && !result.ends_with('_') {
            result.push('_');
        }

        result.push(c.to_ascii_lowercase());
        prev = Some(c);
    }

    while result.ends_with('_') {
        result.pop();
    }

    result
}

/// Convert a string to a human title (e.g., "job-posting" -> "Job Posting")
pub fn to_title_case(s: &str) -> String {
    s.split(['-', '_', ':'])
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                None => String::new(),
                Some(c) => c.to_uppercase().chain(chars).collect(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Lowercase a string and replace every run of non-alphanumeric characters with
/// a single underscore (e.g., "Acme Demo!" -> "acme_demo").
pub fn to_underscore_slug(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        if c.is_ascii_alphanumeric() {
            result.push(c.to_ascii_lowercase());
        } else if !result.is_empty() && !result.ends_with('_') {
            result.push('_');
        }
    }
    while result.ends_with('_') {
        result.pop();
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_pascal_case() {
        assert_eq!(to_pascal_case("hello"), "Hello");
        assert_eq!(to_pascal_case("hello_world"), "HelloWorld");
        assert_eq!(to_pascal_case("job-posting"), "JobPosting");
        assert_eq!(to_pascal_case("jobPosting"), "JobPosting");
        assert_eq!(to_pascal_case(""), "");
    }

    #[test]
    fn test_to_camel_case() {
        assert_eq!(to_camel_case("job-posting"), "jobPosting");
        assert_eq!(to_camel_case("Book"), "book");
        assert_eq!(to_camel_case(""), "");
    }

    #[test]
    fn test_to_snake_case() {
        assert_eq!(to_snake_case("SomeValue"), "some_value");
        assert_eq!(
            to_snake_case("value-with  punctuation"),
            "value_with_punctuation"
        );
        assert_eq!(
            to_snake_case("__Leading_andTrailing__"),
            "leading_and_trailing"
        );
        assert_eq!(to_snake_case("HTTPServer"), "httpserver");
        assert_eq!(to_snake_case("version2Update"), "version2_update");
        assert_eq!(to_snake_case(""), "");
    }

    #[test]
    fn test_to_title_case() {
        assert_eq!(to_title_case("job-posting"), "Job Posting");
        assert_eq!(to_title_case("auto:book"), "Auto Book");
    }

    #[test]
    fn test_to_underscore_slug() {
        assert_eq!(to_underscore_slug("Acme Demo!"), "acme_demo");
        assert_eq!(to_underscore_slug("--book--"), "book");
    }
}
