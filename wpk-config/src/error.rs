use std::path::PathBuf;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Result type for config operations (boxed to reduce size on stack)
pub type Result<T> = std::result::Result<T, Box<Error>>;

/// Source context for error reporting.
///
/// Encapsulates the source content and filename, reducing parameter passing
/// in error factory functions.
///
/// # Example
///
/// ```ignore
/// let ctx = SourceContext::new(content, "wpk.config.toml");
/// ctx.validation_error("resource 'book' defines no routes");
/// ctx.unknown_schema_error("book", "book-schema");
/// ```
#[derive(Debug, Clone)]
pub struct SourceContext {
    src: String,
    filename: String,
}

impl SourceContext {
    /// Create a new source context.
    pub fn new(src: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            filename: filename.into(),
        }
    }

    /// Get the source content.
    pub fn src(&self) -> &str {
        &self.src
    }

    /// Get the filename.
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Create a NamedSource for miette error reporting.
    pub fn named_source(&self) -> NamedSource<String> {
        NamedSource::new(&self.filename, self.src.clone())
    }

    /// Find the span of a config key in the source.
    ///
    /// Looks for TOML table headers (`[resources.book]`), dotted keys and
    /// quoted JSON keys. Returns `None` rather than guessing.
    pub fn find_span(&self, key: &str) -> Option<SourceSpan> {
        find_key_span(&self.src, key)
    }

    /// Create a parse error from a toml error.
    pub fn parse_error(&self, source: toml::de::Error) -> Box<Error> {
        let span = source.span().map(SourceSpan::from);
        Box::new(Error::Parse {
            src: self.named_source(),
            span,
            source,
        })
    }

    /// Create a parse error from a JSON error.
    pub fn json_error(&self, source: serde_json::Error) -> Box<Error> {
        let span = offset_for(&self.src, source.line(), source.column())
            .map(|offset| SourceSpan::from((offset, 1)));
        Box::new(Error::Json {
            src: self.named_source(),
            span,
            source,
        })
    }

    /// Create a validation error without a span.
    pub fn validation_error(&self, message: impl Into<String>) -> Box<Error> {
        Box::new(Error::Validation {
            src: self.named_source(),
            span: None,
            message: message.into(),
        })
    }

    /// Create a validation error pointing at `key` when it can be located.
    pub fn validation_error_at_key(&self, message: impl Into<String>, key: &str) -> Box<Error> {
        Box::new(Error::Validation {
            src: self.named_source(),
            span: self.find_span(key),
            message: message.into(),
        })
    }

    /// Create an unknown schema reference error.
    pub fn unknown_schema_error(
        &self,
        resource: impl Into<String>,
        schema: impl Into<String>,
    ) -> Box<Error> {
        let schema = schema.into();
        Box::new(Error::UnknownSchema {
            src: self.named_source(),
            span: self.find_span(&schema),
            resource: resource.into(),
            schema,
        })
    }
}

#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("failed to read '{path}'")]
    #[diagnostic(help("run 'wpk generate --config <path>' with an existing kernel config"))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported config format for '{path}'")]
    #[diagnostic(
        code(wpk::unsupported_format),
        help("kernel configs must be .toml or .json files")
    )]
    UnsupportedFormat { path: PathBuf },

    #[error("failed to parse kernel config")]
    #[diagnostic(code(wpk::parse_error))]
    Parse {
        #[source_code]
        src: NamedSource<String>,
        #[label("parse error here")]
        span: Option<SourceSpan>,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to parse kernel config")]
    #[diagnostic(code(wpk::json_error))]
    Json {
        #[source_code]
        src: NamedSource<String>,
        #[label("parse error here")]
        span: Option<SourceSpan>,
        #[source]
        source: serde_json::Error,
    },

    #[error("{message}")]
    #[diagnostic(code(wpk::validation_error))]
    Validation {
        #[source_code]
        src: NamedSource<String>,
        #[label("{message}")]
        span: Option<SourceSpan>,
        message: String,
    },

    #[error("resource '{resource}' references unknown schema '{schema}'")]
    #[diagnostic(
        code(wpk::unknown_schema),
        help("declare it under [schemas.{schema}] or use schema = \"auto\"")
    )]
    UnknownSchema {
        #[source_code]
        src: NamedSource<String>,
        #[label("referenced here")]
        span: Option<SourceSpan>,
        resource: String,
        schema: String,
    },

    #[error("invalid schema file '{path}': {message}")]
    #[diagnostic(
        code(wpk::schema_file),
        help("schema paths are resolved relative to the config file and must contain a JSON object")
    )]
    SchemaFile { path: PathBuf, message: String },
}

/// Find the span of a key in TOML or JSON source.
pub(crate) fn find_key_span(src: &str, key: &str) -> Option<SourceSpan> {
    // `[resources.book]`, `[resources.book.routes]`
    let dotted = [format!(".{key}]"), format!(".{key}.")];
    for pattern in &dotted {
        if let Some(pos) = src.find(pattern) {
            return Some(SourceSpan::from((pos + 1, key.len())));
        }
    }

    // `"book": {` in JSON, `schema = "book"` in TOML
    let quoted = format!("\"{key}\"");
    if let Some(pos) = src.find(&quoted) {
        return Some(SourceSpan::from((pos + 1, key.len())));
    }

    None
}

/// Convert a 1-based line/column pair into a byte offset.
fn offset_for(src: &str, line: usize, column: usize) -> Option<usize> {
    if line == 0 {
        return None;
    }
    let mut offset = 0;
    for (index, text) in src.split_inclusive('\n').enumerate() {
        if index + 1 == line {
            let column = column.saturating_sub(1).min(text.len());
            return Some(offset + column);
        }
        offset += text.len();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_key_span_table_header() {
        let src = "namespace = \"acme\"\n[resources.book]\nname = \"book\"\n";
        let span = find_key_span(src, "book").unwrap();
        assert_eq!(&src[span.offset()..span.offset() + span.len()], "book");
        assert_eq!(span.offset(), src.find("book]").unwrap());
    }

    #[test]
    fn test_find_key_span_json_key() {
        let src = r#"{ "resources": { "book": {} } }"#;
        let span = find_key_span(src, "book").unwrap();
        assert_eq!(span.offset(), 18);
    }

    #[test]
    fn test_find_key_span_missing() {
        assert!(find_key_span("namespace = \"acme\"", "book").is_none());
    }

    #[test]
    fn test_offset_for_line_and_column() {
        let src = "{\n  \"a\": 1,\n}";
        assert_eq!(offset_for(src, 1, 1), Some(0));
        assert_eq!(offset_for(src, 2, 3), Some(4));
        assert_eq!(offset_for(src, 9, 1), None);
        assert_eq!(offset_for(src, 0, 0), None);
    }
}
