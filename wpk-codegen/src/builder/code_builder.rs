use super::{CodeFragment, Indent, Renderable};

/// Accumulates indented source text from [`CodeFragment`]s.
///
/// ```
/// use wpkernel_codegen::builder::{CodeBuilder, CodeFragment};
///
/// let mut builder = CodeBuilder::php();
/// builder.apply(CodeFragment::block(
///     "function wpk_boot() {",
///     vec![CodeFragment::line("return true;")],
///     Some("}".to_string()),
/// ));
///
/// assert_eq!(builder.build(), "function wpk_boot() {\n\treturn true;\n}\n");
/// ```
#[derive(Debug, Clone, Default)]
pub struct CodeBuilder {
    depth: usize,
    indent: Indent,
    out: String,
}

impl CodeBuilder {
    pub fn new(indent: Indent) -> Self {
        Self {
            depth: 0,
            indent,
            out: String::new(),
        }
    }

    /// Tab-indented builder for WordPress PHP.
    pub fn php() -> Self {
        Self::new(Indent::Tab)
    }

    /// Render `node` at the current depth.
    pub fn emit(&mut self, node: &impl Renderable) -> &mut Self {
        for fragment in node.to_fragments() {
            self.apply(fragment);
        }
        self
    }

    pub fn apply(&mut self, fragment: CodeFragment) {
        match fragment {
            CodeFragment::Line(text) => self.write_line(&text),
            CodeFragment::Blank => self.out.push('\n'),
            CodeFragment::Block { header, body, close } => {
                self.write_line(&header);
                self.depth += 1;
                for inner in body {
                    self.apply(inner);
                }
                self.depth -= 1;
                if let Some(close) = close {
                    self.write_line(&close);
                }
            }
            CodeFragment::DocBlock(lines) => {
                self.write_line("/**");
                for line in &lines {
                    if line.is_empty() {
                        self.write_line(" *");
                    } else {
                        self.write_line(&format!(" * {line}"));
                    }
                }
                self.write_line(" */");
            }
        }
    }

    pub fn build(self) -> String {
        self.out
    }

    fn write_line(&mut self, text: &str) {
        let unit = self.indent.unit();
        for _ in 0..self.depth {
            self.out.push_str(unit);
        }
        self.out.push_str(text);
        self.out.push('\n');
    }
}
