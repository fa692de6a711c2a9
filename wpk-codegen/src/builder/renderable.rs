/// A piece of line-oriented output. Nesting depth comes from [`Block`]s.
///
/// [`Block`]: CodeFragment::Block
#[derive(Debug, Clone, PartialEq)]
pub enum CodeFragment {
    Line(String),
    Blank,
    /// `header`, then `body` one level deeper, then `close` if any.
    Block {
        header: String,
        body: Vec<CodeFragment>,
        close: Option<String>,
    },
    /// `/** ... */`, one entry per line; empty entries print as ` *`.
    DocBlock(Vec<String>),
}

impl CodeFragment {
    pub fn line(text: impl Into<String>) -> Self {
        Self::Line(text.into())
    }

    pub fn blank() -> Self {
        Self::Blank
    }

    pub fn block(header: impl Into<String>, body: Vec<CodeFragment>, close: Option<String>) -> Self {
        Self::Block {
            header: header.into(),
            body,
            close,
        }
    }

    pub fn docblock<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::DocBlock(lines.into_iter().map(Into::into).collect())
    }
}

/// AST nodes that print as [`CodeFragment`]s.
pub trait Renderable {
    fn to_fragments(&self) -> Vec<CodeFragment>;
}

impl<T: Renderable + ?Sized> Renderable for &T {
    fn to_fragments(&self) -> Vec<CodeFragment> {
        (**self).to_fragments()
    }
}

impl<T: Renderable> Renderable for [T] {
    fn to_fragments(&self) -> Vec<CodeFragment> {
        self.iter().flat_map(Renderable::to_fragments).collect()
    }
}

impl<T: Renderable> Renderable for Vec<T> {
    fn to_fragments(&self) -> Vec<CodeFragment> {
        self.as_slice().to_fragments()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo(&'static str);

    impl Renderable for Echo {
        fn to_fragments(&self) -> Vec<CodeFragment> {
            vec![CodeFragment::line(format!("echo '{}';", self.0))]
        }
    }

    #[test]
    fn test_sequences_concatenate() {
        let nodes = vec![Echo("a"), Echo("b")];
        assert_eq!(
            nodes.to_fragments(),
            vec![CodeFragment::line("echo 'a';"), CodeFragment::line("echo 'b';")]
        );
        assert_eq!((&nodes[..1]).to_fragments().len(), 1);
    }
}
