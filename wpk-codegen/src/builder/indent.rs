/// One level of indentation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Indent {
    /// WordPress coding standards.
    #[default]
    Tab,
    /// Two or four spaces; any other width renders as four.
    Spaces(u8),
}

impl Indent {
    pub fn unit(self) -> &'static str {
        match self {
            Self::Tab => "\t",
            Self::Spaces(2) => "  ",
            Self::Spaces(_) => "    ",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_units() {
        assert_eq!(Indent::default().unit(), "\t");
        assert_eq!(Indent::Spaces(2).unit(), "  ");
        assert_eq!(Indent::Spaces(3).unit(), "    ");
    }
}
