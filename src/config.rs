//! Parser configuration

/// Options shared by every parser layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParserConfig {
    /// Require the document to open with an `<?xml ...?>` declaration.
    pub strict_declaration: bool,
}

impl ParserConfig {
    /// Lenient configuration: the declaration is optional.
    pub const fn new() -> Self {
        ParserConfig {
            strict_declaration: false,
        }
    }

    /// Configuration that rejects documents without an `<?xml ...?>` declaration.
    pub const fn strict() -> Self {
        ParserConfig {
            strict_declaration: true,
        }
    }

    pub const fn with_strict_declaration(mut self, strict: bool) -> Self {
        self.strict_declaration = strict;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_lenient() {
        assert!(!ParserConfig::default().strict_declaration);
        assert_eq!(ParserConfig::default(), ParserConfig::new());
    }

    #[test]
    fn test_builder() {
        let config = ParserConfig::new().with_strict_declaration(true);
        assert_eq!(config, ParserConfig::strict());
    }
}
