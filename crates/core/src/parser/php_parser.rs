use crate::{
    error::{Error, Result},
    parser::utils::{find_first_error, node_to_position},
};
use tree_sitter::{Parser, Tree};

pub struct PhpParser {
    parser: Parser,
}

impl PhpParser {
    pub fn new() -> Result<Self> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_php::LANGUAGE_PHP.into())
            .map_err(|e| Error::TreeSitterError(format!("Failed to set language: {e}")))?;
        Ok(Self { parser })
    }

    /// Parses source leniently; the tree may contain error nodes.
    pub fn parse(&mut self, source: &str) -> Result<Tree> {
        self.parser
            .parse(source, None)
            .ok_or_else(|| Error::TreeSitterError("Failed to parse source code".to_string()))
    }

    /// Parses source and fails on the first ERROR or MISSING node.
    pub fn parse_strict(&mut self, source: &str) -> Result<Tree> {
        let tree = self.parse(source)?;
        let root = tree.root_node();
        if root.has_error() {
            let node = find_first_error(root).unwrap_or(root);
            let position = node_to_position(&node, true);
            let message = if node.is_missing() {
                format!("missing `{}`", node.kind())
            } else {
                let text = &source[node.byte_range()];
                let excerpt: String = text.chars().take(40).collect();
                format!("unexpected `{}`", excerpt.trim())
            };
            tracing::debug!("Rejecting source with syntax error at {}: {}", position, message);
            return Err(Error::SyntaxError {
                line: position.line + 1,
                column: position.character + 1,
                message,
            });
        }
        Ok(tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parser_creation() {
        let parser = PhpParser::new();
        assert!(parser.is_ok());
    }

    #[test]
    fn test_basic_parsing() {
        let mut parser = PhpParser::new().unwrap();
        let source = "<?php\nnamespace foo;\n\nclass Bar {}\n";
        let tree = parser.parse_strict(source).unwrap();
        assert_eq!(tree.root_node().kind(), "program");
    }

    #[test]
    fn test_parse_empty_source() {
        let mut parser = PhpParser::new().unwrap();
        assert!(parser.parse("").is_ok());
    }

    #[test]
    fn test_lenient_parse_keeps_errors() {
        let mut parser = PhpParser::new().unwrap();
        let tree = parser.parse("<?php\nfunction ( {").unwrap();
        assert!(tree.root_node().has_error());
    }

    #[test]
    fn test_strict_parse_reports_location() {
        let mut parser = PhpParser::new().unwrap();
        let err = parser
            .parse_strict("<?php\n$a = 1;\n$b = ;\n")
            .unwrap_err();
        match err {
            Error::SyntaxError { line, .. } => assert_eq!(line, 3),
            other => panic!("unexpected error: {other}"),
        }
    }
}
