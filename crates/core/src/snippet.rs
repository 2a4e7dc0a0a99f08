//! Parsing and printing of code fragments
//!
//! Fragments are written without the `<?php` open tag; it is added before
//! parsing and reported line numbers are shifted back so they point into the
//! fragment itself.

use crate::{
    error::{Error, Result},
    printer::{print_node, print_nodes, PrintOptions},
    tree::{quote_string, NodeId, SyntaxTree},
};

const OPEN_TAG: &str = "<?php\n";
const MEMBER_WRAPPER: &str = "class __CraftgenSnippet {\n";

/// A parsed fragment: its own tree plus the top-level statements in it.
#[derive(Debug, Clone)]
pub struct Snippet {
    tree: SyntaxTree,
    statements: Vec<NodeId>,
}

impl Snippet {
    /// Parses a sequence of statements.
    pub fn parse(code: &str) -> Result<Self> {
        let (source, shift) = if code.trim_start().starts_with("<?php") {
            (code.to_string(), 0)
        } else {
            (format!("{OPEN_TAG}{code}"), 1)
        };
        let tree = SyntaxTree::parse(&source).map_err(|e| shift_lines(e, shift))?;
        let statements = tree
            .named_children(tree.root())
            .filter(|id| tree.kind(*id) != "php_tag")
            .collect();
        Ok(Self { tree, statements })
    }

    /// Parses class members (methods, properties, constants, trait uses).
    pub fn parse_members(code: &str) -> Result<Self> {
        let source = format!("{OPEN_TAG}{MEMBER_WRAPPER}{code}\n}}\n");
        let tree = SyntaxTree::parse(&source).map_err(|e| shift_lines(e, 2))?;
        let body = tree
            .find_first(tree.root(), |t, id| t.kind(id) == "class_declaration")
            .and_then(|class| tree.body_of(class))
            .ok_or_else(|| Error::InvalidInput(format!("`{}` is not a class member", code.trim())))?;
        let statements = tree.named_children(body).collect();
        Ok(Self { tree, statements })
    }

    pub fn tree(&self) -> &SyntaxTree {
        &self.tree
    }

    pub fn statements(&self) -> &[NodeId] {
        &self.statements
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub fn print(&self, options: &PrintOptions) -> String {
        print_nodes(&self.tree, &self.statements, options)
    }
}

pub fn parse_snippet(code: &str) -> Result<Snippet> {
    Snippet::parse(code)
}

pub fn print_snippet(snippet: &Snippet, options: &PrintOptions) -> String {
    snippet.print(options)
}

/// Normalizes a fragment with standard formatting.
pub fn format_snippet(code: &str, options: &PrintOptions) -> Result<String> {
    Ok(parse_snippet(code)?.print(options))
}

fn shift_lines(error: Error, lines: u32) -> Error {
    match error {
        Error::SyntaxError {
            line,
            column,
            message,
        } => Error::SyntaxError {
            line: line.saturating_sub(lines).max(1),
            column,
            message,
        },
        other => other,
    }
}

/// A single standalone expression, used as a value for array merges.
#[derive(Debug, Clone)]
pub struct Expr {
    tree: SyntaxTree,
    node: NodeId,
}

impl Expr {
    pub fn parse(code: &str) -> Result<Self> {
        let code = code.trim().trim_end_matches(';');
        let snippet = Snippet::parse(&format!("{code};"))?;
        let node = match snippet.statements() {
            [statement] if snippet.tree().kind(*statement) == "expression_statement" => {
                snippet.tree().named_children(*statement).next()
            }
            _ => None,
        };
        let node = node.ok_or_else(|| Error::InvalidInput(format!("`{code}` is not a single expression")))?;
        Ok(Self {
            tree: snippet.tree,
            node,
        })
    }

    /// `Class::class`
    pub fn class_constant(class: &str) -> Result<Self> {
        Self::parse(&format!("{class}::class"))
    }

    /// A single-quoted string literal.
    pub fn string(value: &str) -> Result<Self> {
        Self::parse(&quote_string(value))
    }

    pub fn tree(&self) -> &SyntaxTree {
        &self.tree
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn kind(&self) -> &'static str {
        self.tree.kind(self.node)
    }

    pub fn print(&self, options: &PrintOptions) -> String {
        print_node(&self.tree, self.node, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_statements() {
        let snippet = Snippet::parse("// note\n$a = 1;\nfoo();").unwrap();
        let kinds: Vec<_> = snippet
            .statements()
            .iter()
            .map(|id| snippet.tree().kind(*id))
            .collect();
        assert_eq!(kinds, vec!["comment", "expression_statement", "expression_statement"]);
    }

    #[test]
    fn test_parse_accepts_open_tag() {
        let snippet = Snippet::parse("<?php\necho 1;").unwrap();
        assert_eq!(snippet.statements().len(), 1);
    }

    #[test]
    fn test_syntax_error_line_is_relative_to_fragment() {
        let err = Snippet::parse("$a = 1;\n$b = ;").unwrap_err();
        match err {
            Error::SyntaxError { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parse_members() {
        let snippet =
            Snippet::parse_members("use FooTrait;\nconst A = 1;\npublic function bar(): void {}").unwrap();
        let kinds: Vec<_> = snippet
            .statements()
            .iter()
            .map(|id| snippet.tree().kind(*id))
            .collect();
        assert_eq!(kinds, vec!["use_declaration", "const_declaration", "method_declaration"]);
        assert!(Snippet::parse_members("$a = 1;").is_err());
    }

    #[test]
    fn test_format_snippet_round_trip() {
        let options = PrintOptions::default();
        let formatted = format_snippet("if($a){foo( 'x' );}", &options).unwrap();
        assert_eq!(formatted, "if ($a) {\n    foo('x');\n}");
        assert_eq!(format_snippet(&formatted, &options).unwrap(), formatted);
    }

    #[test]
    fn test_expr() {
        let options = PrintOptions::default();
        let expr = Expr::class_constant("foo\\Bar").unwrap();
        assert_eq!(expr.kind(), "class_constant_access_expression");
        assert_eq!(expr.print(&options), "foo\\Bar::class");

        let expr = Expr::string("it's").unwrap();
        assert_eq!(expr.print(&options), "'it\\'s'");

        assert!(matches!(Expr::parse("$a = 1; $b = 2"), Err(Error::InvalidInput(_))));
    }
}
