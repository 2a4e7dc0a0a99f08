//! Token-level pretty printer
//!
//! The tree is flattened into leaf tokens; layout is decided per token from
//! its text and the kinds of its parent and grandparent. Braces of statement
//! lists open indented blocks, `;` ends a line outside parentheses, and class
//! or method bodies put their opening brace on its own line.

use super::{separates_members, PrintOptions};
use crate::tree::{NodeId, SyntaxTree};

/// Prints one subtree with standard formatting.
pub fn print_node(tree: &SyntaxTree, id: NodeId, options: &PrintOptions) -> String {
    print_nodes(tree, &[id], options)
}

/// Prints a sequence of sibling nodes (usually statements) with standard formatting.
pub fn print_nodes(tree: &SyntaxTree, ids: &[NodeId], options: &PrintOptions) -> String {
    let mut printer = StandardPrinter::new(tree, options, "");
    for id in ids {
        printer.node(*id);
    }
    printer.finish()
}

/// Prints one subtree for a line already indented by `indent`. Every later
/// line starts with `indent` too, except lines inside multi-line literals.
pub fn print_node_at(tree: &SyntaxTree, id: NodeId, options: &PrintOptions, indent: &str) -> String {
    let mut printer = StandardPrinter::new(tree, options, indent);
    printer.node(id);
    printer.finish()
}

#[derive(Debug, Clone, Copy)]
struct Token<'a> {
    text: &'a str,
    kind: &'static str,
    parent: &'static str,
    grandparent: &'static str,
}

struct StandardPrinter<'a> {
    tree: &'a SyntaxTree,
    unit: String,
    /// Prefix of every line after the first.
    base: String,
    blank_line_between_members: bool,
    out: String,
    level: usize,
    at_line_start: bool,
    after_close: bool,
    blank_requested: bool,
    paren_depth: usize,
    /// Paren depth outside each open block; `;` inside a closure body still ends a line.
    paren_stack: Vec<usize>,
    prev: Option<Token<'a>>,
}

impl<'a> StandardPrinter<'a> {
    fn new(tree: &'a SyntaxTree, options: &PrintOptions, base: &str) -> Self {
        Self {
            tree,
            unit: options.indent_unit(),
            base: base.to_string(),
            blank_line_between_members: options.blank_line_between_members,
            out: String::new(),
            level: 0,
            at_line_start: true,
            after_close: false,
            blank_requested: false,
            paren_depth: 0,
            paren_stack: Vec::new(),
            prev: None,
        }
    }

    fn finish(self) -> String {
        self.out.trim_end().to_string()
    }

    fn node(&mut self, id: NodeId) {
        let tree = self.tree;
        let node = tree.node(id);
        if let Some(text) = node.text.as_deref() {
            let parent = node.parent;
            let token = Token {
                text,
                kind: node.kind,
                parent: parent.map(|p| tree.kind(p)).unwrap_or(""),
                grandparent: parent
                    .and_then(|p| tree.parent(p))
                    .map(|g| tree.kind(g))
                    .unwrap_or(""),
            };
            self.token(token);
            return;
        }

        let members = node.kind == "declaration_list" && self.blank_line_between_members;
        let mut prev_member: Option<&'static str> = None;
        for &child in &node.children {
            let child_node = tree.node(child);
            if members && child_node.named {
                if prev_member.is_some_and(|prev| separates_members(prev, child_node.kind)) {
                    self.blank_requested = true;
                }
                prev_member = Some(child_node.kind);
            }
            self.node(child);
        }
        if matches!(node.kind, "case_statement" | "default_statement") {
            self.level = self.level.saturating_sub(1);
        }
    }

    fn token(&mut self, token: Token<'a>) {
        match token.kind {
            "comment" => self.comment(&token),
            "php_tag" => {
                self.separate(&token);
                self.write(token.text.trim());
                self.newline();
                self.blank_requested = true;
            }
            _ if token.text == "{" && is_block_brace(&token) => self.open_block(&token),
            _ if token.text == "}" && is_block_brace(&token) => self.close_block(),
            _ if token.text == ";" => {
                self.separate(&token);
                self.write(";");
                if self.paren_depth == 0 {
                    self.newline();
                }
            }
            _ if token.text == ":" && matches!(token.parent, "case_statement" | "default_statement") => {
                self.separate(&token);
                self.write(":");
                self.level += 1;
                self.newline();
            }
            // One match arm per line.
            _ if token.text == "," && token.parent == "match_block" => {
                self.separate(&token);
                self.write(",");
                self.newline();
            }
            _ => {
                self.separate(&token);
                self.write(token.text);
                match token.text {
                    "(" => self.paren_depth += 1,
                    ")" => self.paren_depth = self.paren_depth.saturating_sub(1),
                    _ => {}
                }
            }
        }
        self.prev = Some(token);
    }

    /// Emits whatever must come between the previous token and `token`.
    fn separate(&mut self, token: &Token<'a>) {
        if std::mem::take(&mut self.after_close) {
            match token.text {
                ")" | "," | ";" | "]" | "->" | "?->" => return,
                "else" | "elseif" | "catch" | "finally" => {
                    self.out.push(' ');
                    return;
                }
                "while" if token.parent == "do_statement" => {
                    self.out.push(' ');
                    return;
                }
                _ => self.newline(),
            }
        }
        if self.at_line_start {
            self.write_indent();
            return;
        }
        if let Some(prev) = &self.prev {
            if needs_space(prev, token) {
                self.out.push(' ');
            }
        }
    }

    fn open_block(&mut self, token: &Token<'a>) {
        let own_line = matches!(token.parent, "declaration_list" | "enum_declaration_list")
            || (token.parent == "compound_statement"
                && matches!(token.grandparent, "method_declaration" | "function_definition"));
        if own_line {
            self.after_close = false;
            self.newline();
            self.write_indent();
        } else if std::mem::take(&mut self.after_close) {
            self.newline();
            self.write_indent();
        } else if self.at_line_start {
            self.write_indent();
        } else {
            self.out.push(' ');
        }
        self.write("{");
        self.level += 1;
        self.paren_stack.push(std::mem::take(&mut self.paren_depth));
        self.newline();
    }

    fn close_block(&mut self) {
        self.after_close = false;
        self.blank_requested = false;
        self.level = self.level.saturating_sub(1);
        self.paren_depth = self.paren_stack.pop().unwrap_or(0);
        self.newline();
        self.write_indent();
        self.write("}");
        self.after_close = true;
    }

    fn comment(&mut self, token: &Token<'a>) {
        if std::mem::take(&mut self.after_close) || !self.at_line_start {
            self.newline();
        }
        self.write_indent();
        let indent = format!("{}{}", self.base, self.unit.repeat(self.level));
        for (i, line) in token.text.lines().enumerate() {
            if i == 0 {
                self.out.push_str(line.trim_end());
                continue;
            }
            self.out.push('\n');
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            self.out.push_str(&indent);
            if trimmed.starts_with('*') {
                self.out.push(' ');
            }
            self.out.push_str(trimmed);
        }
        self.at_line_start = false;
        self.newline();
    }

    fn newline(&mut self) {
        if !self.at_line_start {
            let trimmed = self.out.trim_end_matches([' ', '\t']).len();
            self.out.truncate(trimmed);
            self.out.push('\n');
            self.at_line_start = true;
        }
    }

    fn write_indent(&mut self) {
        if std::mem::take(&mut self.blank_requested) && !self.out.is_empty() && !self.out.ends_with("\n\n") {
            self.out.push('\n');
        }
        if !self.out.is_empty() {
            self.out.push_str(&self.base);
        }
        for _ in 0..self.level {
            self.out.push_str(&self.unit);
        }
        self.at_line_start = false;
    }

    fn write(&mut self, text: &str) {
        self.out.push_str(text);
        self.at_line_start = false;
    }
}

fn is_block_brace(token: &Token<'_>) -> bool {
    token.parent == "compound_statement"
        || token.parent.ends_with("_list")
        || token.parent.ends_with("_block")
}

fn is_identifier(token: &Token<'_>) -> bool {
    matches!(
        token.kind,
        "name" | "qualified_name" | "variable_name" | "relative_scope" | "namespace_name"
    )
}

/// Keywords written directly against their opening parenthesis.
const CALL_KEYWORDS: &[&str] = &[
    "function", "fn", "array", "list", "isset", "empty", "unset", "exit", "die", "eval",
    "declare", "static", "self", "parent",
];

fn needs_space(prev: &Token<'_>, token: &Token<'_>) -> bool {
    let (a, b) = (prev.text, token.text);

    if matches!(b, "," | ";" | ")" | "]" | "::" | "->" | "?->") {
        return false;
    }
    if matches!(a, "(" | "[" | "#[" | "::" | "->" | "?->" | "\\" | "!" | "@" | "..." | "$") {
        return false;
    }
    if a == "&" && prev.parent != "binary_expression" {
        return false;
    }
    if matches!(b, "++" | "--") && token.parent == "update_expression" {
        return false;
    }
    if matches!(a, "++" | "--") && prev.parent == "update_expression" {
        return false;
    }
    if matches!(a, "-" | "+" | "~") && prev.parent == "unary_op_expression" {
        return false;
    }
    if a == "?" && prev.parent == "optional_type" {
        return false;
    }
    if (a == "=" && prev.parent == "declare_directive")
        || (b == "=" && token.parent == "declare_directive")
    {
        return false;
    }
    if b == ":" {
        return token.parent == "conditional_expression";
    }
    if b == "(" {
        let callee = is_identifier(prev)
            || matches!(a, ")" | "]" | "}")
            || CALL_KEYWORDS.iter().any(|keyword| a.eq_ignore_ascii_case(keyword));
        return !callee;
    }
    if b == "[" {
        let subscript = is_identifier(prev)
            || matches!(prev.kind, "string" | "encapsed_string")
            || matches!(a, ")" | "]" | "}");
        return !subscript;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snippet::Snippet;

    fn format(code: &str) -> String {
        let snippet = Snippet::parse(code).unwrap();
        print_nodes(snippet.tree(), snippet.statements(), &PrintOptions::default())
    }

    #[test]
    fn test_print_node_at_leaves_literal_lines_alone() {
        let snippet = Snippet::parse("if ($a) { $b = \"x\ny\"; }").unwrap();
        let printed = print_node_at(snippet.tree(), snippet.statements()[0], &PrintOptions::default(), "  ");
        assert_eq!(printed, "if ($a) {\n      $b = \"x\ny\";\n  }");
    }

    #[test]
    fn test_switch_cases_indent_their_statements() {
        assert_eq!(
            format("switch ($a) { case 1: case 2: foo(); break; default: bar(); }"),
            "switch ($a) {\n    case 1:\n    case 2:\n        foo();\n        break;\n    default:\n        bar();\n}"
        );
    }

    #[test]
    fn test_match_arms_on_own_lines() {
        assert_eq!(
            format("$r = match ($a) { 1, 2 => 'x', default => 'y', };"),
            "$r = match ($a) {\n    1, 2 => 'x',\n    default => 'y',\n};"
        );
    }

    #[test]
    fn test_normalizes_spacing() {
        assert_eq!(format("$a=[ 'x'=>1 ,'y'=>Foo :: class ];"), "$a = ['x' => 1, 'y' => Foo::class];");
        assert_eq!(format("foo( $a,$b ) ;"), "foo($a, $b);");
        assert_eq!(format("$event -> types [ ] = Bar::class;"), "$event->types[] = Bar::class;");
    }

    #[test]
    fn test_use_statements() {
        assert_eq!(
            format("use foo\\Bar;   use  baz\\Qux as Quux;"),
            "use foo\\Bar;\nuse baz\\Qux as Quux;"
        );
    }

    #[test]
    fn test_event_handler_layout() {
        let printed = format(
            "Event::on(Foo::class, Foo::EVENT_REGISTER, function(RegisterComponentTypesEvent $event) { $event->types[] = Bar::class; });",
        );
        insta::assert_snapshot!(printed, @r###"
        Event::on(Foo::class, Foo::EVENT_REGISTER, function(RegisterComponentTypesEvent $event) {
            $event->types[] = Bar::class;
        });
        "###);
    }

    #[test]
    fn test_control_structures() {
        let printed = format("if (class_exists(Foo::class)) { bar(); } else { baz(); }");
        insta::assert_snapshot!(printed, @r###"
        if (class_exists(Foo::class)) {
            bar();
        } else {
            baz();
        }
        "###);
    }

    #[test]
    fn test_class_layout() {
        let printed = format(
            "class Foo extends Bar { public $a; /** Docs */ public function init(): void { parent::init(); } }",
        );
        insta::assert_snapshot!(printed, @r###"
        class Foo extends Bar
        {
            public $a;

            /** Docs */
            public function init(): void
            {
                parent::init();
            }
        }
        "###);
    }

    #[test]
    fn test_ternary_and_return_type_colons() {
        assert_eq!(format("$a = $b ? $c : $d;"), "$a = $b ? $c : $d;");
        assert_eq!(format("$f = fn(): int => 1;"), "$f = fn(): int => 1;");
    }
}
