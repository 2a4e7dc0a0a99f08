use super::{NodeId, SyntaxTree};

const TYPE_DECLARATIONS: &[&str] = &[
    "class_declaration",
    "interface_declaration",
    "trait_declaration",
    "enum_declaration",
];

impl SyntaxTree {
    /// Text of the `name` field of a declaration.
    pub fn name_of(&self, id: NodeId) -> Option<&str> {
        self.child_by_field(id, "name").and_then(|name| self.text(name))
    }

    /// Name of the first class, interface, trait or enum declared in the file.
    pub fn declared_type_name(&self) -> Option<&str> {
        self.find_first(self.root(), |tree, id| {
            TYPE_DECLARATIONS.contains(&tree.kind(id))
        })
        .and_then(|declaration| self.name_of(declaration))
    }

    /// Statement body (`{ ... }`) of a class, method, function or namespace.
    pub fn body_of(&self, id: NodeId) -> Option<NodeId> {
        self.child_by_field(id, "body").filter(|body| {
            matches!(
                self.kind(*body),
                "compound_statement" | "declaration_list" | "enum_declaration_list"
            )
        })
    }

    /// The `/** ... */` comment directly preceding a declaration.
    pub fn doc_comment_of(&self, id: NodeId) -> Option<NodeId> {
        self.prev_sibling(id).filter(|sibling| {
            self.kind(*sibling) == "comment"
                && self.text(*sibling).is_some_and(|text| text.starts_with("/**"))
        })
    }

    /// Element initializers of an array literal.
    pub fn array_elements(&self, array: NodeId) -> Vec<NodeId> {
        self.named_children(array)
            .filter(|child| self.kind(*child) == "array_element_initializer")
            .collect()
    }

    /// Key expression of a `key => value` array element.
    pub fn element_key(&self, element: NodeId) -> Option<NodeId> {
        let arrow = self.arrow_index(element)?;
        self.children(element)[..arrow]
            .iter()
            .copied()
            .find(|child| self.is_expression_child(*child))
    }

    /// Value expression of an array element, keyed or not.
    pub fn element_value(&self, element: NodeId) -> Option<NodeId> {
        let start = self.arrow_index(element).map(|arrow| arrow + 1).unwrap_or(0);
        self.children(element)[start..]
            .iter()
            .copied()
            .find(|child| self.is_expression_child(*child))
    }

    /// String value of a literal array key, if the key is a plain string.
    pub fn element_string_key(&self, element: NodeId) -> Option<String> {
        let key = self.element_key(element)?;
        if !matches!(self.kind(key), "string" | "encapsed_string") {
            return None;
        }
        string_literal_value(self.text(key)?)
    }

    fn arrow_index(&self, element: NodeId) -> Option<usize> {
        self.children(element)
            .iter()
            .position(|child| self.text(*child) == Some("=>"))
    }

    fn is_expression_child(&self, id: NodeId) -> bool {
        let node = self.node(id);
        node.named && node.kind != "comment"
    }
}

/// Decodes a single- or double-quoted PHP string literal without interpolation.
pub fn string_literal_value(literal: &str) -> Option<String> {
    let literal = literal
        .strip_prefix(|c: char| c == 'b' || c == 'B')
        .unwrap_or(literal);
    if literal.len() < 2 {
        return None;
    }
    if let Some(inner) = literal.strip_prefix('\'').and_then(|s| s.strip_suffix('\'')) {
        let mut value = String::with_capacity(inner.len());
        let mut chars = inner.chars().peekable();
        while let Some(c) = chars.next() {
            if c == '\\' && matches!(chars.peek(), Some('\'' | '\\')) {
                if let Some(escaped) = chars.next() {
                    value.push(escaped);
                }
            } else {
                value.push(c);
            }
        }
        return Some(value);
    }
    if let Some(inner) = literal.strip_prefix('"').and_then(|s| s.strip_suffix('"')) {
        if inner.contains('$') {
            return None;
        }
        let mut value = String::with_capacity(inner.len());
        let mut chars = inner.chars().peekable();
        while let Some(c) = chars.next() {
            if c == '\\' && matches!(chars.peek(), Some('"' | '\\')) {
                if let Some(escaped) = chars.next() {
                    value.push(escaped);
                }
            } else {
                value.push(c);
            }
        }
        return Some(value);
    }
    None
}

/// Renders a value as a single-quoted PHP string literal.
pub fn quote_string(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
}
