//! Owned, arena-based PHP syntax tree
//!
//! Tree-sitter trees are immutable and borrow their source, so every parse is
//! converted into a [`SyntaxTree`]: a flat table of [`Node`]s addressed by
//! [`NodeId`]. Nodes produced by a parse remember their byte span in the
//! original source; nodes created or grafted afterwards have no span and are
//! printed from scratch. Cloning a tree keeps every id stable, which is what
//! lets the re-printer pair a mutated tree with its pristine original.

mod php;

pub use php::{quote_string, string_literal_value};

use crate::{error::Result, parser::PhpParser};
use std::ops::Range;

/// Node kinds that are kept as a single leaf with their verbatim source text.
pub const ATOMIC_KINDS: &[&str] = &[
    "name",
    "qualified_name",
    "namespace_name",
    "variable_name",
    "string",
    "encapsed_string",
    "heredoc",
    "nowdoc",
    "integer",
    "float",
    "boolean",
    "null",
    "comment",
    "cast_type",
    "primitive_type",
    "visibility_modifier",
    "relative_scope",
    "shell_command_expression",
    "php_tag",
    "text",
];

/// Handle of a node inside one [`SyntaxTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub kind: &'static str,
    pub named: bool,
    /// Grammar field this node occupies in its parent, if any.
    pub field: Option<&'static str>,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// Byte range in the parsed source; `None` for nodes created after parsing.
    pub span: Option<Range<usize>>,
    /// Verbatim text of leaf nodes.
    pub text: Option<String>,
}

impl Node {
    pub fn is_leaf(&self) -> bool {
        self.text.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct SyntaxTree {
    source: String,
    nodes: Vec<Node>,
    root: NodeId,
}

impl SyntaxTree {
    /// Parses a complete PHP file. Fails with `SyntaxError` on invalid input.
    pub fn parse(source: &str) -> Result<Self> {
        let mut parser = PhpParser::new()?;
        let tree = parser.parse_strict(source)?;
        let syntax_tree = Self::from_tree(&tree, source);
        tracing::trace!("Parsed {} bytes into {} nodes", source.len(), syntax_tree.len());
        Ok(syntax_tree)
    }

    pub fn from_tree(tree: &tree_sitter::Tree, source: &str) -> Self {
        let mut syntax_tree = Self {
            source: source.to_string(),
            nodes: Vec::new(),
            root: NodeId(0),
        };
        let root = syntax_tree.build(tree.root_node(), None, None);
        // The program node covers the whole file, including leading and
        // trailing whitespace tree-sitter leaves outside it.
        syntax_tree.nodes[root.0].span = Some(0..source.len());
        syntax_tree.root = root;
        syntax_tree
    }

    fn build(
        &mut self,
        node: tree_sitter::Node,
        field: Option<&'static str>,
        parent: Option<NodeId>,
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        let range = node.byte_range();
        let atomic = node.child_count() == 0 || ATOMIC_KINDS.contains(&node.kind());
        let text = atomic.then(|| self.source[range.clone()].to_string());
        self.nodes.push(Node {
            kind: node.kind(),
            named: node.is_named(),
            field,
            parent,
            children: Vec::new(),
            span: Some(range),
            text,
        });

        if !atomic {
            let mut cursor = node.walk();
            if cursor.goto_first_child() {
                loop {
                    let child = cursor.node();
                    let child_field = cursor.field_name();
                    let child_id = self.build(child, child_field, Some(id));
                    self.nodes[id.0].children.push(child_id);
                    if !cursor.goto_next_sibling() {
                        break;
                    }
                }
            }
        }
        id
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn kind(&self, id: NodeId) -> &'static str {
        self.nodes[id.0].kind
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn named_children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id)
            .iter()
            .copied()
            .filter(|child| self.nodes[child.0].named)
    }

    pub fn child_by_field(&self, id: NodeId, field: &str) -> Option<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .find(|child| self.nodes[child.0].field == Some(field))
    }

    /// Text of a leaf node.
    pub fn text(&self, id: NodeId) -> Option<&str> {
        self.nodes[id.0].text.as_deref()
    }

    pub fn span(&self, id: NodeId) -> Option<Range<usize>> {
        self.nodes[id.0].span.clone()
    }

    /// All nodes below `id` (inclusive) in document order.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.children(current).iter().rev().copied());
        }
        out
    }

    /// First node below `id` (inclusive, document order) matching `predicate`.
    pub fn find_first(
        &self,
        id: NodeId,
        mut predicate: impl FnMut(&SyntaxTree, NodeId) -> bool,
    ) -> Option<NodeId> {
        self.descendants(id)
            .into_iter()
            .find(|candidate| predicate(self, *candidate))
    }

    pub fn position_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|child| *child == id)
    }

    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let index = self.position_in_parent(id)?;
        index
            .checked_sub(1)
            .map(|previous| self.children(parent)[previous])
    }

    /// Adds a detached leaf to the arena.
    pub fn push_leaf(&mut self, kind: &'static str, named: bool, text: impl Into<String>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            named,
            field: None,
            parent: None,
            children: Vec::new(),
            span: None,
            text: Some(text.into()),
        });
        id
    }

    /// Adds a detached composite node owning `children`.
    pub fn push_node(&mut self, kind: &'static str, children: Vec<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        for child in &children {
            self.nodes[child.0].parent = Some(id);
        }
        self.nodes.push(Node {
            kind,
            named: true,
            field: None,
            parent: None,
            children,
            span: None,
            text: None,
        });
        id
    }

    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) {
        let index = index.min(self.nodes[parent.0].children.len());
        self.nodes[parent.0].children.insert(index, child);
        self.nodes[child.0].parent = Some(parent);
    }

    /// Swaps `old` for `new` in `old`'s parent. Returns false for detached nodes.
    pub fn replace_node(&mut self, old: NodeId, new: NodeId) -> bool {
        let Some(parent) = self.parent(old) else {
            return false;
        };
        let Some(index) = self.position_in_parent(old) else {
            return false;
        };
        let field = self.nodes[old.0].field;
        self.nodes[parent.0].children[index] = new;
        self.nodes[new.0].parent = Some(parent);
        self.nodes[new.0].field = field;
        self.nodes[old.0].parent = None;
        true
    }

    pub fn remove_node(&mut self, id: NodeId) -> bool {
        let Some(parent) = self.parent(id) else {
            return false;
        };
        self.nodes[parent.0].children.retain(|child| *child != id);
        self.nodes[id.0].parent = None;
        true
    }

    /// Deep-copies a subtree of another tree into this arena as fresh nodes.
    pub fn graft(&mut self, from: &SyntaxTree, id: NodeId) -> NodeId {
        let source = from.node(id);
        let children: Vec<NodeId> = source
            .children
            .iter()
            .map(|child| self.graft(from, *child))
            .collect();
        let new_id = NodeId(self.nodes.len());
        for child in &children {
            self.nodes[child.0].parent = Some(new_id);
        }
        self.nodes.push(Node {
            kind: source.kind,
            named: source.named,
            field: source.field,
            parent: None,
            children,
            span: None,
            text: source.text.clone(),
        });
        new_id
    }

    /// Inserts statements at the end of a `{ ... }` body, before its closing brace.
    pub fn append_to_body(&mut self, body: NodeId, statements: &[NodeId]) {
        let mut index = self
            .children(body)
            .iter()
            .rposition(|child| self.text(*child) == Some("}"))
            .unwrap_or(self.children(body).len());
        for statement in statements {
            self.insert_child(body, index, *statement);
            index += 1;
        }
    }

    /// Appends an element to a bracketed, comma-separated list (an array literal
    /// or argument list), keeping the list's trailing-comma style.
    pub fn push_list_element(&mut self, list: NodeId, element: NodeId) {
        let children = self.children(list);
        let close = children
            .iter()
            .rposition(|child| matches!(self.text(*child), Some("]" | ")")))
            .unwrap_or(children.len());
        let previous = close
            .checked_sub(1)
            .and_then(|index| children.get(index).copied())
            .filter(|child| self.node(*child).kind != "comment");
        let has_elements = self.named_children(list).any(|child| self.kind(child) != "comment");
        let trailing_comma = previous.is_some_and(|child| self.text(child) == Some(","));

        let mut index = close;
        if has_elements && !trailing_comma {
            let comma = self.push_leaf(",", false, ",");
            self.insert_child(list, index, comma);
            index += 1;
        }
        self.insert_child(list, index, element);
        if trailing_comma {
            let comma = self.push_leaf(",", false, ",");
            self.insert_child(list, index + 1, comma);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = "<?php\nnamespace app;\n\nclass Foo\n{\n    public function init(): void\n    {\n    }\n}\n";

    #[test]
    fn test_parse_builds_spans() {
        let tree = SyntaxTree::parse(SOURCE).unwrap();
        let root = tree.root();
        assert_eq!(tree.kind(root), "program");
        assert_eq!(tree.span(root), Some(0..SOURCE.len()));

        let class = tree
            .find_first(root, |t, id| t.kind(id) == "class_declaration")
            .unwrap();
        let name = tree.child_by_field(class, "name").unwrap();
        assert_eq!(tree.text(name), Some("Foo"));
        let span = tree.span(name).unwrap();
        assert_eq!(&SOURCE[span], "Foo");
    }

    #[test]
    fn test_clone_keeps_ids_stable() {
        let old = SyntaxTree::parse(SOURCE).unwrap();
        let mut new = old.clone();
        let leaf = new.push_leaf("comment", true, "// added");
        let root = new.root();
        new.insert_child(root, 1, leaf);

        assert_eq!(old.len() + 1, new.len());
        assert_eq!(old.children(root).len() + 1, new.children(root).len());
        assert_eq!(new.parent(leaf), Some(root));
    }

    #[test]
    fn test_graft_drops_spans() {
        let donor = SyntaxTree::parse("<?php\n$a = [1, 2];\n").unwrap();
        let statement = donor.named_children(donor.root()).nth(1).unwrap();
        let mut tree = SyntaxTree::parse(SOURCE).unwrap();
        let grafted = tree.graft(&donor, statement);

        assert_eq!(tree.kind(grafted), "expression_statement");
        assert!(tree.descendants(grafted).iter().all(|id| tree.span(*id).is_none()));
    }

    #[test]
    fn test_append_to_body_goes_before_closing_brace() {
        let mut tree = SyntaxTree::parse(SOURCE).unwrap();
        let method = tree
            .find_first(tree.root(), |t, id| t.kind(id) == "method_declaration")
            .unwrap();
        let body = tree.child_by_field(method, "body").unwrap();
        let statement = tree.push_leaf("comment", true, "// x");
        tree.append_to_body(body, &[statement]);

        let children = tree.children(body);
        assert_eq!(children[children.len() - 2], statement);
        assert_eq!(tree.text(children[children.len() - 1]), Some("}"));
    }

    #[test]
    fn test_replace_node_keeps_field() {
        let mut tree = SyntaxTree::parse(SOURCE).unwrap();
        let class = tree
            .find_first(tree.root(), |t, id| t.kind(id) == "class_declaration")
            .unwrap();
        let name = tree.child_by_field(class, "name").unwrap();
        let replacement = tree.push_leaf("name", true, "Bar");

        assert!(tree.replace_node(name, replacement));
        assert_eq!(tree.child_by_field(class, "name"), Some(replacement));
        assert_eq!(tree.parent(name), None);
    }
}
