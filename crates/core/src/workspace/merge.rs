use super::Workspace;
use crate::{
    error::{Error, Result},
    printer::{print_node, PrintOptions},
    snippet::Expr,
    tree::{quote_string, NodeId, SyntaxTree},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeKey {
    /// Appended as a new list element.
    Index,
    /// Overwrites or adds the element with this string key.
    Key(String),
}

#[derive(Debug, Clone)]
pub enum MergeValue {
    Expr(Expr),
    Array(ArrayMerge),
}

/// Ordered entries to merge into an array literal, possibly nested.
#[derive(Debug, Clone, Default)]
pub struct ArrayMerge {
    entries: Vec<(MergeKey, MergeValue)>,
}

impl ArrayMerge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(self, value: Expr) -> Self {
        self.entry(MergeKey::Index, MergeValue::Expr(value))
    }

    pub fn set(self, key: impl Into<String>, value: Expr) -> Self {
        self.entry(MergeKey::Key(key.into()), MergeValue::Expr(value))
    }

    pub fn nest(self, key: impl Into<String>, merge: ArrayMerge) -> Self {
        self.entry(MergeKey::Key(key.into()), MergeValue::Array(merge))
    }

    pub fn entry(mut self, key: MergeKey, value: MergeValue) -> Self {
        self.entries.push((key, value));
        self
    }

    pub fn entries(&self) -> &[(MergeKey, MergeValue)] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Workspace {
    /// Merges `merge` into the array literal `array`, recursively. Index
    /// entries are appended; keyed entries replace the value of an existing
    /// element with the same string key or are appended; nested merges
    /// descend into (or create) an array value.
    pub fn merge_into_array(tree: &mut SyntaxTree, array: NodeId, merge: &ArrayMerge) -> Result<()> {
        if tree.kind(array) != "array_creation_expression" {
            return Err(Error::InvalidInput(format!(
                "Cannot merge into a {} node; expected an array literal",
                tree.kind(array)
            )));
        }

        for (key, value) in merge.entries() {
            match (key, value) {
                (MergeKey::Index, MergeValue::Expr(expr)) => {
                    let value = tree.graft(expr.tree(), expr.node());
                    let element = tree.push_node("array_element_initializer", vec![value]);
                    tree.push_list_element(array, element);
                }
                (MergeKey::Index, MergeValue::Array(_)) => {
                    return Err(Error::InvalidInput(
                        "Integer keys must be set to expressions".to_string(),
                    ));
                }
                (MergeKey::Key(key), MergeValue::Expr(expr)) => {
                    match find_keyed_value(tree, array, key) {
                        Some(existing) if same_expression(tree, existing, expr) => {}
                        Some(existing) => {
                            let value = tree.graft(expr.tree(), expr.node());
                            tree.replace_node(existing, value);
                        }
                        None => {
                            let value = tree.graft(expr.tree(), expr.node());
                            push_keyed_element(tree, array, key, value);
                        }
                    }
                }
                (MergeKey::Key(key), MergeValue::Array(nested)) => {
                    let target = match find_keyed_value(tree, array, key) {
                        Some(existing) if tree.kind(existing) == "array_creation_expression" => existing,
                        Some(existing) => {
                            let empty = empty_array(tree);
                            tree.replace_node(existing, empty);
                            empty
                        }
                        None => {
                            let empty = empty_array(tree);
                            push_keyed_element(tree, array, key, empty);
                            empty
                        }
                    };
                    Self::merge_into_array(tree, target, nested)?;
                }
            }
        }
        Ok(())
    }
}

fn find_keyed_value(tree: &SyntaxTree, array: NodeId, key: &str) -> Option<NodeId> {
    tree.array_elements(array)
        .into_iter()
        .find(|element| tree.element_string_key(*element).as_deref() == Some(key))
        .and_then(|element| tree.element_value(element))
}

fn same_expression(tree: &SyntaxTree, existing: NodeId, expr: &Expr) -> bool {
    let options = PrintOptions::default();
    print_node(tree, existing, &options) == expr.print(&options)
}

fn push_keyed_element(tree: &mut SyntaxTree, array: NodeId, key: &str, value: NodeId) {
    let key = tree.push_leaf("string", true, quote_string(key));
    let arrow = tree.push_leaf("=>", false, "=>");
    let element = tree.push_node("array_element_initializer", vec![key, arrow, value]);
    tree.push_list_element(array, element);
}

fn empty_array(tree: &mut SyntaxTree) -> NodeId {
    let open = tree.push_leaf("[", false, "[");
    let close = tree.push_leaf("]", false, "]");
    tree.push_node("array_creation_expression", vec![open, close])
}
