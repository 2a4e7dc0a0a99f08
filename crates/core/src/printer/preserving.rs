//! Format-preserving re-printer
//!
//! The new tree is walked top-down next to the pristine old tree. Subtrees
//! whose node ids, children and leaf text are unchanged are copied from the
//! original source byte for byte. For changed nodes the child lists are
//! aligned and the original gaps between kept children are reused, so only
//! inserted or replaced children are printed from scratch.

use super::{
    separates_members,
    standard::{print_node, print_node_at},
    PrintOptions,
};
use crate::{
    parser::utils::{line_indent, starts_line},
    tree::{NodeId, SyntaxTree},
};

/// Kinds whose children are laid out one per line.
const BLOCK_KINDS: &[&str] = &[
    "program",
    "declaration_list",
    "compound_statement",
    "enum_declaration_list",
    "switch_block",
    "match_block",
];

/// Re-prints `new`, a mutated clone of `old`, reusing `old`'s source text for
/// everything that did not change.
pub fn print_format_preserving(old: &SyntaxTree, new: &SyntaxTree, options: &PrintOptions) -> String {
    let mut reprinter = Reprinter::new(old, new, options);
    reprinter.mark(new.root());
    let mut out = String::with_capacity(old.source().len() + 256);
    reprinter.emit(new.root(), &mut out);
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Keep(NodeId),
    Insert(NodeId),
    Replace { old: NodeId, new: NodeId },
    Delete(NodeId),
}

impl Op {
    /// The old-tree node this operation is anchored to.
    fn anchor(self) -> Option<NodeId> {
        match self {
            Op::Keep(id) | Op::Delete(id) => Some(id),
            Op::Replace { old, .. } => Some(old),
            Op::Insert(_) => None,
        }
    }
}

struct Reprinter<'a> {
    old: &'a SyntaxTree,
    new: &'a SyntaxTree,
    options: &'a PrintOptions,
    pristine: Vec<bool>,
}

impl<'a> Reprinter<'a> {
    fn new(old: &'a SyntaxTree, new: &'a SyntaxTree, options: &'a PrintOptions) -> Self {
        Self {
            old,
            new,
            options,
            pristine: vec![false; new.len()],
        }
    }

    fn is_original(&self, id: NodeId) -> bool {
        id.index() < self.old.len() && self.new.span(id).is_some()
    }

    /// Fills the pristine table for the subtree under `id`.
    fn mark(&mut self, id: NodeId) -> bool {
        let (old, new) = (self.old, self.new);
        let mut pristine = self.is_original(id)
            && new.children(id) == old.children(id)
            && new.text(id) == old.text(id);
        for &child in new.children(id) {
            pristine &= self.mark(child);
        }
        self.pristine[id.index()] = pristine;
        pristine
    }

    fn emit(&self, id: NodeId, out: &mut String) {
        if self.pristine[id.index()] {
            if let Some(span) = self.old.span(id) {
                out.push_str(&self.old.source()[span]);
                return;
            }
        }
        if !self.is_original(id) {
            out.push_str(&print_node(self.new, id, self.options));
            return;
        }
        if let Some(text) = self.new.text(id) {
            out.push_str(text);
            return;
        }
        self.emit_children(id, out);
    }

    fn emit_children(&self, id: NodeId, out: &mut String) {
        let Some(span) = self.old.span(id) else {
            return;
        };
        let source = self.old.source();
        let ops = align(self.old.children(id), self.new.children(id));
        let block = self.is_block(id);

        let mut cursor = span.start;
        let mut prev: Option<NodeId> = None;
        let mut inserted = false;

        for (index, op) in ops.iter().enumerate() {
            match *op {
                Op::Keep(child) => {
                    let Some(child_span) = self.old.span(child) else {
                        continue;
                    };
                    let gap = self.gap(cursor, child_span.start);
                    if inserted && block && self.is_closing(child) && !gap.contains('\n') {
                        out.push('\n');
                        out.push_str(line_indent(source, span.start));
                    } else {
                        out.push_str(gap);
                    }
                    self.emit(child, out);
                    cursor = child_span.end;
                    inserted = false;
                    prev = Some(child);
                }
                Op::Delete(child) => {
                    if let Some(child_span) = self.old.span(child) {
                        cursor = cursor.max(child_span.end);
                    }
                }
                Op::Replace { old, new } => {
                    let Some(old_span) = self.old.span(old) else {
                        continue;
                    };
                    out.push_str(self.gap(cursor, old_span.start));
                    let indent = line_indent(source, old_span.start);
                    out.push_str(&self.fresh(new, indent));
                    cursor = old_span.end;
                    prev = Some(new);
                }
                Op::Insert(child) => {
                    let next = ops[index + 1..].iter().find_map(|op| op.anchor());
                    match next.filter(|next| !self.is_closing(*next)) {
                        // Before an existing sibling: take over its position and
                        // push it to the next line (or after a space).
                        Some(next) => {
                            let next_start = self.old.span(next).map_or(cursor, |s| s.start);
                            out.push_str(self.gap(cursor, next_start));
                            cursor = cursor.max(next_start);
                            let indent = if starts_line(source, next_start) {
                                line_indent(source, next_start).to_string()
                            } else {
                                self.child_indent(id)
                            };
                            out.push_str(&self.fresh(child, &indent));
                            if block {
                                out.push('\n');
                                out.push_str(&indent);
                            } else {
                                out.push(' ');
                            }
                        }
                        // At the end of the list, before its closing delimiter.
                        None => {
                            let indent = self.child_indent(id);
                            out.push_str(&self.separator(id, prev, child, block, &indent));
                            out.push_str(&self.fresh(child, &indent));
                        }
                    }
                    inserted = true;
                    prev = Some(child);
                }
            }
        }
        out.push_str(self.gap(cursor, span.end));
    }

    /// Text for a node that has no original counterpart at this position.
    fn fresh(&self, id: NodeId, indent: &str) -> String {
        if self.is_original(id) {
            let mut out = String::new();
            self.emit(id, &mut out);
            return out;
        }
        print_node_at(self.new, id, self.options, indent)
    }

    fn separator(
        &self,
        parent: NodeId,
        prev: Option<NodeId>,
        child: NodeId,
        block: bool,
        indent: &str,
    ) -> String {
        if matches!(self.new.text(child), Some("," | ";")) {
            return String::new();
        }
        let prev_text = prev.and_then(|p| self.new.text(p));
        if !block {
            return if matches!(prev_text, Some("(" | "[") | None) {
                String::new()
            } else {
                " ".to_string()
            };
        }
        let mut separator = String::from("\n");
        if self.wants_blank_line(parent, prev, child) {
            separator.push('\n');
        }
        separator.push_str(indent);
        separator
    }

    fn wants_blank_line(&self, parent: NodeId, prev: Option<NodeId>, child: NodeId) -> bool {
        if !self.options.blank_line_between_members || self.new.kind(parent) != "declaration_list" {
            return false;
        }
        let Some(prev) = prev.filter(|p| self.new.node(*p).named) else {
            return false;
        };
        separates_members(self.new.kind(prev), self.new.kind(child))
    }

    /// Indentation used by the children of a block, taken from the first
    /// child that starts a line.
    fn child_indent(&self, id: NodeId) -> String {
        let source = self.old.source();
        self.old
            .named_children(id)
            .filter_map(|child| self.old.span(child))
            .find(|span| starts_line(source, span.start))
            .map(|span| line_indent(source, span.start).to_string())
            .unwrap_or_else(|| match (self.old.kind(id), self.old.span(id)) {
                ("program", _) | (_, None) => String::new(),
                (_, Some(span)) => {
                    format!("{}{}", line_indent(source, span.start), self.options.indent_unit())
                }
            })
    }

    fn is_block(&self, id: NodeId) -> bool {
        BLOCK_KINDS.contains(&self.old.kind(id))
            || self
                .old
                .span(id)
                .is_some_and(|span| self.old.source()[span].contains('\n'))
    }

    fn is_closing(&self, id: NodeId) -> bool {
        matches!(self.old.text(id), Some("}" | "]" | ")"))
    }

    fn gap(&self, from: usize, to: usize) -> &'a str {
        let old: &'a SyntaxTree = self.old;
        if from >= to {
            return "";
        }
        &old.source()[from..to]
    }
}

/// Pairs old and new child lists. Children present in both (by id, in order)
/// are kept; runs of removed and added children between two kept ones are
/// paired up as replacements.
fn align(old: &[NodeId], new: &[NodeId]) -> Vec<Op> {
    let mut ops = Vec::with_capacity(new.len().max(old.len()));
    let mut deleted = Vec::new();
    let mut inserted = Vec::new();
    let mut next_old = 0;

    for &child in new {
        match old[next_old..].iter().position(|candidate| *candidate == child) {
            Some(offset) => {
                deleted.extend_from_slice(&old[next_old..next_old + offset]);
                flush(&mut ops, &mut deleted, &mut inserted);
                ops.push(Op::Keep(child));
                next_old += offset + 1;
            }
            None => inserted.push(child),
        }
    }
    deleted.extend_from_slice(&old[next_old..]);
    flush(&mut ops, &mut deleted, &mut inserted);
    ops
}

fn flush(ops: &mut Vec<Op>, deleted: &mut Vec<NodeId>, inserted: &mut Vec<NodeId>) {
    let paired = deleted.len().min(inserted.len());
    for (old, new) in deleted.iter().zip(inserted.iter()) {
        ops.push(Op::Replace { old: *old, new: *new });
    }
    ops.extend(deleted[paired..].iter().map(|id| Op::Delete(*id)));
    ops.extend(inserted[paired..].iter().map(|id| Op::Insert(*id)));
    deleted.clear();
    inserted.clear();
}
