//! Callback-driven tree traversal
//!
//! Every rewrite is one traversal: find a node, mutate it, stop. [`Visitor`]
//! is the capability trait with no-op defaults; [`NodeVisitor`] bundles plain
//! closures so a call site builds a value instead of a new type.

use crate::{
    error::Result,
    tree::{NodeId, SyntaxTree},
};

/// What the traversal should do after a hook ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    Continue,
    /// Do not descend into the current node. `leave_node` is still called.
    SkipChildren,
    /// End the whole traversal immediately.
    Stop,
    /// Put the given (detached) node in place of the current one.
    Replace(NodeId),
}

pub trait Visitor {
    fn before_traverse(&mut self, _tree: &mut SyntaxTree) -> Result<()> {
        Ok(())
    }

    fn enter_node(&mut self, _tree: &mut SyntaxTree, _id: NodeId) -> Result<Visit> {
        Ok(Visit::Continue)
    }

    fn leave_node(&mut self, _tree: &mut SyntaxTree, _id: NodeId) -> Result<Visit> {
        Ok(Visit::Continue)
    }

    fn after_traverse(&mut self, _tree: &mut SyntaxTree) -> Result<()> {
        Ok(())
    }
}

type TreeHook<'a> = Box<dyn FnMut(&mut SyntaxTree) -> Result<()> + 'a>;
type NodeHook<'a> = Box<dyn FnMut(&mut SyntaxTree, NodeId) -> Result<Visit> + 'a>;

/// A [`Visitor`] assembled from up to four optional closures.
#[derive(Default)]
pub struct NodeVisitor<'a> {
    before_traverse: Option<TreeHook<'a>>,
    enter_node: Option<NodeHook<'a>>,
    leave_node: Option<NodeHook<'a>>,
    after_traverse: Option<TreeHook<'a>>,
}

impl<'a> NodeVisitor<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_before_traverse(mut self, hook: impl FnMut(&mut SyntaxTree) -> Result<()> + 'a) -> Self {
        self.before_traverse = Some(Box::new(hook));
        self
    }

    pub fn on_enter(mut self, hook: impl FnMut(&mut SyntaxTree, NodeId) -> Result<Visit> + 'a) -> Self {
        self.enter_node = Some(Box::new(hook));
        self
    }

    pub fn on_leave(mut self, hook: impl FnMut(&mut SyntaxTree, NodeId) -> Result<Visit> + 'a) -> Self {
        self.leave_node = Some(Box::new(hook));
        self
    }

    pub fn on_after_traverse(mut self, hook: impl FnMut(&mut SyntaxTree) -> Result<()> + 'a) -> Self {
        self.after_traverse = Some(Box::new(hook));
        self
    }

    /// Applies `mutate` to the first node matching `predicate`, then stops.
    pub fn first_match(
        predicate: impl Fn(&SyntaxTree, NodeId) -> bool + 'a,
        mut mutate: impl FnMut(&mut SyntaxTree, NodeId) -> Result<()> + 'a,
    ) -> Self {
        Self::new().on_enter(move |tree, id| {
            if !predicate(tree, id) {
                return Ok(Visit::Continue);
            }
            mutate(tree, id)?;
            Ok(Visit::Stop)
        })
    }
}

impl Visitor for NodeVisitor<'_> {
    fn before_traverse(&mut self, tree: &mut SyntaxTree) -> Result<()> {
        match self.before_traverse.as_mut() {
            Some(hook) => hook(tree),
            None => Ok(()),
        }
    }

    fn enter_node(&mut self, tree: &mut SyntaxTree, id: NodeId) -> Result<Visit> {
        match self.enter_node.as_mut() {
            Some(hook) => hook(tree, id),
            None => Ok(Visit::Continue),
        }
    }

    fn leave_node(&mut self, tree: &mut SyntaxTree, id: NodeId) -> Result<Visit> {
        match self.leave_node.as_mut() {
            Some(hook) => hook(tree, id),
            None => Ok(Visit::Continue),
        }
    }

    fn after_traverse(&mut self, tree: &mut SyntaxTree) -> Result<()> {
        match self.after_traverse.as_mut() {
            Some(hook) => hook(tree),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Stop,
}

/// Walks the named nodes below the root in document order.
pub fn traverse(tree: &mut SyntaxTree, visitor: &mut dyn Visitor) -> Result<()> {
    visitor.before_traverse(tree)?;
    let statements = tree.children(tree.root()).to_vec();
    for statement in statements {
        if walk(tree, statement, visitor)? == Flow::Stop {
            tracing::trace!("Traversal stopped at node {}", statement.index());
            break;
        }
    }
    visitor.after_traverse(tree)
}

fn walk(tree: &mut SyntaxTree, id: NodeId, visitor: &mut dyn Visitor) -> Result<Flow> {
    if !tree.node(id).named {
        return Ok(Flow::Continue);
    }

    let mut current = id;
    let descend = match visitor.enter_node(tree, current)? {
        Visit::Stop => return Ok(Flow::Stop),
        Visit::SkipChildren => false,
        Visit::Replace(replacement) => {
            tree.replace_node(current, replacement);
            current = replacement;
            true
        }
        Visit::Continue => true,
    };

    if descend {
        let children = tree.children(current).to_vec();
        for child in children {
            if walk(tree, child, visitor)? == Flow::Stop {
                return Ok(Flow::Stop);
            }
        }
    }

    match visitor.leave_node(tree, current)? {
        Visit::Stop => Ok(Flow::Stop),
        Visit::Replace(replacement) => {
            tree.replace_node(current, replacement);
            Ok(Flow::Continue)
        }
        Visit::Continue | Visit::SkipChildren => Ok(Flow::Continue),
    }
}
