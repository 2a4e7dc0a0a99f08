//! craftgen-core - Format-preserving rewriting of PHP source files
//!
//! This crate provides functionality to:
//! - Parse PHP into an editable syntax tree and print it back, keeping the
//!   original text of every part that was not touched
//! - Add `use` imports, resolving short-name collisions with aliases
//! - Append code to classes and methods, edit doc comments and merge entries
//!   into array literals
//! - Register generated modules, components and event handlers in existing
//!   Craft CMS projects
pub mod code;
pub mod config;
pub mod error;
pub mod method;
pub mod parser;
pub mod printer;
pub mod registration;
pub mod snippet;
pub mod tree;
pub mod types;
pub mod visitor;
pub mod workspace;

// Re-export commonly used types and traits
pub use error::{Error, Result};
pub use types::*;

// Re-export main API components
pub use config::{Config, ConfigLoader};
pub use method::{MethodSpec, Parameter, Visibility};
pub use printer::PrintOptions;
pub use registration::Outcome;
pub use snippet::{format_snippet, Expr, Snippet};
pub use tree::{NodeId, SyntaxTree};
pub use visitor::{traverse, NodeVisitor, Visit, Visitor};
pub use workspace::{ArrayMerge, EventHandler, Import, RegistrationHandler, Workspace};
