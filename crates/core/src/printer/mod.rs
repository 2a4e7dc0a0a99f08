//! Rendering syntax trees back to PHP source
//!
//! Two printers live here: [`standard`] lays out any subtree from scratch and
//! is used for fresh code and for change detection, while [`preserving`]
//! re-emits a mutated tree reusing the original bytes of everything that did
//! not change.

pub mod preserving;
pub mod standard;

pub use preserving::print_format_preserving;
pub use standard::{print_node, print_nodes};

use crate::config::Config;

/// Layout settings shared by both printers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintOptions {
    pub indent_width: usize,
    pub blank_line_between_members: bool,
}

impl Default for PrintOptions {
    fn default() -> Self {
        Self {
            indent_width: 4,
            blank_line_between_members: true,
        }
    }
}

impl PrintOptions {
    pub fn indent_unit(&self) -> String {
        " ".repeat(self.indent_width)
    }
}

/// Whether two adjacent class members are separated by a blank line.
pub(crate) fn separates_members(prev: &str, next: &str) -> bool {
    prev != "comment"
        && (next == "method_declaration" || next == "comment" || prev == "method_declaration")
}

impl From<&Config> for PrintOptions {
    fn from(config: &Config) -> Self {
        Self {
            indent_width: config.indent_width,
            blank_line_between_members: config.blank_line_between_members,
        }
    }
}
