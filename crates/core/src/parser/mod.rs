//! PHP source parsing using tree-sitter

pub mod php_parser;
pub mod utils;

pub use php_parser::PhpParser;
pub use utils::{find_first_error, node_to_position};
