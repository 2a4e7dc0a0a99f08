pub mod file;

pub use file::{load_config, read_source, PhpFile};
