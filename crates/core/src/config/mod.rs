//! Configuration management for craftgen

mod loader;
mod settings;

pub use loader::{ConfigLoader, CONFIG_FILE_NAME};
pub use settings::Config;
