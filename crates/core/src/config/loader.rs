//! Discovery of `.craftgen.json` files

use super::Config;
use crate::error::Result;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = ".craftgen.json";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads the nearest config for the current directory.
    pub fn load() -> Result<Config> {
        match std::env::current_dir() {
            Ok(cwd) => Self::load_from_path(&cwd),
            Err(_) => Ok(Config::default()),
        }
    }

    /// Loads the nearest config at or above `path`; defaults when there is none.
    pub fn load_from_path(path: &Path) -> Result<Config> {
        match Self::find_config_file(path) {
            Some(config_path) => {
                tracing::debug!("Loading config from {:?}", config_path);
                Config::load_from_file(&config_path)
            }
            None => {
                tracing::debug!("No {} found above {:?}, using defaults", CONFIG_FILE_NAME, path);
                Ok(Config::default())
            }
        }
    }

    pub fn find_config_file(start_path: &Path) -> Option<PathBuf> {
        let mut current = if start_path.is_file() {
            start_path.parent()?
        } else {
            start_path
        };

        loop {
            let config_path = current.join(CONFIG_FILE_NAME);
            if config_path.is_file() {
                return Some(config_path);
            }
            current = current.parent()?;
        }
    }
}
