use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_EVENT_CLASS: &str = "yii\\base\\Event";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct Config {
    /// Spaces per indentation level for freshly printed code.
    pub indent_width: usize,
    /// Separate methods from neighbouring class members with a blank line.
    pub blank_line_between_members: bool,
    /// Class whose static `on()` attaches class-level event handlers.
    pub event_class: String,
    /// Methods tried, in order, when registering an event handler.
    pub registration_methods: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            indent_width: 4,
            blank_line_between_members: true,
            event_class: DEFAULT_EVENT_CLASS.to_string(),
            registration_methods: vec!["attachEventHandlers".to_string(), "init".to_string()],
        }
    }
}

impl Config {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&contents).map_err(|e| {
            Error::ConfigError(format!("Failed to parse {}: {e}", path.display()))
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| Error::ConfigError(format!("Failed to serialize config: {e}")))?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.indent_width == 0 || self.indent_width > 16 {
            return Err(Error::ConfigError(format!(
                "indent_width must be between 1 and 16, got {}",
                self.indent_width
            )));
        }
        if self.event_class.trim().is_empty() {
            return Err(Error::ConfigError("event_class must not be empty".to_string()));
        }
        Ok(())
    }
}
