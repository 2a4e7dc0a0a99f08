use std::io;

/// Errors that can occur while rewriting PHP source
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Syntax error on line {line}, column {column}: {message}")]
    SyntaxError {
        line: u32,
        column: u32,
        message: String,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Tree-sitter error: {0}")]
    TreeSitterError(String),

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl Error {
    pub fn is_syntax_error(&self) -> bool {
        matches!(self, Error::SyntaxError { .. })
    }
}

/// Result type alias for craftgen operations
pub type Result<T> = std::result::Result<T, Error>;
