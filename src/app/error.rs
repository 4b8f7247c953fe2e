use thiserror::Error;

#[derive(Error, Debug)]
pub enum RunnelError {
    /// The page no longer looks the way the markup profile expects.
    #[error("Structural mismatch: {0}")]
    StructuralMismatch(String),

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("Invalid selector `{selector}`: {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    ConfigFile(#[from] crate::config::ConfigError),
}

pub type Result<T> = std::result::Result<T, RunnelError>;
