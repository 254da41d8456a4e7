use thiserror::Error;

/// Dispatcher misuse; expected outcomes (missing file, unknown type) are
/// answered in the response instead
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("path must be a non-empty string")]
    InvalidPath,
}

/// Server startup errors
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
