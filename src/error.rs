use thiserror::Error;

#[derive(Error, Debug)]
pub enum HuffmanError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Corrupt payload: {0}")]
    CorruptPayload(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Config error: {0}")]
    Config(String),

    #[error("MCP error: {0}")]
    Mcp(String),
}

impl HuffmanError {
    /// Caller-correctable errors, as opposed to failures of the service itself.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            HuffmanError::InvalidInput(_)
                | HuffmanError::SessionNotFound(_)
                | HuffmanError::CorruptPayload(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, HuffmanError>;
