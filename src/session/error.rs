use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("token store i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("token store serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("refusing to store an incomplete token pair")]
    IncompletePair,
}

/// Errors surfaced to whoever submitted the login form.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("{message}")]
    Rejected {
        status: u16,
        message: String,
        code: Option<String>,
    },
    #[error("Request timed out. Please try again.")]
    Timeout,
    #[error("Unable to reach the server: {0}")]
    Network(String),
    #[error("Unexpected response from the server: {0}")]
    InvalidResponse(String),
    #[error("Session could not be persisted: {0}")]
    StorageUnavailable(#[from] StoreError),
    #[error("Invalid client configuration: {0}")]
    Config(String),
}

impl AuthError {
    /// Machine-readable code from the endpoint's error payload, if it sent one.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Rejected { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}
