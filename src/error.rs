use thiserror::Error;
use uuid::Uuid;

/// Explorer-wide error type
#[derive(Debug, Error)]
pub enum Error {
    /// The metadata service answered with a fault
    #[error("Service fault: {0}")]
    ProviderFault(String),

    /// Authentication or transport security failure
    #[error("Security fault: {0}")]
    ProviderSecurityFault(String),

    /// Any other provider failure
    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Unknown connection: {0}")]
    UnknownConnection(Uuid),

    #[error("Refresh already in progress for {0}")]
    RefreshInProgress(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience Result type using our Error
pub type Result<T> = std::result::Result<T, Error>;
