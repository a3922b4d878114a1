use thiserror::Error;

/// Failure taxonomy for the controller. Nothing here is fatal: the
/// host logs the error and keeps the last known good table or
/// forecast, and the decision path fails open to "load ON".
#[derive(Debug, Error)]
pub enum ShedError {
    /// A fetch failed or timed out. The next scheduled refresh retries.
    #[error("transport: {0}")]
    Transport(String),

    /// A response body failed to parse or had an unexpected shape.
    #[error("data format: {0}")]
    DataFormat(String),

    /// A decision needed a value that has not arrived yet.
    #[error("missing data: {0}")]
    MissingData(String),
}
