use std::time::Duration;

/// Crate-wide result type for coordination steps.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A chat platform call failed.
    #[error("{operation} failed: {source}")]
    Chat {
        operation: &'static str,
        #[source]
        source: printbot_channels::Error,
    },

    /// The print service refused or could not be reached.
    #[error("print submission failed: {0}")]
    Print(#[from] printbot_printing::Error),

    /// An external call did not finish within the configured bound.
    #[error("{operation} timed out after {limit:?}")]
    Timeout {
        operation: &'static str,
        limit: Duration,
    },
}
