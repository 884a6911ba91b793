/// Crate-wide result type for print operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Transport, HTTP status or IPP parse failure inside the IPP client.
    #[error(transparent)]
    Client(#[from] ipp::error::IppError),

    #[error("invalid printer uri {uri}: {reason}")]
    InvalidUri { uri: String, reason: String },

    /// The IPP response carried a non-successful status code.
    #[error("print request failed: IPP status 0x{status:04x}{detail}")]
    Ipp {
        status: u16,
        /// `status-message` from the server, prefixed with ": " when present.
        detail: String,
    },

    #[error("IPP response did not include a job-id")]
    MissingJobId,
}

impl Error {
    #[must_use]
    pub fn ipp(status: u16, message: Option<&str>) -> Self {
        Self::Ipp {
            status,
            detail: message.map(|m| format!(": {m}")).unwrap_or_default(),
        }
    }

    #[must_use]
    pub fn invalid_uri(uri: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::InvalidUri {
            uri: uri.into(),
            reason: reason.to_string(),
        }
    }
}
