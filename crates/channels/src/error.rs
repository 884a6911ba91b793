use std::error::Error as StdError;

/// Crate-wide result type for channel operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Typed channel errors shared across channel traits.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Inbound payload does not have the expected shape.
    #[error("malformed {kind} event: {message}")]
    MalformedEvent { kind: String, message: String },

    /// The platform API answered but refused the call.
    #[error("{method} rejected: {reason}")]
    Rejected { method: String, reason: String },

    /// Wrapped source error from an external dependency.
    #[error("channel operation failed: {context}: {source}")]
    External {
        context: String,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
}

impl Error {
    #[must_use]
    pub fn malformed(kind: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::MalformedEvent {
            kind: kind.into(),
            message: message.to_string(),
        }
    }

    #[must_use]
    pub fn rejected(method: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::Rejected {
            method: method.into(),
            reason: reason.to_string(),
        }
    }

    #[must_use]
    pub fn external(
        context: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self::External {
            context: context.into(),
            source: Box::new(source),
        }
    }
}
