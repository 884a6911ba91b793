use std::path::PathBuf;

/// Crate-wide result type for config operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while locating or parsing the config file.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No config file in any of the searched locations.
    #[error("no config file found (searched: {})", searched.join(", "))]
    NotFound { searched: Vec<String> },

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("unsupported config format: .{extension}")]
    UnsupportedFormat { extension: String },
}

impl Error {
    #[must_use]
    pub fn parse(path: &std::path::Path, message: impl std::fmt::Display) -> Self {
        Self::Parse {
            path: path.to_path_buf(),
            message: message.to_string(),
        }
    }
}
