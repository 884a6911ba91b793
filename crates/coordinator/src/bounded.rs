//! Deadline wrappers for every external call the coordinator makes.

use std::{future::Future, time::Duration};

use crate::{Error, Result};

/// Run a chat platform call, failing with [`Error::Timeout`] after `limit`.
pub async fn chat_call<T>(
    operation: &'static str,
    limit: Duration,
    call: impl Future<Output = printbot_channels::Result<T>>,
) -> Result<T> {
    match tokio::time::timeout(limit, call).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(source)) => Err(Error::Chat { operation, source }),
        Err(_) => Err(Error::Timeout { operation, limit }),
    }
}

/// Run a print service call, failing with [`Error::Timeout`] after `limit`.
pub async fn print_call<T>(
    limit: Duration,
    call: impl Future<Output = printbot_printing::Result<T>>,
) -> Result<T> {
    match tokio::time::timeout(limit, call).await {
        Ok(result) => Ok(result?),
        Err(_) => Err(Error::Timeout {
            operation: "print job submission",
            limit,
        }),
    }
}
