use std::sync::Arc;

use {
    async_trait::async_trait,
    bytes::Bytes,
    slack_morphism::{errors::SlackClientError, prelude::*},
    tracing::debug,
};

use printbot_channels::{ChatOutbound, Error, Result};

use crate::download::FileDownloader;

/// Web API side of the Slack transport.
pub struct SlackOutbound {
    client: Arc<SlackHyperClient>,
    token: SlackApiToken,
    downloader: FileDownloader,
}

impl SlackOutbound {
    pub fn new(client: Arc<SlackHyperClient>, token: SlackApiToken, downloader: FileDownloader) -> Self {
        Self {
            client,
            token,
            downloader,
        }
    }
}

/// Slack answering `ok: false` is a refusal; anything else (HTTP, rate
/// limit, unparseable body) is a transport failure.
fn call_error(method: &str, err: SlackClientError) -> Error {
    match err {
        SlackClientError::ApiError(api) => Error::rejected(method, api.code),
        other => Error::external(method, other),
    }
}

#[async_trait]
impl ChatOutbound for SlackOutbound {
    async fn post_message(&self, channel_id: &str, text: &str) -> Result<String> {
        let session = self.client.open_session(&self.token);
        let request = SlackApiChatPostMessageRequest::new(
            SlackChannelId::new(channel_id.to_string()),
            SlackMessageContent::new().with_text(text.to_string()),
        );
        let response = session
            .chat_post_message(&request)
            .await
            .map_err(|e| call_error("chat.postMessage", e))?;
        debug!(channel_id, ts = %response.ts, "message posted");
        Ok(response.ts.to_string())
    }

    async fn add_reaction(&self, channel_id: &str, message_id: &str, reaction: &str) -> Result<()> {
        let session = self.client.open_session(&self.token);
        let request = SlackApiReactionsAddRequest::new(
            SlackChannelId::new(channel_id.to_string()),
            SlackReactionName::new(reaction.to_string()),
            SlackTs::new(message_id.to_string()),
        );
        session
            .reactions_add(&request)
            .await
            .map_err(|e| call_error("reactions.add", e))?;
        Ok(())
    }

    async fn delete_message(&self, channel_id: &str, message_id: &str) -> Result<()> {
        let session = self.client.open_session(&self.token);
        let request = SlackApiChatDeleteRequest::new(
            SlackChannelId::new(channel_id.to_string()),
            SlackTs::new(message_id.to_string()),
        );
        session
            .chat_delete(&request)
            .await
            .map_err(|e| call_error("chat.delete", e))?;
        Ok(())
    }

    async fn download_file(&self, file_ref: &str) -> Result<Bytes> {
        self.downloader.download(file_ref).await
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        super::*,
        slack_morphism::errors::{
            SlackClientApiError, SlackClientEndOfStreamError, SlackRateLimitError,
        },
    };

    #[test]
    fn api_refusal_is_rejected() {
        let err = call_error(
            "reactions.add",
            SlackClientError::ApiError(SlackClientApiError::new("already_reacted".into())),
        );
        assert!(
            matches!(&err, Error::Rejected { method, reason }
                if method == "reactions.add" && reason == "already_reacted"),
            "{err}"
        );
    }

    #[test]
    fn transport_failures_are_external() {
        let err = call_error(
            "chat.postMessage",
            SlackClientError::EndOfStream(SlackClientEndOfStreamError::new()),
        );
        assert!(matches!(&err, Error::External { context, .. } if context == "chat.postMessage"));

        let err = call_error(
            "chat.delete",
            SlackClientError::RateLimitError(SlackRateLimitError::new()),
        );
        assert!(matches!(err, Error::External { .. }));
    }
}
