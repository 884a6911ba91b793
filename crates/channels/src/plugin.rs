use {async_trait::async_trait, bytes::Bytes};

use crate::Result;

// ── Inbound events ──────────────────────────────────────────────────────────

/// Events a chat transport delivers to the bot.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChatEvent {
    /// A user posted a message, possibly with files attached.
    Message(MessageEvent),
    /// A user added a reaction to a message.
    Reaction(ReactionEvent),
    /// Anything else the transport delivered (edits, joins, app mentions...).
    Other { event_type: String },
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct MessageEvent {
    pub channel_id: String,
    pub sender_id: Option<String>,
    /// Downloadable handles of every attached file, in posting order.
    pub file_refs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ReactionEvent {
    pub channel_id: String,
    /// Identifier of the message the reaction was added to.
    pub target_message_id: String,
    /// Reaction name without colons.
    pub reaction: String,
    pub user_id: String,
}

/// Receives decoded chat events. The print coordinator is the concrete
/// implementation; transports only depend on this trait.
#[async_trait]
pub trait ChatEventSink: Send + Sync {
    /// Handle one inbound event. Failures are logged by the sink, never
    /// propagated back into the transport's event loop.
    async fn handle_event(&self, event: ChatEvent);
}

// ── Outbound calls ──────────────────────────────────────────────────────────

/// Commands the bot issues against the chat platform.
#[async_trait]
pub trait ChatOutbound: Send + Sync {
    /// Post a plain-text message and return its identifier.
    async fn post_message(&self, channel_id: &str, text: &str) -> Result<String>;

    /// Attach `reaction` to the message `message_id` in `channel_id`.
    async fn add_reaction(&self, channel_id: &str, message_id: &str, reaction: &str)
    -> Result<()>;

    async fn delete_message(&self, channel_id: &str, message_id: &str) -> Result<()>;

    /// Fetch the content behind a file handle from a [`MessageEvent`].
    async fn download_file(&self, file_ref: &str) -> Result<Bytes>;
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_with_kind_tag() {
        let event = ChatEvent::Reaction(ReactionEvent {
            channel_id: "C1".into(),
            target_message_id: "1700000000.000100".into(),
            reaction: "one".into(),
            user_id: "U1".into(),
        });
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["kind"], "reaction");
        assert_eq!(json["reaction"], "one");

        let other = serde_json::to_value(ChatEvent::Other {
            event_type: "channel_join".into(),
        })
        .unwrap();
        assert_eq!(other["kind"], "other");
    }
}
