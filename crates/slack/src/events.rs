//! Decoding of Events API callback bodies into [`ChatEvent`].

use slack_morphism::prelude::*;

use printbot_channels::{ChatEvent, Error, MessageEvent, ReactionEvent, Result};

/// Decode one Events API `event` body.
///
/// Plain messages and `file_share` messages become [`ChatEvent::Message`],
/// other message subtypes (edits, deletions, joins) become
/// [`ChatEvent::Other`]. Reactions on files rather than messages are also
/// `Other`, since no prompt can be a file.
pub fn decode_event(body: &SlackEventCallbackBody) -> Result<ChatEvent> {
    match body {
        SlackEventCallbackBody::Message(message) => decode_message(message),
        SlackEventCallbackBody::ReactionAdded(reaction) => decode_reaction(reaction),
        other => Ok(ChatEvent::Other {
            event_type: event_type_name(other),
        }),
    }
}

fn decode_message(message: &SlackMessageEvent) -> Result<ChatEvent> {
    if let Some(subtype) = &message.subtype
        && *subtype != SlackMessageEventType::FileShare
    {
        return Ok(ChatEvent::Other {
            event_type: format!("message.{}", subtype_name(subtype)),
        });
    }
    let channel_id = message
        .origin
        .channel
        .as_ref()
        .map(|c| c.to_string())
        .ok_or_else(|| Error::malformed("message", "missing channel"))?;
    let file_refs = message
        .content
        .as_ref()
        .and_then(|c| c.files.as_deref())
        .unwrap_or_default()
        .iter()
        .map(|f| {
            f.url_private_download
                .as_ref()
                .or(f.url_private.as_ref())
                .map(|url| url.to_string())
                .ok_or_else(|| Error::malformed("message", "file without download url"))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(ChatEvent::Message(MessageEvent {
        channel_id,
        sender_id: message.sender.user.as_ref().map(|u| u.to_string()),
        file_refs,
    }))
}

fn decode_reaction(reaction: &SlackReactionAddedEvent) -> Result<ChatEvent> {
    let SlackReactionsItem::Message(item) = &reaction.item else {
        return Ok(ChatEvent::Other {
            event_type: "reaction_added.file".into(),
        });
    };
    let channel_id = item
        .origin
        .channel
        .as_ref()
        .map(|c| c.to_string())
        .ok_or_else(|| Error::malformed("reaction_added", "reaction item without channel"))?;

    Ok(ChatEvent::Reaction(ReactionEvent {
        channel_id,
        target_message_id: item.origin.ts.to_string(),
        reaction: reaction.reaction.to_string(),
        user_id: reaction.user.to_string(),
    }))
}

fn subtype_name(subtype: &SlackMessageEventType) -> String {
    match subtype {
        SlackMessageEventType::Other(name) => name.clone(),
        known => format!("{known:?}"),
    }
}

/// Wire name of an event the coordinator does not act on, for logging.
fn event_type_name(body: &SlackEventCallbackBody) -> String {
    match body {
        SlackEventCallbackBody::ReactionRemoved(_) => "reaction_removed".into(),
        SlackEventCallbackBody::AppMention(_) => "app_mention".into(),
        SlackEventCallbackBody::FileShared(_) => "file_shared".into(),
        SlackEventCallbackBody::FileCreated(_) => "file_created".into(),
        SlackEventCallbackBody::MemberJoinedChannel(_) => "member_joined_channel".into(),
        SlackEventCallbackBody::Unknown(value) => value
            .get("type")
            .and_then(|t| t.as_str())
            .unwrap_or("unknown")
            .to_string(),
        _ => "unhandled".into(),
    }
}
