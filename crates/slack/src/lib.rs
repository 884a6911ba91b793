//! Slack transport: Socket Mode event intake and Web API calls.

pub mod download;
pub mod events;
pub mod outbound;
pub mod socket;

pub use {
    download::FileDownloader,
    events::decode_event,
    outbound::SlackOutbound,
    socket::{SlackConnection, connect},
};
