//! Chat channel abstractions.
//!
//! A chat transport (Slack today) decodes its wire events into [`ChatEvent`]
//! and hands them to a [`ChatEventSink`]; the sink talks back through
//! [`ChatOutbound`].

pub mod error;
pub mod plugin;

pub use {
    error::{Error, Result},
    plugin::{ChatEvent, ChatEventSink, ChatOutbound, MessageEvent, ReactionEvent},
};
