//! Socket Mode connection handler for Slack.
//!
//! Uses slack-morphism's socket mode listener to receive events via WebSocket
//! without requiring a public HTTP endpoint.

use std::{sync::Arc, time::Duration};

use {
    anyhow::Result,
    secrecy::ExposeSecret,
    slack_morphism::prelude::*,
    tokio_util::sync::CancellationToken,
    tracing::{debug, info, warn},
};

use {printbot_channels::ChatEventSink, printbot_config::SlackConfig};

use crate::{download::FileDownloader, events::decode_event, outbound::SlackOutbound};

/// Shared state for socket mode callbacks.
#[derive(Clone)]
struct SocketModeState {
    sink: Arc<dyn ChatEventSink>,
}

/// An authenticated Slack workspace connection, ready to listen.
pub struct SlackConnection {
    client: Arc<SlackHyperClient>,
    app_token: SlackApiToken,
    bot_user_id: String,
    outbound: Arc<SlackOutbound>,
}

/// Authenticate the bot token and prepare the Web API client.
///
/// Fails when the tokens are rejected; nothing is listening yet.
pub async fn connect(config: &SlackConfig, request_timeout: Duration) -> Result<SlackConnection> {
    let client = Arc::new(SlackClient::new(SlackClientHyperConnector::new()?));

    let token = SlackApiToken::new(SlackApiTokenValue::new(
        config.bot_token.expose_secret().clone(),
    ));
    let auth_test = client.open_session(&token).auth_test().await?;
    let bot_user_id = auth_test.user_id.to_string();

    info!(
        bot_user_id = %bot_user_id,
        bot_user = ?auth_test.user,
        "slack bot authenticated"
    );

    let downloader = FileDownloader::new(config.bot_token.clone(), request_timeout)?;
    let outbound = Arc::new(SlackOutbound::new(Arc::clone(&client), token, downloader));

    Ok(SlackConnection {
        client,
        app_token: SlackApiToken::new(SlackApiTokenValue::new(
            config.app_token.expose_secret().clone(),
        )),
        bot_user_id,
        outbound,
    })
}

impl SlackConnection {
    /// User id the bot posts and reacts as.
    pub fn bot_user_id(&self) -> &str {
        &self.bot_user_id
    }

    pub fn outbound(&self) -> Arc<SlackOutbound> {
        Arc::clone(&self.outbound)
    }

    /// Deliver push events to `sink` until `cancel` fires.
    pub async fn run(self, sink: Arc<dyn ChatEventSink>, cancel: CancellationToken) -> Result<()> {
        let callbacks = SlackSocketModeListenerCallbacks::new().with_push_events(handle_push_events);

        let listener_env = Arc::new(
            SlackClientEventsListenerEnvironment::new(Arc::clone(&self.client))
                .with_user_state(SocketModeState { sink }),
        );

        let socket_listener = SlackClientSocketModeListener::new(
            &SlackClientSocketModeConfig::new(),
            listener_env,
            callbacks,
        );

        socket_listener.listen_for(&self.app_token).await?;
        info!("socket mode listening");

        cancel.cancelled().await;
        info!("socket mode cancelled");
        socket_listener.shutdown().await;
        Ok(())
    }
}

/// Handle push events (messages, reactions, etc.)
async fn handle_push_events(
    event: SlackPushEventCallback,
    _client: Arc<SlackHyperClient>,
    states: SlackClientEventsUserState,
) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let sink = {
        let guard = states.read().await;
        let state = guard
            .get_user_state::<SocketModeState>()
            .ok_or("missing socket mode state")?;
        Arc::clone(&state.sink)
    };

    match decode_event(&event.event) {
        Ok(chat_event) => {
            debug!(event_id = %event.event_id, "dispatching push event");
            // Acknowledge right away; printing can take a while.
            tokio::spawn(async move { sink.handle_event(chat_event).await });
        },
        Err(e) => {
            warn!(event_id = %event.event_id, error = %e, "dropping malformed push event");
        },
    }

    Ok(())
}
