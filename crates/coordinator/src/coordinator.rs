use std::{sync::Arc, time::Duration};

use {
    async_trait::async_trait,
    tracing::{debug, warn},
};

use {
    printbot_channels::{ChatEvent, ChatEventSink, ChatOutbound, MessageEvent, ReactionEvent},
    printbot_config::{MessagesConfig, PrintbotConfig, PrinterOption},
    printbot_printing::PrintService,
};

use crate::{
    bounded::chat_call,
    correlator::{Correlator, IgnoreReason, Resolution},
    dispatcher::Dispatcher,
    prompter::Prompter,
    registry::PendingRegistry,
};

/// Everything the coordinator needs besides its collaborators.
#[derive(Debug, Clone)]
pub struct CoordinatorSettings {
    pub printers: Vec<PrinterOption>,
    pub messages: MessagesConfig,
    /// The bot's own user id; its messages and reactions are ignored.
    pub bot_user_id: String,
    /// Bound on every chat and print call.
    pub request_timeout: Duration,
    /// Prompts older than this can no longer be resolved. `None` keeps them forever.
    pub prompt_ttl: Option<Duration>,
}

impl CoordinatorSettings {
    pub fn from_config(config: &PrintbotConfig, bot_user_id: impl Into<String>) -> Self {
        Self {
            printers: config.printers.clone(),
            messages: config.messages.clone(),
            bot_user_id: bot_user_id.into(),
            request_timeout: Duration::from_secs(config.bot.request_timeout_secs),
            prompt_ttl: (config.bot.prompt_ttl_secs > 0)
                .then(|| Duration::from_secs(config.bot.prompt_ttl_secs)),
        }
    }
}

/// Routes chat events through prompting, correlation and dispatch.
pub struct PrintCoordinator {
    registry: Arc<PendingRegistry>,
    prompter: Prompter,
    correlator: Correlator,
    dispatcher: Dispatcher,
    outbound: Arc<dyn ChatOutbound>,
    send_one_file: String,
    bot_user_id: String,
    request_timeout: Duration,
}

impl PrintCoordinator {
    pub fn new(
        settings: CoordinatorSettings,
        outbound: Arc<dyn ChatOutbound>,
        print_service: Arc<dyn PrintService>,
    ) -> Self {
        let CoordinatorSettings {
            printers,
            messages,
            bot_user_id,
            request_timeout,
            prompt_ttl,
        } = settings;
        let printers: Arc<[PrinterOption]> = printers.into();
        let registry = Arc::new(PendingRegistry::new(prompt_ttl));

        Self {
            prompter: Prompter::new(
                Arc::clone(&outbound),
                Arc::clone(&registry),
                Arc::clone(&printers),
                messages.prompt_header.clone(),
                request_timeout,
            ),
            correlator: Correlator::new(Arc::clone(&registry), printers, bot_user_id.clone()),
            send_one_file: messages.send_one_file.clone(),
            dispatcher: Dispatcher::new(
                Arc::clone(&outbound),
                print_service,
                messages,
                request_timeout,
            ),
            registry,
            outbound,
            bot_user_id,
            request_timeout,
        }
    }

    pub fn registry(&self) -> &Arc<PendingRegistry> {
        &self.registry
    }

    /// A message with exactly one file becomes a printer prompt; any other
    /// file count gets the "send one file" notice.
    pub async fn on_message(&self, event: MessageEvent) {
        if event.sender_id.as_deref() == Some(self.bot_user_id.as_str()) {
            debug!(channel_id = %event.channel_id, "ignoring own message");
            return;
        }

        let [file_ref] = event.file_refs.as_slice() else {
            debug!(
                channel_id = %event.channel_id,
                files = event.file_refs.len(),
                "message does not carry exactly one file"
            );
            if let Err(e) = chat_call(
                "post send-one-file notice",
                self.request_timeout,
                self.outbound
                    .post_message(&event.channel_id, &self.send_one_file),
            )
            .await
            {
                warn!(channel_id = %event.channel_id, error = %e, "could not post notice");
            }
            return;
        };

        if let Err(e) = self.prompter.prompt(&event.channel_id, file_ref).await {
            warn!(channel_id = %event.channel_id, error = %e, "could not post printer prompt");
        }
    }

    /// Resolve a reaction and, when it picks a printer, print the file.
    pub async fn on_reaction(&self, event: ReactionEvent) {
        match self.correlator.correlate(&event) {
            Resolution::Resolved(resolved) => {
                if let Err(e) = self.dispatcher.dispatch(resolved).await {
                    warn!(channel_id = %event.channel_id, error = %e, "print dispatch failed");
                }
            },
            Resolution::Ignored(IgnoreReason::UnknownReaction) => {
                warn!(
                    channel_id = %event.channel_id,
                    reaction = %event.reaction,
                    "unknown reaction"
                );
            },
            Resolution::Ignored(reason) => {
                debug!(
                    channel_id = %event.channel_id,
                    reaction = %event.reaction,
                    %reason,
                    "reaction ignored"
                );
            },
        }
    }
}

#[async_trait]
impl ChatEventSink for PrintCoordinator {
    async fn handle_event(&self, event: ChatEvent) {
        match event {
            ChatEvent::Message(message) => self.on_message(message).await,
            ChatEvent::Reaction(reaction) => self.on_reaction(reaction).await,
            ChatEvent::Other { event_type } => debug!(event_type = %event_type, "ignoring event"),
        }
    }
}
