use std::sync::Arc;

use {
    printbot_channels::ReactionEvent,
    printbot_config::{PrinterOption, printer_for_reaction},
};

use crate::registry::{PendingPrint, PendingRegistry};

/// Why a reaction did not resolve a pending print.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// The channel has no live prompt (never had one, already resolved, or expired).
    NoPendingPrompt,
    /// The reaction is on some other message than the live prompt.
    UnrelatedMessage,
    /// The reaction does not belong to any configured printer.
    UnknownReaction,
    /// The bot's own reaction, e.g. the affordances it attached itself.
    OwnReaction,
}

impl std::fmt::Display for IgnoreReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::NoPendingPrompt => "no pending prompt",
            Self::UnrelatedMessage => "reaction on unrelated message",
            Self::UnknownReaction => "unknown reaction",
            Self::OwnReaction => "own reaction",
        })
    }
}

/// A reaction that picked a printer for a pending print.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPrint {
    /// The entry, already removed from the registry.
    pub pending: PendingPrint,
    pub printer: PrinterOption,
    /// Who picked the printer.
    pub user_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Resolved(ResolvedPrint),
    Ignored(IgnoreReason),
}

/// Matches reaction events against the registry.
pub struct Correlator {
    registry: Arc<PendingRegistry>,
    printers: Arc<[PrinterOption]>,
    bot_user_id: String,
}

impl Correlator {
    pub fn new(
        registry: Arc<PendingRegistry>,
        printers: Arc<[PrinterOption]>,
        bot_user_id: impl Into<String>,
    ) -> Self {
        Self {
            registry,
            printers,
            bot_user_id: bot_user_id.into(),
        }
    }

    /// Resolve `event` to a printer, removing the pending entry on success.
    ///
    /// Checks, in order: a live entry exists for the channel, the reaction
    /// targets its prompt, the reaction names a configured printer, and the
    /// reacting user is not the bot. Validation and removal happen under the
    /// registry lock, so of two matching reactions exactly one resolves.
    pub fn correlate(&self, event: &ReactionEvent) -> Resolution {
        let outcome = self.registry.remove_if(&event.channel_id, |pending| {
            if pending.prompt_message_id != event.target_message_id {
                return Err(IgnoreReason::UnrelatedMessage);
            }
            let printer = printer_for_reaction(&self.printers, &event.reaction)
                .ok_or(IgnoreReason::UnknownReaction)?;
            if event.user_id == self.bot_user_id {
                return Err(IgnoreReason::OwnReaction);
            }
            Ok(printer.clone())
        });

        match outcome {
            None if event.user_id == self.bot_user_id => {
                Resolution::Ignored(IgnoreReason::OwnReaction)
            },
            None => Resolution::Ignored(IgnoreReason::NoPendingPrompt),
            Some(Err(reason)) => Resolution::Ignored(reason),
            Some(Ok((pending, printer))) => Resolution::Resolved(ResolvedPrint {
                pending,
                printer,
                user_id: event.user_id.clone(),
            }),
        }
    }
}
