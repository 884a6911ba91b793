use std::{sync::Arc, time::Duration};

use tracing::{debug, warn};

use {printbot_channels::ChatOutbound, printbot_config::PrinterOption};

use crate::{
    Result,
    bounded::chat_call,
    registry::{PendingPrint, PendingRegistry},
};

/// Posts the printer-choice message, registers it, and seeds it with one
/// reaction per printer.
pub struct Prompter {
    outbound: Arc<dyn ChatOutbound>,
    registry: Arc<PendingRegistry>,
    printers: Arc<[PrinterOption]>,
    header: String,
    call_timeout: Duration,
}

impl Prompter {
    pub fn new(
        outbound: Arc<dyn ChatOutbound>,
        registry: Arc<PendingRegistry>,
        printers: Arc<[PrinterOption]>,
        header: impl Into<String>,
        call_timeout: Duration,
    ) -> Self {
        Self {
            outbound,
            registry,
            printers,
            header: header.into(),
            call_timeout,
        }
    }

    /// Prompt text: the header, a blank line, then one line per printer.
    pub fn compose(&self) -> String {
        let lines: Vec<String> = self
            .printers
            .iter()
            .map(|p| {
                if p.note.is_empty() {
                    format!("- :{}: *{}*", p.reaction, p.display_name)
                } else {
                    format!("- :{}: *{}* _({})_", p.reaction, p.display_name, p.note)
                }
            })
            .collect();
        format!("{}\n\n{}", self.header, lines.join("\n"))
    }

    /// Post the prompt in `channel_id`, register it, then attach the printer
    /// reactions.
    ///
    /// The entry is stored before any reaction is attached, so a user who
    /// reacts while the remaining affordances are still going out is already
    /// matched. Only a failure to post the prompt itself is an error; each
    /// reaction is attempted independently and failures are logged.
    pub async fn prompt(&self, channel_id: &str, file_ref: &str) -> Result<PendingPrint> {
        let prompt_message_id = chat_call(
            "post printer prompt",
            self.call_timeout,
            self.outbound.post_message(channel_id, &self.compose()),
        )
        .await?;

        let pending = PendingPrint::new(channel_id, file_ref, prompt_message_id);
        if let Some(replaced) = self.registry.put(pending.clone()) {
            debug!(
                channel_id,
                replaced_prompt = %replaced.prompt_message_id,
                "replaced pending print"
            );
        }
        debug!(
            channel_id,
            prompt_message_id = %pending.prompt_message_id,
            "printer prompt registered, attaching reactions"
        );

        for printer in self.printers.iter() {
            let attached = chat_call(
                "add printer reaction",
                self.call_timeout,
                self.outbound
                    .add_reaction(channel_id, &pending.prompt_message_id, &printer.reaction),
            )
            .await;
            if let Err(e) = attached {
                warn!(
                    channel_id,
                    reaction = %printer.reaction,
                    queue = %printer.queue,
                    error = %e,
                    "could not add printer reaction"
                );
            }
        }

        Ok(pending)
    }
}
