use std::{sync::Arc, time::Duration};

use tracing::{info, warn};

use {
    printbot_channels::ChatOutbound,
    printbot_config::MessagesConfig,
    printbot_printing::{JobId, PrintDocument, PrintService},
};

use crate::{
    Result,
    bounded::{chat_call, print_call},
    correlator::ResolvedPrint,
};

/// Name every job is submitted under.
pub const DOCUMENT_NAME: &str = "printbot.pdf";
/// Documents are always submitted as PDF.
pub const DOCUMENT_MIME_TYPE: &str = "application/pdf";

/// Carries a resolved print through cleanup, download, submission and the
/// final channel notice.
pub struct Dispatcher {
    outbound: Arc<dyn ChatOutbound>,
    print_service: Arc<dyn PrintService>,
    messages: MessagesConfig,
    call_timeout: Duration,
}

impl Dispatcher {
    pub fn new(
        outbound: Arc<dyn ChatOutbound>,
        print_service: Arc<dyn PrintService>,
        messages: MessagesConfig,
        call_timeout: Duration,
    ) -> Self {
        Self {
            outbound,
            print_service,
            messages,
            call_timeout,
        }
    }

    /// Print the file behind `resolved` on its chosen printer.
    ///
    /// The prompt deletion is best-effort. A failed download or submission
    /// posts the failure notice to the channel and returns the error; the
    /// pending entry is already gone either way.
    pub async fn dispatch(&self, resolved: ResolvedPrint) -> Result<JobId> {
        let ResolvedPrint {
            pending,
            printer,
            user_id,
        } = resolved;
        let channel_id = pending.channel_id.as_str();

        if let Err(e) = chat_call(
            "delete printer prompt",
            self.call_timeout,
            self.outbound
                .delete_message(channel_id, &pending.prompt_message_id),
        )
        .await
        {
            warn!(
                channel_id,
                prompt_message_id = %pending.prompt_message_id,
                error = %e,
                "could not delete printer prompt"
            );
        }

        let data = match chat_call(
            "download shared file",
            self.call_timeout,
            self.outbound.download_file(&pending.file_ref),
        )
        .await
        {
            Ok(data) => data,
            Err(e) => {
                warn!(channel_id, file = %pending.file_ref, error = %e, "download failed");
                self.notify_failure(channel_id).await;
                return Err(e);
            },
        };

        let document = PrintDocument {
            data,
            name: DOCUMENT_NAME.to_string(),
            mime_type: DOCUMENT_MIME_TYPE.to_string(),
        };
        let size = document.size();
        let job = match print_call(
            self.call_timeout,
            self.print_service
                .submit_print_job(document, &printer.queue, &printer.options),
        )
        .await
        {
            Ok(job) => job,
            Err(e) => {
                warn!(
                    channel_id,
                    printer = %printer.queue,
                    error = %e,
                    "print submission failed"
                );
                self.notify_failure(channel_id).await;
                return Err(e);
            },
        };

        if let Err(e) = chat_call(
            "post printed notice",
            self.call_timeout,
            self.outbound.post_message(channel_id, &self.messages.printed),
        )
        .await
        {
            warn!(channel_id, error = %e, "could not post printed notice");
        }

        info!(
            user = %user_id,
            file = %pending.file_ref,
            printer = %printer.queue,
            job = %job,
            size,
            "file sent to printer"
        );
        Ok(job)
    }

    async fn notify_failure(&self, channel_id: &str) {
        if let Err(e) = chat_call(
            "post failure notice",
            self.call_timeout,
            self.outbound.post_message(channel_id, &self.messages.failure),
        )
        .await
        {
            warn!(channel_id, error = %e, "could not post failure notice");
        }
    }
}
