//! In-memory map of channels awaiting a printer choice.
//!
//! Every read and write goes through one `std::sync::Mutex`; it is never held
//! across an `.await`, so handlers running on different tasks see a
//! consistent view and the overwrite on a second file share is atomic.

use std::{
    collections::HashMap,
    sync::Mutex,
    time::{Duration, Instant},
};

use tracing::debug;

/// A channel waiting for someone to react to the printer prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingPrint {
    pub channel_id: String,
    /// Opaque handle the chat platform can download the file from.
    pub file_ref: String,
    /// Identifier of the prompt message; reactions elsewhere are ignored.
    pub prompt_message_id: String,
    pub created_at: Instant,
}

impl PendingPrint {
    pub fn new(
        channel_id: impl Into<String>,
        file_ref: impl Into<String>,
        prompt_message_id: impl Into<String>,
    ) -> Self {
        Self {
            channel_id: channel_id.into(),
            file_ref: file_ref.into(),
            prompt_message_id: prompt_message_id.into(),
            created_at: Instant::now(),
        }
    }
}

/// At most one [`PendingPrint`] per channel.
pub struct PendingRegistry {
    entries: Mutex<HashMap<String, PendingPrint>>,
    /// Entries older than this are treated as absent.
    ttl: Option<Duration>,
}

impl Default for PendingRegistry {
    fn default() -> Self {
        Self::new(None)
    }
}

impl PendingRegistry {
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, PendingPrint>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Drop the entry for `channel_id` if it outlived the TTL.
    fn prune_expired(&self, entries: &mut HashMap<String, PendingPrint>, channel_id: &str) {
        if let Some(ttl) = self.ttl
            && entries
                .get(channel_id)
                .is_some_and(|p| p.created_at.elapsed() >= ttl)
            && let Some(stale) = entries.remove(channel_id)
        {
            debug!(
                channel_id,
                prompt_message_id = %stale.prompt_message_id,
                "pending print expired"
            );
        }
    }

    /// Store `pending` for its channel, replacing whatever was there.
    ///
    /// Returns the replaced entry; its prompt can no longer be resolved.
    pub fn put(&self, pending: PendingPrint) -> Option<PendingPrint> {
        let mut entries = self.lock();
        self.prune_expired(&mut entries, &pending.channel_id);
        entries.insert(pending.channel_id.clone(), pending)
    }

    pub fn get(&self, channel_id: &str) -> Option<PendingPrint> {
        let mut entries = self.lock();
        self.prune_expired(&mut entries, channel_id);
        entries.get(channel_id).cloned()
    }

    pub fn remove(&self, channel_id: &str) -> Option<PendingPrint> {
        let mut entries = self.lock();
        self.prune_expired(&mut entries, channel_id);
        entries.remove(channel_id)
    }

    /// Inspect the live entry for `channel_id` and remove it only when
    /// `check` accepts it, all under one lock acquisition.
    ///
    /// - `None`: no live entry.
    /// - `Some(Ok((entry, t)))`: `check` returned `Ok(t)`; the entry is gone.
    /// - `Some(Err(e))`: `check` rejected it; the entry stays.
    pub fn remove_if<T, E>(
        &self,
        channel_id: &str,
        check: impl FnOnce(&PendingPrint) -> Result<T, E>,
    ) -> Option<Result<(PendingPrint, T), E>> {
        let mut entries = self.lock();
        self.prune_expired(&mut entries, channel_id);
        let outcome = check(entries.get(channel_id)?);
        Some(match outcome {
            Ok(value) => {
                let entry = entries.remove(channel_id)?;
                Ok((entry, value))
            },
            Err(e) => Err(e),
        })
    }

    /// Number of live and not-yet-pruned entries.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
