use std::collections::BTreeMap;

use {async_trait::async_trait, bytes::Bytes};

use crate::Result;

/// Extra job attributes, keyed by IPP attribute name.
pub type JobOptions = BTreeMap<String, String>;

/// Identifier the print server assigned to an accepted job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JobId(pub i32);

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A document ready to be printed.
#[derive(Debug, Clone)]
pub struct PrintDocument {
    pub data: Bytes,
    /// Reported as `job-name`.
    pub name: String,
    /// Reported as `document-format`.
    pub mime_type: String,
}

impl PrintDocument {
    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// Submits print jobs to a named queue.
#[async_trait]
pub trait PrintService: Send + Sync {
    async fn submit_print_job(
        &self,
        document: PrintDocument,
        queue: &str,
        options: &JobOptions,
    ) -> Result<JobId>;
}
