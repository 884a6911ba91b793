//! Pending-print coordination.
//!
//! A file shared in a channel becomes a printer-choice prompt; a reaction on
//! that prompt picks the printer, and the file is downloaded and submitted to
//! the chosen queue. At most one prompt per channel is live at any time.

pub mod bounded;
pub mod coordinator;
pub mod correlator;
pub mod dispatcher;
pub mod error;
pub mod prompter;
pub mod registry;

pub use {
    coordinator::{CoordinatorSettings, PrintCoordinator},
    correlator::{Correlator, IgnoreReason, Resolution, ResolvedPrint},
    dispatcher::Dispatcher,
    error::{Error, Result},
    prompter::Prompter,
    registry::{PendingPrint, PendingRegistry},
};
