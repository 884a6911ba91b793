//! Print service client.
//!
//! [`PrintService`] is what the coordinator submits jobs through;
//! [`CupsClient`] implements it by sending IPP/1.1 `Print-Job` operations to
//! a CUPS server through the `ipp` crate.

pub mod cups;
pub mod error;
pub mod service;

pub use {
    cups::CupsClient,
    error::{Error, Result},
    service::{JobId, JobOptions, PrintDocument, PrintService},
};
