//! Configuration loading, validation and env substitution.
//!
//! Config files: `printbot.toml`, `printbot.yaml`, `printbot.json` or the
//! legacy `config.json`. Searched in `./` then `~/.config/printbot/`.
//!
//! Supports `${ENV_VAR}` and `${ENV_VAR:-default}` substitution in the raw file.

pub mod env_subst;
pub mod error;
pub mod loader;
pub mod schema;
pub mod validate;

pub use {
    error::{Error, Result},
    loader::{config_dir, discover_and_load, load_config},
    schema::{
        BotConfig, CupsConfig, MessagesConfig, PrintbotConfig, PrinterOption, SlackConfig,
        printer_for_reaction,
    },
    validate::{Diagnostic, Severity, ValidationResult, validate},
};
