//! Configuration validation engine.
//!
//! Runs semantic checks on a parsed [`PrintbotConfig`]: printer list sanity,
//! reaction uniqueness, credential shape and transport security.

use std::collections::HashMap;

use secrecy::ExposeSecret;

use crate::schema::PrintbotConfig;

/// Severity level for a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
            Self::Info => write!(f, "info"),
        }
    }
}

/// A single validation diagnostic.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Category: "printers", "credentials", "security", "tuning"
    pub category: &'static str,
    /// Dotted path, e.g. "printers[1].reaction"
    pub path: String,
    pub message: String,
}

/// Result of validating a configuration.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub diagnostics: Vec<Diagnostic>,
}

impl ValidationResult {
    /// Returns `true` if any diagnostic is an error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    /// Count diagnostics by severity.
    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }

    fn push(
        &mut self,
        severity: Severity,
        category: &'static str,
        path: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.diagnostics.push(Diagnostic {
            severity,
            category,
            path: path.into(),
            message: message.into(),
        });
    }
}

/// Validate a parsed config.
#[must_use]
pub fn validate(config: &PrintbotConfig) -> ValidationResult {
    let mut result = ValidationResult::default();
    check_printers(config, &mut result);
    check_credentials(config, &mut result);
    check_tuning(config, &mut result);
    result
}

fn check_printers(config: &PrintbotConfig, result: &mut ValidationResult) {
    if config.printers.is_empty() {
        result.push(
            Severity::Error,
            "printers",
            "printers",
            "no printers configured",
        );
        return;
    }

    let mut seen: HashMap<&str, usize> = HashMap::new();
    for (i, printer) in config.printers.iter().enumerate() {
        let path = format!("printers[{i}]");

        if printer.queue.trim().is_empty() {
            result.push(
                Severity::Error,
                "printers",
                format!("{path}.queue"),
                "queue name is empty",
            );
        }
        if printer.display_name.trim().is_empty() {
            result.push(
                Severity::Warning,
                "printers",
                format!("{path}.display_name"),
                "display name is empty; the prompt will show a blank entry",
            );
        }

        let reaction = printer.reaction.as_str();
        if reaction.trim().is_empty() {
            result.push(
                Severity::Error,
                "printers",
                format!("{path}.reaction"),
                "reaction is empty",
            );
            continue;
        }
        if reaction.starts_with(':') || reaction.ends_with(':') {
            result.push(
                Severity::Warning,
                "printers",
                format!("{path}.reaction"),
                format!(
                    "reaction \"{reaction}\" should be the bare emoji name without colons"
                ),
            );
        }
        if let Some(first) = seen.insert(reaction, i) {
            result.push(
                Severity::Error,
                "printers",
                format!("{path}.reaction"),
                format!("reaction \"{reaction}\" is already used by printers[{first}]"),
            );
        }
    }
}

fn check_credentials(config: &PrintbotConfig, result: &mut ValidationResult) {
    let tokens = [
        ("slack.app_token", config.slack.app_token.expose_secret(), "xapp-"),
        ("slack.bot_token", config.slack.bot_token.expose_secret(), "xoxb-"),
    ];
    for (path, token, prefix) in tokens {
        if token.is_empty() {
            result.push(Severity::Error, "credentials", path, "token is missing");
        } else if token.starts_with("${") {
            result.push(
                Severity::Error,
                "credentials",
                path,
                format!("unresolved environment placeholder {token}"),
            );
        } else if !token.starts_with(prefix) {
            result.push(
                Severity::Warning,
                "credentials",
                path,
                format!("token does not start with \"{prefix}\""),
            );
        }
    }

    if config.cups.host.trim().is_empty() {
        result.push(Severity::Error, "credentials", "cups.host", "host is empty");
    }
    if config.cups.port == 0 {
        result.push(Severity::Error, "credentials", "cups.port", "port must not be 0");
    }

    let is_localhost = matches!(config.cups.host.as_str(), "localhost" | "127.0.0.1" | "::1");
    if config.cups.has_password() && !config.cups.tls && !is_localhost {
        result.push(
            Severity::Warning,
            "security",
            "cups.tls",
            format!(
                "CUPS password is sent without TLS to {}",
                config.cups.host
            ),
        );
    }
}

fn check_tuning(config: &PrintbotConfig, result: &mut ValidationResult) {
    if config.bot.request_timeout_secs == 0 {
        result.push(
            Severity::Error,
            "tuning",
            "bot.request_timeout_secs",
            "request timeout must be at least 1 second",
        );
    }
    if config.bot.prompt_ttl_secs == 0 {
        result.push(
            Severity::Info,
            "tuning",
            "bot.prompt_ttl_secs",
            "pending prompts never expire",
        );
    }
}
