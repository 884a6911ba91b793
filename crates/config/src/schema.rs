/// Config schema types (printers, Slack, CUPS, bot tuning, notice texts).
use std::collections::BTreeMap;

use {
    secrecy::{ExposeSecret, Secret},
    serde::{Deserialize, Serialize},
};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PrintbotConfig {
    /// Printers offered in the selection prompt, in display order.
    pub printers: Vec<PrinterOption>,
    pub slack: SlackConfig,
    pub cups: CupsConfig,
    pub bot: BotConfig,
    pub messages: MessagesConfig,
}

/// Find the printer whose reaction matches `reaction`.
///
/// Matching is exact; reaction names never carry the surrounding colons.
pub fn printer_for_reaction<'a>(
    printers: &'a [PrinterOption],
    reaction: &str,
) -> Option<&'a PrinterOption> {
    printers.iter().find(|p| p.reaction == reaction)
}

/// One print queue offered to chat users.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrinterOption {
    /// CUPS queue name (e.g. "hp-laserjet-2nd-floor").
    pub queue: String,

    /// Name shown in the prompt.
    pub display_name: String,

    /// Short note shown next to the name (location, duplex, colour...).
    pub note: String,

    /// Slack reaction name without colons (e.g. "printer", "one").
    pub reaction: String,

    /// Extra IPP job attributes sent with every job for this queue.
    ///
    /// Values that parse as integers are sent as IPP `integer`, everything
    /// else as `keyword` (e.g. `sides = "two-sided-long-edge"`, `copies = "2"`).
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub options: BTreeMap<String, String>,
}

/// Slack app credentials (Socket Mode).
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SlackConfig {
    /// App-level token (`xapp-...`) used to open the Socket Mode connection.
    #[serde(serialize_with = "serialize_secret")]
    pub app_token: Secret<String>,

    /// Bot token (`xoxb-...`) used for Web API calls and file downloads.
    #[serde(serialize_with = "serialize_secret")]
    pub bot_token: Secret<String>,
}

impl std::fmt::Debug for SlackConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlackConfig")
            .field("app_token", &"[REDACTED]")
            .field("bot_token", &"[REDACTED]")
            .finish()
    }
}

impl Default for SlackConfig {
    fn default() -> Self {
        Self {
            app_token: Secret::new(String::new()),
            bot_token: Secret::new(String::new()),
        }
    }
}

/// CUPS server connection parameters.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CupsConfig {
    pub host: String,
    pub port: u16,
    /// Sent as `requesting-user-name` and, with a password, as basic auth.
    pub username: String,
    #[serde(serialize_with = "serialize_secret")]
    pub password: Secret<String>,
    /// Use HTTPS / `ipps://`.
    pub tls: bool,
}

impl CupsConfig {
    /// `printer-uri` of `queue`. The IPP client posts to the matching
    /// `http(s)://` endpoint.
    pub fn printer_uri(&self, queue: &str) -> String {
        let scheme = if self.tls {
            "ipps"
        } else {
            "ipp"
        };
        format!("{scheme}://{}:{}/printers/{queue}", self.host, self.port)
    }

    pub fn has_password(&self) -> bool {
        !self.password.expose_secret().is_empty()
    }
}

impl std::fmt::Debug for CupsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CupsConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("tls", &self.tls)
            .finish()
    }
}

impl Default for CupsConfig {
    fn default() -> Self {
        Self {
            host: "localhost".into(),
            port: 631,
            username: "printbot".into(),
            password: Secret::new(String::new()),
            tls: false,
        }
    }
}

/// Runtime tuning for the coordinator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// Upper bound for every chat and print-service call (seconds).
    pub request_timeout_secs: u64,

    /// Pending prompts older than this are treated as gone (seconds, 0 = never).
    pub prompt_ttl_secs: u64,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 30,
            prompt_ttl_secs: 3600,
        }
    }
}

/// User-facing notice texts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessagesConfig {
    /// First line of the printer selection prompt.
    pub prompt_header: String,
    /// Reply to a message with zero or several files.
    pub send_one_file: String,
    /// Generic failure notice after a download or print error.
    pub failure: String,
    /// Confirmation after the job was accepted.
    pub printed: String,
}

impl Default for MessagesConfig {
    fn default() -> Self {
        Self {
            prompt_header: "How do you want to print it?".into(),
            send_one_file: "Please send me exactly one PDF you want to print.".into(),
            failure: "Something went wrong. :(".into(),
            printed: "File sent to the printer.".into(),
        }
    }
}

// ── Serde helpers for Secret<String> ────────────────────────────────────────

fn serialize_secret<S: serde::Serializer>(
    secret: &Secret<String>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = PrintbotConfig::default();
        assert!(cfg.printers.is_empty());
        assert_eq!(cfg.cups.port, 631);
        assert!(!cfg.cups.tls);
        assert_eq!(cfg.bot.request_timeout_secs, 30);
        assert_eq!(cfg.bot.prompt_ttl_secs, 3600);
    }

    #[test]
    fn deserialize_legacy_json_layout() {
        let json = r#"{
            "printers": [
                {"queue": "hp", "display_name": "HP", "note": "black & white", "reaction": "one"},
                {"queue": "canon", "display_name": "Canon", "note": "colour", "reaction": "two"}
            ],
            "slack": {"app_token": "xapp-1", "bot_token": "xoxb-1"},
            "cups": {"host": "print.local", "port": 631, "username": "bot", "password": "pw", "tls": true}
        }"#;
        let cfg: PrintbotConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.printers.len(), 2);
        assert_eq!(cfg.printers[1].queue, "canon");
        assert_eq!(cfg.slack.bot_token.expose_secret(), "xoxb-1");
        assert_eq!(cfg.cups.password.expose_secret(), "pw");
        assert!(cfg.cups.tls);
        // unspecified sections fall back to defaults
        assert_eq!(cfg.messages, MessagesConfig::default());
    }

    #[test]
    fn printer_lookup_by_reaction() {
        let cfg = PrintbotConfig {
            printers: vec![
                PrinterOption {
                    queue: "a".into(),
                    reaction: "one".into(),
                    ..Default::default()
                },
                PrinterOption {
                    queue: "b".into(),
                    reaction: "two".into(),
                    ..Default::default()
                },
            ],
            ..Default::default()
        };
        assert_eq!(
            printer_for_reaction(&cfg.printers, "two").map(|p| p.queue.as_str()),
            Some("b")
        );
        assert!(printer_for_reaction(&cfg.printers, "three").is_none());
        assert!(printer_for_reaction(&cfg.printers, ":two:").is_none());
    }

    #[test]
    fn cups_urls_follow_tls_flag() {
        let mut cups = CupsConfig {
            host: "cups.lan".into(),
            ..Default::default()
        };
        assert_eq!(cups.printer_uri("hp"), "ipp://cups.lan:631/printers/hp");
        cups.tls = true;
        assert_eq!(cups.printer_uri("hp"), "ipps://cups.lan:631/printers/hp");
    }

    #[test]
    fn debug_redacts_secrets() {
        let cfg = SlackConfig {
            app_token: Secret::new("xapp-secret".into()),
            bot_token: Secret::new("xoxb-secret".into()),
        };
        let out = format!("{cfg:?}");
        assert!(!out.contains("secret"));
        assert!(out.contains("[REDACTED]"));
    }
}
