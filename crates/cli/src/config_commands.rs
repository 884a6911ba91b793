use std::path::Path;

use anyhow::Result;

use printbot_config::{PrintbotConfig, Severity, ValidationResult, validate};

/// ANSI color codes.
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Load the config and report every diagnostic. Errors make the command fail.
pub fn check(explicit: Option<&Path>, verbose: bool) -> Result<()> {
    let (path, config) = printbot_config::discover_and_load(explicit)?;
    eprintln!("Checking {}\n", path.display());

    let result = validate(&config);
    eprint!("{}", render_diagnostics(&result, verbose));

    let errors = result.count(Severity::Error);
    if errors > 0 {
        anyhow::bail!("{errors} configuration error(s)");
    }
    Ok(())
}

fn render_diagnostics(result: &ValidationResult, verbose: bool) -> String {
    let mut out = String::new();
    let mut shown = 0;
    for d in &result.diagnostics {
        if d.severity == Severity::Info && !verbose {
            continue;
        }

        let color = match d.severity {
            Severity::Error => RED,
            Severity::Warning => YELLOW,
            Severity::Info => CYAN,
        };

        if d.path.is_empty() {
            out.push_str(&format!("  {BOLD}{color}{}{RESET} {}\n", d.severity, d.message));
        } else {
            out.push_str(&format!(
                "  {BOLD}{color}{}{RESET} {}: {}\n",
                d.severity, d.path, d.message
            ));
        }
        shown += 1;
    }

    if shown > 0 {
        out.push('\n');
    }

    let errors = result.count(Severity::Error);
    let warnings = result.count(Severity::Warning);
    if errors == 0 && warnings == 0 {
        out.push_str("No issues found.\n");
    } else {
        out.push_str(&format!("{errors} error(s), {warnings} warning(s)\n"));
    }
    out
}

/// Print the configured printers in prompt order.
pub fn printers(explicit: Option<&Path>) -> Result<()> {
    let (_, config) = printbot_config::discover_and_load(explicit)?;
    print!("{}", render_printers(&config));
    Ok(())
}

fn render_printers(config: &PrintbotConfig) -> String {
    if config.printers.is_empty() {
        return "No printers configured.\n".into();
    }
    let mut out = String::new();
    for p in &config.printers {
        out.push_str(&format!(":{}:  {}  ({})", p.reaction, p.display_name, p.queue));
        if !p.note.is_empty() {
            out.push_str(&format!("  {}", p.note));
        }
        out.push('\n');
        for (name, value) in &p.options {
            out.push_str(&format!("      {name} = {value}\n"));
        }
    }
    out
}
