mod config_commands;

use std::{path::PathBuf, sync::Arc, time::Duration};

use {
    anyhow::Context,
    clap::{Parser, Subcommand},
    tokio_util::sync::CancellationToken,
    tracing::{error, info, warn},
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

use {
    printbot_channels::{ChatEventSink, ChatOutbound},
    printbot_config::{Severity, validate},
    printbot_coordinator::{CoordinatorSettings, PrintCoordinator},
    printbot_printing::{CupsClient, PrintService},
};

#[derive(Parser)]
#[command(name = "printbot", about = "printbot: print PDFs shared in Slack", version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file (default: first of ./printbot.{toml,yaml,json}, ~/.config/printbot/...).
    #[arg(long, global = true, env = "PRINTBOT_CONFIG_FILE")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect to Slack and handle print requests (default when no subcommand is provided).
    Run,
    /// Validate the configuration file and report errors/warnings.
    CheckConfig {
        /// Show informational diagnostics in addition to errors and warnings.
        #[arg(long)]
        verbose: bool,
    },
    /// List the configured printers.
    Printers,
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        registry
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true),
            )
            .init();
    }
}

async fn run(config_path: Option<PathBuf>) -> anyhow::Result<()> {
    let (path, config) = printbot_config::discover_and_load(config_path.as_deref())?;
    info!(path = %path.display(), printers = config.printers.len(), "config loaded");

    let report = validate(&config);
    for d in &report.diagnostics {
        match d.severity {
            Severity::Error => error!(path = %d.path, category = d.category, "{}", d.message),
            Severity::Warning => warn!(path = %d.path, category = d.category, "{}", d.message),
            Severity::Info => info!(path = %d.path, category = d.category, "{}", d.message),
        }
    }
    if report.has_errors() {
        anyhow::bail!(
            "{} configuration error(s) in {}",
            report.count(Severity::Error),
            path.display()
        );
    }

    let request_timeout = Duration::from_secs(config.bot.request_timeout_secs);
    let print_service: Arc<dyn PrintService> =
        Arc::new(CupsClient::new(config.cups.clone(), request_timeout));

    let connection = printbot_slack::connect(&config.slack, request_timeout)
        .await
        .context("authenticating with Slack")?;
    let outbound: Arc<dyn ChatOutbound> = connection.outbound();

    let settings = CoordinatorSettings::from_config(&config, connection.bot_user_id());
    let coordinator: Arc<dyn ChatEventSink> =
        Arc::new(PrintCoordinator::new(settings, outbound, print_service));

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown requested");
        }
        on_signal.cancel();
    });

    connection.run(coordinator, cancel).await?;
    info!("printbot stopped");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    init_telemetry(&cli);

    match cli.command {
        None | Some(Commands::Run) => {
            info!(version = env!("CARGO_PKG_VERSION"), "printbot starting");
            run(cli.config).await
        },
        Some(Commands::CheckConfig { verbose }) => {
            config_commands::check(cli.config.as_deref(), verbose)
        },
        Some(Commands::Printers) => config_commands::printers(cli.config.as_deref()),
    }
}
