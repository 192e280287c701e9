//! Skyrelay CLI — entry point.
//!
//! # Commands
//!
//! - `skyrelay serve [--port PORT]` — run the webhook server
//! - `skyrelay webhook set [--url URL]` — register the Telegram webhook
//! - `skyrelay webhook status` — show the registered webhook
//! - `skyrelay webhook delete` — remove the webhook registration

mod commands;
mod relay;
mod server;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use skyrelay_core::config::{load_config, Config};
use skyrelay_telegram::TelegramClient;

// ─────────────────────────────────────────────
// CLI definition
// ─────────────────────────────────────────────

/// Skyrelay — Telegram ⇄ LLM relay bot
#[derive(Parser)]
#[command(name = "skyrelay", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the webhook server
    Serve {
        /// Bind port (overrides config)
        #[arg(short, long)]
        port: Option<u16>,

        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,
    },

    /// Manage the Telegram webhook registration
    Webhook {
        #[command(subcommand)]
        action: WebhookCommands,
    },
}

#[derive(Subcommand)]
enum WebhookCommands {
    /// Register the webhook with Telegram
    Set {
        /// Public base URL to register (defaults to server.publicUrl)
        #[arg(short, long)]
        url: Option<String>,
    },
    /// Show the registered webhook status
    Status,
    /// Remove the webhook registration
    Delete,
}

// ─────────────────────────────────────────────
// Entrypoint
// ─────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { port, logs } => {
            init_logging(logs);
            let mut config = load_config(None);
            if let Some(port) = port {
                config.server.port = port;
            }
            server::serve(config).await
        }
        Commands::Webhook { action } => {
            init_logging(false);
            let config = load_config(None);
            run_webhook_command(config, action).await
        }
    }
}

async fn run_webhook_command(config: Config, action: WebhookCommands) -> Result<()> {
    if !config.telegram.is_configured() {
        anyhow::bail!("no Telegram bot token configured (set telegram.token or TELEGRAM_BOT_TOKEN)");
    }
    let telegram = TelegramClient::new(config.telegram.token.clone());

    match action {
        WebhookCommands::Set { url } => {
            let base = url.unwrap_or_else(|| config.server.public_url.clone());
            if base.is_empty() {
                anyhow::bail!("no public URL: pass --url or set server.publicUrl");
            }
            let target = server::webhook_url(&base);
            telegram
                .set_webhook(&target)
                .await
                .context("setWebhook failed")?;
            println!("Webhook registered: {target}");
        }
        WebhookCommands::Status => {
            let info = telegram.webhook_info().await.context("getWebhookInfo failed")?;
            println!("{}", serde_json::to_string_pretty(&info)?);
        }
        WebhookCommands::Delete => {
            let deleted = telegram.delete_webhook().await.context("deleteWebhook failed")?;
            if deleted {
                println!("Webhook deleted.");
            } else {
                println!("Webhook was not deleted.");
            }
        }
    }

    Ok(())
}

/// Initialize tracing/logging.
fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("skyrelay=debug,info")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
