//! Slash command handlers.
//!
//! Commands operate on the store only and return the reply text; the relay
//! delivers it through the same chunked sender as chat replies.

use skyrelay_core::models::{find_model, model_catalog, Provider};
use skyrelay_core::storage;
use skyrelay_core::store::{KvStore, StoreError};
use skyrelay_core::types::{mask_api_key, UserConfigPatch};

/// Whether a message is a command rather than chat input.
pub fn is_command(text: &str) -> bool {
    text.starts_with('/')
}

/// Parse and handle one command, returning the reply text.
pub async fn handle_command(
    store: &dyn KvStore,
    user_id: i64,
    text: &str,
) -> Result<String, StoreError> {
    let mut parts = text.split_whitespace();
    let command = parts.next().unwrap_or("");
    // Strip @botname (e.g. /model@skyrelay_bot in group chats).
    let command = command.split('@').next().unwrap_or(command).to_lowercase();
    let args: Vec<&str> = parts.collect();

    match command.as_str() {
        "/start" => Ok(start_message()),
        "/help" => Ok(help_message()),
        "/config" => config_command(store, user_id, &args).await,
        "/model" => model_command(store, user_id, &args).await,
        "/models" => Ok(model_catalog()),
        "/clear" => {
            storage::clear_history(store, user_id).await?;
            Ok("🗑️ Conversation history cleared. Starting fresh!".to_string())
        }
        "/status" => status_command(store, user_id).await,
        _ => Ok(format!(
            "Unknown command: {command}\n\nType /help for available commands."
        )),
    }
}

fn start_message() -> String {
    "👋 *Welcome to Skyrelay!*

I relay your messages to an AI model and send the reply back here.

*Quick Setup:*
1. Get an API key (Gemini has a free tier!)
2. Configure it: `/config gemini YOUR_KEY`
3. Start chatting!

*Get a free Gemini key:*
https://aistudio.google.com/apikey

Type /help for all commands."
        .to_string()
}

fn help_message() -> String {
    "🤖 *Skyrelay Commands*

Chat with Claude, GPT, or Gemini through Telegram.

*Setup:*
• `/config anthropic <key>` - Set Anthropic API key
• `/config openai <key>` - Set OpenAI API key
• `/config gemini <key>` - Set Gemini API key

*Models:*
• `/model <name>` - Switch LLM model
• `/models` - List available models

*Chat:*
• `/clear` - Clear conversation history
• `/status` - Show current configuration

*Free Option:*
Get a Gemini key at https://aistudio.google.com/apikey

Just send any message (not starting with /) to chat with the AI!"
        .to_string()
}

async fn config_command(
    store: &dyn KvStore,
    user_id: i64,
    args: &[&str],
) -> Result<String, StoreError> {
    if args.len() < 2 {
        return Ok("Usage: `/config <provider> <api-key>`

Providers:
• `anthropic` - For Claude models
• `openai` - For GPT models
• `gemini` - For Gemini models (free tier available!)

Example: `/config gemini AIzaSy...`"
            .to_string());
    }

    let Some(provider) = Provider::parse(args[0]) else {
        return Ok(format!(
            "Unknown provider: {}\n\nValid providers: anthropic, openai, gemini",
            args[0]
        ));
    };
    let api_key = args[1];

    storage::update_user_config(store, user_id, UserConfigPatch::credential(provider, api_key))
        .await?;

    Ok(format!(
        "✅ {} API key saved: `{}`\n\nYour key is stored securely and only used to call the {} API.",
        provider.command_name(),
        mask_api_key(api_key),
        provider.command_name()
    ))
}

async fn model_command(
    store: &dyn KvStore,
    user_id: i64,
    args: &[&str],
) -> Result<String, StoreError> {
    if args.is_empty() {
        let config = storage::load_user_config(store, user_id).await?;
        return Ok(format!(
            "Current model: `{}`\n\n{}",
            config.model,
            model_catalog()
        ));
    }

    let requested = args[0].to_lowercase();
    let Some(spec) = find_model(&requested) else {
        return Ok(format!("Unknown model: {requested}\n\n{}", model_catalog()));
    };

    let config =
        storage::update_user_config(store, user_id, UserConfigPatch::model(requested.clone()))
            .await?;

    let key_status = if config.has_key(spec.provider) {
        String::new()
    } else {
        match spec.provider {
            Provider::Anthropic => {
                "\n\n⚠️ You need to set an Anthropic key: `/config anthropic <key>`".to_string()
            }
            Provider::OpenAi => {
                "\n\n⚠️ You need to set an OpenAI key: `/config openai <key>`".to_string()
            }
            Provider::Gemini => {
                "\n\n⚠️ You need to set a Gemini key: `/config gemini <key>`\n\nGet a free key: https://aistudio.google.com/apikey"
                    .to_string()
            }
        }
    };

    Ok(format!("✅ Model switched to `{requested}`{key_status}"))
}

async fn status_command(store: &dyn KvStore, user_id: i64) -> Result<String, StoreError> {
    let config = storage::load_user_config(store, user_id).await?;

    let key_line = |provider: Provider| match config.key_for(provider) {
        Some(key) if !key.is_empty() => format!("✅ `{}`", mask_api_key(key)),
        _ => "❌ Not set".to_string(),
    };

    Ok(format!(
        "*Current Configuration:*

*Model:* `{}`

*API Keys:*
• Anthropic: {}
• OpenAI: {}
• Gemini: {}

Use `/config <provider> <key>` to set keys.
Use `/model <name>` to switch models.",
        config.model,
        key_line(Provider::Anthropic),
        key_line(Provider::OpenAi),
        key_line(Provider::Gemini)
    ))
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
