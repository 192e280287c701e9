//! Provider and dispatch error taxonomy.
//!
//! Every `Display` string here is shown to the end user, so each variant
//! carries a remediation hint (`/config <provider> <key>`) rather than raw
//! vendor jargon. Vendor error bodies are truncated to keep messages bounded.

use skyrelay_core::models::Provider;
use skyrelay_core::utils::truncate_string;
use thiserror::Error;

/// Maximum vendor error body length carried in an error message.
pub const MAX_ERROR_BODY: usize = 200;

/// A failed call to one vendor's API.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Invalid {} API key. Please check your key with /config {} <key>", .0, command_name(.0))]
    InvalidCredential(Provider),

    #[error("Rate limited by {}. Please wait a moment and try again.", .0)]
    RateLimited(Provider),

    #[error("Invalid request to the {} API. Your message may be too long.", .0)]
    InvalidRequest(Provider),

    #[error("{} API error ({}): {}", .provider, .status, .body)]
    Vendor {
        provider: Provider,
        status: u16,
        body: String,
    },

    #[error("No text response from {}", .0)]
    EmptyResponse(Provider),

    #[error("Error calling {}: {}", .provider, .source)]
    Http {
        provider: Provider,
        source: reqwest::Error,
    },
}

impl ProviderError {
    /// Wrap a transport-level failure.
    pub fn http(provider: Provider, source: reqwest::Error) -> Self {
        ProviderError::Http { provider, source }
    }

    /// Vendor error with the body truncated to [`MAX_ERROR_BODY`].
    pub fn vendor(provider: Provider, status: u16, body: &str) -> Self {
        ProviderError::Vendor {
            provider,
            status,
            body: truncate_string(body, MAX_ERROR_BODY),
        }
    }
}

/// Map a non-success HTTP status to an error kind.
///
/// Shared by the Anthropic and OpenAI adapters; Gemini reports credential
/// problems differently and keeps its own table.
pub fn status_error(provider: Provider, status: u16, body: &str) -> ProviderError {
    match status {
        401 => ProviderError::InvalidCredential(provider),
        429 => ProviderError::RateLimited(provider),
        400 => ProviderError::InvalidRequest(provider),
        _ => ProviderError::vendor(provider, status, body),
    }
}

/// A failed dispatch — either pre-flight (model/credential resolution) or a
/// wrapped adapter failure.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Unknown model: {0}")]
    UnknownModel(String),

    #[error(
        "You need to set {} {} API key to use {}.\n\nUse: /config {} <your-api-key>{}",
        key_article(.provider),
        .provider,
        .model,
        command_name(.provider),
        free_key_hint(.provider)
    )]
    MissingCredential { provider: Provider, model: String },

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

fn command_name(provider: &Provider) -> &'static str {
    provider.command_name()
}

fn key_article(provider: &Provider) -> &'static str {
    match provider {
        Provider::Anthropic | Provider::OpenAi => "an",
        Provider::Gemini => "a",
    }
}

fn free_key_hint(provider: &Provider) -> &'static str {
    match provider {
        Provider::Gemini => "\n\nGet a free key at: https://aistudio.google.com/apikey",
        _ => "",
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
