//! LLM vendor adapters for Skyrelay.
//!
//! Three vendors expose the same capability behind three incompatible wire
//! formats. Each adapter owns its own request/response mapping and error-code
//! table; the [`Dispatcher`] resolves a user's selected model to the right
//! adapter and normalizes every failure into [`DispatchError`], whose
//! `Display` is the user-facing message.

pub mod anthropic;
pub mod dispatch;
pub mod error;
pub mod gemini;
pub mod openai;
pub mod prompt;

pub use anthropic::AnthropicClient;
pub use dispatch::Dispatcher;
pub use error::{DispatchError, ProviderError};
pub use gemini::GeminiClient;
pub use openai::OpenAiClient;
