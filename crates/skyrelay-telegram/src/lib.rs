//! Telegram transport for Skyrelay.
//!
//! Speaks the Bot API directly over `reqwest`: outbound delivery with
//! length-aware chunking and Markdown→plain fallback, the typing indicator,
//! webhook management, and ingestion of inbound webhook updates.

pub mod client;
pub mod split;
pub mod update;

pub use client::{DeliveryError, TelegramClient};
pub use split::{split_message, MAX_MESSAGE_LEN};
pub use update::{extract_text_message, parse_update, Incoming, Update};
