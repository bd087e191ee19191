//! Chat-platform boundary.
//!
//! Inbound update envelopes, inline-keyboard types, and the `ChatApi` trait
//! with its Bot-API-shaped HTTP client. Everything above this crate talks to
//! the trait, never to the wire, so tests substitute a scripted double.

pub mod api;
pub mod client;
pub mod keyboard;
pub mod types;

pub use api::{ChatApi, ChatError, ChatResult};
pub use client::BotClient;
pub use keyboard::{InlineButton, InlineKeyboard};
pub use types::{CallbackQuery, Chat, ChatUser, DocumentAttachment, Message, Update};
