//! Conversation core shared by every tool

pub mod commands;
pub mod controller;
pub mod history;
pub mod reveal;

pub use commands::{ParsedCommand, SlashCommand, get_help_text, parse_slash_command};
pub use controller::{ConversationController, ResultObserver};
pub use history::{Conversation, Exchange};
pub use reveal::RevealState;
