//! Calorie estimation, translation and document summaries backed by a
//! remote text-generation service.
//!
//! Every tool shares one [`ConversationController`], configured per tool by a
//! [`ToolProfile`] that supplies the prompt formatter, the reply parser, the
//! failure texts and the reveal cadence.

pub mod config;
pub mod conversation;
pub mod error;
pub mod events;
pub mod llm;
pub mod parsers;
pub mod prompts;
pub mod session;
pub mod tools;

pub use config::Config;
pub use conversation::{Conversation, ConversationController, Exchange};
pub use error::{LlmError, SubmissionFailure};
pub use events::{ConversationUpdate, SubmissionState, ToolKind};
pub use llm::{GeminiClient, TextGenerator};
pub use session::Session;
pub use tools::ToolProfile;
