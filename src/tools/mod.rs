//! Per-tool configuration for the shared conversation controller

use std::time::Duration;

use crate::config::RevealConfig;
use crate::events::ToolKind;
use crate::parsers::{self, ParsedReply};
use crate::prompts;

pub type PromptFormatter = fn(&str) -> String;
pub type ResponseParser = fn(&str) -> ParsedReply;

/// Everything that distinguishes one tool's conversation from another's.
#[derive(Debug, Clone, Copy)]
pub struct ToolProfile {
    pub kind: ToolKind,
    pub format_prompt: PromptFormatter,
    pub parse_reply: ResponseParser,
    /// Shown when the service answers without usable text
    pub empty_reply_text: &'static str,
    /// Shown when the request itself fails
    pub failure_text: &'static str,
    /// Delay between revealed characters
    pub reveal_interval: Duration,
}

impl ToolProfile {
    pub fn for_tool(kind: ToolKind, reveal: &RevealConfig) -> Self {
        let reveal_interval = reveal.interval_for(kind);
        match kind {
            ToolKind::Calorie => Self {
                kind,
                format_prompt: prompts::format_calorie_prompt,
                parse_reply: parsers::parse_plain,
                empty_reply_text: "No result returned.",
                failure_text: "Error during calorie estimation.",
                reveal_interval,
            },
            ToolKind::Translator => Self {
                kind,
                format_prompt: prompts::format_translator_prompt,
                parse_reply: parsers::parse_translation,
                empty_reply_text: "No translation returned.",
                failure_text: "Error occurred during translation.",
                reveal_interval,
            },
            ToolKind::Pdf => Self {
                kind,
                format_prompt: prompts::format_summary_prompt,
                parse_reply: parsers::parse_plain,
                empty_reply_text: "No summary returned.",
                failure_text: "An error occurred while summarizing the PDF.",
                reveal_interval,
            },
        }
    }

    pub fn with_reveal_interval(mut self, interval: Duration) -> Self {
        self.reveal_interval = interval;
        self
    }
}
