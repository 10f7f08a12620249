use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumIter, EnumString, IntoEnumIterator};

use crate::error::{LlmError, SubmissionFailure};

/// The three tools offered by aitools
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, EnumString, EnumIter, AsRefStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum ToolKind {
    /// Per-item calorie estimates for a meal or ingredient list
    #[default]
    Calorie,
    /// Language detection plus English translation
    Translator,
    /// Bullet-point summary of an extracted document
    #[strum(to_string = "pdf", serialize = "summary")]
    #[serde(rename = "pdf")]
    Pdf,
}

impl ToolKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            ToolKind::Calorie => "Calorie Info",
            ToolKind::Translator => "Translation",
            ToolKind::Pdf => "PDF Summary",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ToolKind::Calorie => "Estimate calories for a meal or list of ingredients",
            ToolKind::Translator => "Detect the language of a text and translate it into English",
            ToolKind::Pdf => "Summarize extracted document text in bullet points",
        }
    }

    /// Placeholder shown by the chat prompt for this tool.
    pub fn placeholder(&self) -> &'static str {
        match self {
            ToolKind::Calorie => "List your ingredients or describe your meal...",
            ToolKind::Translator => "Paste or type in any language...",
            ToolKind::Pdf => "Use /file <path> to summarize a text document...",
        }
    }

    /// The tool that follows this one in tab order, wrapping around.
    pub fn next_tool(&self) -> ToolKind {
        let all: Vec<ToolKind> = ToolKind::iter().collect();
        let idx = all.iter().position(|t| t == self).unwrap_or(0);
        all[(idx + 1) % all.len()]
    }
}

/// Where a controller is in the submission lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmissionState {
    #[default]
    Idle,
    AwaitingResponse,
    Revealing,
}

impl SubmissionState {
    pub fn is_idle(&self) -> bool {
        matches!(self, SubmissionState::Idle)
    }
}

/// Visible change produced by applying one controller event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversationUpdate {
    /// One more character of the last response is visible
    RevealProgress { shown: usize, total: usize },
    /// The last exchange holds its final response
    Completed {
        response: String,
        metadata: Option<String>,
    },
    /// The last exchange holds a failure literal
    Failed {
        failure: SubmissionFailure,
        response: String,
    },
}

/// Messages sent by background tasks to the owning controller.
///
/// Every event carries the generation it was produced for; the controller
/// drops events whose generation is no longer current.
#[derive(Debug)]
pub(crate) enum ControllerEvent {
    Reply {
        generation: u64,
        outcome: Result<Option<String>, LlmError>,
    },
    RevealTick {
        generation: u64,
    },
}

impl ControllerEvent {
    pub(crate) fn generation(&self) -> u64 {
        match self {
            ControllerEvent::Reply { generation, .. } | ControllerEvent::RevealTick { generation } => {
                *generation
            }
        }
    }
}
