//! Error types for the text-generation client and the submission taxonomy

use thiserror::Error;

/// Errors raised while talking to the text-generation service.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("no Gemini API key configured")]
    MissingApiKey,

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed reply payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("generation task did not finish: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl LlmError {
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self::Status {
            status,
            body: body.into(),
        }
    }
}

/// Ways a submission can fall short of a revealed reply.
///
/// None of these ever reach the caller as an `Err`: the controller turns them
/// into a literal response, or for `EmptyInput` records it without appending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionFailure {
    /// Input was blank after trimming; nothing was submitted.
    EmptyInput,
    /// Network error, non-2xx status, a payload that was not JSON, or a
    /// generator that panicked.
    TransportFailure,
    /// 2xx reply without usable text.
    EmptyReply,
    /// Reply text did not follow the tool's format; a placeholder was revealed.
    UnparseableReply,
}

impl SubmissionFailure {
    pub fn label(self) -> &'static str {
        match self {
            SubmissionFailure::EmptyInput => "empty input",
            SubmissionFailure::TransportFailure => "transport failure",
            SubmissionFailure::EmptyReply => "empty reply",
            SubmissionFailure::UnparseableReply => "unparseable reply",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_mentions_code_and_body() {
        let err = LlmError::status(503, "overloaded");
        assert_eq!(err.to_string(), "service returned HTTP 503: overloaded");
    }

    #[test]
    fn decode_error_converts_from_serde() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: LlmError = parse_err.into();
        assert!(matches!(err, LlmError::Decode(_)));
    }
}
