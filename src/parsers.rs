//! Turning raw reply text into what a tool displays

use once_cell::sync::Lazy;
use regex::Regex;

pub const UNKNOWN_LANGUAGE: &str = "Unknown";
pub const NO_TRANSLATION: &str = "No translation available.";

static TRANSLATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)Language:\s*(.+)\n+Translation:\s*([\s\S]*)").expect("translation pattern is valid")
});

/// Structured result extracted from a reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedReply {
    /// Text to reveal and store as the exchange response
    pub text: String,
    /// Detected language for the translator, `None` elsewhere
    pub metadata: Option<String>,
    /// The reply did not follow the expected format and placeholders were used
    pub degraded: bool,
}

impl ParsedReply {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            metadata: None,
            degraded: false,
        }
    }
}

pub fn parse_plain(raw: &str) -> ParsedReply {
    ParsedReply::plain(raw.trim())
}

/// Split a `Language: ...` / `Translation: ...` reply.
///
/// Never fails: a reply that does not match degrades to placeholders.
pub fn parse_translation(raw: &str) -> ParsedReply {
    let Some(caps) = TRANSLATION_RE.captures(raw.trim()) else {
        return ParsedReply {
            text: NO_TRANSLATION.to_string(),
            metadata: Some(UNKNOWN_LANGUAGE.to_string()),
            degraded: true,
        };
    };

    let language = caps.get(1).map(|m| m.as_str().trim()).unwrap_or_default();
    let translation = caps.get(2).map(|m| m.as_str().trim()).unwrap_or_default();

    ParsedReply {
        text: non_empty_or(translation, NO_TRANSLATION),
        metadata: Some(non_empty_or(language, UNKNOWN_LANGUAGE)),
        degraded: language.is_empty() || translation.is_empty(),
    }
}

fn non_empty_or(value: &str, fallback: &str) -> String {
    if value.is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn translation_reply_is_split_into_language_and_text() {
        let parsed = parse_translation("Language: French\nTranslation:\nBonjour devient Hello");
        assert_eq!(parsed.metadata.as_deref(), Some("French"));
        assert_eq!(parsed.text, "Bonjour devient Hello");
        assert!(!parsed.degraded);
    }

    #[test]
    fn translation_markers_are_case_insensitive_and_multiline() {
        let raw = "  language:   Spanish \n\nTRANSLATION: Good morning.\nHow are you?\n";
        let parsed = parse_translation(raw);
        assert_eq!(parsed.metadata.as_deref(), Some("Spanish"));
        assert_eq!(parsed.text, "Good morning.\nHow are you?");
    }

    #[test]
    fn missing_translation_marker_degrades_to_placeholders() {
        let parsed = parse_translation("Language: German\nHallo means hello");
        assert_eq!(parsed.metadata.as_deref(), Some(UNKNOWN_LANGUAGE));
        assert_eq!(parsed.text, NO_TRANSLATION);
        assert!(parsed.degraded);
    }

    #[test]
    fn empty_translation_body_uses_placeholder() {
        let parsed = parse_translation("Language: Italian\nTranslation:   ");
        assert_eq!(parsed.metadata.as_deref(), Some("Italian"));
        assert_eq!(parsed.text, NO_TRANSLATION);
        assert!(parsed.degraded);
    }

    #[test]
    fn plain_tools_pass_trimmed_text_through() {
        let parsed = parse_plain("\n  - Egg: 70 kcal\n");
        assert_eq!(parsed, ParsedReply::plain("- Egg: 70 kcal"));
        let parsed = parse_plain("* point one ");
        assert_eq!(parsed.text, "* point one");
        assert_eq!(parsed.metadata, None);
    }

    proptest! {
        #[test]
        fn translation_parser_always_yields_displayable_fields(raw in "\\PC{0,200}") {
            let parsed = parse_translation(&raw);
            prop_assert!(!parsed.text.is_empty());
            prop_assert!(parsed.metadata.as_deref().is_some_and(|lang| !lang.is_empty()));
        }
    }
}
