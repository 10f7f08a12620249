/// Longest document prefix, in characters, embedded in a summary prompt.
pub const MAX_DOCUMENT_CHARS: usize = 8000;

const CALORIE_PROMPT: &str = "Estimate the calorie breakdown for the following meal or ingredients. \
Be concise and list estimated calories per item:";

const TRANSLATOR_PROMPT: &str = r#"Detect the language of this text and translate it into English.
Return only the following format:

Language: <Detected Language>
Translation:
<Translated Text>

Text:"#;

const SUMMARY_PROMPT: &str = "Please summarize the following PDF content in clear bullet points:";

pub fn format_calorie_prompt(ingredients: &str) -> String {
    format!("{CALORIE_PROMPT}\n\n{ingredients}")
}

pub fn format_translator_prompt(text: &str) -> String {
    format!("{TRANSLATOR_PROMPT}\n{text}")
}

pub fn format_summary_prompt(document: &str) -> String {
    let (prefix, truncated) = truncate_chars(document, MAX_DOCUMENT_CHARS);
    if truncated {
        format!("{SUMMARY_PROMPT}\n\n{prefix}...")
    } else {
        format!("{SUMMARY_PROMPT}\n\n{prefix}")
    }
}

/// First `max` characters of `text`, and whether anything was cut.
pub fn truncate_chars(text: &str, max: usize) -> (&str, bool) {
    match text.char_indices().nth(max) {
        Some((byte_idx, _)) => (&text[..byte_idx], true),
        None => (text, false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calorie_prompt_wraps_ingredients() {
        let prompt = format_calorie_prompt("2 eggs, 1 slice toast");
        assert!(prompt.starts_with("Estimate the calorie breakdown"));
        assert!(prompt.contains("list estimated calories per item"));
        assert!(prompt.ends_with("2 eggs, 1 slice toast"));
    }

    #[test]
    fn translator_prompt_mandates_two_field_format() {
        let prompt = format_translator_prompt("Bonjour tout le monde");
        assert!(prompt.contains("Language: <Detected Language>\nTranslation:\n"));
        assert!(prompt.ends_with("Text:\nBonjour tout le monde"));
    }

    #[test]
    fn summary_prompt_keeps_short_documents_whole() {
        let prompt = format_summary_prompt("Quarterly results were strong.");
        assert!(prompt.ends_with("\n\nQuarterly results were strong."));
        assert!(!prompt.ends_with("..."));
    }

    #[test]
    fn summary_prompt_truncates_to_exactly_8000_chars() {
        let document = format!("{}{}", "a".repeat(MAX_DOCUMENT_CHARS), "b".repeat(500));
        let prompt = format_summary_prompt(&document);
        let body = prompt
            .strip_prefix(&format!("{SUMMARY_PROMPT}\n\n"))
            .and_then(|rest| rest.strip_suffix("..."))
            .unwrap();
        assert_eq!(body.chars().count(), MAX_DOCUMENT_CHARS);
        assert!(body.chars().all(|c| c == 'a'));
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let document = "é".repeat(MAX_DOCUMENT_CHARS + 1);
        let (prefix, truncated) = truncate_chars(&document, MAX_DOCUMENT_CHARS);
        assert!(truncated);
        assert_eq!(prefix.chars().count(), MAX_DOCUMENT_CHARS);
        assert_eq!(prefix.len(), MAX_DOCUMENT_CHARS * 2);
    }

    #[test]
    fn exactly_max_chars_is_not_truncated() {
        let document = "x".repeat(MAX_DOCUMENT_CHARS);
        let (prefix, truncated) = truncate_chars(&document, MAX_DOCUMENT_CHARS);
        assert!(!truncated);
        assert_eq!(prefix, document);
    }
}
