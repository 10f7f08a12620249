use std::str::FromStr;

use crate::events::ToolKind;

use strum::{AsRefStr, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

/// Commands that can be invoked by starting a chat line with a leading slash.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, EnumIter, AsRefStr, IntoStaticStr,
)]
#[strum(serialize_all = "kebab-case")]
pub enum SlashCommand {
    /// Switch to a different tool (calorie, translator, pdf)
    Tool,
    /// Start a new chat, discarding the conversation
    New,
    /// Summarize a plain-text document
    File,
    /// Reprint the conversation so far
    History,
    /// Show help
    Help,
    /// Exit the application
    Bye,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    pub command: SlashCommand,
    pub argument: Option<String>,
}

impl ParsedCommand {
    pub fn argument(&self) -> Option<&str> {
        self.argument.as_deref()
    }

    /// Target of `/tool <name>`; `None` means "cycle to the next tool"
    pub fn tool_target(&self) -> Option<ToolKind> {
        if self.command != SlashCommand::Tool {
            return None;
        }

        let arg = self.argument()?.trim().to_lowercase();
        match arg.as_str() {
            "c" | "cal" | "calories" => Some(ToolKind::Calorie),
            "t" | "translate" => Some(ToolKind::Translator),
            "p" | "summarize" => Some(ToolKind::Pdf),
            other => ToolKind::from_str(other).ok(),
        }
    }
}

impl SlashCommand {
    /// User-visible description shown in help.
    pub fn description(self) -> &'static str {
        match self {
            SlashCommand::Tool => "switch to a different tool (calorie, translator, pdf)",
            SlashCommand::New => "start a new chat",
            SlashCommand::File => "summarize a plain-text document (pdf tool)",
            SlashCommand::History => "show the conversation so far",
            SlashCommand::Help => "show available commands",
            SlashCommand::Bye => "exit the application",
        }
    }

    /// Command string without the leading '/'.
    pub fn command(self) -> &'static str {
        self.into()
    }
}

/// Return all built-in commands paired with their command string.
pub fn built_in_slash_commands() -> Vec<(&'static str, SlashCommand)> {
    SlashCommand::iter().map(|c| (c.command(), c)).collect()
}

/// Parse a slash command from a chat line
pub fn parse_slash_command(input: &str) -> Option<ParsedCommand> {
    let rest = input.trim().strip_prefix('/')?;
    let (head, tail) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
    if head.is_empty() {
        return None;
    }

    let command = SlashCommand::from_str(head).ok().or_else(|| match head.to_lowercase().as_str() {
        "q" | "quit" | "exit" => Some(SlashCommand::Bye),
        "reset" | "clear" => Some(SlashCommand::New),
        "t" | "switch" => Some(SlashCommand::Tool),
        "f" | "pdf" => Some(SlashCommand::File),
        "h" | "?" => Some(SlashCommand::Help),
        _ => None,
    })?;

    let tail = tail.trim();
    let argument = (!tail.is_empty()).then(|| tail.to_string());

    Some(ParsedCommand { command, argument })
}

/// Get help text for all available commands
pub fn get_help_text() -> String {
    let mut help = String::from("Available commands:\n\n");
    for (command_str, command) in built_in_slash_commands() {
        help.push_str(&format!("/{} - {}\n", command_str, command.description()));
    }

    help.push_str("\nAliases: /q for /bye, /reset for /new, /t for /tool, /f for /file");
    help.push_str("\nUse /tool <c|t|p> to jump directly to Calorie, Translator, or PDF summary.");

    help
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_not_a_command() {
        assert_eq!(parse_slash_command("two eggs"), None);
        assert_eq!(parse_slash_command("/"), None);
        assert_eq!(parse_slash_command("/unknown"), None);
    }

    #[test]
    fn commands_and_aliases_parse() {
        assert_eq!(parse_slash_command("/new").unwrap().command, SlashCommand::New);
        assert_eq!(parse_slash_command("/reset").unwrap().command, SlashCommand::New);
        assert_eq!(parse_slash_command("  /q").unwrap().command, SlashCommand::Bye);
        assert_eq!(parse_slash_command("/history").unwrap().command, SlashCommand::History);
    }

    #[test]
    fn file_argument_keeps_spaces() {
        let parsed = parse_slash_command("/file notes/annual report.txt").unwrap();
        assert_eq!(parsed.command, SlashCommand::File);
        assert_eq!(parsed.argument(), Some("notes/annual report.txt"));

        let parsed = parse_slash_command("/f   my  notes.txt \n").unwrap();
        assert_eq!(parsed.command, SlashCommand::File);
        assert_eq!(parsed.argument(), Some("my  notes.txt"));

        assert_eq!(parse_slash_command("/file   ").unwrap().argument(), None);
    }

    #[test]
    fn tool_targets_accept_names_and_shortcuts() {
        let target = |line: &str| parse_slash_command(line).unwrap().tool_target();
        assert_eq!(target("/tool t"), Some(ToolKind::Translator));
        assert_eq!(target("/tool PDF"), Some(ToolKind::Pdf));
        assert_eq!(target("/switch calorie"), Some(ToolKind::Calorie));
        assert_eq!(target("/tool"), None);
        assert_eq!(target("/tool weather"), None);
        assert_eq!(target("/new t"), None);
    }

    #[test]
    fn help_lists_every_command() {
        let help = get_help_text();
        for (name, _) in built_in_slash_commands() {
            assert!(help.contains(&format!("/{name} ")), "missing /{name}");
        }
    }
}
