//! REPL command parsing.

/// Slash commands with their help text, in the order `/help` lists them.
pub const COMMANDS: [(&str, &str); 8] = [
    ("/history", "List past messages, newest first"),
    ("/recall", "/recall <n>: put history entry n back into the input"),
    ("/clear-history", "Delete all history (asks for confirmation)"),
    ("/offline", "Simulate losing the network connection"),
    ("/online", "Simulate the network coming back"),
    ("/status", "Show connectivity and session state"),
    ("/help", "Show this help"),
    ("/quit", "Exit"),
];

/// One parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Plain text to send as a chat message.
    Submit(String),
    History,
    /// 1-based position in the `/history` listing.
    Recall(usize),
    ClearHistory,
    Offline,
    Online,
    Status,
    Help,
    Quit,
    /// A known command used wrongly; carries the usage line.
    Usage(&'static str),
    Unknown(String),
}

/// Parses a line. Blank lines yield `None`.
pub fn parse(line: &str) -> Option<Command> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }

    if !trimmed.starts_with('/') {
        return Some(Command::Submit(trimmed.to_string()));
    }

    let (name, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (trimmed, ""),
    };

    Some(match name {
        "/history" => Command::History,
        "/recall" => match rest.parse::<usize>() {
            Ok(n) if n > 0 => Command::Recall(n),
            _ => Command::Usage("/recall <n>  (n as shown by /history)"),
        },
        "/clear-history" => Command::ClearHistory,
        "/offline" => Command::Offline,
        "/online" => Command::Online,
        "/status" => Command::Status,
        "/help" => Command::Help,
        "/quit" | "/exit" => Command::Quit,
        other => Command::Unknown(other.to_string()),
    })
}

/// Whether a confirmation answer means yes.
pub fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_submitted_trimmed() {
        assert_eq!(parse("  Hello there "), Some(Command::Submit("Hello there".into())));
        assert_eq!(parse("   "), None);
        assert_eq!(parse(""), None);
    }

    #[test]
    fn test_slash_commands() {
        assert_eq!(parse("/history"), Some(Command::History));
        assert_eq!(parse("/clear-history"), Some(Command::ClearHistory));
        assert_eq!(parse("/offline"), Some(Command::Offline));
        assert_eq!(parse("/online"), Some(Command::Online));
        assert_eq!(parse("/status"), Some(Command::Status));
        assert_eq!(parse("/help"), Some(Command::Help));
        assert_eq!(parse("/quit"), Some(Command::Quit));
        assert_eq!(parse("/exit"), Some(Command::Quit));
    }

    #[test]
    fn test_bare_quit_words_are_chat_messages() {
        assert_eq!(parse("quit"), Some(Command::Submit("quit".into())));
        assert_eq!(parse(" exit "), Some(Command::Submit("exit".into())));
    }

    #[test]
    fn test_recall_argument() {
        assert_eq!(parse("/recall 3"), Some(Command::Recall(3)));
        assert_eq!(parse("/recall   12  "), Some(Command::Recall(12)));
        assert!(matches!(parse("/recall"), Some(Command::Usage(_))));
        assert!(matches!(parse("/recall 0"), Some(Command::Usage(_))));
        assert!(matches!(parse("/recall two"), Some(Command::Usage(_))));
    }

    #[test]
    fn test_unknown_command() {
        assert_eq!(parse("/dance now"), Some(Command::Unknown("/dance".into())));
    }

    #[test]
    fn test_is_yes() {
        assert!(is_yes("y"));
        assert!(is_yes(" YES "));
        assert!(!is_yes(""));
        assert!(!is_yes("n"));
    }
}
