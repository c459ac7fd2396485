//! Parsing of shell input lines.

use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Send(String),
    Attach(PathBuf),
    Detach,
    Model(String),
    Models,
    Lang(String),
    Clear,
    Help,
    Quit,
}

/// Expand a leading `~/` to the home directory.
pub fn expand_user_path(path_str: &str) -> PathBuf {
    if let Some(stripped) = path_str.strip_prefix("~/") {
        if let Some(dirs) = directories::UserDirs::new() {
            return dirs.home_dir().join(stripped);
        }
    }
    PathBuf::from(path_str)
}

/// Parse one input line. Blank lines yield `None`; lines that do not start
/// with `/` are chat messages.
pub fn parse_line(line: &str) -> Option<Command> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let Some(rest) = line.strip_prefix('/') else {
        return Some(Command::Send(line.to_string()));
    };

    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest, ""),
    };

    let cmd = match (name.to_ascii_lowercase().as_str(), arg) {
        ("attach", path) if !path.is_empty() => {
            // Drag-and-drop into a terminal often quotes the path.
            let path = path.trim_matches(|c: char| c == '\'' || c == '"');
            Command::Attach(expand_user_path(path))
        }
        ("detach", _) => Command::Detach,
        ("model", name) if !name.is_empty() => Command::Model(name.to_string()),
        ("model" | "models", _) => Command::Models,
        ("lang", tag) if !tag.is_empty() => Command::Lang(tag.to_string()),
        ("clear" | "reset", _) => Command::Clear,
        ("quit" | "q" | "exit", _) => Command::Quit,
        _ => Command::Help,
    };
    Some(cmd)
}

pub const HELP: &str = "\
Commands:
  <text>            send a message
  /attach <path>    stage an image, text file (.txt .md .csv) or PDF
  /detach           drop the staged attachment
  /models           reload and list models
  /model <name>     switch model
  /lang <en|ru|de|fr>
  /clear            forget the conversation
  /quit";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_sent() {
        assert_eq!(
            parse_line("  what is this?  "),
            Some(Command::Send("what is this?".into()))
        );
        assert_eq!(parse_line("   "), None);
    }

    #[test]
    fn test_attach_strips_quotes() {
        assert_eq!(
            parse_line("/attach '/tmp/My Scan.png'"),
            Some(Command::Attach(PathBuf::from("/tmp/My Scan.png")))
        );
        assert_eq!(parse_line("/attach"), Some(Command::Help));
    }

    #[test]
    fn test_model_commands() {
        assert_eq!(parse_line("/model qwen3:8b"), Some(Command::Model("qwen3:8b".into())));
        assert_eq!(parse_line("/model"), Some(Command::Models));
        assert_eq!(parse_line("/MODELS"), Some(Command::Models));
    }

    #[test]
    fn test_misc_commands() {
        assert_eq!(parse_line("/lang ru"), Some(Command::Lang("ru".into())));
        assert_eq!(parse_line("/reset"), Some(Command::Clear));
        assert_eq!(parse_line("/q"), Some(Command::Quit));
        assert_eq!(parse_line("/detach"), Some(Command::Detach));
        assert_eq!(parse_line("/nope"), Some(Command::Help));
    }
}
