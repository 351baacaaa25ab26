// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jason Ish

//! Slash commands handled locally instead of being sent to the remote process.

/// Command identifier for dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Clear,
    Help,
    Quit,
    Status,
    /// Switch to another remote process
    Target(String),
}

#[derive(Debug, Clone)]
pub struct SlashCommand {
    pub name: &'static str,
    pub usage: &'static str,
    pub description: &'static str,
}

pub const COMMANDS: &[SlashCommand] = &[
    SlashCommand {
        name: "clear",
        usage: "/clear",
        description: "Clear the screen",
    },
    SlashCommand {
        name: "help",
        usage: "/help",
        description: "Show commands and key bindings",
    },
    SlashCommand {
        name: "quit",
        usage: "/quit",
        description: "Exit the console",
    },
    SlashCommand {
        name: "status",
        usage: "/status",
        description: "Show target and connection state",
    },
    SlashCommand {
        name: "target",
        usage: "/target <id>",
        description: "Switch to another remote process",
    },
];

pub const KEY_BINDINGS: &[(&str, &str)] = &[
    ("Enter", "Send the line (on an empty line: connect)"),
    ("Up/Down", "Browse history"),
    ("Ctrl+E", "Edit in $VISUAL/$EDITOR and send"),
    ("Ctrl+L", "Clear the screen"),
    ("Esc", "Leave full-screen mode"),
    ("Ctrl+C", "Quit"),
];

/// Help text listing commands and key bindings.
pub(crate) fn help_text() -> String {
    let width = COMMANDS
        .iter()
        .map(|cmd| cmd.usage.len())
        .chain(KEY_BINDINGS.iter().map(|(key, _)| key.len()))
        .max()
        .unwrap_or(0);

    let mut lines = Vec::with_capacity(COMMANDS.len() + KEY_BINDINGS.len());
    for cmd in COMMANDS {
        lines.push(format!("{:width$}  {}", cmd.usage, cmd.description));
    }
    for (key, description) in KEY_BINDINGS {
        lines.push(format!("{:width$}  {}", key, description));
    }
    lines.join("\n")
}

/// Parse a line typed at the prompt. Returns None when the line is not a
/// known slash command and should go to the remote process.
pub(crate) fn parse(input: &str) -> Option<Command> {
    let input = input.trim().strip_prefix('/')?;

    let (cmd_name, args) = if let Some(space_pos) = input.find(char::is_whitespace) {
        let (name, rest) = input.split_at(space_pos);
        (name.trim().to_lowercase(), rest.trim().to_string())
    } else {
        (input.to_lowercase(), String::new())
    };

    match cmd_name.as_str() {
        "clear" => Some(Command::Clear),
        "help" => Some(Command::Help),
        "quit" | "exit" => Some(Command::Quit),
        "status" => Some(Command::Status),
        // Missing argument: show usage rather than sending the line remotely.
        "target" if args.is_empty() => Some(Command::Help),
        "target" => Some(Command::Target(args)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse("/quit"), Some(Command::Quit));
        assert_eq!(parse("/target"), Some(Command::Help));
        assert_eq!(parse("  /CLEAR "), Some(Command::Clear));
        assert_eq!(
            parse("/target  abc123 "),
            Some(Command::Target("abc123".into()))
        );
    }

    #[test]
    fn test_non_commands_go_remote() {
        assert_eq!(parse("1 + 1"), None);
        assert_eq!(parse("/unknown"), None);
    }

    #[test]
    fn test_help_lists_everything() {
        let help = help_text();
        for cmd in COMMANDS {
            assert!(help.contains(cmd.usage));
        }
        assert!(help.contains("Ctrl+E"));
    }
}
