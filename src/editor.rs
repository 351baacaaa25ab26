// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jason Ish

//! Editing the input line in `$VISUAL` / `$EDITOR`.

use std::io::Write;
use std::process::Command;

use tempfile::Builder;
use tracing::debug;

use crate::error::{Error, Result};

fn configured_editor() -> Option<String> {
    ["VISUAL", "EDITOR"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find(|value| !value.trim().is_empty())
}

/// Open `initial` in the user's editor. Returns the edited text, or `None`
/// when the file was saved unchanged. The terminal must be in cooked mode
/// while this runs.
pub(crate) fn edit(initial: &str) -> Result<Option<String>> {
    let editor = configured_editor()
        .ok_or_else(|| Error::Editor("$VISUAL/$EDITOR is not set".into()))?;

    let mut file = Builder::new()
        .prefix("evalterm-")
        .suffix(".txt")
        .tempfile()?;
    file.write_all(initial.as_bytes())?;
    file.flush()?;

    let command = format!(
        "{} {}",
        shell_quote(&editor),
        shell_quote(&file.path().to_string_lossy())
    );
    debug!(%command, "Launching editor");
    let status = Command::new("sh").arg("-c").arg(&command).status()?;
    if !status.success() {
        return Err(Error::Editor(format!("{editor} exited with {status}")));
    }

    let edited = normalize_newlines(&std::fs::read_to_string(file.path())?);
    Ok(changed(initial, &edited).then(|| edited.trim_end_matches('\n').to_string()))
}

fn changed(before: &str, after: &str) -> bool {
    normalize_newlines(before).trim_end() != after.trim_end()
}

fn normalize_newlines(s: &str) -> String {
    s.replace("\r\n", "\n").replace('\r', "\n")
}

/// Single-quote for POSIX sh: abc'def -> 'abc'"'"'def'
fn shell_quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for ch in s.chars() {
        if ch == '\'' {
            out.push_str("'\"'\"'");
        } else {
            out.push(ch);
        }
    }
    out.push('\'');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shell_quote() {
        assert_eq!(shell_quote("vim"), "'vim'");
        assert_eq!(shell_quote("abc'def"), "'abc'\"'\"'def'");
    }

    #[test]
    fn test_trailing_whitespace_is_not_a_change() {
        assert!(!changed("x = 1", "x = 1\n"));
        assert!(!changed("a\r\nb", "a\nb"));
        assert!(changed("x = 1", "x = 2\n"));
    }
}
