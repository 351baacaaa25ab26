// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jason Ish

//! SGR color decoding for remote output.
//!
//! Only foreground colors are interpreted. Every other escape sequence is
//! removed from the text. Color state never outlives a single `decode` call.

use unicode_width::UnicodeWidthChar;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AnsiColor {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    BrightBlack,
    BrightRed,
    BrightGreen,
    BrightYellow,
    BrightBlue,
    BrightMagenta,
    BrightCyan,
    BrightWhite,
}

impl AnsiColor {
    const BASE: [AnsiColor; 8] = [
        AnsiColor::Black,
        AnsiColor::Red,
        AnsiColor::Green,
        AnsiColor::Yellow,
        AnsiColor::Blue,
        AnsiColor::Magenta,
        AnsiColor::Cyan,
        AnsiColor::White,
    ];

    const BRIGHT: [AnsiColor; 8] = [
        AnsiColor::BrightBlack,
        AnsiColor::BrightRed,
        AnsiColor::BrightGreen,
        AnsiColor::BrightYellow,
        AnsiColor::BrightBlue,
        AnsiColor::BrightMagenta,
        AnsiColor::BrightCyan,
        AnsiColor::BrightWhite,
    ];

    fn from_sgr(code: u16) -> Option<Self> {
        match code {
            30..=37 => Some(Self::BASE[(code - 30) as usize]),
            90..=97 => Some(Self::BRIGHT[(code - 90) as usize]),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Span {
    pub text: String,
    pub color: Option<AnsiColor>,
}

struct SpanBuilder {
    spans: Vec<Span>,
    current: String,
    color: Option<AnsiColor>,
}

impl SpanBuilder {
    fn new() -> Self {
        Self {
            spans: Vec::new(),
            current: String::new(),
            color: None,
        }
    }

    fn set_color(&mut self, color: Option<AnsiColor>) {
        if color != self.color {
            self.flush();
            self.color = color;
        }
    }

    fn flush(&mut self) {
        if self.current.is_empty() {
            return;
        }
        let text = std::mem::take(&mut self.current);
        if let Some(last) = self.spans.last_mut()
            && last.color == self.color
        {
            last.text.push_str(&text);
            return;
        }
        self.spans.push(Span {
            text,
            color: self.color,
        });
    }

    fn finish(mut self) -> Vec<Span> {
        // An open color with no trailing reset is closed here.
        self.flush();
        self.spans
    }
}

/// A parsed escape sequence.
enum Escape {
    /// `ESC [ params m`
    Sgr(String),
    /// Any other sequence; dropped.
    Other,
}

/// Consume an escape sequence whose leading ESC has already been read.
fn read_escape(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Escape {
    match chars.peek() {
        Some('[') => {
            chars.next();
            let mut params = String::new();
            for ch in chars.by_ref() {
                if ('\u{40}'..='\u{7e}').contains(&ch) {
                    return if ch == 'm' {
                        Escape::Sgr(params)
                    } else {
                        Escape::Other
                    };
                }
                params.push(ch);
            }
            Escape::Other
        }
        Some(']') => {
            // OSC: terminated by BEL or ESC \
            chars.next();
            while let Some(ch) = chars.next() {
                if ch == '\u{7}' {
                    break;
                }
                if ch == '\u{1b}' {
                    if chars.peek() == Some(&'\\') {
                        chars.next();
                    }
                    break;
                }
            }
            Escape::Other
        }
        Some(_) => {
            chars.next();
            Escape::Other
        }
        None => Escape::Other,
    }
}

fn apply_sgr(params: &str, color: Option<AnsiColor>) -> Option<AnsiColor> {
    if params.is_empty() {
        return None;
    }
    let mut color = color;
    let mut codes = params.split(';');
    while let Some(code) = codes.next() {
        if code.is_empty() {
            color = None;
            continue;
        }
        let Ok(code) = code.parse::<u16>() else {
            continue;
        };
        match code {
            0 | 39 => color = None,
            // Extended colors carry their own arguments; skip them so they are
            // not read as standalone codes.
            38 | 48 => match codes.next() {
                Some("5") => {
                    codes.next();
                }
                Some("2") => {
                    codes.next();
                    codes.next();
                    codes.next();
                }
                _ => {}
            },
            _ => {
                if let Some(c) = AnsiColor::from_sgr(code) {
                    color = Some(c);
                }
            }
        }
    }
    color
}

/// Decode `input` into colored spans.
pub(crate) fn decode(input: &str) -> Vec<Span> {
    let mut builder = SpanBuilder::new();
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '\u{1b}' {
            builder.current.push(ch);
            continue;
        }
        if let Escape::Sgr(params) = read_escape(&mut chars) {
            let color = apply_sgr(&params, builder.color);
            builder.set_color(color);
        }
    }

    builder.finish()
}

/// Remove every escape sequence from `input`.
pub(crate) fn strip(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\u{1b}' {
            read_escape(&mut chars);
        } else {
            out.push(ch);
        }
    }
    out
}

/// Display width of `input` once escape sequences are removed.
pub(crate) fn visible_width(input: &str) -> usize {
    strip(input)
        .chars()
        .map(|ch| UnicodeWidthChar::width(ch).unwrap_or(0))
        .sum()
}
