//! Heuristic chat-transcript parser.
//!
//! Splits raw multi-line chat exports into `{sender, time, content}` triples.
//! Each non-blank line is classified as either a header (`name H:MM` or
//! `name HH:MM`) or plain text; a header consumes the following line as its
//! message content. Lines that classify as text fall back to whitespace
//! splitting into sender/time/remainder, a documented last resort rather
//! than a grammar. Malformed lines are silently dropped.

use std::sync::OnceLock;

use regex::Regex;

use crate::models::ChatMessage;

/// Classification of a single transcript line.
#[derive(Debug, PartialEq, Eq)]
enum LineClass<'a> {
    /// `name` token(s) followed by an `H:MM` clock marker.
    Header { sender: &'a str, time: &'a str },
    /// Anything else.
    Text(&'a str),
}

fn header_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Prefix match on purpose: trailing garbage after the clock marker is
    // tolerated, mirroring how chat exports pad header lines.
    RE.get_or_init(|| Regex::new(r"^(.+?)\s+(\d{1,2}:\d{2})").expect("header regex"))
}

fn classify(line: &str) -> LineClass<'_> {
    match header_re().captures(line) {
        Some(caps) => {
            let sender = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
            let time = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
            LineClass::Header { sender, time }
        }
        None => LineClass::Text(line),
    }
}

/// Parse a raw transcript into message triples.
///
/// Best-effort: there is no guarantee of correctness on arbitrary input.
/// A header line with nothing after it is dropped; a text line with fewer
/// than three whitespace-separated tokens is dropped.
pub fn parse_transcript(raw: &str) -> Vec<ChatMessage> {
    let lines: Vec<&str> = raw
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    let mut messages = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        match classify(lines[i]) {
            LineClass::Header { sender, time } => {
                if let Some(content) = lines.get(i + 1) {
                    messages.push(ChatMessage {
                        sender: sender.to_string(),
                        time: time.to_string(),
                        content: (*content).to_string(),
                    });
                    i += 2;
                } else {
                    // Trailing header with no content line.
                    i += 1;
                }
            }
            LineClass::Text(line) => {
                // Fallback: sender, time, remainder split on whitespace.
                let mut parts = line.split_whitespace();
                if let (Some(sender), Some(time)) = (parts.next(), parts.next()) {
                    let content = parts.collect::<Vec<_>>().join(" ");
                    if !content.is_empty() {
                        messages.push(ChatMessage {
                            sender: sender.to_string(),
                            time: time.to_string(),
                            content,
                        });
                    }
                }
                i += 1;
            }
        }
    }

    messages
}
