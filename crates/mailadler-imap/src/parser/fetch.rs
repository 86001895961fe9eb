//! FETCH response parsing.
//!
//! Extracts a [`MessageSummary`] from a single `* n FETCH (UID FLAGS
//! ENVELOPE)` line. Each field is matched independently, so a line missing
//! the envelope still yields a summary with empty date, subject and sender.
//! Quoted strings are taken verbatim: escaped quotes inside them are not
//! understood. Date and subject are matched as a pair of quoted strings, so
//! a `NIL` subject (or date) leaves both empty.

use std::sync::LazyLock;

use regex::Regex;

use crate::types::MessageSummary;

use super::compile;

static UID: LazyLock<Regex> = LazyLock::new(|| compile(r"\bUID\s+(\d+)"));

/// Date and subject: the first two quoted strings after `ENVELOPE (`.
static ENVELOPE: LazyLock<Regex> =
    LazyLock::new(|| compile(r#"ENVELOPE \("([^"]*)"\s*"([^"]*)""#));

/// First address of the first address list: `(("name" NIL "mailbox" "host")`.
/// A `NIL` display name is accepted and treated as empty.
static SENDER: LazyLock<Regex> = LazyLock::new(|| {
    compile(r#"\(\((?:"([^"]*)"|NIL)\s+NIL\s+"([^"]*)"\s+"([^"]*)"\)"#)
});

static ENCODED_WORD: LazyLock<Regex> = LazyLock::new(|| compile(r"(?i)=\?[^?\s]*\?Q\?"));

/// Parses one FETCH line. Returns `None` when the line has no UID.
#[must_use]
pub fn parse_fetch_line(line: &str) -> Option<MessageSummary> {
    let uid = UID.captures(line)?.get(1)?.as_str().to_string();

    let mut summary = MessageSummary {
        uid,
        seen: line.contains("\\Seen"),
        ..MessageSummary::default()
    };

    if let Some(caps) = ENVELOPE.captures(line) {
        summary.date = caps.get(1).map_or_else(String::new, |m| m.as_str().to_string());
        summary.subject = caps
            .get(2)
            .map_or_else(String::new, |m| decode_subject(m.as_str()));
    }

    let addresses = line.find("ENVELOPE (").map_or(line, |pos| &line[pos..]);
    if let Some(caps) = SENDER.captures(addresses) {
        let field = |i| caps.get(i).map_or("", |m| m.as_str());
        summary.sender = format_sender(field(1), field(2), field(3));
    }

    Some(summary)
}

/// Strips `=?charset?Q?` / `?=` markers and turns underscores into spaces.
///
/// Hex escapes such as `=C3=A4` are left as they are, so non-ASCII subjects
/// come out garbled. Subjects without a Q-encoded word are returned unchanged.
#[must_use]
pub fn decode_subject(subject: &str) -> String {
    if !ENCODED_WORD.is_match(subject) {
        return subject.to_string();
    }

    ENCODED_WORD
        .replace_all(subject, "")
        .replace("?=", "")
        .replace('_', " ")
}

/// Formats an envelope address for display.
#[must_use]
pub fn format_sender(name: &str, mailbox: &str, host: &str) -> String {
    if name.is_empty() {
        format!("{mailbox}@{host}")
    } else {
        format!("{name} <{mailbox}@{host}>")
    }
}
