//! Server response classification.
//!
//! Every framed line is sorted into exactly one [`Response`] by a fixed,
//! first-match-wins rule list:
//!
//! 1. `* OK ...` is a greeting / informational OK.
//! 2. `* <n> EXISTS` reports the mailbox size.
//! 3. `* ... FETCH ...` carries one message's envelope data.
//! 4. A line whose first token is the outstanding tag completes a command.
//! 5. `* BYE ...` announces the server is closing.
//! 6. Anything else is ignored.
//!
//! Matching is line-oriented and regex based. Responses that spread a value
//! over an IMAP literal (`{n}`) are not understood.
//!
//! # Example
//!
//! ```
//! use mailadler_imap::parser::{classify, Response};
//!
//! assert_eq!(classify("* 7 EXISTS", None), Response::Exists(7));
//! ```

mod fetch;

use std::sync::LazyLock;

use regex::Regex;

use crate::types::{MessageSummary, Status, Tag};

pub use fetch::{decode_subject, format_sender, parse_fetch_line};

static EXISTS: LazyLock<Regex> = LazyLock::new(|| compile(r"^\* (\d+) EXISTS"));

/// A classified server line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Untagged `OK`; the server greeting or an informational line.
    Greeting {
        /// Line text after `* OK`.
        text: String,
    },
    /// Untagged `EXISTS` with the mailbox message count.
    Exists(u32),
    /// Untagged FETCH data. `None` when no UID could be extracted.
    Fetch(Option<MessageSummary>),
    /// Tagged completion of the outstanding command.
    Tagged {
        /// Parsed status token, `None` if it was not OK/NO/BAD.
        status: Option<Status>,
        /// The full line as the server sent it.
        text: String,
    },
    /// Untagged `BYE`.
    Bye {
        /// Line text after `* BYE`.
        text: String,
    },
    /// Anything this client does not model.
    Other,
}

/// Classifies one framed line (without CRLF).
///
/// `outstanding` is the tag of the command awaiting completion; tagged lines
/// for any other tag are classified as [`Response::Other`].
#[must_use]
pub fn classify(line: &str, outstanding: Option<&Tag>) -> Response {
    if let Some(rest) = line.strip_prefix("* OK") {
        return Response::Greeting {
            text: rest.trim().to_string(),
        };
    }

    if let Some(count) = EXISTS
        .captures(line)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
    {
        return Response::Exists(count);
    }

    if line.starts_with("* ") && line.contains("FETCH") {
        return Response::Fetch(parse_fetch_line(line));
    }

    if outstanding.is_some_and(|tag| tag.matches_line(line)) {
        let status = line.split(' ').nth(1).and_then(Status::parse);
        return Response::Tagged {
            status,
            text: line.to_string(),
        };
    }

    if let Some(rest) = line.strip_prefix("* BYE") {
        return Response::Bye {
            text: rest.trim().to_string(),
        };
    }

    Response::Other
}

/// Compiles a pattern known at build time.
#[allow(clippy::expect_used)]
pub(crate) fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("literal pattern must compile")
}
