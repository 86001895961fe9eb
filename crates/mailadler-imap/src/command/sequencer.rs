//! One-command-at-a-time sequencing.
//!
//! The client never pipelines: a command may be sent only after the tagged
//! completion of the previous one has been seen. The sequencer owns the tag
//! counter and the single outstanding slot.

use crate::types::Tag;
use crate::{Error, Result};

use super::{Command, CommandKind, TagGenerator};

/// The command currently awaiting its tagged completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outstanding {
    /// Tag the command was sent with.
    pub tag: Tag,
    /// What the command was.
    pub kind: CommandKind,
}

/// Assigns tags and enforces that at most one command is in flight.
#[derive(Debug, Clone, Default)]
pub struct Sequencer {
    tags: TagGenerator,
    outstanding: Option<Outstanding>,
}

impl Sequencer {
    /// Creates a sequencer whose tags start with `prefix`.
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            tags: TagGenerator::new(prefix),
            outstanding: None,
        }
    }

    /// Tags and serializes `command`, marking it outstanding.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OperationInProgress`] if a command is still awaiting
    /// completion. No tag is consumed in that case.
    pub fn send(&mut self, command: &Command) -> Result<Vec<u8>> {
        if let Some(pending) = &self.outstanding {
            return Err(Error::OperationInProgress(pending.kind.to_string()));
        }

        let tag = self.tags.next();
        tracing::debug!(command = %command.redacted(&tag), "IMAP >");

        let data = command.serialize(&tag);
        self.outstanding = Some(Outstanding {
            tag,
            kind: command.kind(),
        });
        Ok(data)
    }

    /// Returns the outstanding command, if any.
    #[must_use]
    pub const fn outstanding(&self) -> Option<&Outstanding> {
        self.outstanding.as_ref()
    }

    /// Returns `true` if `line` is the tagged completion of the outstanding command.
    #[must_use]
    pub fn is_completion(&self, line: &str) -> bool {
        self.outstanding
            .as_ref()
            .is_some_and(|pending| pending.tag.matches_line(line))
    }

    /// Clears the outstanding slot, returning what was in it.
    pub fn complete(&mut self) -> Option<Outstanding> {
        self.outstanding.take()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn select(name: &str) -> Command {
        Command::Select {
            mailbox: name.to_string(),
        }
    }

    #[test]
    fn test_send_records_outstanding() {
        let mut seq = Sequencer::default();
        let data = seq.send(&select("INBOX")).unwrap();
        assert_eq!(data, b"A0001 SELECT \"INBOX\"\r\n");

        let pending = seq.outstanding().unwrap();
        assert_eq!(pending.tag.as_str(), "A0001");
        assert_eq!(pending.kind, CommandKind::Select);
    }

    #[test]
    fn test_second_send_is_rejected() {
        let mut seq = Sequencer::default();
        seq.send(&select("INBOX")).unwrap();

        let err = seq.send(&Command::Logout).unwrap_err();
        assert!(matches!(err, Error::OperationInProgress(ref kind) if kind == "SELECT"));
        assert_eq!(seq.outstanding().unwrap().kind, CommandKind::Select);

        seq.complete();
        let data = seq.send(&Command::Logout).unwrap();
        assert_eq!(data, b"A0002 LOGOUT\r\n");
    }

    #[test]
    fn test_tags_increase_across_completions() {
        let mut seq = Sequencer::new("T");
        let mut previous = 0;
        for _ in 0..5 {
            seq.send(&Command::Logout).unwrap();
            let done = seq.complete().unwrap();
            let n: u32 = done.tag.as_str()[1..].parse().unwrap();
            assert!(n > previous);
            previous = n;
        }
        assert!(seq.outstanding().is_none());
    }

    #[test]
    fn test_is_completion() {
        let mut seq = Sequencer::default();
        assert!(!seq.is_completion("A0001 OK done"));

        seq.send(&Command::Logout).unwrap();
        assert!(seq.is_completion("A0001 OK LOGOUT completed"));
        assert!(!seq.is_completion("A0002 OK LOGOUT completed"));
        assert!(!seq.is_completion("* BYE logging out"));
    }
}
