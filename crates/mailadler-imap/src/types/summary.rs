//! Parsed message envelope summaries.

/// Header-level summary of one message, built from a FETCH response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageSummary {
    /// Server-assigned UID, kept as the digits the server sent.
    pub uid: String,
    /// Sender as `Name <mailbox@host>` or `mailbox@host`.
    pub sender: String,
    /// Whether the message carries the `\Seen` flag.
    pub seen: bool,
    /// Subject with encoded-word markers stripped.
    pub subject: String,
    /// Envelope date exactly as the server sent it.
    pub date: String,
}

impl MessageSummary {
    /// Returns `true` if the message has not been read.
    #[must_use]
    pub fn is_unread(&self) -> bool {
        !self.seen
    }
}
