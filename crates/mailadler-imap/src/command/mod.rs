//! IMAP command builder.
//!
//! This module provides the four commands the client sends, their wire
//! serialization, tag generation and the one-at-a-time [`Sequencer`].

mod sequencer;
mod serialize;
mod tag_generator;

use crate::types::Tag;

pub use sequencer::{Outstanding, Sequencer};
pub use tag_generator::TagGenerator;

use serialize::write_quoted;

/// Kind of command, remembered while its completion is outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    /// LOGIN.
    Login,
    /// SELECT.
    Select,
    /// FETCH.
    Fetch,
    /// LOGOUT.
    Logout,
}

impl CommandKind {
    /// Returns the IMAP verb.
    #[must_use]
    pub const fn verb(self) -> &'static str {
        match self {
            Self::Login => "LOGIN",
            Self::Select => "SELECT",
            Self::Fetch => "FETCH",
            Self::Logout => "LOGOUT",
        }
    }
}

impl std::fmt::Display for CommandKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.verb())
    }
}

/// IMAP command.
#[derive(Clone, PartialEq, Eq)]
pub enum Command {
    /// LOGIN command.
    Login {
        /// Username.
        username: String,
        /// Password.
        password: String,
    },
    /// SELECT command.
    Select {
        /// Mailbox to select.
        mailbox: String,
    },
    /// FETCH of `UID FLAGS ENVELOPE` for a sequence range.
    Fetch {
        /// First sequence number (inclusive).
        start: u32,
        /// Last sequence number (inclusive).
        end: u32,
    },
    /// LOGOUT command.
    Logout,
}

impl Command {
    /// Returns the command kind.
    #[must_use]
    pub const fn kind(&self) -> CommandKind {
        match self {
            Self::Login { .. } => CommandKind::Login,
            Self::Select { .. } => CommandKind::Select,
            Self::Fetch { .. } => CommandKind::Fetch,
            Self::Logout => CommandKind::Logout,
        }
    }

    /// Serializes the command to bytes with the given tag.
    #[must_use]
    pub fn serialize(&self, tag: &Tag) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(tag.as_str().as_bytes());
        buf.push(b' ');
        buf.extend_from_slice(self.kind().verb().as_bytes());

        match self {
            Self::Login { username, password } => {
                buf.push(b' ');
                write_quoted(&mut buf, username);
                buf.push(b' ');
                write_quoted(&mut buf, password);
            }
            Self::Select { mailbox } => {
                buf.push(b' ');
                write_quoted(&mut buf, mailbox);
            }
            Self::Fetch { start, end } => {
                buf.extend_from_slice(format!(" {start}:{end} (UID FLAGS ENVELOPE)").as_bytes());
            }
            Self::Logout => {}
        }

        buf.extend_from_slice(b"\r\n");
        buf
    }

    /// Renders the command line for logs, with credentials masked.
    #[must_use]
    pub fn redacted(&self, tag: &Tag) -> String {
        match self {
            Self::Login { .. } => format!("{tag} LOGIN ***"),
            _ => String::from_utf8_lossy(&self.serialize(tag))
                .trim_end()
                .to_string(),
        }
    }
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Login { username, .. } => f
                .debug_struct("Login")
                .field("username", username)
                .field("password", &"***")
                .finish(),
            Self::Select { mailbox } => f.debug_struct("Select").field("mailbox", mailbox).finish(),
            Self::Fetch { start, end } => f
                .debug_struct("Fetch")
                .field("start", start)
                .field("end", end)
                .finish(),
            Self::Logout => f.write_str("Logout"),
        }
    }
}
