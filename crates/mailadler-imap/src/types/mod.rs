//! Core IMAP types.
//!
//! This module defines the small set of values that cross the boundary
//! between the protocol core and its caller.

#![allow(clippy::missing_const_for_fn)]

mod identifiers;
mod status;
mod summary;

pub use identifiers::Tag;
pub use status::Status;
pub use summary::MessageSummary;

/// Mailbox selected when the caller does not name one.
pub const DEFAULT_MAILBOX: &str = "INBOX";

/// Number of most recent messages fetched when the caller does not say.
pub const DEFAULT_FETCH_COUNT: u32 = 50;
