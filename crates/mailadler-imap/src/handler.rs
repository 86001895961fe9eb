//! Session notifications.
//!
//! The protocol core reports progress through an [`EventHandler`]: one
//! callback per notification kind, all with empty default bodies. Pass the
//! handler to every [`Protocol`](crate::protocol::Protocol) call that can
//! produce notifications.
//!
//! # Example
//!
//! ```ignore
//! use mailadler_imap::handler::EventHandler;
//! use mailadler_imap::MessageSummary;
//!
//! struct Counter {
//!     unread: usize,
//! }
//!
//! impl EventHandler for Counter {
//!     fn on_headers_received(&mut self, headers: &[MessageSummary]) {
//!         self.unread = headers.iter().filter(|h| h.is_unread()).count();
//!     }
//! }
//! ```

use tokio::sync::mpsc;

use crate::types::MessageSummary;

/// Receiver of session notifications.
pub trait EventHandler: Send {
    /// Called when the server greeting has arrived.
    fn on_connected(&mut self) {}

    /// Called when LOGIN succeeded.
    fn on_authenticated(&mut self) {}

    /// Called when SELECT succeeded, with the mailbox message count.
    fn on_folder_selected(&mut self, folder: &str, count: u32) {
        let _ = (folder, count);
    }

    /// Called when a FETCH completed, newest message first.
    ///
    /// Also called with an empty slice when there was nothing to fetch.
    fn on_headers_received(&mut self, headers: &[MessageSummary]) {
        let _ = headers;
    }

    /// Called with human-readable progress text.
    fn on_status(&mut self, message: &str) {
        let _ = message;
    }

    /// Called once per failure, with a human-readable description.
    fn on_error(&mut self, message: &str) {
        let _ = message;
    }

    /// Called when the session reached the disconnected state.
    fn on_disconnected(&mut self) {}
}

/// A no-op handler that ignores all notifications.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHandler;

impl EventHandler for NoopHandler {}

/// A handler that logs notifications using tracing.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingHandler;

impl EventHandler for LoggingHandler {
    fn on_connected(&mut self) {
        tracing::info!("connected");
    }

    fn on_authenticated(&mut self) {
        tracing::info!("authenticated");
    }

    fn on_folder_selected(&mut self, folder: &str, count: u32) {
        tracing::info!(folder, count, "folder selected");
    }

    fn on_headers_received(&mut self, headers: &[MessageSummary]) {
        tracing::info!(count = headers.len(), "headers received");
    }

    fn on_status(&mut self, message: &str) {
        tracing::debug!(message, "status");
    }

    fn on_error(&mut self, message: &str) {
        tracing::error!(message, "error");
    }

    fn on_disconnected(&mut self) {
        tracing::info!("disconnected");
    }
}

/// A session notification as a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Server greeting received.
    Connected,
    /// LOGIN succeeded.
    Authenticated,
    /// SELECT succeeded.
    FolderSelected {
        /// Selected mailbox name.
        folder: String,
        /// Message count reported by the server.
        count: u32,
    },
    /// FETCH completed.
    HeadersReceived(Vec<MessageSummary>),
    /// Progress text.
    Status(String),
    /// Failure text.
    Error(String),
    /// Session is over.
    Disconnected,
}

/// A handler that collects events for later processing.
///
/// Useful for testing or batch processing of events.
#[derive(Debug, Default, Clone)]
pub struct CollectingHandler {
    /// Collected events.
    pub events: Vec<Event>,
}

impl CollectingHandler {
    /// Creates a new collecting handler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears all collected events.
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Takes all collected events, leaving the handler empty.
    pub fn take(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }
}

impl EventHandler for CollectingHandler {
    fn on_connected(&mut self) {
        self.events.push(Event::Connected);
    }

    fn on_authenticated(&mut self) {
        self.events.push(Event::Authenticated);
    }

    fn on_folder_selected(&mut self, folder: &str, count: u32) {
        self.events.push(Event::FolderSelected {
            folder: folder.to_string(),
            count,
        });
    }

    fn on_headers_received(&mut self, headers: &[MessageSummary]) {
        self.events.push(Event::HeadersReceived(headers.to_vec()));
    }

    fn on_status(&mut self, message: &str) {
        self.events.push(Event::Status(message.to_string()));
    }

    fn on_error(&mut self, message: &str) {
        self.events.push(Event::Error(message.to_string()));
    }

    fn on_disconnected(&mut self) {
        self.events.push(Event::Disconnected);
    }
}

/// Forwards events into an unbounded channel.
///
/// Send failures mean the receiver was dropped; the event is discarded.
#[derive(Debug, Clone)]
pub struct ChannelHandler {
    sender: mpsc::UnboundedSender<Event>,
}

impl ChannelHandler {
    /// Wraps the sending half of an event channel.
    #[must_use]
    pub const fn new(sender: mpsc::UnboundedSender<Event>) -> Self {
        Self { sender }
    }

    fn send(&self, event: Event) {
        if self.sender.send(event).is_err() {
            tracing::trace!("event receiver dropped");
        }
    }
}

impl EventHandler for ChannelHandler {
    fn on_connected(&mut self) {
        self.send(Event::Connected);
    }

    fn on_authenticated(&mut self) {
        self.send(Event::Authenticated);
    }

    fn on_folder_selected(&mut self, folder: &str, count: u32) {
        self.send(Event::FolderSelected {
            folder: folder.to_string(),
            count,
        });
    }

    fn on_headers_received(&mut self, headers: &[MessageSummary]) {
        self.send(Event::HeadersReceived(headers.to_vec()));
    }

    fn on_status(&mut self, message: &str) {
        self.send(Event::Status(message.to_string()));
    }

    fn on_error(&mut self, message: &str) {
        self.send(Event::Error(message.to_string()));
    }

    fn on_disconnected(&mut self) {
        self.send(Event::Disconnected);
    }
}
