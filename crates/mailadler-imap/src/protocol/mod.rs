//! Sans-I/O IMAP session.
//!
// Allow missing_const_for_fn since many functions can't be const in stable Rust.
#![allow(clippy::missing_const_for_fn)]
//!
//! [`Protocol`] is the whole client state machine with no I/O in it. The
//! caller (normally the driver in [`crate::connection`]) tells it about
//! transport events and feeds it received bytes; it produces bytes to send
//! via [`Protocol::poll_transmit`] and reports progress through an
//! [`EventHandler`].
//!
//! # Example
//!
//! ```
//! use mailadler_imap::handler::CollectingHandler;
//! use mailadler_imap::protocol::Protocol;
//!
//! let mut handler = CollectingHandler::new();
//! let mut protocol = Protocol::new();
//!
//! protocol.connect("imap.example.com", 993, &mut handler).unwrap();
//! protocol.transport_connected(&mut handler).unwrap();
//! protocol.handle_input(b"* OK ready\r\n", &mut handler);
//!
//! protocol.login("jane", "secret", &mut handler).unwrap();
//! let transmit = protocol.poll_transmit().unwrap();
//! assert_eq!(transmit.data, b"A0001 LOGIN \"jane\" \"secret\"\r\n");
//! ```

mod state;
mod transmit;

use std::collections::VecDeque;

use bytes::Bytes;

pub use state::{IdleState, SessionState};
pub use transmit::Transmit;

use crate::command::{Command, CommandKind, Outstanding, Sequencer};
use crate::framer::LineFramer;
use crate::handler::EventHandler;
use crate::parser::{Response, classify};
use crate::store::HeaderStore;
use crate::types::{DEFAULT_MAILBOX, MessageSummary, Status};
use crate::{Error, Result};

/// Incoming lines are logged up to this many characters.
const TRACE_LINE_LIMIT: usize = 100;

/// Sans-I/O IMAP client state machine.
///
/// One instance per connection. All methods take `&mut self`; the instance
/// must stay confined to one task.
pub struct Protocol {
    /// Current lifecycle state.
    state: SessionState,
    /// Tags and the single outstanding command.
    sequencer: Sequencer,
    /// Receive buffer.
    framer: LineFramer,
    /// Summaries of the fetch in progress.
    headers: HeaderStore,
    /// Outbound data queue.
    outbound: VecDeque<Transmit>,
    /// Last EXISTS count seen.
    message_count: u32,
    /// Count to restore if the SELECT in flight is rejected.
    count_before_select: u32,
    /// Mailbox named by the SELECT in flight.
    pending_folder: Option<String>,
}

impl Default for Protocol {
    fn default() -> Self {
        Self::new()
    }
}

impl Protocol {
    /// Creates a disconnected session using tag prefix `A`.
    #[must_use]
    pub fn new() -> Self {
        Self::with_tag_prefix("A")
    }

    /// Creates a disconnected session with a custom tag prefix.
    #[must_use]
    pub fn with_tag_prefix(prefix: impl Into<String>) -> Self {
        Self {
            state: SessionState::Disconnected,
            sequencer: Sequencer::new(prefix),
            framer: LineFramer::new(),
            headers: HeaderStore::new(),
            outbound: VecDeque::new(),
            message_count: 0,
            count_before_select: 0,
            pending_folder: None,
        }
    }

    /// Returns the current session state.
    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Returns `true` once LOGIN has succeeded.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.state.is_authenticated()
    }

    /// Returns the selected mailbox name, if any.
    #[must_use]
    pub fn selected_folder(&self) -> Option<&str> {
        self.state.selected_folder()
    }

    /// Returns the last message count reported by the server.
    #[must_use]
    pub fn message_count(&self) -> u32 {
        self.message_count
    }

    /// Returns the command awaiting completion, if any.
    #[must_use]
    pub fn outstanding(&self) -> Option<&Outstanding> {
        self.sequencer.outstanding()
    }

    /// Returns the summaries collected so far by the current fetch.
    #[must_use]
    pub fn headers(&self) -> Vec<MessageSummary> {
        self.headers.snapshot()
    }

    /// Returns the next data to transmit, if any.
    pub fn poll_transmit(&mut self) -> Option<Transmit> {
        self.outbound.pop_front()
    }

    // === Transport events ===

    /// Records that the caller has started connecting to `host:port`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidState`] unless the session is disconnected.
    pub fn connect(&mut self, host: &str, port: u16, handler: &mut dyn EventHandler) -> Result<()> {
        if self.state != SessionState::Disconnected {
            return Err(Error::InvalidState(format!(
                "cannot connect while {}",
                self.state
            )));
        }

        tracing::info!(host, port, "connecting");
        handler.on_status(&format!("Connecting to {host}:{port}..."));
        self.state = SessionState::Connecting;
        Ok(())
    }

    /// Records that the encrypted transport is established.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidState`] if a session is already running.
    pub fn transport_connected(&mut self, handler: &mut dyn EventHandler) -> Result<()> {
        if !matches!(self.state, SessionState::Disconnected | SessionState::Connecting) {
            return Err(Error::InvalidState(format!(
                "transport already connected ({})",
                self.state
            )));
        }

        handler.on_status("Connected, waiting for server...");
        self.state = SessionState::AwaitingGreeting;
        Ok(())
    }

    /// Records a fatal transport failure and ends the session.
    ///
    /// Reported once: calling this on an already disconnected session does
    /// nothing.
    pub fn transport_error(&mut self, message: &str, handler: &mut dyn EventHandler) {
        if self.state == SessionState::Disconnected {
            tracing::debug!(message, "transport error after disconnect");
            return;
        }

        tracing::warn!(message, state = %self.state, "transport error");
        handler.on_error(&format!("Connection error: {message}"));
        self.disconnect(handler);
    }

    /// Feeds received data into the session.
    pub fn handle_input(&mut self, data: &[u8], handler: &mut dyn EventHandler) {
        let lines: Vec<Bytes> = self.framer.feed(data).collect();

        for line in lines {
            if self.state == SessionState::Disconnected {
                tracing::trace!("discarding input after disconnect");
                break;
            }
            self.process_line(&String::from_utf8_lossy(&line), handler);
        }
    }

    // === Operations ===

    /// Sends LOGIN.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OperationInProgress`] while another command is in
    /// flight and [`Error::InvalidState`] unless the session is idle and not
    /// yet authenticated.
    pub fn login(
        &mut self,
        username: &str,
        password: &str,
        handler: &mut dyn EventHandler,
    ) -> Result<()> {
        let idle = self.ready_for(CommandKind::Login)?;
        if idle.authenticated {
            return Err(Error::InvalidState("already authenticated".to_string()));
        }

        handler.on_status(&format!("Logging in as {username}..."));
        self.send(
            &Command::Login {
                username: username.to_string(),
                password: password.to_string(),
            },
            idle,
        )
    }

    /// Sends SELECT for `mailbox`, or [`DEFAULT_MAILBOX`] when `None`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OperationInProgress`] while another command is in
    /// flight and [`Error::InvalidState`] unless the session is idle and
    /// authenticated.
    pub fn select_mailbox(
        &mut self,
        mailbox: Option<&str>,
        handler: &mut dyn EventHandler,
    ) -> Result<()> {
        let idle = self.ready_for(CommandKind::Select)?;
        if !idle.authenticated {
            return Err(Error::InvalidState("not authenticated".to_string()));
        }

        let mailbox = mailbox.unwrap_or(DEFAULT_MAILBOX);
        handler.on_status(&format!("Opening folder {mailbox}..."));
        self.send(
            &Command::Select {
                mailbox: mailbox.to_string(),
            },
            idle,
        )?;

        self.pending_folder = Some(mailbox.to_string());
        self.count_before_select = self.message_count;
        self.message_count = 0;
        Ok(())
    }

    /// Fetches envelopes of the `max_count` most recent messages.
    ///
    /// With an empty mailbox (or `max_count == 0`) no FETCH is sent and
    /// [`EventHandler::on_headers_received`] fires immediately with an empty
    /// slice.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OperationInProgress`] while another command is in
    /// flight and [`Error::InvalidState`] unless a mailbox is selected.
    pub fn fetch_headers(&mut self, max_count: u32, handler: &mut dyn EventHandler) -> Result<()> {
        let idle = self.ready_for(CommandKind::Fetch)?;
        if idle.folder.is_none() {
            return Err(Error::InvalidState("no mailbox selected".to_string()));
        }

        let Some((start, end)) = fetch_range(self.message_count, max_count) else {
            tracing::debug!(count = self.message_count, max_count, "nothing to fetch");
            self.headers.begin_fetch();
            handler.on_headers_received(&[]);
            return Ok(());
        };

        handler.on_status(&format!("Loading messages {start}-{end}..."));
        self.headers.begin_fetch();
        self.send(&Command::Fetch { start, end }, idle)
    }

    /// Sends LOGOUT.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OperationInProgress`] while another command is in
    /// flight and [`Error::InvalidState`] unless the session is idle.
    pub fn logout(&mut self, handler: &mut dyn EventHandler) -> Result<()> {
        let idle = self.ready_for(CommandKind::Logout)?;
        handler.on_status("Logging out...");
        self.send(&Command::Logout, idle)
    }

    // === Internals ===

    /// Checks that `kind` may be sent now and returns the current idle state.
    fn ready_for(&self, kind: CommandKind) -> Result<IdleState> {
        if let Some(pending) = self.sequencer.outstanding() {
            return Err(Error::OperationInProgress(pending.kind.to_string()));
        }

        self.state.idle().cloned().ok_or_else(|| {
            Error::InvalidState(format!("{kind} not allowed while {}", self.state))
        })
    }

    /// Queues a command and moves to its in-flight state.
    fn send(&mut self, command: &Command, prior: IdleState) -> Result<()> {
        let data = self.sequencer.send(command)?;
        self.outbound.push_back(Transmit::from(data));
        self.state = SessionState::in_flight(command.kind(), prior);
        Ok(())
    }

    /// Processes one complete line.
    fn process_line(&mut self, line: &str, handler: &mut dyn EventHandler) {
        tracing::trace!(line = %truncate(line, TRACE_LINE_LIMIT), "IMAP <");

        let response = classify(line, self.sequencer.outstanding().map(|o| &o.tag));
        match response {
            Response::Greeting { .. } => {
                handler.on_status("Server ready");
                if self.state == SessionState::AwaitingGreeting {
                    self.state = SessionState::Idle(IdleState::default());
                    handler.on_connected();
                }
            }
            Response::Exists(count) => self.message_count = count,
            Response::Fetch(summary) => self.handle_fetch(summary),
            Response::Tagged { status, text } => self.handle_tagged(status, text, handler),
            Response::Bye { text } => {
                if self.state == SessionState::AwaitingGreeting {
                    self.transport_error(&format!("server refused connection: {text}"), handler);
                } else {
                    tracing::debug!(text, "BYE");
                }
            }
            Response::Other => {}
        }
    }

    /// Adds a parsed FETCH line to the fetch in progress.
    fn handle_fetch(&mut self, summary: Option<MessageSummary>) {
        if !matches!(self.state, SessionState::Fetching(_)) {
            tracing::trace!("ignoring FETCH data outside a fetch");
            return;
        }

        match summary {
            Some(summary) => self.headers.append(summary),
            None => tracing::debug!("dropping FETCH line without UID"),
        }
    }

    /// Handles the tagged completion of the outstanding command.
    fn handle_tagged(
        &mut self,
        status: Option<Status>,
        text: String,
        handler: &mut dyn EventHandler,
    ) {
        let Some(done) = self.sequencer.complete() else {
            return;
        };
        let prior = self.state.base().cloned().unwrap_or_default();

        if !status.is_some_and(Status::is_ok) {
            self.state = SessionState::Idle(prior);
            if done.kind == CommandKind::Select {
                self.pending_folder = None;
                self.message_count = self.count_before_select;
            }

            // A status token other than OK/NO/BAD is a protocol violation.
            let error = match status {
                Some(Status::No) => Error::No(text),
                _ => Error::Bad(text),
            };
            tracing::warn!(command = %done.kind, %error, "command failed");
            handler.on_error(&format!("{} failed: {error}", done.kind));
            return;
        }

        match done.kind {
            CommandKind::Login => {
                self.state = SessionState::Idle(IdleState {
                    authenticated: true,
                    folder: None,
                });
                handler.on_status("Login successful");
                handler.on_authenticated();
            }
            CommandKind::Select => {
                let folder = self.pending_folder.take().unwrap_or_default();
                let count = self.message_count;
                self.state = SessionState::Idle(IdleState {
                    authenticated: true,
                    folder: Some(folder.clone()),
                });
                handler.on_status(&format!("Folder {folder}: {count} messages"));
                handler.on_folder_selected(&folder, count);
            }
            CommandKind::Fetch => {
                self.state = SessionState::Idle(prior);
                let headers = self.headers.snapshot();
                handler.on_status(&format!("{} messages loaded", headers.len()));
                handler.on_headers_received(&headers);
            }
            CommandKind::Logout => {
                handler.on_status("Logged out");
                self.disconnect(handler);
            }
        }
    }

    /// Moves to `Disconnected`, dropping per-connection data.
    fn disconnect(&mut self, handler: &mut dyn EventHandler) {
        let _ = self.sequencer.complete();
        self.framer.clear();
        self.outbound.clear();
        self.pending_folder = None;
        self.message_count = 0;
        self.state = SessionState::Disconnected;
        tracing::info!("disconnected");
        handler.on_disconnected();
    }
}

impl std::fmt::Debug for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Protocol")
            .field("state", &self.state)
            .field("outstanding", &self.sequencer.outstanding())
            .field("message_count", &self.message_count)
            .field("outbound_count", &self.outbound.len())
            .field("headers", &self.headers.len())
            .finish_non_exhaustive()
    }
}

/// Sequence range covering the newest `max_count` of `count` messages.
fn fetch_range(count: u32, max_count: u32) -> Option<(u32, u32)> {
    if count == 0 || max_count == 0 {
        return None;
    }
    let start = count.saturating_sub(max_count - 1).max(1);
    Some((start, count))
}

/// Cuts `line` to at most `limit` characters.
fn truncate(line: &str, limit: usize) -> &str {
    line.char_indices().nth(limit).map_or(line, |(i, _)| &line[..i])
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::too_many_lines)]
mod tests {
    use super::*;
    use crate::handler::{CollectingHandler, Event};

    const FETCH_LINE: &str = "* 3 FETCH (UID 42 FLAGS (\\Seen) ENVELOPE (\"Mon, 1 Jan 2024 10:00:00 +0000\" \"Hello\" ((\"Jane Doe\" NIL \"jane\" \"example.com\"))))\r\n";

    fn sent(protocol: &mut Protocol) -> String {
        let mut out = String::new();
        while let Some(t) = protocol.poll_transmit() {
            out.push_str(&String::from_utf8_lossy(&t.data));
        }
        out
    }

    /// Drops status events, which are progress text only.
    fn notifications(handler: &mut CollectingHandler) -> Vec<Event> {
        handler
            .take()
            .into_iter()
            .filter(|e| !matches!(e, Event::Status(_)))
            .collect()
    }

    fn connected(handler: &mut CollectingHandler) -> Protocol {
        let mut protocol = Protocol::new();
        protocol.connect("imap.example.com", 993, handler).unwrap();
        protocol.transport_connected(handler).unwrap();
        protocol.handle_input(b"* OK IMAP4rev1 ready\r\n", handler);
        handler.clear();
        protocol
    }

    fn logged_in(handler: &mut CollectingHandler) -> Protocol {
        let mut protocol = connected(handler);
        protocol.login("jane", "secret", handler).unwrap();
        protocol.handle_input(b"A0001 OK LOGIN completed\r\n", handler);
        let _ = sent(&mut protocol);
        handler.clear();
        protocol
    }

    fn selected(handler: &mut CollectingHandler, exists: u32) -> Protocol {
        let mut protocol = logged_in(handler);
        protocol.select_mailbox(None, handler).unwrap();
        let input = format!("* {exists} EXISTS\r\nA0002 OK [READ-WRITE] SELECT completed\r\n");
        protocol.handle_input(input.as_bytes(), handler);
        let _ = sent(&mut protocol);
        handler.clear();
        protocol
    }

    #[test]
    fn test_protocol_new() {
        let protocol = Protocol::new();
        assert_eq!(protocol.state(), &SessionState::Disconnected);
        assert!(!protocol.is_authenticated());
        assert!(protocol.outstanding().is_none());
    }

    #[test]
    fn test_greeting_connects() {
        let mut handler = CollectingHandler::new();
        let mut protocol = Protocol::new();

        protocol.connect("imap.gmx.net", 993, &mut handler).unwrap();
        assert_eq!(protocol.state(), &SessionState::Connecting);
        protocol.transport_connected(&mut handler).unwrap();
        assert_eq!(protocol.state(), &SessionState::AwaitingGreeting);

        protocol.handle_input(b"* OK IMAP4rev1 ready\r\n", &mut handler);
        assert_eq!(protocol.state(), &SessionState::Idle(IdleState::default()));
        assert_eq!(
            handler.events,
            vec![
                Event::Status("Connecting to imap.gmx.net:993...".to_string()),
                Event::Status("Connected, waiting for server...".to_string()),
                Event::Status("Server ready".to_string()),
                Event::Connected,
            ]
        );
    }

    #[test]
    fn test_greeting_split_across_reads() {
        let mut handler = CollectingHandler::new();
        let mut protocol = Protocol::new();
        protocol.transport_connected(&mut handler).unwrap();

        protocol.handle_input(b"* OK IMAP", &mut handler);
        assert_eq!(protocol.state(), &SessionState::AwaitingGreeting);
        protocol.handle_input(b" ready\r\n", &mut handler);
        assert!(protocol.state().idle().is_some());
    }

    #[test]
    fn test_bye_greeting_disconnects() {
        let mut handler = CollectingHandler::new();
        let mut protocol = Protocol::new();
        protocol.transport_connected(&mut handler).unwrap();
        handler.clear();

        protocol.handle_input(b"* BYE too many connections\r\n", &mut handler);
        assert_eq!(protocol.state(), &SessionState::Disconnected);
        assert_eq!(
            notifications(&mut handler),
            vec![
                Event::Error(
                    "Connection error: server refused connection: too many connections"
                        .to_string()
                ),
                Event::Disconnected,
            ]
        );
    }

    #[test]
    fn test_login_success() {
        let mut handler = CollectingHandler::new();
        let mut protocol = connected(&mut handler);

        protocol.login("jane", "secret", &mut handler).unwrap();
        assert_eq!(sent(&mut protocol), "A0001 LOGIN \"jane\" \"secret\"\r\n");
        assert!(matches!(protocol.state(), SessionState::LoggingIn(_)));

        protocol.handle_input(b"A0001 OK LOGIN completed\r\n", &mut handler);
        assert!(protocol.is_authenticated());
        assert_eq!(notifications(&mut handler), vec![Event::Authenticated]);
    }

    #[test]
    fn test_login_failure_allows_retry() {
        let mut handler = CollectingHandler::new();
        let mut protocol = connected(&mut handler);

        protocol.login("jane", "wrong", &mut handler).unwrap();
        let _ = sent(&mut protocol);
        protocol.handle_input(
            b"A0001 NO [AUTHENTICATIONFAILED] Invalid credentials\r\n",
            &mut handler,
        );

        assert!(!protocol.is_authenticated());
        assert_eq!(protocol.state(), &SessionState::Idle(IdleState::default()));
        assert_eq!(
            notifications(&mut handler),
            vec![Event::Error(
                "LOGIN failed: Server returned NO: A0001 NO [AUTHENTICATIONFAILED] Invalid credentials"
                    .to_string()
            )]
        );

        protocol.login("jane", "right", &mut handler).unwrap();
        assert_eq!(sent(&mut protocol), "A0002 LOGIN \"jane\" \"right\"\r\n");
        protocol.handle_input(b"A0002 OK LOGIN completed\r\n", &mut handler);
        assert!(protocol.is_authenticated());
    }

    #[test]
    fn test_bad_completion() {
        let mut handler = CollectingHandler::new();
        let mut protocol = connected(&mut handler);

        protocol.login("jane", "x", &mut handler).unwrap();
        protocol.handle_input(b"A0001 BAD syntax error\r\n", &mut handler);
        let events = notifications(&mut handler);
        assert!(matches!(&events[..], [Event::Error(msg)] if msg.contains("Server returned BAD")));
    }

    #[test]
    fn test_unknown_status_is_reported_as_bad() {
        let mut handler = CollectingHandler::new();
        let mut protocol = connected(&mut handler);

        protocol.login("jane", "x", &mut handler).unwrap();
        protocol.handle_input(b"A0001 MAYBE try later\r\n", &mut handler);

        assert!(!protocol.is_authenticated());
        assert_eq!(
            notifications(&mut handler),
            vec![Event::Error(
                "LOGIN failed: Server returned BAD: A0001 MAYBE try later".to_string()
            )]
        );
    }

    #[test]
    fn test_ok_later_in_line_is_not_success() {
        let mut handler = CollectingHandler::new();
        let mut protocol = connected(&mut handler);

        protocol.login("jane", "x", &mut handler).unwrap();
        protocol.handle_input(b"A0001 NO refused, OK?\r\n", &mut handler);

        assert!(!protocol.is_authenticated());
        assert!(matches!(&notifications(&mut handler)[..], [Event::Error(msg)] if msg.contains("Server returned NO")));
    }

    #[test]
    fn test_second_command_fails_without_bytes() {
        let mut handler = CollectingHandler::new();
        let mut protocol = connected(&mut handler);

        protocol.login("jane", "secret", &mut handler).unwrap();
        let _ = sent(&mut protocol);

        let err = protocol.logout(&mut handler).unwrap_err();
        assert!(matches!(err, Error::OperationInProgress(_)));
        assert!(protocol.poll_transmit().is_none());
        assert_eq!(protocol.outstanding().unwrap().kind, CommandKind::Login);
    }

    #[test]
    fn test_operations_out_of_order() {
        let mut handler = CollectingHandler::new();
        let mut protocol = Protocol::new();
        assert!(matches!(
            protocol.login("a", "b", &mut handler),
            Err(Error::InvalidState(_))
        ));

        let mut protocol = connected(&mut handler);
        assert!(matches!(
            protocol.select_mailbox(None, &mut handler),
            Err(Error::InvalidState(_))
        ));
        assert!(matches!(
            protocol.fetch_headers(10, &mut handler),
            Err(Error::InvalidState(_))
        ));
        assert!(protocol.poll_transmit().is_none());

        let mut protocol = logged_in(&mut handler);
        assert!(matches!(
            protocol.login("a", "b", &mut handler),
            Err(Error::InvalidState(_))
        ));
        assert!(matches!(
            protocol.connect("h", 1, &mut handler),
            Err(Error::InvalidState(_))
        ));
    }

    #[test]
    fn test_select_reports_last_exists() {
        let mut handler = CollectingHandler::new();
        let mut protocol = logged_in(&mut handler);

        protocol.select_mailbox(None, &mut handler).unwrap();
        assert_eq!(sent(&mut protocol), "A0002 SELECT \"INBOX\"\r\n");

        protocol.handle_input(
            b"* FLAGS (\\Answered \\Seen)\r\n* 5 EXISTS\r\n* 0 RECENT\r\n* 7 EXISTS\r\n* OK [UIDVALIDITY 1] UIDs valid\r\n",
            &mut handler,
        );
        assert!(matches!(protocol.state(), SessionState::Selecting(_)));

        protocol.handle_input(b"A0002 OK SELECT completed\r\n", &mut handler);
        assert_eq!(protocol.selected_folder(), Some("INBOX"));
        assert_eq!(
            notifications(&mut handler),
            vec![Event::FolderSelected {
                folder: "INBOX".to_string(),
                count: 7
            }]
        );
    }

    #[test]
    fn test_select_named_mailbox() {
        let mut handler = CollectingHandler::new();
        let mut protocol = logged_in(&mut handler);

        protocol.select_mailbox(Some("Sent Items"), &mut handler).unwrap();
        assert_eq!(sent(&mut protocol), "A0002 SELECT \"Sent Items\"\r\n");
        protocol.handle_input(b"* 3 EXISTS\r\nA0002 OK done\r\n", &mut handler);
        assert_eq!(protocol.selected_folder(), Some("Sent Items"));
        assert_eq!(protocol.message_count(), 3);
    }

    #[test]
    fn test_failed_select_keeps_previous_folder() {
        let mut handler = CollectingHandler::new();
        let mut protocol = selected(&mut handler, 4);

        protocol.select_mailbox(Some("Nope"), &mut handler).unwrap();
        protocol.handle_input(b"A0003 NO Mailbox doesn't exist\r\n", &mut handler);

        assert_eq!(protocol.selected_folder(), Some("INBOX"));
        assert_eq!(protocol.message_count(), 4);
        assert!(matches!(&notifications(&mut handler)[..], [Event::Error(_)]));
    }

    #[test]
    fn test_fetch_headers() {
        let mut handler = CollectingHandler::new();
        let mut protocol = selected(&mut handler, 3);

        protocol.fetch_headers(50, &mut handler).unwrap();
        assert_eq!(sent(&mut protocol), "A0003 FETCH 1:3 (UID FLAGS ENVELOPE)\r\n");

        let mut input = String::new();
        input.push_str("* 1 FETCH (UID 40 FLAGS () ENVELOPE (\"d1\" \"First\" ((\"\" NIL \"a\" \"x.org\"))))\r\n");
        input.push_str("* 2 FETCH (FLAGS (\\Seen))\r\n");
        input.push_str(FETCH_LINE);
        input.push_str("A0003 OK FETCH completed\r\n");
        protocol.handle_input(input.as_bytes(), &mut handler);

        let events = notifications(&mut handler);
        let [Event::HeadersReceived(headers)] = &events[..] else {
            panic!("expected headers, got {events:?}");
        };
        assert_eq!(headers.len(), 2);
        assert_eq!(headers[0].uid, "42");
        assert_eq!(headers[0].sender, "Jane Doe <jane@example.com>");
        assert!(headers[0].seen);
        assert_eq!(headers[1].uid, "40");
        assert_eq!(headers[1].sender, "a@x.org");
        assert!(!headers[1].seen);

        assert_eq!(protocol.selected_folder(), Some("INBOX"));
        assert!(protocol.state().idle().is_some());
    }

    #[test]
    fn test_fetch_range_limits_to_most_recent() {
        let mut handler = CollectingHandler::new();
        let mut protocol = selected(&mut handler, 120);

        protocol.fetch_headers(50, &mut handler).unwrap();
        assert_eq!(sent(&mut protocol), "A0003 FETCH 71:120 (UID FLAGS ENVELOPE)\r\n");
    }

    #[test]
    fn test_fetch_empty_mailbox_sends_nothing() {
        let mut handler = CollectingHandler::new();
        let mut protocol = selected(&mut handler, 0);

        protocol.fetch_headers(50, &mut handler).unwrap();
        assert!(protocol.poll_transmit().is_none());
        assert!(protocol.outstanding().is_none());
        assert_eq!(
            notifications(&mut handler),
            vec![Event::HeadersReceived(Vec::new())]
        );
        assert!(protocol.state().idle().is_some());
    }

    #[test]
    fn test_fetch_clears_previous_results() {
        let mut handler = CollectingHandler::new();
        let mut protocol = selected(&mut handler, 3);

        protocol.fetch_headers(1, &mut handler).unwrap();
        protocol.handle_input(FETCH_LINE.as_bytes(), &mut handler);
        protocol.handle_input(b"A0003 OK done\r\n", &mut handler);
        handler.clear();

        protocol.fetch_headers(1, &mut handler).unwrap();
        assert!(protocol.headers().is_empty());
        protocol.handle_input(FETCH_LINE.as_bytes(), &mut handler);
        protocol.handle_input(b"A0004 OK done\r\n", &mut handler);

        let events = notifications(&mut handler);
        assert!(matches!(&events[..], [Event::HeadersReceived(h)] if h.len() == 1));
    }

    #[test]
    fn test_unsolicited_fetch_is_ignored() {
        let mut handler = CollectingHandler::new();
        let mut protocol = selected(&mut handler, 3);

        protocol.handle_input(FETCH_LINE.as_bytes(), &mut handler);
        assert!(protocol.headers().is_empty());
        assert!(handler.events.is_empty());
    }

    #[test]
    fn test_logout() {
        let mut handler = CollectingHandler::new();
        let mut protocol = selected(&mut handler, 1);

        protocol.logout(&mut handler).unwrap();
        assert_eq!(sent(&mut protocol), "A0003 LOGOUT\r\n");
        protocol.handle_input(
            b"* BYE IMAP4rev1 Server logging out\r\nA0003 OK LOGOUT completed\r\n",
            &mut handler,
        );

        assert_eq!(protocol.state(), &SessionState::Disconnected);
        assert_eq!(notifications(&mut handler), vec![Event::Disconnected]);
    }

    #[test]
    fn test_transport_error_reported_once() {
        let mut handler = CollectingHandler::new();
        let mut protocol = logged_in(&mut handler);
        protocol.select_mailbox(None, &mut handler).unwrap();
        handler.clear();

        protocol.transport_error("connection reset", &mut handler);
        protocol.transport_error("connection reset", &mut handler);

        assert_eq!(protocol.state(), &SessionState::Disconnected);
        assert!(protocol.outstanding().is_none());
        assert!(protocol.poll_transmit().is_none());
        assert_eq!(
            notifications(&mut handler),
            vec![
                Event::Error("Connection error: connection reset".to_string()),
                Event::Disconnected,
            ]
        );
    }

    #[test]
    fn test_tags_keep_increasing_after_reconnect() {
        let mut handler = CollectingHandler::new();
        let mut protocol = logged_in(&mut handler);
        protocol.transport_error("gone", &mut handler);

        protocol.connect("imap.example.com", 993, &mut handler).unwrap();
        protocol.transport_connected(&mut handler).unwrap();
        protocol.handle_input(b"* OK again\r\n", &mut handler);
        protocol.login("jane", "secret", &mut handler).unwrap();
        assert!(sent(&mut protocol).starts_with("A0002 LOGIN"));
    }

    #[test]
    fn test_foreign_tag_does_not_complete() {
        let mut handler = CollectingHandler::new();
        let mut protocol = connected(&mut handler);

        protocol.login("jane", "secret", &mut handler).unwrap();
        protocol.handle_input(b"A00010 OK not ours\r\nX0001 OK nope\r\n", &mut handler);
        assert!(matches!(protocol.state(), SessionState::LoggingIn(_)));
    }

    #[test]
    fn test_custom_tag_prefix() {
        let mut handler = CollectingHandler::new();
        let mut protocol = Protocol::with_tag_prefix("MADL");
        protocol.transport_connected(&mut handler).unwrap();
        protocol.handle_input(b"* OK hi\r\n", &mut handler);
        protocol.logout(&mut handler).unwrap();
        assert_eq!(sent(&mut protocol), "MADL0001 LOGOUT\r\n");
    }

    #[test]
    fn test_fetch_range() {
        assert_eq!(fetch_range(0, 50), None);
        assert_eq!(fetch_range(10, 0), None);
        assert_eq!(fetch_range(10, 50), Some((1, 10)));
        assert_eq!(fetch_range(100, 50), Some((51, 100)));
        assert_eq!(fetch_range(1, 1), Some((1, 1)));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("abc", 10), "abc");
        assert_eq!(truncate("abcdef", 3), "abc");
        assert_eq!(truncate("äöü", 2), "äö");
    }
}
