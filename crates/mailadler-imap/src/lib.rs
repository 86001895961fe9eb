//! # mailadler-imap
//!
//! An event-driven IMAP client core covering the handful of commands a
//! header viewer needs: LOGIN, SELECT, FETCH of envelopes, and LOGOUT, over
//! implicit TLS.
//!
//! ## Features
//!
//! - **Sans-I/O core**: [`Protocol`] holds the whole session state machine
//!   and never touches a socket, so it is tested by feeding it bytes
//! - **Strictly sequential**: at most one command is in flight; a second
//!   request while one is outstanding fails with
//!   [`Error::OperationInProgress`] and nothing is sent
//! - **Event callbacks**: progress is reported through [`EventHandler`], or
//!   as [`Event`] values over a channel when using [`connect`]
//! - **TLS via rustls**: certificate errors are logged and ignored by
//!   default, see [`CertificatePolicy`]
//!
//! ## Quick Start
//!
//! ```ignore
//! use mailadler_imap::{Config, Event, connect};
//!
//! #[tokio::main]
//! async fn main() -> mailadler_imap::Result<()> {
//!     let (client, mut events) = connect(Config::new("imap.web.de"));
//!
//!     while let Some(event) = events.recv().await {
//!         match event {
//!             Event::Connected => client.login("user@web.de", "password")?,
//!             Event::Authenticated => client.select_mailbox(None)?,
//!             Event::FolderSelected { .. } => client.fetch_headers(20)?,
//!             Event::HeadersReceived(headers) => {
//!                 for header in &headers {
//!                     println!("{} | {} | {}", header.date, header.sender, header.subject);
//!                 }
//!                 client.logout()?;
//!             }
//!             Event::Error(message) => eprintln!("{message}"),
//!             Event::Disconnected => break,
//!             _ => {}
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Session States
//!
//! ```text
//! Disconnected ─ connect ─→ Connecting ─ TLS up ─→ AwaitingGreeting
//!                                                      │ * OK
//!                                                      ▼
//!       ┌──────────── tagged completion ─────────── Idle
//!       │                                             │ login / select / fetch / logout
//!       └── LoggingIn / Selecting / Fetching / LoggingOut ◄┘
//! ```
//!
//! ## Modules
//!
//! - [`framer`]: CRLF line framing
//! - [`command`]: command serialization and sequencing
//! - [`parser`]: response classification and envelope extraction
//! - [`protocol`]: the sans-I/O session
//! - [`store`]: collected message summaries
//! - [`handler`]: notification callbacks
//! - [`connection`]: TLS setup and the driver task

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod command;
pub mod connection;
mod error;
pub mod framer;
pub mod handler;
pub mod parser;
pub mod protocol;
pub mod store;
pub mod types;

pub use connection::{CertificatePolicy, Client, Config, ConfigBuilder, EventReceiver, connect};
pub use error::{Error, Result};
pub use handler::{Event, EventHandler};
pub use protocol::{Protocol, SessionState};
pub use types::{DEFAULT_FETCH_COUNT, DEFAULT_MAILBOX, MessageSummary};
