//! Connection driver.
//!
//! [`connect`] spawns one task per connection. The task owns the TLS stream
//! and a [`Protocol`], applies [`Request`]s sent through the [`Client`]
//! handle, and forwards every notification to an [`EventReceiver`].
//!
//! # Example
//!
//! ```ignore
//! use mailadler_imap::{Config, Event, connect};
//!
//! #[tokio::main]
//! async fn main() -> mailadler_imap::Result<()> {
//!     let (client, mut events) = connect(Config::new("imap.gmx.net"));
//!
//!     while let Some(event) = events.recv().await {
//!         match event {
//!             Event::Connected => client.login("jane@gmx.net", "secret")?,
//!             Event::Authenticated => client.select_mailbox(None)?,
//!             Event::FolderSelected { .. } => client.fetch_headers(50)?,
//!             Event::HeadersReceived(headers) => {
//!                 for header in &headers {
//!                     println!("{} {}", header.sender, header.subject);
//!                 }
//!                 client.logout()?;
//!             }
//!             Event::Disconnected => break,
//!             _ => {}
//!         }
//!     }
//!     Ok(())
//! }
//! ```

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::{Config, connect_tls};
use crate::handler::{ChannelHandler, Event, EventHandler};
use crate::protocol::{Protocol, SessionState};
use crate::{Error, Result};

/// Size of the read buffer used by the driver.
const READ_BUFFER_SIZE: usize = 8192;

/// Receiving half of a connection's event channel.
pub type EventReceiver = mpsc::UnboundedReceiver<Event>;

/// An operation for the driver task to apply.
#[derive(Clone, PartialEq, Eq)]
pub enum Request {
    /// Send LOGIN.
    Login {
        /// User name.
        username: String,
        /// Password, sent as a quoted string.
        password: String,
    },
    /// Send SELECT; `None` selects INBOX.
    Select {
        /// Mailbox name.
        mailbox: Option<String>,
    },
    /// Fetch envelopes of the most recent messages.
    FetchHeaders {
        /// Upper bound on the number of messages.
        max_count: u32,
    },
    /// Send LOGOUT.
    Logout,
}

impl std::fmt::Debug for Request {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Login { username, .. } => f
                .debug_struct("Login")
                .field("username", username)
                .field("password", &"***")
                .finish(),
            Self::Select { mailbox } => f.debug_struct("Select").field("mailbox", mailbox).finish(),
            Self::FetchHeaders { max_count } => f
                .debug_struct("FetchHeaders")
                .field("max_count", max_count)
                .finish(),
            Self::Logout => f.write_str("Logout"),
        }
    }
}

/// Handle to a connection task.
///
/// Methods only enqueue a request; their outcome arrives as an [`Event`].
/// Dropping every clone of the handle ends the session.
#[derive(Debug, Clone)]
pub struct Client {
    requests: mpsc::UnboundedSender<Request>,
}

impl Client {
    /// Requests LOGIN.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ChannelClosed`] if the connection task has ended.
    pub fn login(&self, username: impl Into<String>, password: impl Into<String>) -> Result<()> {
        self.send(Request::Login {
            username: username.into(),
            password: password.into(),
        })
    }

    /// Requests SELECT of `mailbox`, or INBOX when `None`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ChannelClosed`] if the connection task has ended.
    pub fn select_mailbox(&self, mailbox: Option<&str>) -> Result<()> {
        self.send(Request::Select {
            mailbox: mailbox.map(str::to_string),
        })
    }

    /// Requests envelopes of the `max_count` most recent messages.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ChannelClosed`] if the connection task has ended.
    pub fn fetch_headers(&self, max_count: u32) -> Result<()> {
        self.send(Request::FetchHeaders { max_count })
    }

    /// Requests LOGOUT.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ChannelClosed`] if the connection task has ended.
    pub fn logout(&self) -> Result<()> {
        self.send(Request::Logout)
    }

    /// Returns `true` while the connection task is running.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        !self.requests.is_closed()
    }

    fn send(&self, request: Request) -> Result<()> {
        self.requests.send(request).map_err(|_| Error::ChannelClosed)
    }
}

/// Connects to the server in a background task.
///
/// Returns at once. Progress, including connection failures, is reported
/// through the returned receiver; [`Event::Connected`] signals that the
/// session is ready for [`Client::login`].
#[must_use]
pub fn connect(config: Config) -> (Client, EventReceiver) {
    let (request_tx, request_rx) = mpsc::unbounded_channel();
    let (event_tx, event_rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        let mut handler = ChannelHandler::new(event_tx);
        let mut protocol = Protocol::with_tag_prefix(config.tag_prefix.clone());

        if let Err(err) = protocol.connect(&config.host, config.port, &mut handler) {
            handler.on_error(&err.to_string());
            return;
        }

        match connect_tls(&config).await {
            Ok(stream) => {
                if let Err(err) = protocol.transport_connected(&mut handler) {
                    handler.on_error(&err.to_string());
                    return;
                }
                run(stream, protocol, request_rx, handler).await;
            }
            Err(err) => protocol.transport_error(&err.to_string(), &mut handler),
        }
    });

    (
        Client {
            requests: request_tx,
        },
        event_rx,
    )
}

/// Starts a session on an already established stream.
///
/// The task resolves to the final [`Protocol`] once the session is over.
pub fn spawn_on<S>(
    stream: S,
    tag_prefix: impl Into<String>,
) -> (Client, EventReceiver, JoinHandle<Protocol>)
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let (request_tx, request_rx) = mpsc::unbounded_channel();
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let mut protocol = Protocol::with_tag_prefix(tag_prefix);

    let task = tokio::spawn(async move {
        let mut handler = ChannelHandler::new(event_tx);
        if let Err(err) = protocol.transport_connected(&mut handler) {
            handler.on_error(&err.to_string());
            return protocol;
        }
        run(stream, protocol, request_rx, handler).await
    });

    (
        Client {
            requests: request_tx,
        },
        event_rx,
        task,
    )
}

/// Drives `protocol` over `stream` until the session is disconnected.
///
/// Server data and caller requests are processed as they arrive, one at a
/// time. A closed request channel counts as a transport failure.
pub async fn run<S, H>(
    mut stream: S,
    mut protocol: Protocol,
    mut requests: mpsc::UnboundedReceiver<Request>,
    mut handler: H,
) -> Protocol
where
    S: AsyncRead + AsyncWrite + Unpin,
    H: EventHandler,
{
    let mut buf = vec![0u8; READ_BUFFER_SIZE];

    loop {
        while let Some(transmit) = protocol.poll_transmit() {
            if let Err(err) = write_all(&mut stream, &transmit.data).await {
                protocol.transport_error(&err.to_string(), &mut handler);
            }
        }

        if *protocol.state() == SessionState::Disconnected {
            break;
        }

        tokio::select! {
            read = stream.read(&mut buf) => match read {
                Ok(0) => protocol.transport_error("connection closed by server", &mut handler),
                Ok(n) => protocol.handle_input(&buf[..n], &mut handler),
                Err(err) => protocol.transport_error(&err.to_string(), &mut handler),
            },
            request = requests.recv() => match request {
                Some(request) => {
                    tracing::trace!(?request, "request");
                    if let Err(err) = apply(&mut protocol, request, &mut handler) {
                        tracing::debug!(%err, "request rejected");
                        handler.on_error(&err.to_string());
                    }
                }
                None => protocol.transport_error("connection cancelled", &mut handler),
            },
        }
    }

    if let Err(err) = stream.shutdown().await {
        tracing::debug!(%err, "shutdown failed");
    }
    tracing::debug!("connection task finished");
    protocol
}

/// Applies one request to the protocol.
fn apply(protocol: &mut Protocol, request: Request, handler: &mut dyn EventHandler) -> Result<()> {
    match request {
        Request::Login { username, password } => protocol.login(&username, &password, handler),
        Request::Select { mailbox } => protocol.select_mailbox(mailbox.as_deref(), handler),
        Request::FetchHeaders { max_count } => protocol.fetch_headers(max_count, handler),
        Request::Logout => protocol.logout(handler),
    }
}

async fn write_all<S>(stream: &mut S, data: &[u8]) -> std::io::Result<()>
where
    S: AsyncWrite + Unpin,
{
    stream.write_all(data).await?;
    stream.flush().await
}
