//! IMAP connection management.
//!
//! This module provides the I/O side of a session:
//! - Configuration (host, port, certificate policy)
//! - TLS stream setup
//! - A driver task that runs a [`Protocol`](crate::protocol::Protocol) over
//!   the stream and exchanges requests and events through channels

mod client;
mod config;
mod stream;

pub use client::{Client, EventReceiver, Request, connect, run, spawn_on};
pub use config::{CertificatePolicy, Config, ConfigBuilder};
pub use stream::{ImapStream, connect_tls, create_tls_connector};
