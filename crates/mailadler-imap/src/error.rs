//! Error types for the IMAP library.

use thiserror::Error;

/// Errors that can occur during IMAP operations.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error during network operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TLS handshake or encryption error.
    #[error("TLS error: {0}")]
    Tls(#[from] rustls::Error),

    /// Invalid DNS name for TLS.
    #[error("Invalid DNS name: {0}")]
    InvalidDnsName(#[from] rustls::pki_types::InvalidDnsNameError),

    /// Server returned NO for a tagged command.
    #[error("Server returned NO: {0}")]
    No(String),

    /// Server returned BAD for a tagged command.
    #[error("Server returned BAD: {0}")]
    Bad(String),

    /// A command is still waiting for its tagged completion.
    #[error("Operation in progress: {0} has not completed yet")]
    OperationInProgress(String),

    /// Invalid state for the requested operation.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// The connection task is gone.
    #[error("Connection closed")]
    ChannelClosed,
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
