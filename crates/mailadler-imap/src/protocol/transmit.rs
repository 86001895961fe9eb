//! Outgoing protocol data.

/// Bytes the protocol core wants written to the transport.
///
/// The core never performs I/O itself; the driver drains these with
/// [`Protocol::poll_transmit`](super::Protocol::poll_transmit) and writes them
/// in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transmit {
    /// Raw bytes to send to the server.
    pub data: Vec<u8>,
}

impl From<Vec<u8>> for Transmit {
    fn from(data: Vec<u8>) -> Self {
        Self { data }
    }
}

impl AsRef<[u8]> for Transmit {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}
