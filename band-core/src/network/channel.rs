//! Channel Abstraction
//!
//! The per-peer reliable message pipe is provided by an external
//! peer-connection library; the core only sees this trait plus an event
//! stream. Per-channel message ordering is guaranteed by the implementation;
//! cross-channel ordering and delivery confirmation are not.

use thiserror::Error;

/// Reserved channel key for the coordinator's channel on the member side.
pub const HOST_CHANNEL_ID: &str = "host";

/// Channel-layer errors
#[derive(Debug, Clone, Error)]
pub enum ChannelError {
    #[error("endpoint unavailable: {0}")]
    Unavailable(String),

    #[error("endpoint already in use: {0}")]
    EndpointInUse(String),

    #[error("no open channel to {0}")]
    NotConnected(String),

    #[error("channel send failed: {0}")]
    Send(String),
}

/// Events emitted by a [`ChannelHub`] implementation.
///
/// Delivered in per-channel order over an unbounded mpsc receiver handed to
/// the session at construction.
#[derive(Debug, Clone)]
pub enum ChannelEvent {
    /// A channel to `peer` finished opening (inbound or outbound).
    Open { peer: String },
    /// A message arrived on the channel to `peer`.
    Data { peer: String, payload: Vec<u8> },
    /// The channel to `peer` closed.
    Closed { peer: String },
    /// The channel to `peer` failed (or the hub itself, if `peer` is None).
    Error {
        peer: Option<String>,
        message: String,
    },
}

/// Handle to the external peer-connection layer.
///
/// A host calls `listen` with the endpoint derived from its room code;
/// members call `connect` with the same endpoint. After that, both sides
/// exchange opaque payloads addressed by channel-level peer id.
pub trait ChannelHub: Send + Sync {
    /// This process's channel-level peer identifier.
    fn local_id(&self) -> String;

    /// Open a listening channel under a namespaced endpoint (host side).
    fn listen(&self, endpoint: &str) -> Result<(), ChannelError>;

    /// Open an outbound connection to a listening endpoint (member side).
    /// Completion is signalled by a later `Open` event; an unreachable
    /// endpoint may never produce one.
    fn connect(&self, endpoint: &str) -> Result<(), ChannelError>;

    /// Send a payload to one peer. At-most-once per call, no retry.
    fn send(&self, peer: &str, payload: &[u8]) -> Result<(), ChannelError>;

    /// Close the channel to one peer.
    fn close(&self, peer: &str);

    /// Close every channel and stop listening.
    fn shutdown(&self);
}
