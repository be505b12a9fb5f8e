//! Session errors and the UI notification surface

use crate::network::ChannelError;
use crate::sync::{PeerEntry, SessionStatus};
use crate::transfer::TransferError;

/// Errors surfaced by [`super::BandSession`] operations.
#[derive(Debug, thiserror::Error)]
pub enum BandError {
    #[error("not in a room")]
    NotInRoom,

    #[error("already in a room")]
    AlreadyInRoom,

    #[error("not the host")]
    NotHost,

    #[error("operation requires a member")]
    NotMember,

    #[error("room not found: connection timed out")]
    JoinTimeout,

    #[error("invalid room code")]
    InvalidRoomCode,

    #[error("unknown peer: {0}")]
    PeerNotFound(String),

    #[error("cannot kick yourself")]
    SelfKick,

    #[error("no song selected")]
    NoSongSelected,

    #[error(transparent)]
    Channel(#[from] ChannelError),

    #[error(transparent)]
    Transfer(#[from] TransferError),
}

/// Notifications pushed to the embedding UI. Display only; no protocol
/// decision is made behind this surface.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    StatusChanged(SessionStatus),
    /// Any roster field changed (latency, readiness, assignment, membership)
    RosterChanged,
    PeerJoined(PeerEntry),
    PeerLeft { id: String },
    /// Selected piece, its track list, or its local availability changed
    SongChanged,
    ModeChanged(crate::sync::PlayMode),
    /// The session ended from the remote side (kick, room closed, host lost)
    RoomEnded { reason: String },
    Error { message: String },
}

/// Callback interface for session events
pub trait SessionCallback: Send + Sync {
    fn on_event(&self, event: SessionEvent);
}
