//! Band Together - Core Library
//!
//! This library provides the core functionality for host-authoritative
//! synchronized MIDI performance: rooms joined by code, roster replication,
//! latency-compensated transport scheduling, settings replication and a
//! by-ear calibration loop.

pub mod calibration;
pub mod config;
pub mod engine;
pub mod latency;
pub mod network;
pub mod scheduler;
pub mod session;
pub mod settings;
pub mod sync;
pub mod transfer;

// Re-exports for convenience
pub use engine::{PlayOptions, PlaybackEngine};
pub use network::{ChannelEvent, ChannelHub, RoomCode, HOST_CHANNEL_ID};
pub use session::{BandError, BandSession, SessionCallback, SessionEvent};
pub use settings::SettingsSnapshot;
pub use sync::{BandMessage, PeerEntry, PlayMode, SessionState, SessionStatus, SongInfo};
pub use transfer::{DiskFileStore, FileStore};
