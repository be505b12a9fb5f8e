//! Playback engine collaborator boundary
//!
//! The core never renders notes itself; it drives an external engine that
//! turns "play piece X at position P under options O" into key events.

use crate::settings::SettingsSnapshot;
use crate::sync::{PlayMode, SongInfo};

/// Per-peer playback options for a scheduled play command.
///
/// `slot` and `track_id` come from the local roster entry at fire time, not
/// from the envelope: each peer personalizes its own notes.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayOptions {
    /// Position to start from, in milliseconds
    pub position_ms: u64,
    /// Split or track play
    pub mode: PlayMode,
    /// This peer's slot in split mode
    pub slot: Option<u32>,
    /// Number of participants sharing the piece
    pub total_players: u32,
    /// This peer's assigned MIDI track in track mode
    pub track_id: Option<u32>,
}

/// The external note-rendering engine.
///
/// Implementations are expected to be cheap to call from timer tasks; the
/// core invokes them at scheduled fire times and never waits on them.
pub trait PlaybackEngine: Send + Sync {
    fn play_piece(&self, song: &SongInfo, options: &PlayOptions);
    fn pause_resume(&self);
    fn stop(&self);
    fn seek_to(&self, position_ms: u64);
    /// Fire a single test key press (calibration only).
    fn press_key(&self, key: &str);
    fn current_position_ms(&self) -> u64;
    fn is_paused(&self) -> bool;
    /// Read the engine's current playback settings.
    fn settings(&self) -> SettingsSnapshot;
    /// Apply a settings snapshot through the engine's four setters.
    fn apply_settings(&self, settings: &SettingsSnapshot);
}
