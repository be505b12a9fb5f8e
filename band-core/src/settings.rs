//! Playback settings replication
//!
//! A member adopts the host's playback settings for the duration of a room
//! session. The member's own settings are captured once when it joins and
//! restored exactly once when it leaves (or is kicked, or the room closes).

use serde::{Deserialize, Serialize};

/// Snapshot of the local playback configuration.
///
/// The core treats `note_mode` and `key_mode` as opaque labels; the playback
/// engine is the only component that interprets them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsSnapshot {
    /// Playback speed multiplier
    pub speed: f64,
    /// Note interpretation mode
    pub note_mode: String,
    /// Key layout mode
    pub key_mode: String,
    /// Octave shift applied to all notes
    pub octave_shift: i32,
}

impl Default for SettingsSnapshot {
    fn default() -> Self {
        Self {
            speed: 1.0,
            note_mode: String::new(),
            key_mode: String::new(),
            octave_shift: 0,
        }
    }
}

/// Guards the capture-once / restore-once invariant for a member's
/// pre-join settings.
#[derive(Debug, Default)]
pub struct SettingsReplicator {
    original: Option<SettingsSnapshot>,
}

impl SettingsReplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture the member's own settings before any host value is applied.
    /// Returns `false` (and keeps the existing snapshot) if a snapshot was
    /// already captured this session.
    pub fn capture(&mut self, snapshot: SettingsSnapshot) -> bool {
        if self.original.is_some() {
            tracing::warn!("settings snapshot already captured, ignoring second capture");
            return false;
        }
        self.original = Some(snapshot);
        true
    }

    /// Take the captured snapshot for restoration. Subsequent calls return
    /// `None`, so every teardown path can call this unconditionally.
    pub fn restore(&mut self) -> Option<SettingsSnapshot> {
        self.original.take()
    }

    pub fn is_captured(&self) -> bool {
        self.original.is_some()
    }
}
