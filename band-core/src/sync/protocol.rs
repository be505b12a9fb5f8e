//! Band Protocol Messages
//!
//! Typed records exchanged over the per-peer channels. Every message carries
//! a `type` discriminator; unrecognized types fail to decode and are ignored
//! by the receiver for forward compatibility.

use serde::{Deserialize, Serialize};

use crate::settings::SettingsSnapshot;

/// How the selected piece is divided among participants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayMode {
    /// Notes are partitioned across slots 0..N-1
    Split,
    /// Each participant plays an assigned MIDI track
    Track,
}

impl Default for PlayMode {
    fn default() -> Self {
        PlayMode::Split
    }
}

/// A participant as seen by the roster.
///
/// The host holds the authoritative copy; member replicas mutate only by
/// applying host-originated messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeerEntry {
    /// Channel-level peer identifier ("host" for the coordinator)
    pub id: String,
    /// Display name chosen by the player
    pub name: String,
    /// Latest one-way latency estimate (advisory, locally measured)
    pub latency_ms: u64,
    /// Assigned MIDI track for track mode
    pub track_id: Option<u32>,
    /// Assigned position for split mode
    pub slot: Option<u32>,
    /// Readiness flag, host is always ready
    pub ready: bool,
    pub is_host: bool,
    /// Join order, the stable sort key for slot auto-assignment
    pub join_seq: u64,
}

/// An available MIDI track of the selected piece.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackRecord {
    pub id: u32,
    pub name: String,
    pub note_count: u32,
}

/// The shared piece. Only `name` and `filename` travel on the wire;
/// `file_data` exists transiently on the host while a new piece propagates,
/// `path`/`pending` describe member-local availability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SongInfo {
    pub name: String,
    pub filename: String,
    #[serde(skip)]
    pub file_data: Option<String>,
    #[serde(skip)]
    pub path: Option<String>,
    #[serde(skip)]
    pub pending: bool,
}

impl SongInfo {
    pub fn new(name: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            filename: filename.into(),
            file_data: None,
            path: None,
            pending: false,
        }
    }
}

/// Messages exchanged between the host and members.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BandMessage {
    // === Room lifecycle ===
    /// Request to join (member -> host)
    Join { name: String },

    /// Full state push to a new joiner (host -> member)
    RoomState {
        peers: Vec<PeerEntry>,
        tracks: Vec<TrackRecord>,
        mode: PlayMode,
        song: Option<SongInfo>,
    },

    /// Roster delta broadcasts (host -> all)
    PeerJoined { peer: PeerEntry },
    PeerLeft { id: String },
    PeerKicked { id: String },

    /// Forced termination
    Kicked,
    RoomClosed,

    // === Latency probes ===
    Ping { timestamp: u64 },
    /// Echoes the ping timestamp verbatim
    Pong { timestamp: u64 },

    // === Assignment and piece selection (host -> all) ===
    TrackAssign { peer_id: String, track_id: u32 },
    SlotAssign { peer_id: String, slot: u32 },
    TracksUpdate { tracks: Vec<TrackRecord> },
    ModeChange { mode: PlayMode },
    SongSelect { name: String, filename: String },
    /// Base64 piece payload for members lacking the file
    SongData { filename: String, file_data: String },

    // === Transport envelopes (host -> all, host included) ===
    Play {
        start_at: u64,
        position_ms: u64,
        mode: PlayMode,
        total_players: u32,
        settings: SettingsSnapshot,
    },
    Pause { start_at: u64, position_ms: u64 },
    Stop { start_at: u64 },
    Seek {
        seek_at: u64,
        position_ms: u64,
        settings: SettingsSnapshot,
    },

    /// Drift-correction pulse. Reserved: sent and accepted, but no
    /// corrective action is taken yet.
    Sync { position_ms: u64, timestamp: u64 },

    // === Readiness gating ===
    /// Member reports its own readiness (member -> host)
    Ready { ready: bool },
    /// Host replicates a readiness change (host -> all)
    ReadyUpdate { peer_id: String, ready: bool },
    /// Host reverts every non-host peer to not-ready (host -> all)
    ReadyReset,

    // === Settings replication ===
    SettingsSync { settings: SettingsSnapshot },

    // === Calibration ===
    CalibrateStart { start_at: u64, interval_ms: u64 },
    CalibrateStop,
}

impl BandMessage {
    /// Whether a member may originate this message. Everything else is
    /// host-authoritative and ignored when it arrives at the host.
    pub fn member_originated(&self) -> bool {
        matches!(
            self,
            BandMessage::Join { .. }
                | BandMessage::Ping { .. }
                | BandMessage::Pong { .. }
                | BandMessage::Ready { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_tag_encoding() {
        let msg = BandMessage::Ping { timestamp: 42 };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains(r#""type":"ping""#), "got {}", json);

        let msg = BandMessage::ReadyReset;
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(json, r#"{"type":"ready_reset"}"#);
    }

    #[test]
    fn test_unknown_type_fails_decode() {
        let err = serde_json::from_str::<BandMessage>(r#"{"type":"hologram","x":1}"#);
        assert!(err.is_err());
    }

    #[test]
    fn test_song_local_fields_stay_local() {
        let mut song = SongInfo::new("Nocturne", "nocturne.mid");
        song.file_data = Some("AAAA".to_string());
        song.path = Some("/tmp/nocturne.mid".to_string());
        song.pending = true;

        let json = serde_json::to_string(&song).unwrap();
        assert!(!json.contains("file_data"));
        assert!(!json.contains("path"));

        let decoded: SongInfo = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded.file_data, None);
        assert_eq!(decoded.path, None);
        assert!(!decoded.pending);
    }

    #[test]
    fn test_play_envelope_round_trip() {
        let msg = BandMessage::Play {
            start_at: 1_000,
            position_ms: 250,
            mode: PlayMode::Track,
            total_players: 3,
            settings: crate::settings::SettingsSnapshot::default(),
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains(r#""type":"play""#));
        assert!(json.contains(r#""mode":"track""#));

        match serde_json::from_str::<BandMessage>(&json).unwrap() {
            BandMessage::Play {
                start_at,
                total_players,
                ..
            } => {
                assert_eq!(start_at, 1_000);
                assert_eq!(total_players, 3);
            }
            other => panic!("decoded wrong variant: {:?}", other),
        }
    }

    #[test]
    fn test_member_originated() {
        assert!(BandMessage::Join {
            name: "Bob".to_string()
        }
        .member_originated());
        assert!(BandMessage::Ready { ready: true }.member_originated());
        assert!(!BandMessage::RoomClosed.member_originated());
        assert!(!BandMessage::Stop { start_at: 0 }.member_originated());
    }
}
