//! Message dispatch
//!
//! Protocol logic lives in pure functions `(state, input) -> effects` so it
//! can be exercised without a live network. The session applies the returned
//! effects against the channel hub, scheduler, engine and callback.

use tracing::debug;

use super::events::SessionEvent;
use crate::latency::one_way_ms;
use crate::network::{ChannelEvent, HOST_CHANNEL_ID};
use crate::settings::SettingsSnapshot;
use crate::sync::{BandMessage, PlayMode, SessionState, SessionStatus, SongInfo};

/// A transport action to execute locally at a scheduled time.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportAction {
    Play {
        position_ms: u64,
        mode: PlayMode,
        total_players: u32,
    },
    Pause,
    Stop,
    Seek {
        position_ms: u64,
    },
}

/// Side effects requested by the pure dispatch functions.
#[derive(Debug, Clone)]
pub enum Effect {
    SendTo {
        peer: String,
        message: BandMessage,
    },
    Broadcast {
        message: BandMessage,
        except: Option<String>,
    },
    StartPing {
        peer: String,
    },
    StopPing {
        peer: String,
    },
    RecordLatency {
        peer: String,
        latency_ms: u64,
    },
    ScheduleTransport {
        start_at_ms: u64,
        action: TransportAction,
    },
    ApplySettings(SettingsSnapshot),
    /// Capture the member's own settings before host values are applied.
    CaptureSettings,
    /// The member's outbound connection finished opening.
    JoinEstablished,
    /// Look up whether the selected piece already exists locally.
    CheckSongAvailability {
        filename: String,
    },
    /// Persist a pushed piece payload.
    SaveSongFile {
        filename: String,
        data: String,
    },
    StartCalibration {
        start_at_ms: u64,
        interval_ms: u64,
    },
    StopCalibration,
    /// Tear the session down into `status`, emitting `reason` when the
    /// remote side ended it.
    Teardown {
        status: SessionStatus,
        reason: Option<String>,
    },
    Notify(SessionEvent),
}

/// Dispatch a channel-layer event.
pub fn handle_channel_event(
    state: &mut SessionState,
    event: ChannelEvent,
    now_ms: u64,
) -> Vec<Effect> {
    match event {
        ChannelEvent::Open { peer } => handle_open(state, peer),
        ChannelEvent::Data { peer, payload } => match serde_json::from_slice(&payload) {
            Ok(message) => handle_message(state, &peer, message, now_ms),
            Err(e) => {
                // Forward-compatibility stance: unknown or malformed
                // messages are ignored, not errors.
                debug!("ignoring undecodable message from {}: {}", peer, e);
                Vec::new()
            }
        },
        ChannelEvent::Closed { peer } => handle_closed(state, &peer, None),
        ChannelEvent::Error { peer, message } => match peer {
            Some(peer) => handle_closed(state, &peer, Some(message)),
            None => hub_failure(state, message),
        },
    }
}

fn handle_open(state: &mut SessionState, peer: String) -> Vec<Effect> {
    if state.is_host {
        if state.status != SessionStatus::Connected {
            return Vec::new();
        }
        // Roster entry waits for the join message; latency probing starts
        // right away so a first estimate exists before the peer appears.
        return vec![Effect::StartPing { peer }];
    }

    if state.status == SessionStatus::Connecting && peer == HOST_CHANNEL_ID {
        state.status = SessionStatus::Connected;
        return vec![
            // Order matters: snapshot our own settings before anything the
            // host sends can overwrite them.
            Effect::CaptureSettings,
            Effect::SendTo {
                peer: HOST_CHANNEL_ID.to_string(),
                message: BandMessage::Join {
                    name: state.display_name.clone(),
                },
            },
            Effect::StartPing {
                peer: HOST_CHANNEL_ID.to_string(),
            },
            Effect::JoinEstablished,
            Effect::Notify(SessionEvent::StatusChanged(SessionStatus::Connected)),
        ];
    }
    Vec::new()
}

fn handle_closed(state: &mut SessionState, peer: &str, error: Option<String>) -> Vec<Effect> {
    if state.is_host {
        if state.roster.remove(peer).is_none() {
            return vec![Effect::StopPing {
                peer: peer.to_string(),
            }];
        }
        return vec![
            Effect::StopPing {
                peer: peer.to_string(),
            },
            Effect::Broadcast {
                message: BandMessage::PeerLeft {
                    id: peer.to_string(),
                },
                except: None,
            },
            Effect::Notify(SessionEvent::PeerLeft {
                id: peer.to_string(),
            }),
            Effect::Notify(SessionEvent::RosterChanged),
        ];
    }

    if peer != HOST_CHANNEL_ID {
        return Vec::new();
    }
    match state.status {
        SessionStatus::Connecting => vec![Effect::Teardown {
            status: SessionStatus::Error,
            reason: Some(error.unwrap_or_else(|| "room not reachable".to_string())),
        }],
        SessionStatus::Connected => vec![Effect::Teardown {
            status: SessionStatus::Disconnected,
            reason: Some(match error {
                Some(e) => format!("connection to host failed: {}", e),
                None => "connection to host lost".to_string(),
            }),
        }],
        _ => Vec::new(),
    }
}

fn hub_failure(state: &mut SessionState, message: String) -> Vec<Effect> {
    if state.status == SessionStatus::Disconnected {
        return Vec::new();
    }
    vec![
        Effect::Notify(SessionEvent::Error {
            message: message.clone(),
        }),
        Effect::Teardown {
            status: SessionStatus::Error,
            reason: Some(message),
        },
    ]
}

/// Dispatch one protocol message.
pub fn handle_message(
    state: &mut SessionState,
    from: &str,
    message: BandMessage,
    now_ms: u64,
) -> Vec<Effect> {
    if state.status != SessionStatus::Connected {
        return Vec::new();
    }

    if state.is_host {
        // Host-authoritative messages only ever originate here; a copy
        // arriving from a member channel is ignored. The host's own
        // envelopes are dispatched locally under the reserved host id.
        if from != HOST_CHANNEL_ID && !message.member_originated() {
            debug!("ignoring host-only message from member {}", from);
            return Vec::new();
        }
    } else if from != HOST_CHANNEL_ID {
        debug!("ignoring message from non-host channel {}", from);
        return Vec::new();
    }

    match message {
        // === Member-originated (host handles) ===
        BandMessage::Join { name } => host_handle_join(state, from, name),

        BandMessage::Ready { ready } => {
            if !state.is_host {
                return Vec::new();
            }
            if !state.roster.set_ready(from, ready) {
                return Vec::new();
            }
            vec![
                Effect::Broadcast {
                    message: BandMessage::ReadyUpdate {
                        peer_id: from.to_string(),
                        ready,
                    },
                    except: None,
                },
                Effect::Notify(SessionEvent::RosterChanged),
            ]
        }

        // === Latency probes (both directions) ===
        BandMessage::Ping { timestamp } => vec![Effect::SendTo {
            peer: from.to_string(),
            message: BandMessage::Pong { timestamp },
        }],

        BandMessage::Pong { timestamp } => {
            let latency_ms = one_way_ms(now_ms, timestamp);
            state.roster.set_latency(from, latency_ms);
            vec![
                Effect::RecordLatency {
                    peer: from.to_string(),
                    latency_ms,
                },
                Effect::Notify(SessionEvent::RosterChanged),
            ]
        }

        // === Host-originated roster replication (member applies) ===
        BandMessage::RoomState {
            peers,
            tracks,
            mode,
            song,
        } => {
            state.roster.clear();
            for peer in peers {
                state.roster.apply(peer);
            }
            state.tracks = tracks;
            state.play_mode = mode;
            let mut effects = vec![Effect::Notify(SessionEvent::RosterChanged)];
            if let Some(song) = song {
                let filename = song.filename.clone();
                state.song = Some(song);
                effects.push(Effect::CheckSongAvailability { filename });
                effects.push(Effect::Notify(SessionEvent::SongChanged));
            }
            effects
        }

        BandMessage::PeerJoined { peer } => {
            state.roster.apply(peer.clone());
            vec![
                Effect::Notify(SessionEvent::PeerJoined(peer)),
                Effect::Notify(SessionEvent::RosterChanged),
            ]
        }

        BandMessage::PeerLeft { id } | BandMessage::PeerKicked { id } => {
            state.roster.remove(&id);
            vec![
                Effect::Notify(SessionEvent::PeerLeft { id }),
                Effect::Notify(SessionEvent::RosterChanged),
            ]
        }

        BandMessage::TrackAssign { peer_id, track_id } => {
            state.roster.assign_track(&peer_id, track_id);
            vec![Effect::Notify(SessionEvent::RosterChanged)]
        }

        BandMessage::SlotAssign { peer_id, slot } => {
            state.roster.assign_slot(&peer_id, slot);
            vec![Effect::Notify(SessionEvent::RosterChanged)]
        }

        BandMessage::ReadyUpdate { peer_id, ready } => {
            state.roster.set_ready(&peer_id, ready);
            vec![Effect::Notify(SessionEvent::RosterChanged)]
        }

        BandMessage::ReadyReset => {
            state.roster.reset_ready();
            vec![Effect::Notify(SessionEvent::RosterChanged)]
        }

        BandMessage::TracksUpdate { tracks } => {
            state.tracks = tracks;
            vec![Effect::Notify(SessionEvent::SongChanged)]
        }

        BandMessage::ModeChange { mode } => {
            state.play_mode = mode;
            vec![Effect::Notify(SessionEvent::ModeChanged(mode))]
        }

        // === Piece selection and transfer ===
        BandMessage::SongSelect { name, filename } => {
            state.song = Some(SongInfo::new(name, filename.clone()));
            state.tracks.clear();
            vec![
                Effect::CheckSongAvailability { filename },
                Effect::Notify(SessionEvent::SongChanged),
            ]
        }

        BandMessage::SongData {
            filename,
            file_data,
        } => {
            let wants_file = state
                .song
                .as_ref()
                .map(|s| s.pending && s.filename == filename)
                .unwrap_or(false);
            if !wants_file {
                debug!("discarding song payload for {} (not pending)", filename);
                return Vec::new();
            }
            vec![Effect::SaveSongFile {
                filename,
                data: file_data,
            }]
        }

        // === Transport envelopes ===
        BandMessage::Play {
            start_at,
            position_ms,
            mode,
            total_players,
            settings,
        } => {
            let mut effects = Vec::new();
            if !state.is_host {
                // The host is the source of these values already.
                effects.push(Effect::ApplySettings(settings));
            }
            effects.push(Effect::ScheduleTransport {
                start_at_ms: start_at,
                action: TransportAction::Play {
                    position_ms,
                    mode,
                    total_players,
                },
            });
            effects
        }

        BandMessage::Pause { start_at, .. } => vec![Effect::ScheduleTransport {
            start_at_ms: start_at,
            action: TransportAction::Pause,
        }],

        BandMessage::Stop { start_at } => vec![Effect::ScheduleTransport {
            start_at_ms: start_at,
            action: TransportAction::Stop,
        }],

        BandMessage::Seek {
            seek_at,
            position_ms,
            settings,
        } => {
            let mut effects = Vec::new();
            if !state.is_host {
                effects.push(Effect::ApplySettings(settings));
            }
            effects.push(Effect::ScheduleTransport {
                start_at_ms: seek_at,
                action: TransportAction::Seek { position_ms },
            });
            effects
        }

        BandMessage::Sync { .. } => {
            // Reserved drift-correction pulse: accepted, no corrective
            // action defined yet.
            Vec::new()
        }

        BandMessage::SettingsSync { settings } => {
            if state.is_host {
                Vec::new()
            } else {
                vec![Effect::ApplySettings(settings)]
            }
        }

        // === Forced termination ===
        BandMessage::Kicked => vec![Effect::Teardown {
            status: SessionStatus::Disconnected,
            reason: Some("kicked from the room".to_string()),
        }],

        BandMessage::RoomClosed => vec![Effect::Teardown {
            status: SessionStatus::Disconnected,
            reason: Some("host closed the room".to_string()),
        }],

        // === Calibration ===
        BandMessage::CalibrateStart {
            start_at,
            interval_ms,
        } => vec![Effect::StartCalibration {
            start_at_ms: start_at,
            interval_ms,
        }],

        BandMessage::CalibrateStop => vec![Effect::StopCalibration],
    }
}

fn host_handle_join(state: &mut SessionState, from: &str, name: String) -> Vec<Effect> {
    if !state.is_host || from == HOST_CHANNEL_ID {
        return Vec::new();
    }

    let entry = state.roster.add(from, name, false).clone();
    let mut effects = vec![
        Effect::Broadcast {
            message: BandMessage::PeerJoined {
                peer: entry.clone(),
            },
            except: Some(from.to_string()),
        },
        Effect::SendTo {
            peer: from.to_string(),
            message: BandMessage::RoomState {
                peers: state.roster.ordered().into_iter().cloned().collect(),
                tracks: state.tracks.clone(),
                mode: state.play_mode,
                song: state.song.clone(),
            },
        },
    ];

    // A joiner that lacks the current piece adopts the payload while the
    // host still holds it.
    if let Some(song) = &state.song {
        if let Some(file_data) = &song.file_data {
            effects.push(Effect::SendTo {
                peer: from.to_string(),
                message: BandMessage::SongData {
                    filename: song.filename.clone(),
                    file_data: file_data.clone(),
                },
            });
        }
    }

    effects.push(Effect::Notify(SessionEvent::PeerJoined(entry)));
    effects.push(Effect::Notify(SessionEvent::RosterChanged));
    effects
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::PeerEntry;

    fn host_state() -> SessionState {
        let mut state = SessionState::new("host-local".to_string());
        state.is_host = true;
        state.status = SessionStatus::Connected;
        state.display_name = "Alice".to_string();
        state.roster.add(HOST_CHANNEL_ID, "Alice", true);
        state
    }

    fn member_state(id: &str, name: &str) -> SessionState {
        let mut state = SessionState::new(id.to_string());
        state.status = SessionStatus::Connected;
        state.display_name = name.to_string();
        state
    }

    fn broadcasts(effects: &[Effect]) -> Vec<BandMessage> {
        effects
            .iter()
            .filter_map(|e| match e {
                Effect::Broadcast { message, .. } => Some(message.clone()),
                _ => None,
            })
            .collect()
    }

    fn sends_to<'a>(effects: &'a [Effect], peer: &str) -> Vec<&'a BandMessage> {
        effects
            .iter()
            .filter_map(|e| match e {
                Effect::SendTo { peer: p, message } if p == peer => Some(message),
                _ => None,
            })
            .collect()
    }

    /// Replicate every message a host produced onto a member state.
    fn replicate(member: &mut SessionState, effects: &[Effect]) {
        for message in broadcasts(effects) {
            handle_message(member, HOST_CHANNEL_ID, message, 0);
        }
    }

    #[test]
    fn test_join_adds_peer_and_pushes_state() {
        let mut host = host_state();
        let effects = handle_message(
            &mut host,
            "p-bob",
            BandMessage::Join {
                name: "Bob".to_string(),
            },
            0,
        );

        let bob = host.roster.get("p-bob").unwrap();
        assert_eq!(bob.name, "Bob");
        assert!(!bob.ready);
        assert!(!bob.is_host);

        // The joiner gets a full state push, everyone else a delta.
        match sends_to(&effects, "p-bob").as_slice() {
            [BandMessage::RoomState { peers, .. }] => {
                assert_eq!(peers.len(), 2);
                assert!(peers.iter().any(|p| p.id == "p-bob"));
            }
            other => panic!("unexpected sends to joiner: {:?}", other),
        }
        match broadcasts(&effects).as_slice() {
            [BandMessage::PeerJoined { peer }] => assert_eq!(peer.id, "p-bob"),
            other => panic!("unexpected broadcasts: {:?}", other),
        }
    }

    #[test]
    fn test_roster_replication_round_trip() {
        let mut host = host_state();
        let mut member = member_state("p-bob", "Bob");

        // Bob joins: his replica starts from the host's state push.
        let join_effects = handle_message(
            &mut host,
            "p-bob",
            BandMessage::Join {
                name: "Bob".to_string(),
            },
            0,
        );
        for message in sends_to(&join_effects, "p-bob") {
            handle_message(&mut member, HOST_CHANNEL_ID, message.clone(), 0);
        }

        // Carol joins; Bob sees the delta broadcast.
        let carol_effects = handle_message(
            &mut host,
            "p-carol",
            BandMessage::Join {
                name: "Carol".to_string(),
            },
            0,
        );
        replicate(&mut member, &carol_effects);

        // Host-side mutations mirrored through their broadcast messages.
        host.roster.assign_track("p-bob", 2);
        handle_message(
            &mut member,
            HOST_CHANNEL_ID,
            BandMessage::TrackAssign {
                peer_id: "p-bob".to_string(),
                track_id: 2,
            },
            0,
        );
        let ready_effects = handle_message(
            &mut host,
            "p-carol",
            BandMessage::Ready { ready: true },
            0,
        );
        replicate(&mut member, &ready_effects);

        // Field-for-field equality per peer id.
        assert_eq!(host.roster.len(), member.roster.len());
        for peer in host.roster.ordered() {
            assert_eq!(Some(peer), member.roster.get(&peer.id));
        }
    }

    #[test]
    fn test_member_ignores_non_host_channels() {
        let mut member = member_state("p-bob", "Bob");
        let effects = handle_message(
            &mut member,
            "p-mallory",
            BandMessage::RoomClosed,
            0,
        );
        assert!(effects.is_empty());
        assert_eq!(member.status, SessionStatus::Connected);
    }

    #[test]
    fn test_host_ignores_host_only_messages_from_members() {
        let mut host = host_state();
        let effects = handle_message(
            &mut host,
            "p-bob",
            BandMessage::Stop { start_at: 0 },
            0,
        );
        assert!(effects.is_empty());
    }

    #[test]
    fn test_host_self_dispatches_envelopes() {
        let mut host = host_state();
        let effects = handle_message(
            &mut host,
            HOST_CHANNEL_ID,
            BandMessage::Play {
                start_at: 5_000,
                position_ms: 0,
                mode: PlayMode::Split,
                total_players: 2,
                settings: SettingsSnapshot::default(),
            },
            4_000,
        );

        // No settings application on the host, just the timer.
        assert!(matches!(
            effects.as_slice(),
            [Effect::ScheduleTransport {
                start_at_ms: 5_000,
                action: TransportAction::Play { .. },
            }]
        ));
    }

    #[test]
    fn test_member_play_applies_settings_then_schedules() {
        let mut member = member_state("p-bob", "Bob");
        let effects = handle_message(
            &mut member,
            HOST_CHANNEL_ID,
            BandMessage::Play {
                start_at: 5_000,
                position_ms: 120,
                mode: PlayMode::Track,
                total_players: 2,
                settings: SettingsSnapshot::default(),
            },
            4_000,
        );

        assert!(matches!(
            effects.as_slice(),
            [
                Effect::ApplySettings(_),
                Effect::ScheduleTransport {
                    action: TransportAction::Play { position_ms: 120, .. },
                    ..
                }
            ]
        ));
    }

    #[test]
    fn test_past_envelope_still_schedules() {
        // A start_at in the past still produces a timer; the scheduler
        // clamps its delay to zero rather than dropping the action.
        let mut member = member_state("p-bob", "Bob");
        let effects = handle_message(
            &mut member,
            HOST_CHANNEL_ID,
            BandMessage::Stop { start_at: 1_000 },
            1_500,
        );
        assert!(matches!(
            effects.as_slice(),
            [Effect::ScheduleTransport {
                start_at_ms: 1_000,
                action: TransportAction::Stop,
            }]
        ));
    }

    #[test]
    fn test_ready_reset_clears_members_everywhere() {
        let mut host = host_state();
        host.roster.add("p-bob", "Bob", false);
        host.roster.set_ready("p-bob", true);

        let mut member = member_state("p-bob", "Bob");
        for peer in host.roster.ordered() {
            member.roster.apply(peer.clone());
        }

        handle_message(&mut host, HOST_CHANNEL_ID, BandMessage::ReadyReset, 0);
        handle_message(&mut member, HOST_CHANNEL_ID, BandMessage::ReadyReset, 0);

        for state in [&host, &member] {
            assert!(!state.roster.get("p-bob").unwrap().ready);
            assert!(state.roster.get(HOST_CHANNEL_ID).unwrap().ready);
        }
    }

    #[test]
    fn test_pong_updates_roster_latency() {
        let mut host = host_state();
        host.roster.add("p-bob", "Bob", false);

        let effects = handle_message(
            &mut host,
            "p-bob",
            BandMessage::Pong { timestamp: 1_000 },
            1_080,
        );
        assert_eq!(host.roster.get("p-bob").unwrap().latency_ms, 40);
        assert!(effects
            .iter()
            .any(|e| matches!(e, Effect::RecordLatency { latency_ms: 40, .. })));
    }

    #[test]
    fn test_song_data_only_saved_when_pending() {
        let mut member = member_state("p-bob", "Bob");
        let effects = handle_message(
            &mut member,
            HOST_CHANNEL_ID,
            BandMessage::SongData {
                filename: "x.mid".to_string(),
                file_data: "AAAA".to_string(),
            },
            0,
        );
        assert!(effects.is_empty());

        let mut song = SongInfo::new("X", "x.mid");
        song.pending = true;
        member.song = Some(song);
        let effects = handle_message(
            &mut member,
            HOST_CHANNEL_ID,
            BandMessage::SongData {
                filename: "x.mid".to_string(),
                file_data: "AAAA".to_string(),
            },
            0,
        );
        assert!(matches!(effects.as_slice(), [Effect::SaveSongFile { .. }]));
    }

    #[test]
    fn test_kicked_and_room_closed_teardown() {
        for (message, expect) in [
            (BandMessage::Kicked, "kicked from the room"),
            (BandMessage::RoomClosed, "host closed the room"),
        ] {
            let mut member = member_state("p-bob", "Bob");
            let effects = handle_message(&mut member, HOST_CHANNEL_ID, message, 0);
            match effects.as_slice() {
                [Effect::Teardown {
                    status: SessionStatus::Disconnected,
                    reason: Some(reason),
                }] => assert_eq!(reason, expect),
                other => panic!("unexpected effects: {:?}", other),
            }
        }
    }

    #[test]
    fn test_sync_pulse_is_a_no_op() {
        let mut member = member_state("p-bob", "Bob");
        let effects = handle_message(
            &mut member,
            HOST_CHANNEL_ID,
            BandMessage::Sync {
                position_ms: 10,
                timestamp: 20,
            },
            30,
        );
        assert!(effects.is_empty());
    }

    #[test]
    fn test_member_open_captures_before_join() {
        let mut member = member_state("p-bob", "Bob");
        member.status = SessionStatus::Connecting;

        let effects = handle_channel_event(
            &mut member,
            ChannelEvent::Open {
                peer: HOST_CHANNEL_ID.to_string(),
            },
            0,
        );
        assert_eq!(member.status, SessionStatus::Connected);

        let capture_pos = effects
            .iter()
            .position(|e| matches!(e, Effect::CaptureSettings))
            .expect("capture effect");
        let join_pos = effects
            .iter()
            .position(
                |e| matches!(e, Effect::SendTo { message: BandMessage::Join { .. }, .. }),
            )
            .expect("join send");
        assert!(capture_pos < join_pos);
    }

    #[test]
    fn test_host_channel_lost_tears_down_member() {
        let mut member = member_state("p-bob", "Bob");
        member.roster.apply(PeerEntry {
            id: HOST_CHANNEL_ID.to_string(),
            name: "Alice".to_string(),
            latency_ms: 0,
            track_id: None,
            slot: None,
            ready: true,
            is_host: true,
            join_seq: 0,
        });

        let effects = handle_channel_event(
            &mut member,
            ChannelEvent::Closed {
                peer: HOST_CHANNEL_ID.to_string(),
            },
            0,
        );
        assert!(matches!(
            effects.as_slice(),
            [Effect::Teardown {
                status: SessionStatus::Disconnected,
                reason: Some(_),
            }]
        ));
    }

    #[test]
    fn test_host_peer_close_broadcasts_departure() {
        let mut host = host_state();
        host.roster.add("p-bob", "Bob", false);

        let effects = handle_channel_event(
            &mut host,
            ChannelEvent::Closed {
                peer: "p-bob".to_string(),
            },
            0,
        );
        assert!(!host.roster.contains("p-bob"));
        assert!(matches!(
            broadcasts(&effects).as_slice(),
            [BandMessage::PeerLeft { .. }]
        ));
    }

    #[test]
    fn test_undecodable_payload_ignored() {
        let mut host = host_state();
        let effects = handle_channel_event(
            &mut host,
            ChannelEvent::Data {
                peer: "p-bob".to_string(),
                payload: br#"{"type":"quantum_entangle"}"#.to_vec(),
            },
            0,
        );
        assert!(effects.is_empty());
    }
}
