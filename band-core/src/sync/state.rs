//! Session and Roster State
//!
//! One `SessionState` exists per process. The host mutates it directly; a
//! member's copy is a replica kept consistent by applying host broadcasts.

use std::collections::HashMap;

use super::protocol::{PeerEntry, PlayMode, SongInfo, TrackRecord};
use crate::network::{RoomCode, HOST_CHANNEL_ID};

/// Room session lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Disconnected,
    Connecting,
    Connected,
    Error,
}

/// Connected peers and their attributes.
#[derive(Debug, Default, Clone)]
pub struct Roster {
    peers: HashMap<String, PeerEntry>,
    next_join_seq: u64,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a peer with the next join sequence number (authoritative side).
    pub fn add(&mut self, id: impl Into<String>, name: impl Into<String>, is_host: bool) -> &PeerEntry {
        let id = id.into();
        let join_seq = self.next_join_seq;
        self.next_join_seq += 1;
        self.peers.insert(
            id.clone(),
            PeerEntry {
                id: id.clone(),
                name: name.into(),
                latency_ms: 0,
                track_id: None,
                slot: None,
                // The host is always ready; members confirm explicitly.
                ready: is_host,
                is_host,
                join_seq,
            },
        );
        &self.peers[&id]
    }

    /// Insert a peer entry received from the host (replica side). Keeps the
    /// wire join_seq so replicas order identically to the host.
    pub fn apply(&mut self, entry: PeerEntry) {
        self.next_join_seq = self.next_join_seq.max(entry.join_seq + 1);
        self.peers.insert(entry.id.clone(), entry);
    }

    pub fn remove(&mut self, id: &str) -> Option<PeerEntry> {
        self.peers.remove(id)
    }

    pub fn get(&self, id: &str) -> Option<&PeerEntry> {
        self.peers.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.peers.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    pub fn ids(&self) -> Vec<String> {
        self.peers.keys().cloned().collect()
    }

    pub fn set_latency(&mut self, id: &str, latency_ms: u64) {
        if let Some(peer) = self.peers.get_mut(id) {
            peer.latency_ms = latency_ms;
        }
    }

    pub fn assign_track(&mut self, id: &str, track_id: u32) -> bool {
        match self.peers.get_mut(id) {
            Some(peer) => {
                peer.track_id = Some(track_id);
                true
            }
            None => false,
        }
    }

    pub fn assign_slot(&mut self, id: &str, slot: u32) -> bool {
        match self.peers.get_mut(id) {
            Some(peer) => {
                peer.slot = Some(slot);
                true
            }
            None => false,
        }
    }

    pub fn set_ready(&mut self, id: &str, ready: bool) -> bool {
        match self.peers.get_mut(id) {
            Some(peer) => {
                peer.ready = ready;
                true
            }
            None => false,
        }
    }

    /// Revert every non-host peer to not-ready.
    pub fn reset_ready(&mut self) {
        for peer in self.peers.values_mut() {
            if !peer.is_host {
                peer.ready = false;
            }
        }
    }

    /// Assign slots 0..n-1 in join order. Join order is stable across the
    /// session, unlike map iteration order. Returns the assignments made.
    pub fn auto_assign_slots(&mut self) -> Vec<(String, u32)> {
        let mut ordered: Vec<&PeerEntry> = self.peers.values().collect();
        ordered.sort_by_key(|p| p.join_seq);
        let ids: Vec<String> = ordered.into_iter().map(|p| p.id.clone()).collect();

        let mut assignments = Vec::with_capacity(ids.len());
        for (slot, id) in ids.into_iter().enumerate() {
            let slot = slot as u32;
            self.assign_slot(&id, slot);
            assignments.push((id, slot));
        }
        assignments
    }

    /// Peers for display and state pushes: host first, then join order.
    pub fn ordered(&self) -> Vec<&PeerEntry> {
        let mut list: Vec<&PeerEntry> = self.peers.values().collect();
        list.sort_by_key(|p| (!p.is_host, p.join_seq));
        list
    }

    pub fn clear(&mut self) {
        self.peers.clear();
        self.next_join_seq = 0;
    }
}

/// Top-level per-process session state.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub status: SessionStatus,
    pub is_host: bool,
    pub room_code: Option<RoomCode>,
    /// Our channel-level peer id (what the host sees us as)
    pub local_id: String,
    pub display_name: String,
    pub play_mode: PlayMode,
    pub song: Option<SongInfo>,
    pub tracks: Vec<TrackRecord>,
    pub roster: Roster,
}

impl SessionState {
    pub fn new(local_id: String) -> Self {
        Self {
            status: SessionStatus::Disconnected,
            is_host: false,
            room_code: None,
            local_id,
            display_name: String::new(),
            play_mode: PlayMode::default(),
            song: None,
            tracks: Vec::new(),
            roster: Roster::new(),
        }
    }

    /// Our own roster key: the reserved host id when hosting, the channel
    /// id the host knows us by otherwise.
    pub fn self_id(&self) -> &str {
        if self.is_host {
            HOST_CHANNEL_ID
        } else {
            &self.local_id
        }
    }

    /// Reset everything owned by a connected session.
    pub fn reset(&mut self) {
        self.status = SessionStatus::Disconnected;
        self.is_host = false;
        self.room_code = None;
        self.display_name.clear();
        self.play_mode = PlayMode::default();
        self.song = None;
        self.tracks.clear();
        self.roster.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_assign_follows_join_order() {
        let mut roster = Roster::new();
        roster.add(HOST_CHANNEL_ID, "Alice", true);
        roster.add("p-bob", "Bob", false);
        roster.add("p-carol", "Carol", false);

        let assignments = roster.auto_assign_slots();
        assert_eq!(
            assignments,
            vec![
                (HOST_CHANNEL_ID.to_string(), 0),
                ("p-bob".to_string(), 1),
                ("p-carol".to_string(), 2),
            ]
        );
    }

    #[test]
    fn test_auto_assign_stable_after_churn() {
        let mut roster = Roster::new();
        roster.add(HOST_CHANNEL_ID, "Alice", true);
        roster.add("p-bob", "Bob", false);
        roster.add("p-carol", "Carol", false);

        // Bob leaves and rejoins: he now sorts after Carol, and existing
        // peers keep their relative order.
        roster.remove("p-bob");
        roster.add("p-bob2", "Bob", false);

        let assignments = roster.auto_assign_slots();
        assert_eq!(
            assignments,
            vec![
                (HOST_CHANNEL_ID.to_string(), 0),
                ("p-carol".to_string(), 1),
                ("p-bob2".to_string(), 2),
            ]
        );
    }

    #[test]
    fn test_reset_ready_spares_host() {
        let mut roster = Roster::new();
        roster.add(HOST_CHANNEL_ID, "Alice", true);
        roster.add("p-bob", "Bob", false);
        roster.set_ready("p-bob", true);

        roster.reset_ready();
        assert!(roster.get(HOST_CHANNEL_ID).unwrap().ready);
        assert!(!roster.get("p-bob").unwrap().ready);
    }

    #[test]
    fn test_replica_apply_preserves_join_seq() {
        let mut host_roster = Roster::new();
        host_roster.add(HOST_CHANNEL_ID, "Alice", true);
        host_roster.add("p-bob", "Bob", false);

        let mut replica = Roster::new();
        for peer in host_roster.ordered() {
            replica.apply(peer.clone());
        }

        assert_eq!(
            replica.auto_assign_slots(),
            host_roster.auto_assign_slots()
        );
    }

    #[test]
    fn test_self_id() {
        let mut state = SessionState::new("p-local".to_string());
        assert_eq!(state.self_id(), "p-local");
        state.is_host = true;
        assert_eq!(state.self_id(), HOST_CHANNEL_ID);
    }
}
