//! Band Session
//!
//! The session object embedders hold: it owns the shared state, runs the
//! channel event pump, and turns the pure dispatch effects into calls on the
//! channel hub, the scheduler, the playback engine and the UI callback.

mod events;
mod handlers;

pub use events::{BandError, SessionCallback, SessionEvent};
pub use handlers::{handle_channel_event, handle_message, Effect, TransportAction};

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::calibration::run_calibration_loop;
use crate::config::{ConfigStore, StoredConfig};
use crate::engine::{PlayOptions, PlaybackEngine};
use crate::latency::{new_shared_monitor, SharedLatencyMonitor, PING_INTERVAL};
use crate::network::{ChannelEvent, ChannelHub, RoomCode, HOST_CHANNEL_ID};
use crate::scheduler::{
    fire_delay, now_ms, seek_buffer_ms, transport_buffer_ms, Scheduler,
};
use crate::settings::SettingsReplicator;
use crate::sync::{
    BandMessage, PeerEntry, PlayMode, SessionState, SessionStatus, SongInfo, TrackRecord,
};
use crate::transfer::FileStore;

/// How long a member waits for its outbound channel to open before the join
/// is declared failed.
const JOIN_TIMEOUT: Duration = Duration::from_secs(10);

/// A host-or-member band session over one channel hub.
///
/// All methods are callable from any thread; spawned loops hold only a
/// [`Weak`] reference to the session where they would otherwise keep it
/// alive past the embedder's drop.
pub struct BandSession {
    hub: Arc<dyn ChannelHub>,
    engine: Arc<dyn PlaybackEngine>,
    files: Arc<dyn FileStore>,
    config_store: Arc<dyn ConfigStore>,

    state: Arc<RwLock<SessionState>>,
    latency: SharedLatencyMonitor,
    replicator: Mutex<SettingsReplicator>,
    scheduler: Scheduler,

    /// Per-peer ping loop cancel handles, keyed by channel peer id.
    pings: Mutex<HashMap<String, oneshot::Sender<()>>>,
    calibration_cancel: Arc<Mutex<Option<oneshot::Sender<()>>>>,
    /// Resolver for an in-flight `join_room` call.
    pending_join: Mutex<Option<oneshot::Sender<Result<(), BandError>>>>,

    /// Host compensation offset, shared with timer tasks. Persisted.
    host_delay_ms: Arc<AtomicI64>,
    use_turn_relay: AtomicBool,

    callback: RwLock<Option<Arc<dyn SessionCallback>>>,
}

impl BandSession {
    /// Build a session over `hub` and start pumping its event stream.
    pub fn new(
        hub: Arc<dyn ChannelHub>,
        events: mpsc::UnboundedReceiver<ChannelEvent>,
        engine: Arc<dyn PlaybackEngine>,
        files: Arc<dyn FileStore>,
        config_store: Arc<dyn ConfigStore>,
    ) -> Arc<Self> {
        let config = config_store.load();
        let local_id = hub.local_id();

        let session = Arc::new(Self {
            hub,
            engine,
            files,
            config_store,
            state: Arc::new(RwLock::new(SessionState::new(local_id))),
            latency: new_shared_monitor(),
            replicator: Mutex::new(SettingsReplicator::new()),
            scheduler: Scheduler::new(),
            pings: Mutex::new(HashMap::new()),
            calibration_cancel: Arc::new(Mutex::new(None)),
            pending_join: Mutex::new(None),
            host_delay_ms: Arc::new(AtomicI64::new(config.host_delay_ms)),
            use_turn_relay: AtomicBool::new(config.use_turn_relay),
            callback: RwLock::new(None),
        });

        session.spawn_event_pump(events);
        session
    }

    fn spawn_event_pump(self: &Arc<Self>, mut events: mpsc::UnboundedReceiver<ChannelEvent>) {
        let weak: Weak<Self> = Arc::downgrade(self);
        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                let Some(session) = weak.upgrade() else { break };
                session.process_event(event);
            }
            debug!("channel event pump ended");
        });
    }

    pub fn set_callback(&self, callback: Arc<dyn SessionCallback>) {
        *self.callback.write() = Some(callback);
    }

    // === Room lifecycle ===

    /// Create a room and start listening for members. Returns the code to
    /// share with joiners.
    pub fn create_room(&self, display_name: &str) -> Result<RoomCode, BandError> {
        {
            let state = self.state.read();
            if state.status != SessionStatus::Disconnected && state.status != SessionStatus::Error
            {
                return Err(BandError::AlreadyInRoom);
            }
        }

        let code = RoomCode::random();
        if let Err(e) = self.hub.listen(&code.endpoint()) {
            self.state.write().status = SessionStatus::Error;
            self.notify(SessionEvent::StatusChanged(SessionStatus::Error));
            return Err(e.into());
        }

        {
            let mut state = self.state.write();
            state.status = SessionStatus::Connected;
            state.is_host = true;
            state.room_code = Some(code.clone());
            state.display_name = display_name.to_string();
            state.roster.add(HOST_CHANNEL_ID, display_name, true);
        }

        info!("created room {}", code);
        self.notify(SessionEvent::StatusChanged(SessionStatus::Connected));
        self.notify(SessionEvent::RosterChanged);
        Ok(code)
    }

    /// Join an existing room by code. Resolves once the host's state push
    /// channel is open, or fails after [`JOIN_TIMEOUT`].
    pub async fn join_room(&self, code: &str, display_name: &str) -> Result<(), BandError> {
        let code = RoomCode::parse(code).ok_or(BandError::InvalidRoomCode)?;

        {
            let mut state = self.state.write();
            if state.status != SessionStatus::Disconnected && state.status != SessionStatus::Error
            {
                return Err(BandError::AlreadyInRoom);
            }
            state.status = SessionStatus::Connecting;
            state.is_host = false;
            state.room_code = Some(code.clone());
            state.display_name = display_name.to_string();
        }
        self.notify(SessionEvent::StatusChanged(SessionStatus::Connecting));

        let (tx, rx) = oneshot::channel();
        *self.pending_join.lock() = Some(tx);

        if let Err(e) = self.hub.connect(&code.endpoint()) {
            self.pending_join.lock().take();
            self.teardown(SessionStatus::Error, None);
            return Err(e.into());
        }

        info!("joining room {}", code);
        match tokio::time::timeout(JOIN_TIMEOUT, rx).await {
            Ok(Ok(result)) => result,
            // The sender is dropped only by a concurrent teardown.
            Ok(Err(_)) => Err(BandError::JoinTimeout),
            Err(_) => {
                warn!("join to {} timed out", code);
                self.pending_join.lock().take();
                self.teardown(SessionStatus::Error, None);
                Err(BandError::JoinTimeout)
            }
        }
    }

    /// Leave the current room. A host closes the room for everyone.
    pub fn leave_room(&self) -> Result<(), BandError> {
        let is_host = {
            let state = self.state.read();
            if state.status != SessionStatus::Connected
                && state.status != SessionStatus::Connecting
            {
                return Err(BandError::NotInRoom);
            }
            state.is_host
        };

        if is_host {
            info!("closing room");
            self.broadcast(&BandMessage::RoomClosed, None);
        }
        self.teardown(SessionStatus::Disconnected, None);
        Ok(())
    }

    /// Remove a member from the room (host only).
    pub fn kick_player(&self, peer_id: &str) -> Result<(), BandError> {
        self.require_host()?;
        if peer_id == HOST_CHANNEL_ID {
            return Err(BandError::SelfKick);
        }
        if !self.state.read().roster.contains(peer_id) {
            return Err(BandError::PeerNotFound(peer_id.to_string()));
        }

        info!("kicking {}", peer_id);
        self.send_to(peer_id, &BandMessage::Kicked);
        self.hub.close(peer_id);

        if let Some(cancel) = self.pings.lock().remove(peer_id) {
            let _ = cancel.send(());
        }
        self.latency.write().remove(peer_id);
        self.state.write().roster.remove(peer_id);

        self.broadcast(
            &BandMessage::PeerKicked {
                id: peer_id.to_string(),
            },
            None,
        );
        self.notify(SessionEvent::PeerLeft {
            id: peer_id.to_string(),
        });
        self.notify(SessionEvent::RosterChanged);
        Ok(())
    }

    // === Assignment and piece selection (host only) ===

    pub fn assign_track(&self, peer_id: &str, track_id: u32) -> Result<(), BandError> {
        self.require_host()?;
        if !self.state.write().roster.assign_track(peer_id, track_id) {
            return Err(BandError::PeerNotFound(peer_id.to_string()));
        }
        self.broadcast(
            &BandMessage::TrackAssign {
                peer_id: peer_id.to_string(),
                track_id,
            },
            None,
        );
        self.notify(SessionEvent::RosterChanged);
        Ok(())
    }

    pub fn assign_slot(&self, peer_id: &str, slot: u32) -> Result<(), BandError> {
        self.require_host()?;
        if !self.state.write().roster.assign_slot(peer_id, slot) {
            return Err(BandError::PeerNotFound(peer_id.to_string()));
        }
        self.broadcast(
            &BandMessage::SlotAssign {
                peer_id: peer_id.to_string(),
                slot,
            },
            None,
        );
        self.notify(SessionEvent::RosterChanged);
        Ok(())
    }

    /// Assign slots 0..N-1 in join order and replicate each assignment.
    pub fn auto_assign_slots(&self) -> Result<Vec<(String, u32)>, BandError> {
        self.require_host()?;
        let assignments = self.state.write().roster.auto_assign_slots();
        for (peer_id, slot) in &assignments {
            self.broadcast(
                &BandMessage::SlotAssign {
                    peer_id: peer_id.clone(),
                    slot: *slot,
                },
                None,
            );
        }
        self.notify(SessionEvent::RosterChanged);
        Ok(assignments)
    }

    pub fn set_play_mode(&self, mode: PlayMode) -> Result<(), BandError> {
        self.require_host()?;
        self.state.write().play_mode = mode;
        self.broadcast(&BandMessage::ModeChange { mode }, None);
        self.notify(SessionEvent::ModeChanged(mode));
        Ok(())
    }

    /// Select a local piece and propagate it: filename announcement first,
    /// then the payload for members lacking the file.
    pub fn select_song(&self, path: &Path, name: &str) -> Result<(), BandError> {
        self.require_host()?;

        let filename = path
            .file_name()
            .and_then(|f| f.to_str())
            .map(str::to_string)
            .ok_or_else(|| crate::transfer::TransferError::NotAFile(path.to_path_buf()))?;
        let tracks = self.files.list_tracks(path)?;
        let file_data = self.files.read_file_base64(path)?;

        {
            let mut state = self.state.write();
            let mut song = SongInfo::new(name, filename.clone());
            // Kept while the room is open so late joiners get the payload.
            song.file_data = Some(file_data.clone());
            song.path = Some(path.display().to_string());
            state.song = Some(song);
            state.tracks = tracks.clone();
        }

        info!("selected piece {} ({})", name, filename);
        self.broadcast(
            &BandMessage::SongSelect {
                name: name.to_string(),
                filename: filename.clone(),
            },
            None,
        );
        self.broadcast(&BandMessage::TracksUpdate { tracks }, None);
        self.broadcast(
            &BandMessage::SongData {
                filename,
                file_data,
            },
            None,
        );
        self.notify(SessionEvent::SongChanged);
        Ok(())
    }

    /// Push the host's current engine settings to every member.
    pub fn sync_settings(&self) -> Result<(), BandError> {
        self.require_host()?;
        self.broadcast(
            &BandMessage::SettingsSync {
                settings: self.engine.settings(),
            },
            None,
        );
        Ok(())
    }

    // === Readiness (member only) ===

    pub fn set_ready(&self, ready: bool) -> Result<(), BandError> {
        let state = self.state.read();
        if state.status != SessionStatus::Connected {
            return Err(BandError::NotInRoom);
        }
        if state.is_host {
            return Err(BandError::NotMember);
        }
        drop(state);
        self.send_to(HOST_CHANNEL_ID, &BandMessage::Ready { ready });
        Ok(())
    }

    // === Transport (host only) ===

    pub fn band_play(&self, position_ms: u64) -> Result<(), BandError> {
        self.require_host()?;
        let (mode, total_players) = {
            let state = self.state.read();
            if state.song.is_none() {
                return Err(BandError::NoSongSelected);
            }
            (state.play_mode, state.roster.len() as u32)
        };

        let message = BandMessage::Play {
            start_at: now_ms() + transport_buffer_ms(self.max_latency_ms()),
            position_ms,
            mode,
            total_players,
            settings: self.engine.settings(),
        };
        self.broadcast(&message, None);
        self.dispatch_local(message);
        Ok(())
    }

    pub fn band_pause(&self) -> Result<(), BandError> {
        self.require_host()?;
        let message = BandMessage::Pause {
            start_at: now_ms() + transport_buffer_ms(self.max_latency_ms()),
            position_ms: self.engine.current_position_ms(),
        };
        self.broadcast(&message, None);
        self.dispatch_local(message);
        Ok(())
    }

    /// Stop playback everywhere and revert every member to not-ready.
    pub fn band_stop(&self) -> Result<(), BandError> {
        self.require_host()?;
        let message = BandMessage::Stop {
            start_at: now_ms() + transport_buffer_ms(self.max_latency_ms()),
        };
        self.broadcast(&message, None);
        self.dispatch_local(message);

        self.broadcast(&BandMessage::ReadyReset, None);
        self.dispatch_local(BandMessage::ReadyReset);
        Ok(())
    }

    pub fn band_seek(&self, position_ms: u64) -> Result<(), BandError> {
        self.require_host()?;
        let message = BandMessage::Seek {
            seek_at: now_ms() + seek_buffer_ms(self.max_latency_ms()),
            position_ms,
            settings: self.engine.settings(),
        };
        self.broadcast(&message, None);
        self.dispatch_local(message);
        Ok(())
    }

    // === Calibration (host only) ===

    pub fn start_calibration(&self, interval_ms: u64) -> Result<(), BandError> {
        self.require_host()?;
        let message = BandMessage::CalibrateStart {
            start_at: now_ms() + transport_buffer_ms(self.max_latency_ms()),
            interval_ms,
        };
        self.broadcast(&message, None);
        self.dispatch_local(message);
        Ok(())
    }

    pub fn stop_calibration(&self) -> Result<(), BandError> {
        self.require_host()?;
        self.broadcast(&BandMessage::CalibrateStop, None);
        self.dispatch_local(BandMessage::CalibrateStop);
        Ok(())
    }

    // === Persisted configuration ===

    pub fn host_delay_ms(&self) -> i64 {
        self.host_delay_ms.load(Ordering::Relaxed)
    }

    /// Set the host compensation offset. Takes effect on the next scheduled
    /// command (and the next calibration beep) without restart.
    pub fn set_host_delay_ms(&self, value: i64) {
        self.host_delay_ms.store(value, Ordering::Relaxed);
        self.persist_config();
    }

    pub fn use_turn_relay(&self) -> bool {
        self.use_turn_relay.load(Ordering::Relaxed)
    }

    pub fn set_use_turn_relay(&self, value: bool) {
        self.use_turn_relay.store(value, Ordering::Relaxed);
        self.persist_config();
    }

    fn persist_config(&self) {
        self.config_store.store(&StoredConfig {
            host_delay_ms: self.host_delay_ms.load(Ordering::Relaxed),
            use_turn_relay: self.use_turn_relay.load(Ordering::Relaxed),
        });
    }

    // === Observers ===

    pub fn status(&self) -> SessionStatus {
        self.state.read().status
    }

    pub fn is_host(&self) -> bool {
        self.state.read().is_host
    }

    pub fn room_code(&self) -> Option<RoomCode> {
        self.state.read().room_code.clone()
    }

    /// Roster snapshot: host first, then join order.
    pub fn roster(&self) -> Vec<PeerEntry> {
        self.state
            .read()
            .roster
            .ordered()
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn song(&self) -> Option<SongInfo> {
        self.state.read().song.clone()
    }

    pub fn tracks(&self) -> Vec<TrackRecord> {
        self.state.read().tracks.clone()
    }

    pub fn play_mode(&self) -> PlayMode {
        self.state.read().play_mode
    }

    pub fn max_latency_ms(&self) -> u64 {
        self.latency.read().max_latency_ms()
    }

    // === Event pump and effect application ===

    fn process_event(&self, event: ChannelEvent) {
        let effects = {
            let mut state = self.state.write();
            handlers::handle_channel_event(&mut state, event, now_ms())
        };
        self.apply_effects(effects);
    }

    /// Run a host-originated envelope through the same dispatch path members
    /// use, under the reserved host id.
    fn dispatch_local(&self, message: BandMessage) {
        let effects = {
            let mut state = self.state.write();
            handlers::handle_message(&mut state, HOST_CHANNEL_ID, message, now_ms())
        };
        self.apply_effects(effects);
    }

    fn apply_effects(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::SendTo { peer, message } => self.send_to(&peer, &message),
                Effect::Broadcast { message, except } => {
                    self.broadcast(&message, except.as_deref())
                }
                Effect::StartPing { peer } => self.start_ping(peer),
                Effect::StopPing { peer } => {
                    if let Some(cancel) = self.pings.lock().remove(&peer) {
                        let _ = cancel.send(());
                    }
                    self.latency.write().remove(&peer);
                }
                Effect::RecordLatency { peer, latency_ms } => {
                    self.latency.write().set(&peer, latency_ms);
                }
                Effect::ScheduleTransport {
                    start_at_ms,
                    action,
                } => self.schedule_transport(start_at_ms, action),
                Effect::ApplySettings(settings) => self.engine.apply_settings(&settings),
                Effect::CaptureSettings => {
                    self.replicator.lock().capture(self.engine.settings());
                }
                Effect::JoinEstablished => {
                    if let Some(tx) = self.pending_join.lock().take() {
                        let _ = tx.send(Ok(()));
                    }
                }
                Effect::CheckSongAvailability { filename } => self.check_song(&filename),
                Effect::SaveSongFile { filename, data } => self.save_song(&filename, &data),
                Effect::StartCalibration {
                    start_at_ms,
                    interval_ms,
                } => self.start_calibration_loop(start_at_ms, interval_ms),
                Effect::StopCalibration => {
                    if let Some(cancel) = self.calibration_cancel.lock().take() {
                        let _ = cancel.send(());
                    }
                }
                Effect::Teardown { status, reason } => self.teardown(status, reason),
                Effect::Notify(event) => self.notify(event),
            }
        }
    }

    // === Effect implementations ===

    fn send_to(&self, peer: &str, message: &BandMessage) {
        let payload = match serde_json::to_vec(message) {
            Ok(p) => p,
            Err(e) => {
                warn!("failed to encode message: {}", e);
                return;
            }
        };
        if let Err(e) = self.hub.send(peer, &payload) {
            warn!("send to {} failed: {}", peer, e);
        }
    }

    /// Send to every roster peer except ourselves (and `except`, if given).
    fn broadcast(&self, message: &BandMessage, except: Option<&str>) {
        let payload = match serde_json::to_vec(message) {
            Ok(p) => p,
            Err(e) => {
                warn!("failed to encode message: {}", e);
                return;
            }
        };
        let targets: Vec<String> = {
            let state = self.state.read();
            let self_id = state.self_id().to_string();
            state
                .roster
                .ids()
                .into_iter()
                .filter(|id| id != &self_id && Some(id.as_str()) != except)
                .collect()
        };
        for peer in targets {
            if let Err(e) = self.hub.send(&peer, &payload) {
                warn!("broadcast to {} failed: {}", peer, e);
            }
        }
    }

    /// Ping `peer` immediately, then every [`PING_INTERVAL`] until cancelled
    /// or the channel goes away.
    fn start_ping(&self, peer: String) {
        let (cancel_tx, mut cancel_rx) = oneshot::channel();
        if let Some(old) = self.pings.lock().insert(peer.clone(), cancel_tx) {
            let _ = old.send(());
        }

        let hub = Arc::clone(&self.hub);
        tokio::spawn(async move {
            loop {
                let ping = BandMessage::Ping {
                    timestamp: now_ms(),
                };
                match serde_json::to_vec(&ping) {
                    Ok(payload) => {
                        if hub.send(&peer, &payload).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        warn!("failed to encode ping: {}", e);
                        break;
                    }
                }
                tokio::select! {
                    _ = &mut cancel_rx => break,
                    _ = tokio::time::sleep(PING_INTERVAL) => {}
                }
            }
            debug!("ping loop for {} ended", peer);
        });
    }

    fn schedule_transport(&self, start_at_ms: u64, action: TransportAction) {
        // The compensation offset applies only to the host's own execution.
        let offset_ms = if self.state.read().is_host {
            self.host_delay_ms.load(Ordering::Relaxed)
        } else {
            0
        };
        let delay = fire_delay(start_at_ms, now_ms(), offset_ms);
        debug!("scheduling {:?} in {:?}", action, delay);

        let state = Arc::clone(&self.state);
        let engine = Arc::clone(&self.engine);
        let calibration_cancel = Arc::clone(&self.calibration_cancel);

        self.scheduler.arm(delay, async move {
            match action {
                TransportAction::Play {
                    position_ms,
                    mode,
                    total_players,
                } => {
                    // slot/track come from our own roster entry at fire
                    // time; each peer personalizes its own notes.
                    let (song, slot, track_id) = {
                        let state = state.read();
                        let own = state.roster.get(state.self_id());
                        (
                            state.song.clone(),
                            own.and_then(|p| p.slot),
                            own.and_then(|p| p.track_id),
                        )
                    };
                    match song {
                        Some(song) => engine.play_piece(
                            &song,
                            &PlayOptions {
                                position_ms,
                                mode,
                                slot,
                                total_players,
                                track_id,
                            },
                        ),
                        None => warn!("play fired with no piece selected"),
                    }
                }
                TransportAction::Pause => engine.pause_resume(),
                TransportAction::Stop => {
                    engine.stop();
                    // A stop also silences any running calibration loop.
                    if let Some(cancel) = calibration_cancel.lock().take() {
                        let _ = cancel.send(());
                    }
                }
                TransportAction::Seek { position_ms } => engine.seek_to(position_ms),
            }
        });
    }

    fn start_calibration_loop(&self, start_at_ms: u64, interval_ms: u64) {
        let (cancel_tx, cancel_rx) = oneshot::channel();
        if let Some(old) = self.calibration_cancel.lock().replace(cancel_tx) {
            let _ = old.send(());
        }

        let offset_ms = if self.state.read().is_host {
            Arc::clone(&self.host_delay_ms)
        } else {
            Arc::new(AtomicI64::new(0))
        };
        tokio::spawn(run_calibration_loop(
            start_at_ms,
            interval_ms,
            offset_ms,
            Arc::clone(&self.engine),
            cancel_rx,
        ));
    }

    fn check_song(&self, filename: &str) {
        let path = self.files.check_file_exists(filename);
        {
            let mut state = self.state.write();
            if let Some(song) = state.song.as_mut() {
                if song.filename == filename {
                    match &path {
                        Some(p) => {
                            song.path = Some(p.display().to_string());
                            song.pending = false;
                        }
                        None => {
                            debug!("piece {} not available locally, awaiting payload", filename);
                            song.pending = true;
                        }
                    }
                }
            }
        }
        self.notify(SessionEvent::SongChanged);
    }

    fn save_song(&self, filename: &str, data: &str) {
        match self.files.save_temp_file(filename, data) {
            Ok(path) => {
                let mut state = self.state.write();
                if let Some(song) = state.song.as_mut() {
                    if song.filename == filename {
                        song.path = Some(path.display().to_string());
                        song.pending = false;
                    }
                }
                drop(state);
                info!("stored pushed piece {}", filename);
                self.notify(SessionEvent::SongChanged);
            }
            Err(e) => {
                warn!("failed to store pushed piece {}: {}", filename, e);
                self.notify(SessionEvent::Error {
                    message: format!("failed to store piece: {}", e),
                });
            }
        }
    }

    /// Cancel everything owned by the connected session and reset to
    /// `status`. Safe to call from any path, including twice.
    fn teardown(&self, status: SessionStatus, reason: Option<String>) {
        for (_, cancel) in self.pings.lock().drain() {
            let _ = cancel.send(());
        }
        self.scheduler.cancel_all();
        if let Some(cancel) = self.calibration_cancel.lock().take() {
            let _ = cancel.send(());
        }
        self.latency.write().clear();

        // Restore-once: the replicator is empty on the host and after a
        // previous teardown.
        if let Some(snapshot) = self.replicator.lock().restore() {
            self.engine.apply_settings(&snapshot);
        }

        self.hub.shutdown();
        {
            let mut state = self.state.write();
            state.reset();
            state.status = status;
        }

        if let Some(tx) = self.pending_join.lock().take() {
            let _ = tx.send(Err(BandError::JoinTimeout));
        }

        self.notify(SessionEvent::StatusChanged(status));
        if let Some(reason) = reason {
            info!("session ended: {}", reason);
            self.notify(SessionEvent::RoomEnded { reason });
        }
    }

    fn require_host(&self) -> Result<(), BandError> {
        let state = self.state.read();
        if state.status != SessionStatus::Connected {
            return Err(BandError::NotInRoom);
        }
        if !state.is_host {
            return Err(BandError::NotHost);
        }
        Ok(())
    }

    fn notify(&self, event: SessionEvent) {
        let callback = self.callback.read().clone();
        if let Some(callback) = callback {
            callback.on_event(event);
        }
    }
}

impl Drop for BandSession {
    fn drop(&mut self) {
        self.scheduler.cancel_all();
    }
}
