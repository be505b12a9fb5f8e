//! In-process channel hub
//!
//! A registry-backed [`ChannelHub`] implementation that wires hubs in the
//! same process together. Used by the integration tests and by same-machine
//! play; real deployments plug in an actual peer-connection transport.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use rand::distributions::Alphanumeric;
use rand::Rng;
use tokio::sync::mpsc;
use tracing::debug;

use super::channel::{ChannelError, ChannelEvent, ChannelHub, HOST_CHANNEL_ID};

/// Link endpoint: which hub, and under which channel key the link appears
/// on that hub's side.
type LinkEnd = (String, String);

#[derive(Default)]
struct NetInner {
    /// endpoint -> listening hub id
    listeners: HashMap<String, String>,
    /// hub id -> event sink
    hubs: HashMap<String, mpsc::UnboundedSender<ChannelEvent>>,
    /// (local hub id, local channel key) -> remote end
    links: HashMap<LinkEnd, LinkEnd>,
}

impl NetInner {
    fn deliver(&self, hub_id: &str, event: ChannelEvent) {
        if let Some(tx) = self.hubs.get(hub_id) {
            let _ = tx.send(event);
        }
    }
}

/// Registry connecting [`MemoryHub`]s in the same process.
#[derive(Clone, Default)]
pub struct MemoryNet {
    inner: Arc<Mutex<NetInner>>,
}

impl MemoryNet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a hub on this registry together with its event stream.
    pub fn hub(&self) -> (Arc<MemoryHub>, mpsc::UnboundedReceiver<ChannelEvent>) {
        let id: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(12)
            .map(|b| (b as char).to_ascii_lowercase())
            .collect();

        let (tx, rx) = mpsc::unbounded_channel();
        self.inner.lock().hubs.insert(id.clone(), tx);

        let hub = Arc::new(MemoryHub {
            id,
            inner: Arc::clone(&self.inner),
        });
        (hub, rx)
    }
}

/// An in-process channel hub.
pub struct MemoryHub {
    id: String,
    inner: Arc<Mutex<NetInner>>,
}

impl ChannelHub for MemoryHub {
    fn local_id(&self) -> String {
        self.id.clone()
    }

    fn listen(&self, endpoint: &str) -> Result<(), ChannelError> {
        let mut inner = self.inner.lock();
        if inner.listeners.contains_key(endpoint) {
            return Err(ChannelError::EndpointInUse(endpoint.to_string()));
        }
        inner.listeners.insert(endpoint.to_string(), self.id.clone());
        debug!("hub {} listening on {}", self.id, endpoint);
        Ok(())
    }

    fn connect(&self, endpoint: &str) -> Result<(), ChannelError> {
        let mut inner = self.inner.lock();
        let Some(host_id) = inner.listeners.get(endpoint).cloned() else {
            // An unreachable endpoint never produces an Open event; the
            // caller's connection timeout is the only way out.
            debug!("hub {} connect to {}: no listener", self.id, endpoint);
            return Ok(());
        };

        let local_end: LinkEnd = (self.id.clone(), HOST_CHANNEL_ID.to_string());
        if inner.links.contains_key(&local_end) {
            return Ok(());
        }
        let remote_end: LinkEnd = (host_id.clone(), self.id.clone());
        inner.links.insert(local_end.clone(), remote_end.clone());
        inner.links.insert(remote_end, local_end);

        inner.deliver(
            &host_id,
            ChannelEvent::Open {
                peer: self.id.clone(),
            },
        );
        inner.deliver(
            &self.id,
            ChannelEvent::Open {
                peer: HOST_CHANNEL_ID.to_string(),
            },
        );
        Ok(())
    }

    fn send(&self, peer: &str, payload: &[u8]) -> Result<(), ChannelError> {
        let inner = self.inner.lock();
        let Some((remote_hub, remote_key)) =
            inner.links.get(&(self.id.clone(), peer.to_string())).cloned()
        else {
            return Err(ChannelError::NotConnected(peer.to_string()));
        };
        if !inner.hubs.contains_key(&remote_hub) {
            return Err(ChannelError::Send(format!("peer {} is gone", peer)));
        }
        inner.deliver(
            &remote_hub,
            ChannelEvent::Data {
                peer: remote_key,
                payload: payload.to_vec(),
            },
        );
        Ok(())
    }

    fn close(&self, peer: &str) {
        let mut inner = self.inner.lock();
        if let Some((remote_hub, remote_key)) =
            inner.links.remove(&(self.id.clone(), peer.to_string()))
        {
            inner.links.remove(&(remote_hub.clone(), remote_key.clone()));
            inner.deliver(&remote_hub, ChannelEvent::Closed { peer: remote_key });
        }
    }

    fn shutdown(&self) {
        let mut inner = self.inner.lock();
        inner.listeners.retain(|_, hub_id| hub_id != &self.id);

        let local_keys: Vec<String> = inner
            .links
            .keys()
            .filter(|(hub, _)| hub == &self.id)
            .map(|(_, key)| key.clone())
            .collect();
        for key in local_keys {
            if let Some((remote_hub, remote_key)) = inner.links.remove(&(self.id.clone(), key)) {
                inner.links.remove(&(remote_hub.clone(), remote_key.clone()));
                inner.deliver(&remote_hub, ChannelEvent::Closed { peer: remote_key });
            }
        }
        // The hub itself stays registered so it can host or join again.
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(rx: &mut mpsc::UnboundedReceiver<ChannelEvent>) -> Vec<ChannelEvent> {
        let mut events = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            events.push(ev);
        }
        events
    }

    #[test]
    fn test_connect_opens_both_sides() {
        let net = MemoryNet::new();
        let (host, mut host_rx) = net.hub();
        let (member, mut member_rx) = net.hub();

        host.listen("band-abc").unwrap();
        member.connect("band-abc").unwrap();

        match drain(&mut host_rx).as_slice() {
            [ChannelEvent::Open { peer }] => assert_eq!(peer, &member.local_id()),
            other => panic!("unexpected host events: {:?}", other),
        }
        match drain(&mut member_rx).as_slice() {
            [ChannelEvent::Open { peer }] => assert_eq!(peer, HOST_CHANNEL_ID),
            other => panic!("unexpected member events: {:?}", other),
        }
    }

    #[test]
    fn test_connect_unknown_endpoint_is_silent() {
        let net = MemoryNet::new();
        let (member, mut member_rx) = net.hub();

        member.connect("band-nowhere").unwrap();
        assert!(drain(&mut member_rx).is_empty());
        assert!(member.send(HOST_CHANNEL_ID, b"x").is_err());
    }

    #[test]
    fn test_send_preserves_order() {
        let net = MemoryNet::new();
        let (host, mut host_rx) = net.hub();
        let (member, _member_rx) = net.hub();

        host.listen("band-abc").unwrap();
        member.connect("band-abc").unwrap();
        drain(&mut host_rx);

        member.send(HOST_CHANNEL_ID, b"one").unwrap();
        member.send(HOST_CHANNEL_ID, b"two").unwrap();

        let payloads: Vec<Vec<u8>> = drain(&mut host_rx)
            .into_iter()
            .filter_map(|ev| match ev {
                ChannelEvent::Data { payload, .. } => Some(payload),
                _ => None,
            })
            .collect();
        assert_eq!(payloads, vec![b"one".to_vec(), b"two".to_vec()]);
    }

    #[test]
    fn test_close_notifies_remote_only() {
        let net = MemoryNet::new();
        let (host, mut host_rx) = net.hub();
        let (member, mut member_rx) = net.hub();

        host.listen("band-abc").unwrap();
        member.connect("band-abc").unwrap();
        drain(&mut host_rx);
        drain(&mut member_rx);

        let member_id = member.local_id();
        host.close(&member_id);

        assert!(drain(&mut host_rx).is_empty());
        match drain(&mut member_rx).as_slice() {
            [ChannelEvent::Closed { peer }] => assert_eq!(peer, HOST_CHANNEL_ID),
            other => panic!("unexpected member events: {:?}", other),
        }
    }

    #[test]
    fn test_shutdown_closes_all_links() {
        let net = MemoryNet::new();
        let (host, mut host_rx) = net.hub();
        let (a, mut a_rx) = net.hub();
        let (b, mut b_rx) = net.hub();

        host.listen("band-abc").unwrap();
        a.connect("band-abc").unwrap();
        b.connect("band-abc").unwrap();
        drain(&mut host_rx);
        drain(&mut a_rx);
        drain(&mut b_rx);

        host.shutdown();

        for rx in [&mut a_rx, &mut b_rx] {
            match drain(rx).as_slice() {
                [ChannelEvent::Closed { peer }] => assert_eq!(peer, HOST_CHANNEL_ID),
                other => panic!("unexpected events: {:?}", other),
            }
        }
        // The endpoint is free again
        let (host2, _rx) = net.hub();
        assert!(host2.listen("band-abc").is_ok());
    }
}
