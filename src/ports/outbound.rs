//! Outbound ports: the secure channel service and the forwarding
//! components the core drives.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::{
    ChannelNumber, CipherAlgorithm, Fingerprint, PeerEndpoint, RouteSet, TransportError,
};
use crate::ports::inbound::TransportEventSink;

// =============================================================================
// Secure channel service
// =============================================================================

/// The external secure datagram transport.
///
/// Owns the handshake wire protocol and session state; the core drives it
/// through these operations and reacts to its events through the
/// registered [`TransportEventSink`].
#[async_trait]
pub trait SecureChannel: Send + Sync {
    /// Open the transport on the given listen endpoint.
    async fn open(&self, listen: PeerEndpoint) -> Result<(), TransportError>;

    /// Close the transport. Safe to call more than once.
    async fn close(&self);

    /// Advertise the cipher algorithms this node is willing to negotiate.
    fn set_cipher_capabilities(&self, capabilities: Vec<CipherAlgorithm>);

    /// Register the sink that receives all transport events. The transport
    /// guarantees events for the same peer are delivered in protocol order.
    fn register_event_sink(&self, sink: Arc<dyn TransportEventSink>);

    /// Send a hello probe and measure the round trip.
    async fn greet(&self, target: PeerEndpoint) -> Result<Duration, TransportError>;

    /// Send the local presentation to a peer.
    async fn introduce_to(&self, target: PeerEndpoint) -> Result<(), TransportError>;

    /// Request a session with a peer that presented valid certificates.
    async fn request_session(&self, target: PeerEndpoint) -> Result<(), TransportError>;

    /// Ask a peer to relay contact requests for the given fingerprints.
    async fn send_contact_request(
        &self,
        target: PeerEndpoint,
        fingerprints: &[Fingerprint],
    ) -> Result<(), TransportError>;

    /// Send payload to an established peer on a logical channel.
    async fn send_data(
        &self,
        target: PeerEndpoint,
        channel: ChannelNumber,
        payload: Vec<u8>,
    ) -> Result<(), TransportError>;
}

// =============================================================================
// Forwarding components
// =============================================================================

/// Sender handed to a forwarding component when a port is registered;
/// pushes outbound payload to the peer over the transport's data channel.
#[derive(Clone)]
pub struct PortSender {
    channel: Arc<dyn SecureChannel>,
    peer: PeerEndpoint,
}

impl PortSender {
    /// Bind a sender to a peer.
    pub fn new(channel: Arc<dyn SecureChannel>, peer: PeerEndpoint) -> Self {
        Self { channel, peer }
    }

    /// The peer this sender delivers to.
    pub fn peer(&self) -> PeerEndpoint {
        self.peer
    }

    /// Send one payload on the data channel.
    pub async fn send(&self, payload: Vec<u8>) -> Result<(), TransportError> {
        self.channel
            .send_data(self.peer, ChannelNumber::DATA, payload)
            .await
    }
}

impl std::fmt::Debug for PortSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortSender").field("peer", &self.peer).finish()
    }
}

/// Frame-level forwarding component used in bridged mode.
pub trait FrameSwitch: Send + Sync {
    /// Register a forwarding port for a newly established peer.
    fn register_port(&self, peer: PeerEndpoint, sender: PortSender);

    /// Unregister the port for a lost peer.
    fn unregister_port(&self, peer: &PeerEndpoint);

    /// Hand an inbound frame from the peer to the switch.
    fn frame_received(&self, peer: PeerEndpoint, frame: &[u8]);
}

/// Packet-level forwarding component used in routed mode.
pub trait PacketRouter: Send + Sync {
    /// Register a forwarding port carrying the peer's advertised routes.
    fn register_port(&self, peer: PeerEndpoint, routes: RouteSet, sender: PortSender);

    /// Unregister the port for a lost peer.
    fn unregister_port(&self, peer: &PeerEndpoint);

    /// Replace the advertised routes for an existing port.
    fn update_routes(&self, peer: &PeerEndpoint, routes: RouteSet);

    /// Hand an inbound packet from the peer to the router.
    fn packet_received(&self, peer: PeerEndpoint, packet: &[u8]);
}

/// The forwarding component selected by configuration.
#[derive(Clone)]
pub enum Forwarding {
    /// Bridged (switch) mode: raw frames keyed by peer.
    Bridged(Arc<dyn FrameSwitch>),
    /// Routed mode: network packets plus per-peer route sets.
    Routed(Arc<dyn PacketRouter>),
}

impl std::fmt::Debug for Forwarding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bridged(_) => f.write_str("Forwarding::Bridged"),
            Self::Routed(_) => f.write_str("Forwarding::Routed"),
        }
    }
}
