//! Transport event handling.
//!
//! The orchestrator is the single event sink the secure channel service
//! drives. Every verdict-carrying handler starts from the transport's own
//! suggested disposition and only tightens it.

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::domain::{
    AlgorithmInfo, ChannelNumber, CipherAlgorithm, Contact, ControlMessage, Fingerprint,
    PeerCertificate, PeerEndpoint,
};
use crate::ports::inbound::TransportEventSink;
use crate::ports::outbound::Forwarding;
use crate::service::core::SessionOrchestrator;

#[async_trait]
impl TransportEventSink for SessionOrchestrator {
    async fn hello_received(&self, sender: PeerEndpoint, default_accept: bool) -> bool {
        debug!(%sender, default_accept, "received hello request");

        let mut accept = default_accept;
        if self.banned().is_banned(sender.address()) {
            warn!(%sender, "ignoring hello request from banned host");
            accept = false;
        }

        if accept {
            self.introduce_to(sender).await;
        }

        accept
    }

    async fn contact_request_received(
        &self,
        sender: PeerEndpoint,
        subject: PeerCertificate,
        fingerprint: Fingerprint,
        answer: PeerEndpoint,
    ) -> bool {
        if !self.config().channel.accept_contact_requests {
            return false;
        }

        info!(
            %sender,
            subject = subject.subject(),
            %fingerprint,
            %answer,
            "received contact request"
        );

        true
    }

    async fn contact_received(
        &self,
        sender: PeerEndpoint,
        fingerprint: Fingerprint,
        answer: PeerEndpoint,
    ) {
        if !self.config().channel.accept_contacts {
            return;
        }

        if self.banned().is_banned(answer.address()) {
            warn!(%sender, %fingerprint, %answer, "received forbidden contact; host will not be contacted");
            return;
        }

        info!(%sender, %fingerprint, %answer, "received contact");
        self.contact(&Contact::from(answer)).await;
    }

    async fn presentation_received(
        &self,
        sender: PeerEndpoint,
        signature_certificate: PeerCertificate,
        cipherment_certificate: PeerCertificate,
        is_new: bool,
    ) -> bool {
        debug!(
            %sender,
            signature = signature_certificate.subject(),
            cipherment = cipherment_certificate.subject(),
            is_new,
            "received presentation"
        );

        if self.banned().is_banned(sender.address()) {
            warn!(%sender, "ignoring presentation from banned host");
            return false;
        }

        if self.certificate_is_valid(&signature_certificate)
            && self.certificate_is_valid(&cipherment_certificate)
        {
            self.request_session_with(sender).await;
            return true;
        }

        false
    }

    async fn session_request_received(
        &self,
        sender: PeerEndpoint,
        capabilities: Vec<CipherAlgorithm>,
        default_accept: bool,
    ) -> bool {
        let offered = capabilities
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ");
        debug!(%sender, %offered, default_accept, "received session request");

        default_accept
    }

    async fn session_received(
        &self,
        sender: PeerEndpoint,
        cipher: CipherAlgorithm,
        default_accept: bool,
    ) -> bool {
        debug!(%sender, %cipher, default_accept, "received session");

        default_accept
    }

    async fn session_failed(
        &self,
        peer: PeerEndpoint,
        is_new: bool,
        local: AlgorithmInfo,
        remote: AlgorithmInfo,
    ) {
        if is_new {
            warn!(%peer, %local, %remote, "session establishment failed");
        } else {
            warn!(%peer, %local, %remote, "session renewal failed");
        }
        // The next periodic contact cycle retries naturally.
    }

    async fn session_established(
        &self,
        peer: PeerEndpoint,
        is_new: bool,
        local: AlgorithmInfo,
        remote: AlgorithmInfo,
    ) {
        if is_new {
            info!(%peer, %local, %remote, "session established");
            self.register_forwarding_port(peer);
        } else {
            info!(%peer, %local, %remote, "session renewed");
        }
    }

    async fn session_lost(&self, peer: PeerEndpoint) {
        info!(%peer, "session lost");
        self.unregister_forwarding_port(peer);
    }

    async fn data_received(&self, sender: PeerEndpoint, channel: ChannelNumber, payload: Vec<u8>) {
        match channel {
            ChannelNumber::DATA => match self.forwarding() {
                Forwarding::Bridged(switch) => switch.frame_received(sender, &payload),
                Forwarding::Routed(router) => router.packet_received(sender, &payload),
            },
            ChannelNumber::MESSAGES => match ControlMessage::decode(&payload) {
                Ok(message) => self.handle_control_message(sender, message).await,
                Err(error) => {
                    warn!(%sender, %error, "received incorrectly formatted message");
                }
            },
            other => {
                warn!(%sender, channel = %other, bytes = payload.len(), "received data on unhandled channel");
            }
        }
    }
}

impl SessionOrchestrator {
    async fn handle_control_message(&self, sender: PeerEndpoint, message: ControlMessage) {
        match message {
            ControlMessage::RoutesRequest => {
                // Answering with local routes is the forwarding layer's
                // business; the core only acknowledges the request.
                debug!(%sender, "peer requested local routes");
            }
            ControlMessage::Routes { routes } => match self.forwarding() {
                Forwarding::Routed(router) => {
                    info!(%sender, routes = routes.len(), "received route advertisement");
                    router.update_routes(&sender, routes);
                }
                Forwarding::Bridged(_) => {
                    debug!(%sender, "ignoring route advertisement on a bridged network");
                }
            },
        }
    }
}
